use thiserror::Error;

/// Misuse errors raised by the cell itself. Failures of the computation
/// being awaited travel as the `Err` side of an [`Outcome`](crate::Outcome)
/// and never through this type.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("the result cell already holds an outcome")]
    AlreadyResolved,
    #[error("the resolver was dropped before the cell was resolved")]
    ResolverDropped,
}
