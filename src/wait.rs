use crate::{Error, Outcome, ResultCell};
use std::fmt;
use std::sync::Arc;
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

/// Awaits the outcome of a [`ResultCell`]. Any number of `Wait`s may be
/// pending on the same cell; every one of them receives the same shared
/// outcome.
///
/// # Examples
///
/// ```
/// use promise_cell::Resolver;
/// use futures::executor::block_on;
/// use std::thread;
///
/// let resolver = Resolver::<String, String>::pending();
/// let cell = resolver.cell();
/// let task = thread::spawn(move || block_on(cell.wait()));
/// resolver.resolve("Hi".into()).unwrap();
///
/// let outcome = task.join().expect("The task thread has panicked.").unwrap();
/// assert_eq!(*outcome, Ok("Hi".to_string()));
/// ```
#[must_use = "futures do nothing unless polled"]
pub struct Wait<V, E> {
    cell: ResultCell<V, E>,
}

impl<V, E> Wait<V, E> {
    pub(crate) fn new(cell: ResultCell<V, E>) -> Self {
        Self { cell }
    }
}

impl<V, E> Future for Wait<V, E> {
    /// `Err(Error::ResolverDropped)` if the cell can no longer be resolved.
    type Output = Result<Arc<Outcome<V, E>>, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.cell.poll_outcome(cx)
    }
}

impl<V, E> fmt::Debug for Wait<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wait").field("cell", &self.cell).finish()
    }
}
