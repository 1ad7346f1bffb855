//! A single-assignment result cell and the resolver that completes it.
//!
//! A [`Resolver`] owns the right to complete a cell once, with a value or an
//! error. Any number of [`ResultCell`] handles can watch the same cell,
//! either by registering callbacks or by awaiting [`ResultCell::wait`].
//!
//! ```
//! use promise_cell::Resolver;
//! use std::sync::mpsc::channel;
//!
//! let resolver = Resolver::<u32, String>::pending();
//! let cell = resolver.cell();
//! let (tx, rx) = channel();
//! let tx2 = tx.clone();
//! cell.observe(move |outcome| tx.send(format!("{:?}", outcome)).unwrap());
//! cell.observe_value(move |value| tx2.send(format!("value {}", value)).unwrap());
//!
//! resolver.resolve(7).unwrap();
//! assert_eq!(rx.try_iter().collect::<Vec<_>>(), ["Ok(7)", "value 7"]);
//! ```
//!
mod cell;
mod error;
mod resolver;
mod wait;

pub use cell::{Outcome, ResultCell};
pub use error::Error;
pub use resolver::Resolver;
pub use wait::Wait;

/// The producing half of a promise: hands out read-only views of its cell
/// and completes it once.
pub trait Promise {
    type Value;
    type Error;
    type Cell;

    fn cell(&self) -> Self::Cell;
    fn resolve(self, value: Self::Value) -> Result<(), crate::Error>;
    fn reject(self, error: Self::Error) -> Result<(), crate::Error>;
}
