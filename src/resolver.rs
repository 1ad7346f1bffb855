use crate::{Error, Promise, ResultCell};
use std::fmt;

/// The write side of a [`ResultCell`]. A resolver completes its cell at
/// most once: `resolve` and `reject` take it by value.
///
/// Dropping a resolver whose cell is still pending abandons the cell. Its
/// observers are released uncalled and [`Wait`](crate::Wait) futures
/// complete with [`Error::ResolverDropped`].
///
/// # Examples
///
/// ```
/// use promise_cell::Resolver;
/// use std::sync::mpsc::channel;
///
/// let resolver = Resolver::<u32, String>::resolved(42);
/// let (tx, rx) = channel();
/// resolver.cell().observe_value(move |value| tx.send(*value).unwrap());
/// assert_eq!(rx.try_recv(), Ok(42));
/// ```
pub struct Resolver<V, E> {
    cell: ResultCell<V, E>,
}

impl<V, E> Resolver<V, E> {
    /// A resolver whose cell starts pending, or already holds
    /// `Ok(value)` when `initial` is `Some`.
    pub fn new(initial: Option<V>) -> Self {
        match initial {
            Some(value) => Self::resolved(value),
            None => Self::pending(),
        }
    }

    pub fn pending() -> Self {
        Self {
            cell: ResultCell::pending(),
        }
    }

    pub fn resolved(value: V) -> Self {
        Self {
            cell: ResultCell::with_outcome(Ok(value)),
        }
    }

    pub fn rejected(error: E) -> Self {
        Self {
            cell: ResultCell::with_outcome(Err(error)),
        }
    }

    /// A read-only handle to the cell this resolver completes.
    pub fn cell(&self) -> ResultCell<V, E> {
        self.cell.clone()
    }

    /// Completes the cell with `Ok(value)` and notifies every observer
    /// before returning.
    ///
    /// Fails with [`Error::AlreadyResolved`] if the resolver was built
    /// pre-resolved; observers are not notified a second time.
    pub fn resolve(self, value: V) -> Result<(), Error> {
        self.cell.set_outcome(Ok(value))
    }

    /// Completes the cell with `Err(error)`. Value observers are skipped.
    pub fn reject(self, error: E) -> Result<(), Error> {
        self.cell.set_outcome(Err(error))
    }
}

impl<V, E> Default for Resolver<V, E> {
    fn default() -> Self {
        Self::pending()
    }
}

impl<V, E> Drop for Resolver<V, E> {
    /// If this is an unresolved resolver, abandon the cell.
    fn drop(&mut self) {
        self.cell.abandon();
    }
}

impl<V, E> fmt::Debug for Resolver<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").field("cell", &self.cell).finish()
    }
}

impl<V, E> Promise for Resolver<V, E> {
    type Value = V;
    type Error = E;
    type Cell = ResultCell<V, E>;

    fn cell(&self) -> Self::Cell {
        Resolver::cell(self)
    }

    fn resolve(self, value: V) -> Result<(), Error> {
        Resolver::resolve(self, value)
    }

    fn reject(self, error: E) -> Result<(), Error> {
        Resolver::reject(self, error)
    }
}

#[cfg(test)]
mod tests {
    use super::Resolver;
    use crate::Error;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Boom(&'static str);

    #[test]
    fn pre_resolved_value_reaches_value_observer() {
        let resolver = Resolver::<u32, Boom>::new(Some(42));
        let seen = Arc::new(Mutex::new(vec![]));
        let s = seen.clone();
        resolver.cell().observe_value(move |v| s.lock().push(*v));
        assert_eq!(*seen.lock(), vec![42]);
    }

    #[test]
    fn resolve_delivers_in_registration_order() {
        let resolver = Resolver::<u32, Boom>::new(None);
        let cell = resolver.cell();
        let seen = Arc::new(Mutex::new(vec![]));
        for name in ["A", "B"] {
            let s = seen.clone();
            cell.observe(move |outcome| s.lock().push((name, outcome.clone())));
        }
        resolver.resolve(7).unwrap();
        assert_eq!(*seen.lock(), vec![("A", Ok(7)), ("B", Ok(7))]);
    }

    #[test]
    fn reject_skips_value_observers() {
        let resolver = Resolver::<u32, Boom>::pending();
        let cell = resolver.cell();
        let fired = Arc::new(Mutex::new(0));
        let f = fired.clone();
        cell.observe_value(move |_| *f.lock() += 1);
        resolver.reject(Boom("no")).unwrap();

        let f = fired.clone();
        cell.observe_value(move |_| *f.lock() += 1);
        assert_eq!(*fired.lock(), 0);
        assert_eq!(cell.outcome().as_deref(), Some(&Err(Boom("no"))));
    }

    #[test]
    fn pre_rejected_reports_failure_to_late_observer() {
        let resolver = Resolver::<u32, Boom>::rejected(Boom("early"));
        let seen = Arc::new(Mutex::new(vec![]));
        let s = seen.clone();
        resolver.cell().observe(move |outcome| s.lock().push(outcome.clone()));
        assert_eq!(*seen.lock(), vec![Err(Boom("early"))]);
    }

    #[test]
    fn resolving_a_pre_resolved_resolver_fails() {
        let resolver = Resolver::<u32, Boom>::resolved(1);
        let cell = resolver.cell();
        let calls = Arc::new(Mutex::new(0));
        let c = calls.clone();
        cell.observe(move |_| *c.lock() += 1);

        assert_eq!(resolver.resolve(2), Err(Error::AlreadyResolved));
        assert_eq!(*calls.lock(), 1);
        assert_eq!(cell.outcome().as_deref(), Some(&Ok(1)));
    }

    #[test]
    fn dropping_a_pending_resolver_abandons_the_cell() {
        let resolver = Resolver::<u32, Boom>::default();
        let cell = resolver.cell();
        let calls = Arc::new(Mutex::new(0));
        let c = calls.clone();
        cell.observe(move |_| *c.lock() += 1);
        drop(resolver);

        assert!(!cell.is_resolved());
        assert_eq!(cell.outcome(), None);
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn cell_outlives_resolver_once_resolved() {
        let resolver = Resolver::<u32, Boom>::pending();
        let cell = resolver.cell();
        resolver.resolve(3).unwrap();
        assert!(cell.is_resolved());
        assert_eq!(cell.outcome().as_deref(), Some(&Ok(3)));
    }
}
