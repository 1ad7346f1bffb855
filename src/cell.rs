//! The read side: a cell that will hold one outcome and tells its observers
//! when it arrives.
//!
use crate::{Error, Wait};
use parking_lot::Mutex;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

/// The terminal result stored in a [`ResultCell`].
pub type Outcome<V, E> = Result<V, E>;

type Observer<V, E> = Box<dyn FnOnce(&Outcome<V, E>) + Send>;
type ValueObserver<V> = Box<dyn FnOnce(&V) + Send>;

/// A shared, read-only handle to a value that arrives later.
///
/// Handles are cheap to clone; every clone observes the same cell. Only the
/// [`Resolver`](crate::Resolver) that produced the cell can complete it.
///
/// Callbacks run inline. An observer registered while the cell is pending
/// runs on the thread that resolves it, during `resolve`/`reject`. An
/// observer registered after resolution runs on the registering thread
/// before `observe` returns. The internal lock is released before any
/// callback is invoked, so callbacks may use the cell again.
pub struct ResultCell<V, E> {
    inner: Arc<Mutex<State<V, E>>>,
}

enum State<V, E> {
    Pending(Observers<V, E>),
    Resolved(Arc<Outcome<V, E>>),
    /// The resolver went away without ever producing an outcome.
    Abandoned,
}

struct Observers<V, E> {
    full: Vec<Observer<V, E>>,
    values: Vec<ValueObserver<V>>,
    wakers: Vec<Waker>,
}

impl<V, E> Observers<V, E> {
    fn new() -> Self {
        Self {
            full: vec![],
            values: vec![],
            wakers: vec![],
        }
    }
}

impl<V, E> ResultCell<V, E> {
    pub(crate) fn pending() -> Self {
        Self {
            inner: Arc::new(Mutex::new(State::Pending(Observers::new()))),
        }
    }

    pub(crate) fn with_outcome(outcome: Outcome<V, E>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(State::Resolved(Arc::new(outcome)))),
        }
    }

    /// Calls `callback` with the outcome once it is known, or right away if
    /// it already is. The callback runs at most once.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_cell::Resolver;
    /// use std::sync::mpsc::channel;
    ///
    /// let resolver = Resolver::<u32, String>::pending();
    /// let (tx, rx) = channel();
    /// resolver.cell().observe(move |outcome| tx.send(outcome.clone()).unwrap());
    /// assert!(rx.try_recv().is_err());
    ///
    /// resolver.resolve(7).unwrap();
    /// assert_eq!(rx.try_recv(), Ok(Ok(7)));
    /// ```
    pub fn observe<F>(&self, callback: F)
    where
        F: FnOnce(&Outcome<V, E>) + Send + 'static,
    {
        let outcome = {
            let mut state = self.inner.lock();
            match &mut *state {
                State::Pending(observers) => {
                    observers.full.push(Box::new(callback));
                    tracing::trace!(queued = observers.full.len(), "observer registered");
                    return;
                }
                State::Resolved(outcome) => Arc::clone(outcome),
                State::Abandoned => {
                    tracing::trace!("observer dropped, cell was abandoned");
                    return;
                }
            }
        };
        callback(&outcome);
    }

    /// Like [`observe`](Self::observe) but only for a successful outcome.
    /// The callback is never called if the cell is rejected.
    pub fn observe_value<F>(&self, callback: F)
    where
        F: FnOnce(&V) + Send + 'static,
    {
        let outcome = {
            let mut state = self.inner.lock();
            match &mut *state {
                State::Pending(observers) => {
                    observers.values.push(Box::new(callback));
                    tracing::trace!(queued = observers.values.len(), "value observer registered");
                    return;
                }
                State::Resolved(outcome) => Arc::clone(outcome),
                State::Abandoned => {
                    tracing::trace!("value observer dropped, cell was abandoned");
                    return;
                }
            }
        };
        if let Ok(value) = &*outcome {
            callback(value);
        }
    }

    /// Returns a future that completes with the shared outcome.
    pub fn wait(&self) -> Wait<V, E> {
        Wait::new(self.clone())
    }

    pub fn is_resolved(&self) -> bool {
        matches!(&*self.inner.lock(), State::Resolved(_))
    }

    /// The stored outcome, if any. Never blocks on resolution.
    pub fn outcome(&self) -> Option<Arc<Outcome<V, E>>> {
        match &*self.inner.lock() {
            State::Resolved(outcome) => Some(Arc::clone(outcome)),
            _ => None,
        }
    }

    /// Stores `outcome`, wakes any waiting tasks, then fans it out: full
    /// observers first, then value observers, each group in registration
    /// order.
    ///
    /// A panicking observer does not stop delivery to the rest. The first
    /// panic is resumed once every observer has run.
    ///
    /// Only a pending cell accepts an outcome. Anything else is refused and
    /// nobody is notified again.
    pub(crate) fn set_outcome(&self, outcome: Outcome<V, E>) -> Result<(), Error> {
        let outcome = Arc::new(outcome);
        let observers = {
            let mut state = self.inner.lock();
            match std::mem::replace(&mut *state, State::Resolved(Arc::clone(&outcome))) {
                State::Pending(observers) => observers,
                previous => {
                    *state = previous;
                    tracing::warn!("refusing to resolve a cell twice");
                    return Err(Error::AlreadyResolved);
                }
            }
        };

        let Observers {
            full,
            values,
            wakers,
        } = observers;
        tracing::trace!(
            success = outcome.is_ok(),
            observers = full.len(),
            value_observers = values.len(),
            wakers = wakers.len(),
            "cell resolved"
        );
        for waker in wakers {
            waker.wake();
        }

        let mut panicked = None;
        for callback in full {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(&outcome))) {
                tracing::warn!("observer panicked during delivery");
                panicked.get_or_insert(payload);
            }
        }
        if let Ok(value) = &*outcome {
            for callback in values {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(value))) {
                    tracing::warn!("value observer panicked during delivery");
                    panicked.get_or_insert(payload);
                }
            }
        }
        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }
        Ok(())
    }

    /// Marks a still-pending cell as abandoned. Queued observers are
    /// released without being called and waiting tasks are woken.
    pub(crate) fn abandon(&self) {
        let observers = {
            let mut state = self.inner.lock();
            match std::mem::replace(&mut *state, State::Abandoned) {
                State::Pending(observers) => observers,
                previous => {
                    *state = previous;
                    return;
                }
            }
        };
        tracing::debug!(
            observers = observers.full.len(),
            value_observers = observers.values.len(),
            "resolver dropped while pending, cell abandoned"
        );
        for waker in observers.wakers {
            waker.wake();
        }
    }

    pub(crate) fn poll_outcome(&self, cx: &mut Context<'_>) -> Poll<Result<Arc<Outcome<V, E>>, Error>> {
        let mut state = self.inner.lock();
        match &mut *state {
            State::Pending(observers) => {
                if !observers.wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    observers.wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
            State::Resolved(outcome) => Poll::Ready(Ok(Arc::clone(outcome))),
            State::Abandoned => Poll::Ready(Err(Error::ResolverDropped)),
        }
    }
}

impl<V, E> Clone for ResultCell<V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, E> fmt::Debug for ResultCell<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.inner.lock() {
            State::Pending(_) => "pending",
            State::Resolved(outcome) if outcome.is_ok() => "resolved",
            State::Resolved(_) => "rejected",
            State::Abandoned => "abandoned",
        };
        f.debug_struct("ResultCell").field("state", &state).finish()
    }
}
