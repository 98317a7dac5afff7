//! At most one in-flight execution per named operation.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

/// Outcome of [`SingleFlight::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flight<T> {
    /// A previous run was still in flight; this one was dropped, not queued.
    Dropped,
    /// The operation ran to completion with this output.
    Landed(T),
}

impl<T> Flight<T> {
    pub fn landed(self) -> Option<T> {
        match self {
            Flight::Landed(value) => Some(value),
            Flight::Dropped => None,
        }
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, Flight::Dropped)
    }
}

/// Guards one named operation. Clones share the same busy flag.
#[derive(Debug, Clone)]
pub struct SingleFlight {
    name: &'static str,
    busy: Rc<Cell<bool>>,
}

// Frees the flag however the guarded future ends: output, error, panic or drop.
struct Release(Rc<Cell<bool>>);

impl Drop for Release {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl SingleFlight {
    pub fn new(name: &'static str) -> Self {
        SingleFlight {
            name,
            busy: Rc::new(Cell::new(false)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Runs `op` unless a previous run is still in flight.
    pub async fn run<F, Fut, T>(&self, op: F) -> Flight<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if self.busy.replace(true) {
            tracing::trace!(operation = self.name, "still in flight, dropping trigger");
            return Flight::Dropped;
        }

        let _release = Release(self.busy.clone());
        Flight::Landed(op().await)
    }
}
