//! Periodic polling tasks on one cooperative context.
//!
//! Every task runs on the current [`tokio::task::LocalSet`]; [`Scheduler::schedule`]
//! and [`Scheduler::spawn_once`] must be called from inside one. A tick never waits
//! for the previous tick's work: each invocation is spawned on its own, and tasks
//! that must not overlap wrap their body in a [`SingleFlight`](crate::single_flight::SingleFlight).

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Captured when a task is invoked. Continuations check it before touching state,
/// so a call that resolves after cancellation changes nothing.
#[derive(Debug, Clone)]
pub struct Liveness {
    scheduler: Rc<Cell<bool>>,
    task: Rc<Cell<bool>>,
}

impl Liveness {
    pub fn is_alive(&self) -> bool {
        self.scheduler.get() && self.task.get()
    }
}

#[derive(Debug)]
struct TaskSlot {
    name: &'static str,
    alive: Rc<Cell<bool>>,
    ticker: Option<AbortHandle>,
}

impl TaskSlot {
    fn cancel(&self) {
        if self.alive.replace(false) {
            tracing::trace!(task = self.name, "cancelled");
        }
        if let Some(ticker) = &self.ticker {
            ticker.abort();
        }
    }
}

/// Cancellation handle returned by [`Scheduler::schedule`].
#[derive(Debug, Clone)]
pub struct TaskHandle {
    slot: Rc<TaskSlot>,
}

impl TaskHandle {
    pub fn name(&self) -> &'static str {
        self.slot.name
    }

    /// Stops the timer. Invocations already in flight become no-ops.
    pub fn cancel(&self) {
        self.slot.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        !self.slot.alive.get()
    }
}

#[derive(Debug)]
pub struct Scheduler {
    alive: Rc<Cell<bool>>,
    tasks: RefCell<Vec<Rc<TaskSlot>>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            alive: Rc::new(Cell::new(true)),
            tasks: RefCell::new(Vec::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.alive.get()
    }

    /// Number of periodic tasks that have not been cancelled.
    pub fn active_tasks(&self) -> usize {
        self.tasks
            .borrow()
            .iter()
            .filter(|slot| slot.alive.get())
            .count()
    }

    /// Invokes `task` right away and then every `period` until cancelled.
    pub fn schedule<F, Fut>(&self, name: &'static str, period: Duration, mut task: F) -> TaskHandle
    where
        F: FnMut(Liveness) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let alive = Rc::new(Cell::new(self.is_running()));
        if !self.is_running() {
            tracing::warn!(task = name, "scheduler is shut down, task not started");
            let slot = Rc::new(TaskSlot { name, alive, ticker: None });
            return TaskHandle { slot };
        }

        let liveness = Liveness {
            scheduler: self.alive.clone(),
            task: alive.clone(),
        };
        tokio::task::spawn_local(task(liveness.clone()));

        let ticker = tokio::task::spawn_local(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if !liveness.is_alive() {
                    break;
                }
                tokio::task::spawn_local(task(liveness.clone()));
            }
        });

        tracing::debug!(task = name, period_ms = period.as_millis() as u64, "scheduled");
        let slot = Rc::new(TaskSlot {
            name,
            alive,
            ticker: Some(ticker.abort_handle()),
        });

        let mut tasks = self.tasks.borrow_mut();
        tasks.retain(|slot| slot.alive.get());
        tasks.push(slot.clone());
        TaskHandle { slot }
    }

    /// Runs `task` once. It is bound to the scheduler's liveness only.
    pub fn spawn_once<F, Fut>(&self, name: &'static str, task: F)
    where
        F: FnOnce(Liveness) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        if !self.is_running() {
            tracing::trace!(task = name, "scheduler is shut down, one-shot skipped");
            return;
        }

        let liveness = Liveness {
            scheduler: self.alive.clone(),
            task: Rc::new(Cell::new(true)),
        };
        tokio::task::spawn_local(task(liveness));
    }

    /// Cancels every task. Later results are discarded through [`Liveness`].
    pub fn shutdown(&self) {
        if !self.alive.replace(false) {
            return;
        }
        for slot in self.tasks.borrow_mut().drain(..) {
            slot.cancel();
        }
        tracing::debug!("scheduler shut down");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
