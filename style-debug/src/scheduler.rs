//! Low-priority scheduling for flushes.
//!
//! Callers hand a [`FlushTask`] to a [`Scheduler`] and never learn which
//! mechanism runs it. Implementations pick between an idle callback with a
//! bounded timeout and a next-paint callback via [`ScheduleStrategy`].

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::error::Result;

/// Work deferred until the host is idle. An `Err` escapes to whatever
/// drives the scheduler.
pub type FlushTask = Box<dyn FnOnce() -> Result<()>>;

pub trait Scheduler {
    fn schedule_low_priority(&self, task: FlushTask);
}

impl<T: Scheduler + ?Sized> Scheduler for Rc<T> {
    fn schedule_low_priority(&self, task: FlushTask) {
        (**self).schedule_low_priority(task)
    }
}

/// Which callback mechanism a scheduler uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStrategy {
    /// Run when the host is idle, but no later than `timeout`.
    Idle { timeout: Duration },
    /// Run right before the next paint.
    NextPaint,
}

impl ScheduleStrategy {
    /// Idle callbacks win whenever the host offers them.
    pub fn select(idle_available: bool, timeout: Duration) -> Self {
        if idle_available {
            Self::Idle { timeout }
        } else {
            Self::NextPaint
        }
    }
}

/// Scheduler driven by hand. Tasks run only when [`run_pending`] is
/// called, which makes flush timing observable in tests and tools.
///
/// [`run_pending`]: ManualScheduler::run_pending
#[derive(Clone, Default)]
pub struct ManualScheduler {
    tasks: Rc<RefCell<VecDeque<FlushTask>>>,
    scheduled: Rc<Cell<usize>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the tasks queued so far. Tasks they schedule wait for the next
    /// call. Stops at the first failing task; later tasks stay queued.
    pub fn run_pending(&self) -> Result<usize> {
        let batch: Vec<FlushTask> = self.tasks.borrow_mut().drain(..).collect();
        let mut ran = 0;
        let mut batch = batch.into_iter();
        while let Some(task) = batch.next() {
            if let Err(err) = task() {
                let mut tasks = self.tasks.borrow_mut();
                for (i, rest) in batch.enumerate() {
                    tasks.insert(i, rest);
                }
                return Err(err);
            }
            ran += 1;
        }
        Ok(ran)
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Total number of tasks ever scheduled.
    pub fn scheduled(&self) -> usize {
        self.scheduled.get()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_low_priority(&self, task: FlushTask) {
        self.scheduled.set(self.scheduled.get() + 1);
        self.tasks.borrow_mut().push_back(task);
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::DeferredScheduler;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Duration;

    use super::{FlushTask, ScheduleStrategy, Scheduler};

    const FRAME: Duration = Duration::from_millis(16);

    /// Runs tasks on the current tokio `LocalSet`.
    ///
    /// `Idle` yields once so already-queued local work goes first, which is
    /// always well inside its timeout. `NextPaint` waits one 60 Hz frame.
    /// Must be used from inside a `LocalSet`.
    #[derive(Debug, Clone, Copy)]
    pub struct DeferredScheduler {
        strategy: ScheduleStrategy,
    }

    impl DeferredScheduler {
        pub fn new(strategy: ScheduleStrategy) -> Self {
            Self { strategy }
        }

        pub fn strategy(&self) -> ScheduleStrategy {
            self.strategy
        }
    }

    impl Scheduler for DeferredScheduler {
        fn schedule_low_priority(&self, task: FlushTask) {
            let strategy = self.strategy;
            tokio::task::spawn_local(async move {
                match strategy {
                    ScheduleStrategy::Idle { .. } => tokio::task::yield_now().await,
                    ScheduleStrategy::NextPaint => tokio::time::sleep(FRAME).await,
                }
                if let Err(err) = task() {
                    tracing::error!(%err, "scheduled debug flush failed");
                }
            });
        }
    }
}
