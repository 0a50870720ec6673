//! Spawning deferred work on the host's single-threaded executor.

use std::rc::Rc;

use futures::executor::LocalSpawner;
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

pub trait TaskSpawner {
    /// Run `task` to completion later on the current thread.
    fn spawn_task(&self, task: LocalBoxFuture<'static, ()>);
}

impl<T: TaskSpawner + ?Sized> TaskSpawner for Rc<T> {
    fn spawn_task(&self, task: LocalBoxFuture<'static, ()>) {
        (**self).spawn_task(task)
    }
}

impl TaskSpawner for LocalSpawner {
    fn spawn_task(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(err) = self.spawn_local(task) {
            tracing::warn!(%err, "executor shut down; debug annotation dropped");
        }
    }
}

/// Spawns onto the current tokio `LocalSet`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

#[cfg(not(target_arch = "wasm32"))]
impl TaskSpawner for TokioSpawner {
    fn spawn_task(&self, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(task);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::executor::LocalPool;
    use futures::FutureExt;

    use super::*;

    #[test]
    fn local_spawner_runs_when_pool_is_driven() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        spawner.spawn_task(async move { flag.set(true) }.boxed_local());

        assert!(!done.get());
        pool.run_until_stalled();
        assert!(done.get());
    }
}
