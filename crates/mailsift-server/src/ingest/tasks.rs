//! Fan-out/fan-in task execution
//!
//! An explicit asynchronous join: tasks of a group run concurrently under a
//! semaphore bound, completions are counted, and a continuation fires exactly
//! once when the count of finished tasks reaches the number submitted. No
//! polling; the group supervisor awaits completions directly.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};

/// Completion counters for one fan-out group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStats {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl GroupStats {
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// A single flat group of independent tasks.
///
/// Each task reports success as `true`. Failures are counted, never
/// propagated; individual tasks are expected to log their own errors.
pub struct TaskGroup {
    semaphore: Arc<Semaphore>,
    set: JoinSet<bool>,
    submitted: usize,
}

impl TaskGroup {
    pub fn new(concurrency: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            set: JoinSet::new(),
            submitted: 0,
        }
    }

    /// Add one task to the group. The task starts as soon as a permit frees.
    pub fn submit<F>(&mut self, task: F)
    where
        F: Future<Output = bool> + Send + 'static,
    {
        let semaphore = self.semaphore.clone();
        self.set.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            task.await
        });
        self.submitted += 1;
    }

    /// Detach a supervisor that drains the group and then runs the
    /// continuation exactly once, regardless of individual task outcomes.
    pub fn join<C, Fut>(mut self, on_complete: C) -> JoinHandle<GroupStats>
    where
        C: FnOnce(GroupStats) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        tokio::spawn(async move {
            let mut stats = GroupStats {
                submitted: self.submitted,
                ..Default::default()
            };

            while let Some(joined) = self.set.join_next().await {
                match joined {
                    Ok(true) => stats.succeeded += 1,
                    Ok(false) => stats.failed += 1,
                    Err(e) => {
                        stats.failed += 1;
                        tracing::error!(error = %e, "Task terminated abnormally");
                    },
                }
            }

            on_complete(stats).await;
            stats
        })
    }
}
