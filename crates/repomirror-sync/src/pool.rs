//! Bounded work pool
//!
//! Runs a batch of independent tasks with at most `limit` in flight and
//! returns every outcome once all of them have finished. A failing or
//! panicking task never cancels its siblings and the pool itself never fails.

use crate::error::{Error, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::Semaphore;
use tracing::debug;

/// Result of one submitted task
#[derive(Debug)]
pub struct Outcome<T> {
    pub label: String,
    pub result: Result<T>,
}

impl<T> Outcome<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Flat pool with a fixed concurrency ceiling
#[derive(Debug, Clone, Copy)]
pub struct WorkPool {
    limit: usize,
}

impl WorkPool {
    /// A limit of zero is raised to one
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run every `(label, task)` pair and collect all outcomes in submission order.
    ///
    /// A task is only started once it holds a slot; queued tasks wait in
    /// submission order.
    pub async fn submit_all<'a, I, F, Fut, T>(&self, tasks: I) -> Vec<Outcome<T>>
    where
        I: IntoIterator<Item = (String, F)>,
        F: FnOnce() -> Fut + 'a,
        Fut: Future<Output = Result<T>> + 'a,
        T: 'a,
    {
        let semaphore = Semaphore::new(self.limit);
        let mut pending = FuturesUnordered::new();

        for (index, (label, task)) in tasks.into_iter().enumerate() {
            let semaphore = &semaphore;
            pending.push(async move {
                // Never closed, so acquire cannot fail
                let _permit = semaphore.acquire().await.ok();
                debug!("Starting task: {}", label);

                let result = match AssertUnwindSafe(async move { task().await })
                    .catch_unwind()
                    .await
                {
                    Ok(result) => result,
                    Err(payload) => Err(Error::worker(&label, panic_message(payload))),
                };

                (index, Outcome { label, result })
            });
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some(finished) = pending.next().await {
            outcomes.push(finished);
        }

        outcomes.sort_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
