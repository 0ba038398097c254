//! Cooperative-scheduling glue over the tokio task pool.

use std::future::Future;

use tokio::task::JoinHandle;

/// Push the remainder of the calling task to the back of the run queue.
///
/// Suspends for exactly one scheduler turn, giving every other ready task a
/// chance to run before continuing.
pub async fn requeue() {
    tokio::task::yield_now().await;
}

/// Spawn `fut` on the pool, yielding one scheduler turn before running it.
///
/// Used where a freshly-spawned producer must not race ahead of work the
/// caller is about to do — notably stream construction, where the consumer
/// attaches right after the constructor returns.
pub fn next_loop<F>(fut: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        fut.await;
    })
}
