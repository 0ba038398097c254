//! Synchronous-to-asynchronous bridge for boundary and test code.
//!
//! The actor core never calls this; it exists so synchronous callers (tests,
//! mostly) can observe async outcomes without already being on a runtime.

use std::future::Future;
use std::sync::mpsc;
use std::time::Duration;

/// Errors from running an async block through [`conduit`].
#[derive(thiserror::Error, Debug)]
pub enum ConduitError {
    /// The async block did not complete within the timeout
    #[error("async block did not complete within the timeout")]
    Timeout,
    /// The async block panicked before producing a value
    #[error("async block panicked before producing a value")]
    Interrupted,
    /// The bridging runtime could not be built
    #[error("failed to build the bridging runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Run an async block to completion off the caller's synchronous context.
///
/// The future runs on a fresh current-thread runtime on its own OS thread;
/// the caller blocks for at most `timeout` waiting for the result.
pub fn conduit<T, F>(timeout: Duration, fut: F) -> Result<T, ConduitError>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let (tx, rx) = mpsc::sync_channel(1);
    std::thread::spawn(move || {
        let _ = tx.send(runtime.block_on(fut));
    });
    match rx.recv_timeout(timeout) {
        Ok(value) => Ok(value),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(ConduitError::Timeout),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(ConduitError::Interrupted),
    }
}
