use std::future::Future;

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::actor::Actor;
use crate::addr::Addr;

/// Provides context and capabilities to actors during message handling.
///
/// The context gives actors access to:
/// - Their own address for self-messaging
/// - Actor-scoped background task spawning
/// - The pipe pattern for bridging async results back into the mailbox
pub struct Context<A>
where
    A: Actor,
{
    addr: Addr<A>,
    cancellation: CancellationToken,
}

impl<A> Context<A>
where
    A: Actor,
{
    pub(crate) fn new(addr: Addr<A>, cancellation: CancellationToken) -> Self {
        Context { addr, cancellation }
    }

    /// The actor's own address, for self-messaging or handing out.
    pub fn addr(&self) -> Addr<A> {
        self.addr.clone()
    }

    /// Spawn the future on the actor's lifecycle.
    ///
    /// The given future will be cancelled if the actor stops. As such, the
    /// future should be cancel safe as it may be cancelled without notice.
    /// Once cancelled, it will not be restarted.
    pub fn spawn(&self, fut: impl Future<Output = ()> + Send + 'static) -> CancellationToken {
        let cancellation = self.cancellation.child_token();
        let cancellation_ret = cancellation.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = fut => {},
                _ = cancellation.cancelled() => {}
            };
        });
        cancellation_ret
    }

    /// Feed the outcome of already-launched asynchronous work back into this
    /// actor's own message stream (the pipe pattern).
    ///
    /// The work runs unsynchronized on the task pool; its outcome re-enters
    /// through the same serialized mailbox as every other message. Success,
    /// panic, and cancellation all arrive as the `Result` given to `map` —
    /// failures are values here, never unwinds into the actor. If the actor
    /// has stopped by the time the work completes, the mapped message is
    /// dropped silently.
    pub fn pipe_to_self<T, F>(&self, work: JoinHandle<T>, map: F)
    where
        T: Send + 'static,
        F: FnOnce(Result<T, JoinError>) -> A::Message + Send + 'static,
    {
        let addr = self.addr.clone();
        tokio::spawn(async move {
            let outcome = work.await;
            addr.tell(map(outcome));
        });
    }
}
