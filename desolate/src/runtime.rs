//! The receive loop that gives each actor its isolation and ordering
//! guarantees.

use tokio_util::sync::CancellationToken;

use crate::actor::{Actor, Signal};
use crate::addr::Addr;
use crate::context::Context;
use crate::mailbox::{self, Mailbox, MailboxSender};
use crate::message::Envelope;

/// Spawn an actor onto the task pool and return its address.
///
/// The actor runs until its handler returns [`Signal::Stopped`] or every
/// address to it has been dropped.
pub fn spawn<A>(actor: A) -> Addr<A>
where
    A: Actor,
{
    let (runtime, sender) = ActorRuntime::construct(actor);
    let addr = Addr::new(sender);
    let endpoint = addr.clone();
    tokio::spawn(runtime.run(endpoint));
    addr
}

pub(crate) struct ActorRuntime<A>
where
    A: Actor,
{
    actor: A,
    status: Signal,
    mailbox: Mailbox<Envelope<A::Message>>,
}

impl<A> ActorRuntime<A>
where
    A: Actor,
{
    pub fn construct(actor: A) -> (Self, MailboxSender<Envelope<A::Message>>) {
        let (sender, mailbox) = mailbox::unbounded();
        let runtime = ActorRuntime {
            actor,
            status: Signal::Running,
            mailbox,
        };
        (runtime, sender)
    }

    #[tracing::instrument(name = "actor", skip_all, fields(actor = A::NAME))]
    pub async fn run(mut self, endpoint: Addr<A>) {
        let cancellation = CancellationToken::new();
        let mut ctx = Context::new(endpoint, cancellation.clone());
        tracing::debug!("actor started");
        self.actor.started(&mut ctx).await;
        while let Some(Envelope { msg, ack }) = self.mailbox.recv().await {
            self.receive(&mut ctx, msg).await;
            // Acks fire for discarded messages too: `task` promises the
            // message has been observed, not that it was acted upon.
            if let Some(ack) = ack {
                let _ = ack.send(());
            }
            if self.status.is_stopped() {
                break;
            }
        }
        self.actor.stopped(&mut ctx).await;
        cancellation.cancel();
        tracing::debug!("actor stopped");
    }

    /// Handle a single message according to the current lifecycle signal.
    async fn receive(&mut self, ctx: &mut Context<A>, msg: A::Message) {
        match self.status {
            Signal::Running => {
                self.status = self.actor.on_message(ctx, msg).await;
            }
            Signal::Ignoring { count } => {
                let remaining = count.saturating_sub(1);
                self.status = if remaining == 0 {
                    Signal::Running
                } else {
                    Signal::Ignoring { count: remaining }
                };
                tracing::trace!(remaining, "message discarded while ignoring");
            }
            Signal::Stopped => {
                tracing::trace!("message discarded, actor stopped");
            }
        }
    }
}

impl<A> std::fmt::Debug for ActorRuntime<A>
where
    A: Actor,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorRuntime")
            .field("actor", &A::NAME)
            .field("status", &self.status)
            .finish()
    }
}
