//! Handles for sending messages to an actor without exposing its state.

use std::sync::Arc;

use crate::actor::Actor;
use crate::mailbox::MailboxSender;
use crate::message::{Envelope, MessageSender, Recipient, SendError};

/// An address used to send messages to an actor.
///
/// Addresses are freely cloneable and shareable across tasks; they hold no
/// state besides the mailbox sender. The actor's own state is only ever
/// touched inside its receive loop.
pub struct Addr<A: Actor> {
    sender: MailboxSender<Envelope<A::Message>>,
}

impl<A: Actor> Addr<A> {
    pub(crate) fn new(sender: MailboxSender<Envelope<A::Message>>) -> Self {
        Self { sender }
    }

    /// Send a message using at-most-once semantics without waiting for it to
    /// be processed.
    ///
    /// Returns immediately. Messages told from one task without an
    /// intervening suspension are observed by the actor in call order; two
    /// racing senders have no ordering guarantee relative to each other. A
    /// message sent to a stopped actor is dropped silently.
    pub fn tell(&self, msg: A::Message) {
        if self.sender.send(Envelope::fire(msg)).is_err() {
            tracing::trace!(actor = A::NAME, "message dropped, mailbox closed");
        }
    }

    /// Send a message and suspend until the actor has observed it.
    ///
    /// This is a completion signal only: it resolves once the message has
    /// been fully handled (or discarded by the actor's lifecycle dispatch),
    /// and carries no result value.
    pub async fn task(&self, msg: A::Message) -> Result<(), SendError> {
        let (envelope, done) = Envelope::acked(msg);
        self.sender
            .send(envelope)
            .map_err(|_| SendError::MailboxClosed)?;
        done.await.map_err(|_| SendError::AckDropped)
    }

    /// Whether the actor behind this address has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Build a transforming handle that addresses this actor with a
    /// different message vocabulary.
    ///
    /// The transform must be pure and synchronous; it runs on the sender's
    /// side before delivery.
    pub fn recipient<N>(
        &self,
        transform: impl Fn(N) -> A::Message + Send + Sync + 'static,
    ) -> Recipient<N>
    where
        N: Send + 'static,
    {
        Recipient::new(Box::new(MappedSender {
            addr: self.clone(),
            transform: Arc::new(transform),
        }))
    }
}

impl<A: Actor> Clone for Addr<A> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<A: Actor> std::fmt::Debug for Addr<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Addr").field("actor", &A::NAME).finish()
    }
}

/// Sender that adapts an external message type into the actor's own.
struct MappedSender<A: Actor, N> {
    addr: Addr<A>,
    transform: Arc<dyn Fn(N) -> A::Message + Send + Sync>,
}

impl<A: Actor, N> Clone for MappedSender<A, N> {
    fn clone(&self) -> Self {
        Self {
            addr: self.addr.clone(),
            transform: self.transform.clone(),
        }
    }
}

#[async_trait::async_trait]
impl<A, N> MessageSender<N> for MappedSender<A, N>
where
    A: Actor,
    N: Send + 'static,
{
    fn tell(&self, msg: N) {
        self.addr.tell((self.transform)(msg));
    }

    async fn task(&self, msg: N) -> Result<(), SendError> {
        self.addr.task((self.transform)(msg)).await
    }
}
