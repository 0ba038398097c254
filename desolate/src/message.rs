//! Envelope and sender types for actor communication.

use dyn_clone::DynClone;
use tokio::sync::oneshot;

/// Errors that can occur when delivering a message to an actor.
#[derive(thiserror::Error, Debug)]
pub enum SendError {
    /// Returned when trying to send a message to an actor whose mailbox has been closed
    #[error("Actor mailbox has been closed")]
    MailboxClosed,
    /// Returned when the completion ack was dropped before the message was processed
    #[error("Actor dropped the completion ack unexpectedly")]
    AckDropped,
}

/// A message plus an optional completion ack.
///
/// The ack carries no value: `task` callers learn only that their message has
/// been observed by the actor, not what it did.
pub(crate) struct Envelope<M> {
    pub msg: M,
    pub ack: Option<oneshot::Sender<()>>,
}

impl<M> Envelope<M> {
    /// Fire-and-forget envelope.
    pub fn fire(msg: M) -> Self {
        Self { msg, ack: None }
    }

    /// Envelope whose ack fires once the message has been handled or dropped.
    pub fn acked(msg: M) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                msg,
                ack: Some(tx),
            },
            rx,
        )
    }
}

/// A trait for representing a sender of some message type.
///
/// This is the seam behind [`Recipient`]: it lets an actor be addressed with
/// a vocabulary other than its own message type.
#[async_trait::async_trait]
pub trait MessageSender<M>: DynClone + Send + Sync
where
    M: Send + 'static,
{
    /// Send a message without waiting for it to be processed.
    fn tell(&self, msg: M);

    /// Send a message and wait until the actor has observed it.
    async fn task(&self, msg: M) -> Result<(), SendError>;
}

dyn_clone::clone_trait_object!(<M> MessageSender<M> where M: Send + 'static);

/// A type-erased, transforming handle to an actor.
///
/// Built from [`Addr::recipient`](crate::addr::Addr::recipient): the
/// transform maps the external message type into the actor's own message
/// type before delivery, so the sender never learns the real type.
pub struct Recipient<M: Send + 'static> {
    sender: Box<dyn MessageSender<M>>,
}

impl<M: Send + 'static> Recipient<M> {
    pub fn new(sender: Box<dyn MessageSender<M>>) -> Self {
        Self { sender }
    }

    /// Send a message without waiting for it to be processed.
    pub fn tell(&self, msg: M) {
        self.sender.tell(msg);
    }

    /// Send a message and wait until the actor has observed it.
    pub async fn task(&self, msg: M) -> Result<(), SendError> {
        self.sender.task(msg).await
    }
}

impl<M: Send + 'static> Clone for Recipient<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<M: Send + 'static> std::fmt::Debug for Recipient<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recipient")
            .field("message", &std::any::type_name::<M>())
            .finish()
    }
}
