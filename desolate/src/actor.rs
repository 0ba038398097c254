//! Core actor trait and lifecycle types for the actor toolkit.
use crate::context::Context;

pub use async_trait::async_trait;

/// Lifecycle signal of an actor, returned by the handler after each message.
///
/// The runtime dispatches on the current signal before invoking the handler:
/// - `Running`: the handler runs and its return value becomes the next signal.
/// - `Ignoring`: the message is discarded and the count decremented; at zero
///   the actor resumes `Running`. Ignoring is a temporary deafness window,
///   not a buffer — discarded messages are gone.
/// - `Stopped`: terminal. No handler invocation ever happens again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Actively handling messages.
    Running,
    /// Discarding the next `count` messages, then resuming.
    Ignoring { count: u32 },
    /// Permanently done; all further messages are dropped.
    Stopped,
}

impl Signal {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Signal::Stopped)
    }
}

/// The core actor trait that must be implemented by all actors.
///
/// Actors are the fundamental unit of computation in the toolkit. They:
/// - Process messages one at a time
/// - Maintain private state that is never touched from outside the handler
/// - Can send messages to other actors
/// - Transition through the [`Signal`] lifecycle
#[async_trait]
pub trait Actor: Sized + Send + 'static {
    /// The closed set of messages this actor accepts.
    type Message: Send + 'static;

    /// A short name for the actor type, used in tracing output.
    const NAME: &'static str;

    /// Handle a single message and return the actor's next lifecycle signal.
    ///
    /// The runtime guarantees this is never executing concurrently with
    /// itself for one actor instance, and that messages from a single sender
    /// arrive in send order.
    async fn on_message(&mut self, ctx: &mut Context<Self>, msg: Self::Message) -> Signal;

    /// Called once before the actor begins processing messages.
    async fn started(&mut self, _ctx: &mut Context<Self>) {}

    /// Called once after the actor has stopped processing messages.
    async fn stopped(&mut self, _ctx: &mut Context<Self>) {}
}
