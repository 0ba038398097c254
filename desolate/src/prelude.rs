//! Commonly used actor toolkit types and traits.
//!
//! This module re-exports the most commonly used items from the toolkit.
//! Import this module to get started with the basic actor functionality.

pub use super::actor::{
    Actor,       // Core actor trait
    Signal,      // Actor lifecycle signal
    async_trait, // Async trait macro
};
pub use super::addr::Addr; // An address to communicate with an actor.
pub use super::conduit::{
    ConduitError, // Errors from the sync-to-async bridge
    conduit,      // Run an async block from a synchronous context
};
pub use super::context::Context; // Actor context for message handling
pub use super::message::{
    MessageSender, // Trait behind transforming senders
    Recipient,     // A transforming, type-erased actor handle
    SendError,     // Errors for message delivery
};
pub use super::nozzle::{
    Consumer, // Consumer callbacks for a nozzle
    Current,  // The actor engine behind a nozzle
    Emitter,  // Emission capability for nozzle builders
    Flow,     // The nozzle message alphabet
    Nozzle,   // Sentinel-terminated single-consumer stream
};
pub use super::runtime::spawn; // Spawn an actor and get its address
pub use super::scheduler; // Cooperative scheduling glue
