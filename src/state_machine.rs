//! Dialogue state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

pub mod effect;
pub mod event;
mod pagination;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Action, Effect};
pub use event::{Event, Intent};
pub use state::{DialogueState, SessionContext, TurnContext};
pub use transition::transition;
