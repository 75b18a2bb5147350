//! Runtime for executing dialogue turns

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{SkillRuntime, Turn, TurnOutcome};
pub use traits::*;

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime = SkillRuntime<DatabaseSessionStore, QuizletConnector>;
