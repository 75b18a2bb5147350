//! API request and response types

use crate::state_machine::{Action, SessionContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Intent name the host sends when the user opens the skill
pub const LAUNCH_REQUEST: &str = "LaunchRequest";

/// One host turn
#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub session_id: String,
    pub user_id: String,
    /// Raw linked-account bearer string, absent when the account is not linked
    #[serde(default)]
    pub credential: Option<String>,
    pub intent_name: String,
    /// Accepted for host compatibility; intents carry no slot values we use
    #[serde(default)]
    pub slots: Option<Value>,
    /// Session context returned by the previous turn
    #[serde(default)]
    pub attributes: Option<Value>,
}

/// Reply to a host turn
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub action: Action,
    /// Session context to send back on the next turn
    pub attributes: SessionContext,
    pub should_end_session: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
