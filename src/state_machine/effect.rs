//! Effects produced by state transitions

use super::state::ListSource;
use crate::quizlet::ItemId;
use serde::{Deserialize, Serialize};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Read the user's last used set from the session store
    LookUpLastSet,

    /// Fetch the last used set to offer it back
    FetchLastSet { set_id: ItemId },

    /// Fetch a list of sets or classes
    FetchList { source: ListSource },

    /// Fetch a set's full contents
    FetchSetDetail { set_id: ItemId },

    /// Remember the set as the user's last used
    StoreLastSet { set_id: ItemId },

    /// Fetch favorites to learn whether the active set is one
    CheckFavorite,

    /// Mark or unmark a set as favorite
    UpdateFavorite { set_id: ItemId, favorite: bool },

    /// Speak to the user; ends the turn
    Respond(Action),
}

impl Effect {
    pub fn ask(speech: impl Into<String>, reprompt: impl Into<String>) -> Self {
        Effect::Respond(Action::Ask {
            speech: speech.into(),
            reprompt: reprompt.into(),
        })
    }

    pub fn tell(speech: impl Into<String>) -> Self {
        Effect::Respond(Action::Tell {
            speech: speech.into(),
        })
    }

    pub fn link_account(speech: impl Into<String>) -> Self {
        Effect::Respond(Action::TellWithLinkAccount {
            speech: speech.into(),
        })
    }

    #[allow(dead_code)] // Used in tests
    pub fn action(&self) -> Option<&Action> {
        match self {
            Effect::Respond(action) => Some(action),
            _ => None,
        }
    }
}

/// What the host should say and whether the session stays open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Speak and keep listening
    Ask { speech: String, reprompt: String },
    /// Speak and end the session
    Tell { speech: String },
    /// Speak, end the session, and show an account-link card
    TellWithLinkAccount { speech: String },
}

impl Action {
    pub fn speech(&self) -> &str {
        match self {
            Action::Ask { speech, .. }
            | Action::Tell { speech }
            | Action::TellWithLinkAccount { speech } => speech,
        }
    }

    pub fn ends_session(&self) -> bool {
        !matches!(self, Action::Ask { .. })
    }
}
