//! Events that can occur in a dialogue

use crate::quizlet::{GatewayError, NavItem, SetDetail};
use crate::runtime::StoreError;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Host events
    Launch,
    Intent(Intent),

    // Entry resolution
    LastSetLookedUp {
        result: Result<Option<String>, StoreError>,
    },
    LastSetFetched {
        result: Result<SetDetail, GatewayError>,
    },

    // Browsing
    ListFetched {
        result: Result<Vec<NavItem>, GatewayError>,
    },

    // Set load
    SetDetailFetched {
        result: Result<SetDetail, GatewayError>,
    },
    LastSetStored {
        result: Result<(), StoreError>,
    },
    FavoritesChecked {
        result: Result<Vec<NavItem>, GatewayError>,
    },

    // Set menu
    FavoriteUpdated {
        result: Result<(), GatewayError>,
    },
}

impl Event {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::Launch => "launch",
            Event::Intent(_) => "intent",
            Event::LastSetLookedUp { .. } => "last_set_looked_up",
            Event::LastSetFetched { .. } => "last_set_fetched",
            Event::ListFetched { .. } => "list_fetched",
            Event::SetDetailFetched { .. } => "set_detail_fetched",
            Event::LastSetStored { .. } => "last_set_stored",
            Event::FavoritesChecked { .. } => "favorites_checked",
            Event::FavoriteUpdated { .. } => "favorite_updated",
        }
    }
}

/// Recognized user intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectFavoriteSet,
    SelectSet,
    SelectClass,
    Yes,
    No,
    Repeat,
    Help,
    Cancel,
    Stop,
    StartOver,
    Next,
    /// "set one".."set four"
    SetOrdinal(usize),
    /// "class one".."class four"
    ClassOrdinal(usize),
    /// "one".."four"
    Ordinal(usize),
    Review,
    QuizMe,
    ToggleFavorite,
    ReviewByTerm,
    ReviewByDefinition,
    TermsQuiz,
    DefinitionsQuiz,
    /// Anything the dialogue has no handler for
    Unknown(String),
}

const ORDINAL_WORDS: [&str; 4] = ["One", "Two", "Three", "Four"];

impl Intent {
    /// Map a host intent name to an intent
    pub fn from_name(name: &str) -> Self {
        match name {
            "SelectFavoriteSetIntent" => Intent::SelectFavoriteSet,
            "SelectSetIntent" => Intent::SelectSet,
            "SelectClassIntent" => Intent::SelectClass,
            "AMAZON.YesIntent" => Intent::Yes,
            "AMAZON.NoIntent" => Intent::No,
            "AMAZON.RepeatIntent" => Intent::Repeat,
            "AMAZON.HelpIntent" => Intent::Help,
            "AMAZON.CancelIntent" => Intent::Cancel,
            "AMAZON.StopIntent" => Intent::Stop,
            "AMAZON.StartOverIntent" => Intent::StartOver,
            "AMAZON.NextIntent" => Intent::Next,
            "ReviewIntent" => Intent::Review,
            "QuizMeIntent" => Intent::QuizMe,
            "ToggleFavoriteIntent" => Intent::ToggleFavorite,
            "ReviewByTermIntent" => Intent::ReviewByTerm,
            "ReviewByDefinitionIntent" => Intent::ReviewByDefinition,
            "TermsQuizIntent" => Intent::TermsQuiz,
            "DefinitionsQuizIntent" => Intent::DefinitionsQuiz,
            other => parse_ordinal(other).unwrap_or_else(|| Intent::Unknown(other.to_string())),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Intent::Unknown(_))
    }
}

/// `SetTwoIntent`, `ClassFourIntent`, `OneIntent`, ...
fn parse_ordinal(name: &str) -> Option<Intent> {
    let stem = name.strip_suffix("Intent")?;
    let (prefix, word) = ORDINAL_WORDS
        .iter()
        .find_map(|w| stem.strip_suffix(w).map(|p| (p, *w)))?;
    let n = ORDINAL_WORDS.iter().position(|w| *w == word)? + 1;
    match prefix {
        "Set" => Some(Intent::SetOrdinal(n)),
        "Class" => Some(Intent::ClassOrdinal(n)),
        "" => Some(Intent::Ordinal(n)),
        _ => None,
    }
}
