//! Dialogue state types

use crate::credential::Credential;
use crate::prompts::{MessageKey, Renderer};
use crate::quiz::Quiz;
use crate::quizlet::{ItemId, NavItem, SetDetail, Term};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Sets, favorites and class sets kept for browsing
pub const MAX_SET_ITEMS: usize = 40;

/// Classes kept for browsing
pub const MAX_CLASS_ITEMS: usize = 100;

/// Terms kept from a loaded set
pub const MAX_TERMS: usize = 100;

// ============================================================================
// Navigation
// ============================================================================

/// What a navigation list contains; drives wording and what selection does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavKind {
    Set,
    FavoriteSet,
    ClassSet,
    Class,
    LastSet,
}

impl NavKind {
    pub fn max_items(self) -> usize {
        match self {
            NavKind::Class => MAX_CLASS_ITEMS,
            NavKind::Set | NavKind::FavoriteSet | NavKind::ClassSet | NavKind::LastSet => {
                MAX_SET_ITEMS
            }
        }
    }

    pub fn is_class(self) -> bool {
        self == NavKind::Class
    }
}

/// Remote list a navigation is fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListSource {
    Sets,
    Favorites,
    Classes,
    ClassSets { class_id: ItemId },
}

impl ListSource {
    pub fn kind(self) -> NavKind {
        match self {
            ListSource::Sets => NavKind::Set,
            ListSource::Favorites => NavKind::FavoriteSet,
            ListSource::Classes => NavKind::Class,
            ListSource::ClassSets { .. } => NavKind::ClassSet,
        }
    }

    /// Prefix spoken when the list comes back empty
    pub fn empty_message(self) -> MessageKey {
        match self {
            ListSource::Sets => MessageKey::NoSets,
            ListSource::Favorites => MessageKey::NoFavoriteSets,
            ListSource::Classes => MessageKey::NoClasses,
            ListSource::ClassSets { .. } => MessageKey::NoClassSets,
        }
    }
}

/// Candidates the user is browsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub kind: NavKind,
    pub items: Vec<NavItem>,
    /// Head of the current page
    pub cursor: usize,
    /// Class whose sets are being fetched, once a class is chosen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<ItemId>,
}

// ============================================================================
// Active set
// ============================================================================

/// The set the user has confirmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSet {
    pub id: ItemId,
    pub title: String,
    /// Ordered by rank, at most `MAX_TERMS`
    pub terms: Vec<Term>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl ActiveSet {
    pub fn from_detail(detail: SetDetail) -> Self {
        let mut terms = detail.terms;
        terms.sort_by_key(|t| t.rank);
        terms.truncate(MAX_TERMS);
        Self {
            id: detail.id,
            title: detail.title,
            terms,
            is_favorite: false,
        }
    }

    pub fn term_by_rank(&self, rank: u32) -> Option<&Term> {
        self.terms.iter().find(|t| t.rank == rank)
    }
}

// ============================================================================
// Dialogue State
// ============================================================================

/// Progress of the set load sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetLoadStep {
    FetchDetail,
    StoreLastUsed,
    CheckFavorite,
}

/// Dialogue state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogueState {
    /// New session, nothing resolved yet
    #[default]
    EntryResolution,

    /// Waiting on the session store for the last used set
    LookingUpLastSet,

    /// Waiting on the last used set's detail
    ResumingLastSet,

    /// Favorites / sets / classes menu
    MainMenu,

    /// Waiting on a list fetch
    FetchingList { source: ListSource },

    /// Yes/no on a single candidate
    Confirm,

    /// Paged choice among several candidates
    ListBrowse,

    /// Set load sequence in flight
    LoadingSet { step: SetLoadStep },

    /// Review / quiz / favorite menu for the active set
    SetMenu,

    /// Waiting on a favorite mark/unmark
    TogglingFavorite { favorite: bool },

    ReviewMenu,

    Reviewing {
        /// Term first, then definition
        by_term: bool,
        index: usize,
    },

    QuizMenu,

    QuizActive { quiz: Quiz },

    /// Session closed by a tell action
    Ended,
}

impl DialogueState {
    /// States the session can rest in between turns
    pub fn is_resting(&self) -> bool {
        matches!(
            self,
            DialogueState::MainMenu
                | DialogueState::Confirm
                | DialogueState::ListBrowse
                | DialogueState::SetMenu
                | DialogueState::ReviewMenu
                | DialogueState::Reviewing { .. }
                | DialogueState::QuizMenu
                | DialogueState::QuizActive { .. }
        )
    }

    /// States that wait on a collaborator inside a turn
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            DialogueState::LookingUpLastSet
                | DialogueState::ResumingLastSet
                | DialogueState::FetchingList { .. }
                | DialogueState::LoadingSet { .. }
                | DialogueState::TogglingFavorite { .. }
        )
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_terminal(&self) -> bool {
        matches!(self, DialogueState::Ended)
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            DialogueState::EntryResolution => "entry_resolution",
            DialogueState::LookingUpLastSet => "looking_up_last_set",
            DialogueState::ResumingLastSet => "resuming_last_set",
            DialogueState::MainMenu => "main_menu",
            DialogueState::FetchingList { .. } => "fetching_list",
            DialogueState::Confirm => "confirm",
            DialogueState::ListBrowse => "list_browse",
            DialogueState::LoadingSet { .. } => "loading_set",
            DialogueState::SetMenu => "set_menu",
            DialogueState::TogglingFavorite { .. } => "toggling_favorite",
            DialogueState::ReviewMenu => "review_menu",
            DialogueState::Reviewing { .. } => "reviewing",
            DialogueState::QuizMenu => "quiz_menu",
            DialogueState::QuizActive { .. } => "quiz_active",
            DialogueState::Ended => "ended",
        }
    }
}

/// Everything the dialogue remembers between turns of one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionContext {
    pub state: DialogueState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<Navigation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_set: Option<ActiveSet>,
    /// Last reprompt issued, echoed after input we could not handle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<String>,
}

// ============================================================================
// Turn Context
// ============================================================================

/// Per-turn inputs that do not change while the turn runs
#[derive(Clone)]
pub struct TurnContext {
    pub user_id: String,
    pub credential: Option<Credential>,
    pub renderer: Arc<dyn Renderer>,
}

impl TurnContext {
    pub fn new(
        user_id: impl Into<String>,
        credential: Option<Credential>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            credential,
            renderer,
        }
    }

    pub fn text(&self, key: MessageKey) -> String {
        self.renderer.text(key)
    }

    pub fn render(&self, key: MessageKey, args: &[&str]) -> String {
        self.renderer.render(key, args)
    }
}

impl fmt::Debug for TurnContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnContext")
            .field("user_id", &self.user_id)
            .field("linked", &self.credential.is_some())
            .finish_non_exhaustive()
    }
}
