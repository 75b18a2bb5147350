//! Records returned by the flashcard service

use serde::{Deserialize, Serialize};

/// Identifier of a set or class on the flashcard service
pub type ItemId = u64;

/// A browsable candidate: a set (by title) or a class (by name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub id: ItemId,
    pub title: String,
}

impl NavItem {
    pub fn new(id: ItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// One term/definition pair of a set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Stable position of the term within its set, assigned by the service
    pub rank: u32,
    pub term: String,
    pub definition: String,
}

impl Term {
    pub fn new(rank: u32, term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            rank,
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// Full set contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDetail {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub terms: Vec<Term>,
}

impl SetDetail {
    pub fn summary(&self) -> NavItem {
        NavItem::new(self.id, self.title.clone())
    }
}
