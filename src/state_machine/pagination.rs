//! Paging over navigation lists
//!
//! Choices are read four at a time. `cursor` is the index of the first item
//! on the page being read; ordinals are one-based within that page.

use super::state::{NavKind, Navigation};
use crate::quizlet::NavItem;

/// Items read per page
pub const PAGE_SIZE: usize = 4;

impl Navigation {
    /// Build a navigation, keeping at most the kind's item limit
    pub fn new(kind: NavKind, mut items: Vec<NavItem>) -> Self {
        items.truncate(kind.max_items());
        Self {
            kind,
            items,
            cursor: 0,
            class_id: None,
        }
    }

    pub fn is_single(&self) -> bool {
        self.items.len() == 1
    }

    /// Items from the cursor to the end of the list
    pub fn remaining(&self) -> usize {
        self.items.len().saturating_sub(self.cursor)
    }

    /// Items on the current page
    pub fn page(&self) -> &[NavItem] {
        let start = self.cursor.min(self.items.len());
        let end = (start + PAGE_SIZE).min(self.items.len());
        &self.items[start..end]
    }

    /// Whether "next" has anything to show
    pub fn has_next_page(&self) -> bool {
        self.remaining() > PAGE_SIZE
    }

    /// Move to the next page; returns false and stays put on the last page
    pub fn next_page(&mut self) -> bool {
        if !self.has_next_page() {
            return false;
        }
        self.cursor += PAGE_SIZE;
        true
    }

    /// Resolve a one-based ordinal on the current page
    pub fn select(&self, ordinal: usize) -> Option<&NavItem> {
        if ordinal == 0 || ordinal > PAGE_SIZE || self.remaining() < ordinal {
            return None;
        }
        self.items.get(self.cursor + ordinal - 1)
    }

    /// Item under the cursor; the candidate of a confirm prompt
    pub fn current(&self) -> Option<&NavItem> {
        self.items.get(self.cursor)
    }
}
