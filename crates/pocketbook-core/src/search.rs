//! Free-text search over transactions and pockets

use crate::models::{Pocket, Transaction};

/// Case-insensitive substring matcher
///
/// Built once per query so the needle is lowercased a single time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchMatcher {
    needle: Option<String>,
}

impl SearchMatcher {
    /// Blank or whitespace-only text yields a matcher that accepts everything
    pub fn new(text: &str) -> Self {
        let trimmed = text.trim();
        Self {
            needle: (!trimmed.is_empty()).then(|| trimmed.to_lowercase()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.needle.is_some()
    }

    /// Match title, category and the resolved pocket's name
    pub fn matches(&self, transaction: &Transaction, pocket: Option<&Pocket>) -> bool {
        let Some(needle) = self.needle.as_deref() else {
            return true;
        };
        contains(&transaction.title, needle)
            || contains(&transaction.category, needle)
            || pocket.map_or(false, |p| contains(&p.name, needle))
    }

    /// Match a pocket's name and category
    pub fn matches_pocket(&self, pocket: &Pocket) -> bool {
        let Some(needle) = self.needle.as_deref() else {
            return true;
        };
        contains(&pocket.name, needle) || contains(&pocket.category, needle)
    }
}

/// One-off match without building a matcher first
pub fn matches(text: &str, transaction: &Transaction, pocket: Option<&Pocket>) -> bool {
    SearchMatcher::new(text).matches(transaction, pocket)
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
