//! Pocket list queries

use pocketbook_config::SortOrder;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{Pocket, Snapshot};
use crate::reports::{pocket_overview, pocket_transaction_counts, progress_of, PocketOverview};
use crate::search::SearchMatcher;
use crate::sort::{apply_order, compare_text};
use crate::types::PocketType;

/// Pocket type filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PocketTypeFilter {
    All,
    Standard,
    Goal,
}

impl Default for PocketTypeFilter {
    fn default() -> Self {
        PocketTypeFilter::All
    }
}

impl PocketTypeFilter {
    pub fn matches(&self, pocket_type: PocketType) -> bool {
        match self {
            PocketTypeFilter::All => true,
            PocketTypeFilter::Standard => pocket_type == PocketType::Standard,
            PocketTypeFilter::Goal => pocket_type == PocketType::Goal,
        }
    }
}

impl std::str::FromStr for PocketTypeFilter {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(PocketTypeFilter::All),
            "standard" => Ok(PocketTypeFilter::Standard),
            "goal" | "goals" => Ok(PocketTypeFilter::Goal),
            _ => Err(CoreError::invalid_value("pocket type", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PocketSortKey {
    Name,
    Balance,
    Progress,
}

impl Default for PocketSortKey {
    fn default() -> Self {
        PocketSortKey::Name
    }
}

impl std::str::FromStr for PocketSortKey {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(PocketSortKey::Name),
            "balance" => Ok(PocketSortKey::Balance),
            "progress" => Ok(PocketSortKey::Progress),
            _ => Err(CoreError::invalid_value("pocket sort key", s)),
        }
    }
}

/// Pocket list view configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PocketQuery {
    #[serde(rename = "type")]
    pub type_filter: PocketTypeFilter,
    pub search: String,
    pub sort_key: PocketSortKey,
    pub order: SortOrder,
}

impl Default for PocketQuery {
    fn default() -> Self {
        Self {
            type_filter: PocketTypeFilter::All,
            search: String::new(),
            sort_key: PocketSortKey::Name,
            order: SortOrder::Ascending,
        }
    }
}

/// Pocket row with derived values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PocketView {
    pub pocket: Pocket,
    pub progress: rust_decimal::Decimal,
    /// Transactions referencing this pocket, across the whole snapshot
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PocketQueryResult {
    pub pockets: Vec<PocketView>,
    /// Totals over the listed pockets
    pub overview: PocketOverview,
}

pub fn query_pockets(snapshot: &Snapshot, query: &PocketQuery) -> PocketQueryResult {
    let matcher = SearchMatcher::new(&query.search);
    let counts = pocket_transaction_counts(&snapshot.transactions);

    let mut rows: Vec<PocketView> = snapshot
        .pockets
        .iter()
        .filter(|p| query.type_filter.matches(p.pocket_type))
        .filter(|p| matcher.matches_pocket(p))
        .map(|p| PocketView {
            pocket: p.clone(),
            progress: progress_of(p),
            transaction_count: counts.get(p.id.as_str()).copied().unwrap_or(0),
        })
        .collect();

    rows.sort_by(|a, b| {
        let ascending = match query.sort_key {
            PocketSortKey::Name => compare_text(&a.pocket.name, &b.pocket.name),
            PocketSortKey::Balance => a.pocket.current_balance.cmp(&b.pocket.current_balance),
            PocketSortKey::Progress => a.progress.cmp(&b.progress),
        };
        apply_order(ascending, query.order)
    });

    let overview = pocket_overview(rows.iter().map(|r| &r.pocket));
    log::debug!(
        target: "pocketbook::pockets",
        "pocket query: {} of {} pockets listed",
        rows.len(),
        snapshot.pockets.len()
    );

    PocketQueryResult {
        pockets: rows,
        overview,
    }
}
