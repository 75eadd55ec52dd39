//! Query facade: validate, filter, search, sort, aggregate

use chrono::{DateTime, FixedOffset};
use pocketbook_config::QueryConfig as QueryDefaults;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::filter::{build_predicate, FilterConfig};
use crate::models::{Snapshot, Transaction};
use crate::reports::{active_filter_count, summarize, Summary};
use crate::search::SearchMatcher;
use crate::sort::{sort_transactions, SortConfig};
use crate::time::DateRange;

/// Everything the transaction list view can configure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub filter: FilterConfig,
    pub search: String,
    pub sort: SortConfig,
}

impl QueryConfig {
    pub fn new(filter: FilterConfig, search: impl Into<String>, sort: SortConfig) -> Self {
        Self {
            filter,
            search: search.into(),
            sort,
        }
    }

    /// Start from the configured default range and ordering
    pub fn from_defaults(defaults: &QueryDefaults) -> Self {
        Self {
            filter: FilterConfig::new().with_date_range(DateRange::from(defaults.default_range)),
            search: String::new(),
            sort: SortConfig::new(defaults.default_sort, defaults.default_order),
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.filter.validate()
    }
}

/// Rendered transaction list plus its aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub results: Vec<Transaction>,
    pub summary: Summary,
    pub active_filter_count: usize,
}

/// Run a query against a snapshot
///
/// Pure with respect to its inputs: the same snapshot, configuration and
/// `now` always produce the same result.
pub fn query(
    snapshot: &Snapshot,
    config: &QueryConfig,
    now: &DateTime<FixedOffset>,
) -> CoreResult<QueryResult> {
    config.validate()?;

    let predicate = build_predicate(&config.filter, now)?;
    let index = snapshot.pocket_index();
    let matcher = SearchMatcher::new(&config.search);

    let mut selected: Vec<&Transaction> = snapshot
        .transactions
        .iter()
        .filter(|t| predicate.matches(t))
        .collect();
    let filtered = selected.len();

    selected.retain(|t| matcher.matches(t, index.resolve(t)));
    let searched = selected.len();

    sort_transactions(&mut selected, config.sort);
    let summary = summarize(selected.iter().copied());

    log::debug!(
        target: "pocketbook::query",
        "query: {} transactions, {} after filters ({} clauses), {} after search, sort {} {}",
        snapshot.transactions.len(),
        filtered,
        predicate.clause_count(),
        searched,
        config.sort.key,
        config.sort.order
    );

    Ok(QueryResult {
        results: selected.into_iter().cloned().collect(),
        summary,
        active_filter_count: active_filter_count(&config.filter),
    })
}
