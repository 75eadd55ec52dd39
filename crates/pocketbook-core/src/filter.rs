//! Filter configuration and the predicate it compiles to
//!
//! Each dimension is either in its neutral state (matches everything) or
//! contributes one clause. The compiled predicate and the active-filter
//! badge are both derived from [`FilterConfig::is_active`], so they cannot
//! disagree about what is filtering.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::Transaction;
use crate::sort::compare_text;
use crate::time::{DateRange, DateWindow};
use crate::types::{AmountBucket, PocketFilter, TransactionType, TypeFilter};

/// One independently configurable filter axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDimension {
    Date,
    Category,
    Amount,
    Pocket,
    Type,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 5] = [
        FilterDimension::Date,
        FilterDimension::Category,
        FilterDimension::Amount,
        FilterDimension::Pocket,
        FilterDimension::Type,
    ];
}

/// Filter configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub date_range: DateRange,
    /// Selected category labels; empty selects all
    pub categories: BTreeSet<String>,
    pub amount_bucket: AmountBucket,
    pub pocket: PocketFilter,
    #[serde(rename = "type")]
    pub transaction_type: TypeFilter,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn with_amount_bucket(mut self, bucket: AmountBucket) -> Self {
        self.amount_bucket = bucket;
        self
    }

    pub fn with_pocket(mut self, pocket: PocketFilter) -> Self {
        self.pocket = pocket;
        self
    }

    pub fn with_type(mut self, filter: TypeFilter) -> Self {
        self.transaction_type = filter;
        self
    }

    /// Whether a dimension is away from its neutral value
    pub fn is_active(&self, dimension: FilterDimension) -> bool {
        match dimension {
            FilterDimension::Date => !self.date_range.is_all(),
            FilterDimension::Category => !self.categories.is_empty(),
            FilterDimension::Amount => self.amount_bucket != AmountBucket::All,
            FilterDimension::Pocket => self.pocket != PocketFilter::All,
            FilterDimension::Type => self.transaction_type != TypeFilter::All,
        }
    }

    pub fn active_dimensions(&self) -> Vec<FilterDimension> {
        FilterDimension::ALL
            .iter()
            .copied()
            .filter(|d| self.is_active(*d))
            .collect()
    }

    /// Number of dimensions currently filtering (UI badge)
    pub fn active_count(&self) -> usize {
        self.active_dimensions().len()
    }

    /// Reset every dimension to its neutral value
    pub fn clear(&mut self) {
        *self = FilterConfig::default();
    }

    /// Reject configurations that cannot be evaluated
    pub fn validate(&self) -> CoreResult<()> {
        self.date_range.validate()?;
        if let Some(blank) = self.categories.iter().find(|c| c.trim().is_empty()) {
            return Err(CoreError::invalid_value("categories", blank.clone()));
        }
        if let PocketFilter::Pocket(id) = &self.pocket {
            if id.trim().is_empty() {
                return Err(CoreError::invalid_value("pocket", id.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Clause {
    Window(DateWindow),
    Categories(BTreeSet<String>),
    Amount(AmountBucket),
    Pocket(PocketFilter),
    Type(TransactionType),
}

impl Clause {
    fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            Clause::Window(window) => window.contains(&transaction.date),
            Clause::Categories(set) => set.contains(&transaction.category),
            Clause::Amount(bucket) => bucket.contains(transaction.magnitude()),
            Clause::Pocket(filter) => filter.matches(transaction.pocket_id.as_deref()),
            Clause::Type(t) => transaction.transaction_type == *t,
        }
    }
}

/// Compiled conjunction of the active filter clauses
#[derive(Debug, Clone)]
pub struct TransactionPredicate {
    clauses: Vec<Clause>,
}

impl TransactionPredicate {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.clauses.iter().all(|c| c.matches(transaction))
    }

    /// Number of clauses; equals the configuration's active count
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// Predicate that matches everything
    pub fn is_noop(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Compile a filter configuration against an injected `now`
pub fn build_predicate(
    config: &FilterConfig,
    now: &DateTime<FixedOffset>,
) -> CoreResult<TransactionPredicate> {
    config.validate()?;

    let mut clauses = Vec::new();
    for dimension in config.active_dimensions() {
        let clause = match dimension {
            FilterDimension::Date => match config.date_range.window(now)? {
                Some(window) => Clause::Window(window),
                None => continue,
            },
            FilterDimension::Category => Clause::Categories(config.categories.clone()),
            FilterDimension::Amount => Clause::Amount(config.amount_bucket),
            FilterDimension::Pocket => Clause::Pocket(config.pocket.clone()),
            FilterDimension::Type => match config.transaction_type.as_type() {
                Some(t) => Clause::Type(t),
                None => continue,
            },
        };
        clauses.push(clause);
    }

    Ok(TransactionPredicate { clauses })
}

/// Distinct category labels present in a transaction set, in display order
pub fn available_categories(transactions: &[Transaction]) -> Vec<String> {
    let distinct: BTreeSet<&str> = transactions.iter().map(|t| t.category.as_str()).collect();
    let mut categories: Vec<String> = distinct.into_iter().map(str::to_string).collect();
    categories.sort_by(|a, b| compare_text(a, b));
    categories
}
