//! Transaction and pocket query engine
//!
//! Takes an in-memory snapshot of transactions and pockets and produces the
//! filtered, searched, sorted and aggregated views a finance UI renders,
//! plus the tabular record sets used for export.
//!
//! All operations are synchronous and pure: the current time is always
//! passed in as a `DateTime<FixedOffset>` carrying the user's UTC offset.

pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod pockets;
pub mod query;
pub mod reports;
pub mod search;
pub mod sort;
pub mod time;
pub mod types;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use export::{serialize, ExportSelection, RecordSection, SectionKind, TabularRecordSet};
pub use filter::{
    available_categories, build_predicate, FilterConfig, FilterDimension, TransactionPredicate,
};
pub use models::{
    Pocket, PocketIndex, PocketRecord, Snapshot, SnapshotRecords, Transaction, TransactionRecord,
    UNCATEGORIZED_LABEL, UNLINKED_LABEL,
};
pub use pockets::{
    query_pockets, PocketQuery, PocketQueryResult, PocketSortKey, PocketTypeFilter, PocketView,
};
pub use query::{query, QueryConfig, QueryResult};
pub use reports::{
    category_breakdown, monthly_summaries, pocket_overview, progress_of, summarize,
    CategoryBreakdown, MonthlySummary, PocketOverview, Summary,
};
pub use search::SearchMatcher;
pub use sort::SortConfig;
pub use time::{DateRange, DateWindow};
pub use types::{
    AmountBucket, PocketFilter, PocketType, TransactionType, TypeFilter, RESERVED_POCKET_IDS,
};

pub use pocketbook_config::{SortKey, SortOrder, TimeRange};
