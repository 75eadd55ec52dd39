//! Export serializer
//!
//! Turns the date-windowed transaction set and the pocket list into
//! independent tabular sections. Writing them to disk is the caller's job.

use chrono::{DateTime, FixedOffset};
use pocketbook_config::ExportConfig;
use pocketbook_utils::sanitize_cell;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::{Pocket, PocketIndex, Transaction};
use crate::reports::{
    monthly_summaries, pocket_transaction_counts, progress_of, summaries_by_category, summarize,
    Summary,
};
use crate::time::{DateRange, DateWindow};

pub const TRANSACTION_HEADERS: [&str; 10] = [
    "id",
    "date",
    "title",
    "category",
    "type",
    "amount",
    "signed_amount",
    "pocket",
    "tags",
    "note",
];

pub const POCKET_HEADERS: [&str; 8] = [
    "id",
    "name",
    "type",
    "category",
    "balance",
    "target",
    "progress",
    "transactions",
];

pub const REPORT_HEADERS: [&str; 6] = ["section", "label", "income", "expenses", "net", "count"];

/// Which sections to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSelection {
    pub transactions: bool,
    pub pockets: bool,
    pub reports: bool,
}

impl Default for ExportSelection {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for ExportSelection {
    fn from(config: &ExportConfig) -> Self {
        Self {
            transactions: config.include_transactions,
            pockets: config.include_pockets,
            reports: config.include_reports,
        }
    }
}

impl ExportSelection {
    pub fn is_empty(&self) -> bool {
        !(self.transactions || self.pockets || self.reports)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Transactions,
    Pockets,
    Reports,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Transactions => "transactions",
            SectionKind::Pockets => "pockets",
            SectionKind::Reports => "reports",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One independently toggled block of rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSection {
    pub kind: SectionKind,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordSection {
    fn new(kind: SectionKind, headers: &[&str]) -> Self {
        Self {
            kind,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Serialized export payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularRecordSet {
    pub range_label: String,
    pub window: Option<DateWindow>,
    pub sections: Vec<RecordSection>,
}

impl TabularRecordSet {
    pub fn section(&self, kind: SectionKind) -> Option<&RecordSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Data rows across all sections, headers excluded
    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }

    /// Concatenated rows, each tagged with its section
    pub fn records(&self) -> impl Iterator<Item = (SectionKind, &[String])> + '_ {
        self.sections
            .iter()
            .flat_map(|s| s.rows.iter().map(move |r| (s.kind, r.as_slice())))
    }
}

/// Build the export record set for a date range
pub fn serialize(
    transactions: &[Transaction],
    pockets: &[Pocket],
    range: &DateRange,
    selection: ExportSelection,
    now: &DateTime<FixedOffset>,
) -> CoreResult<TabularRecordSet> {
    if selection.is_empty() {
        return Err(CoreError::NothingSelected);
    }

    let window = range.window(now)?;
    let in_range: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| window.map_or(true, |w| w.contains(&t.date)))
        .collect();
    let offset = *now.offset();

    let mut sections = Vec::new();
    if selection.transactions {
        sections.push(transaction_section(&in_range, pockets, &offset));
    }
    if selection.pockets {
        sections.push(pocket_section(transactions, pockets));
    }
    if selection.reports {
        sections.push(report_section(&in_range, &offset));
    }

    log::debug!(
        target: "pocketbook::export",
        "export {}: {} of {} transactions in range, {} sections",
        range.description(),
        in_range.len(),
        transactions.len(),
        sections.len()
    );

    Ok(TabularRecordSet {
        range_label: range.description(),
        window,
        sections,
    })
}

fn transaction_section(
    transactions: &[&Transaction],
    pockets: &[Pocket],
    offset: &FixedOffset,
) -> RecordSection {
    let index = PocketIndex::new(pockets);
    let mut section = RecordSection::new(SectionKind::Transactions, &TRANSACTION_HEADERS);
    for t in transactions {
        section.rows.push(vec![
            sanitize_cell(&t.id),
            t.date.with_timezone(offset).format("%Y-%m-%d %H:%M").to_string(),
            sanitize_cell(&t.title),
            sanitize_cell(&t.category),
            t.transaction_type.to_string(),
            money(t.magnitude()),
            money(t.signed_amount()),
            sanitize_cell(index.label(t)),
            sanitize_cell(&t.tags.join(";")),
            sanitize_cell(t.note.as_deref().unwrap_or_default()),
        ]);
    }
    section
}

// Pocket rows describe current state, so counts span every transaction.
fn pocket_section(transactions: &[Transaction], pockets: &[Pocket]) -> RecordSection {
    let counts = pocket_transaction_counts(transactions);
    let mut section = RecordSection::new(SectionKind::Pockets, &POCKET_HEADERS);
    for p in pockets {
        section.rows.push(vec![
            sanitize_cell(&p.id),
            sanitize_cell(&p.name),
            p.pocket_type.to_string(),
            sanitize_cell(&p.category),
            money(p.current_balance),
            p.target_amount.map(money).unwrap_or_default(),
            format!("{:.2}", progress_of(p)),
            counts.get(p.id.as_str()).copied().unwrap_or(0).to_string(),
        ]);
    }
    section
}

fn report_section(transactions: &[&Transaction], offset: &FixedOffset) -> RecordSection {
    let mut section = RecordSection::new(SectionKind::Reports, &REPORT_HEADERS);
    for row in summaries_by_category(transactions.iter().copied()) {
        section.rows.push(report_row("category", &row.category, &row.summary));
    }
    for row in monthly_summaries(transactions.iter().copied(), offset) {
        section.rows.push(report_row("month", &row.month, &row.summary));
    }
    let total = summarize(transactions.iter().copied());
    section.rows.push(report_row("total", "All", &total));
    section
}

fn report_row(kind: &str, label: &str, summary: &Summary) -> Vec<String> {
    vec![
        kind.to_string(),
        sanitize_cell(label),
        money(summary.income),
        money(summary.expenses),
        money(summary.net),
        summary.count.to_string(),
    ]
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}
