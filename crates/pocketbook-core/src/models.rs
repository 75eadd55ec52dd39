//! Core data models for transactions and pockets
//!
//! Amounts are stored as unsigned magnitudes; the sign lives in the
//! transaction type. Raw records coming from outside the engine are
//! normalized to that shape once, in [`Snapshot::from_records`].

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{PocketType, TransactionType, RESERVED_POCKET_IDS};

/// Label shown for transactions without a resolvable pocket
pub const UNLINKED_LABEL: &str = "Unlinked";

/// Category assigned when a record carries none
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Tag the UI treats as a recurring marker
pub const RECURRING_TAG: &str = "recurring";

/// Transaction information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: String,
    /// Short display title
    pub title: String,
    /// Long-form memo
    pub note: Option<String>,
    /// Unsigned magnitude
    pub amount: Decimal,
    /// Income or expense
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Instant the transaction happened
    pub date: DateTime<Utc>,
    /// Free-text category label
    pub category: String,
    /// Weak reference to a pocket
    pub pocket_id: Option<String>,
    /// Tags, in insertion order, without duplicates
    pub tags: Vec<String>,
}

impl Transaction {
    /// Create a transaction; a negative amount is stored as its magnitude
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        amount: Decimal,
        transaction_type: TransactionType,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            note: None,
            amount: amount.abs(),
            transaction_type,
            date,
            category: UNCATEGORIZED_LABEL.to_string(),
            pocket_id: None,
            tags: vec![],
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_pocket(mut self, pocket_id: impl Into<String>) -> Self {
        self.pocket_id = Some(pocket_id.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = dedup_tags(tags.into_iter().map(Into::into));
        self
    }

    /// Amount magnitude, regardless of how the value was constructed
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }

    /// Amount with the sign implied by the type (expenses negative)
    pub fn signed_amount(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Income => self.magnitude(),
            TransactionType::Expense => -self.magnitude(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    pub fn is_recurring(&self) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(RECURRING_TAG))
    }

    /// Calendar date in the given local offset
    pub fn local_date(&self, offset: &FixedOffset) -> NaiveDate {
        self.date.with_timezone(offset).date_naive()
    }
}

/// Pocket (budget envelope or savings goal)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pocket {
    /// Unique pocket identifier
    pub id: String,
    /// Full display name
    pub name: String,
    /// Standard envelope or goal
    #[serde(rename = "type")]
    pub pocket_type: PocketType,
    /// Unsigned balance
    pub current_balance: Decimal,
    /// Goal target; only goal pockets carry one
    pub target_amount: Option<Decimal>,
    /// Grouping label for pockets
    pub category: String,
}

impl Pocket {
    pub fn standard(id: impl Into<String>, name: impl Into<String>, balance: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pocket_type: PocketType::Standard,
            current_balance: balance.abs(),
            target_amount: None,
            category: UNCATEGORIZED_LABEL.to_string(),
        }
    }

    pub fn goal(
        id: impl Into<String>,
        name: impl Into<String>,
        balance: Decimal,
        target: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pocket_type: PocketType::Goal,
            current_balance: balance.abs(),
            target_amount: Some(target.abs()),
            category: UNCATEGORIZED_LABEL.to_string(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn is_goal(&self) -> bool {
        self.pocket_type == PocketType::Goal
    }
}

// ==================== Input Records ====================

/// Transaction as supplied by the data-access layer
///
/// The amount may be signed, and the type may be missing; both are
/// resolved by [`TransactionRecord::normalize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    #[serde(alias = "description")]
    pub title: String,
    #[serde(default, alias = "memo", alias = "notes")]
    pub note: Option<String>,
    pub amount: Decimal,
    #[serde(default, rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// RFC 3339 timestamp, `YYYY-MM-DD HH:MM:SS`, or a plain date
    pub date: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "pocketId")]
    pub pocket_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TransactionRecord {
    /// Convert to the canonical representation
    ///
    /// Timestamps without an offset and plain dates are read in `offset`,
    /// the user's local time.
    pub fn normalize(self, offset: &FixedOffset) -> CoreResult<Transaction> {
        let id = required_text(&self.id, "transaction id")?;
        let title = required_text(&self.title, &format!("title of transaction {}", id))?;
        let date = parse_timestamp(&self.date, offset)?;

        let transaction_type = match self.transaction_type {
            Some(t) => {
                let disagrees = match t {
                    TransactionType::Income => is_negative(self.amount),
                    TransactionType::Expense => false,
                };
                if disagrees {
                    log::warn!(
                        target: "pocketbook::models",
                        "transaction {} is typed income but carries a negative amount; \
                         using its magnitude",
                        id
                    );
                }
                t
            }
            None if is_negative(self.amount) => TransactionType::Expense,
            None => TransactionType::Income,
        };

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED_LABEL)
            .to_string();

        let pocket_id = self
            .pocket_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let note = self
            .note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let raw_tag_count = self.tags.len();
        let tags = dedup_tags(self.tags);
        if tags.len() != raw_tag_count {
            log::debug!(
                target: "pocketbook::models",
                "transaction {}: dropped {} blank or duplicate tag(s)",
                id,
                raw_tag_count - tags.len()
            );
        }

        Ok(Transaction {
            id,
            title,
            note,
            amount: self.amount.abs(),
            transaction_type,
            date,
            category,
            pocket_id,
            tags,
        })
    }
}

/// Pocket as supplied by the data-access layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PocketRecord {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub pocket_type: PocketType,
    #[serde(alias = "currentBalance", alias = "balance")]
    pub current_balance: Decimal,
    #[serde(default, alias = "targetAmount")]
    pub target_amount: Option<Decimal>,
    #[serde(default)]
    pub category: Option<String>,
}

impl PocketRecord {
    /// Convert to the canonical representation
    pub fn normalize(self) -> CoreResult<Pocket> {
        let id = required_text(&self.id, "pocket id")?;
        if RESERVED_POCKET_IDS.contains(&id.as_str()) {
            return Err(CoreError::ValidationError {
                message: format!("pocket id '{}' is reserved for the pocket filter", id),
            });
        }
        let name = required_text(&self.name, &format!("name of pocket {}", id))?;

        if is_negative(self.current_balance) {
            log::warn!(
                target: "pocketbook::models",
                "pocket {} has a negative balance; storing its magnitude",
                id
            );
        }

        let target_amount = match (self.pocket_type, self.target_amount) {
            (PocketType::Goal, target) => target.map(|t| t.abs()),
            (PocketType::Standard, Some(_)) => {
                log::warn!(
                    target: "pocketbook::models",
                    "standard pocket {} carries a target amount; ignoring it",
                    id
                );
                None
            }
            (PocketType::Standard, None) => None,
        };

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED_LABEL)
            .to_string();

        Ok(Pocket {
            id,
            name,
            pocket_type: self.pocket_type,
            current_balance: self.current_balance.abs(),
            target_amount,
            category,
        })
    }
}

/// Raw snapshot as read from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotRecords {
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default)]
    pub pockets: Vec<PocketRecord>,
}

/// Immutable input to a query: every transaction and pocket the user owns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    pub pockets: Vec<Pocket>,
}

impl Snapshot {
    pub fn new(transactions: Vec<Transaction>, pockets: Vec<Pocket>) -> Self {
        Self { transactions, pockets }
    }

    /// Normalize raw records, rejecting duplicate identifiers
    pub fn from_records(records: SnapshotRecords, offset: &FixedOffset) -> CoreResult<Self> {
        let mut seen = HashSet::new();
        let mut transactions = Vec::with_capacity(records.transactions.len());
        for record in records.transactions {
            let transaction = record.normalize(offset)?;
            if !seen.insert(transaction.id.clone()) {
                return Err(CoreError::DuplicateEntry {
                    entry: format!("transaction {}", transaction.id),
                });
            }
            transactions.push(transaction);
        }

        let mut seen = HashSet::new();
        let mut pockets = Vec::with_capacity(records.pockets.len());
        for record in records.pockets {
            let pocket = record.normalize()?;
            if !seen.insert(pocket.id.clone()) {
                return Err(CoreError::DuplicateEntry {
                    entry: format!("pocket {}", pocket.id),
                });
            }
            pockets.push(pocket);
        }

        log::debug!(
            target: "pocketbook::models",
            "snapshot normalized: {} transactions, {} pockets",
            transactions.len(),
            pockets.len()
        );

        Ok(Self { transactions, pockets })
    }

    /// Decode and normalize a JSON snapshot
    pub fn from_json(content: &str, offset: &FixedOffset) -> CoreResult<Self> {
        let records: SnapshotRecords = serde_json::from_str(content)?;
        Self::from_records(records, offset)
    }

    pub fn pocket_index(&self) -> PocketIndex<'_> {
        PocketIndex::new(&self.pockets)
    }
}

/// Lookup of pockets by id, used to resolve weak references at read time
#[derive(Debug, Clone, Default)]
pub struct PocketIndex<'a> {
    by_id: HashMap<&'a str, &'a Pocket>,
}

impl<'a> PocketIndex<'a> {
    pub fn new(pockets: &'a [Pocket]) -> Self {
        Self {
            by_id: pockets.iter().map(|p| (p.id.as_str(), p)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&'a Pocket> {
        self.by_id.get(id).copied()
    }

    /// Pocket a transaction points to, if it still exists
    pub fn resolve(&self, transaction: &Transaction) -> Option<&'a Pocket> {
        transaction.pocket_id.as_deref().and_then(|id| self.get(id))
    }

    /// Pocket name, or "Unlinked" when absent or dangling
    pub fn label(&self, transaction: &Transaction) -> &'a str {
        self.resolve(transaction)
            .map(|p| p.name.as_str())
            .unwrap_or(UNLINKED_LABEL)
    }
}

// ==================== Helpers ====================

fn required_text(value: &str, what: &str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::ValidationError {
            message: format!("{} must not be blank", what),
        });
    }
    Ok(trimmed.to_string())
}

fn is_negative(value: Decimal) -> bool {
    value.is_sign_negative() && !value.is_zero()
}

fn dedup_tags<I: IntoIterator<Item = String>>(tags: I) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn parse_timestamp(value: &str, offset: &FixedOffset) -> CoreResult<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let local = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });

    local
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| CoreError::InvalidFormat {
            message: format!("unrecognised date '{}'", value),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn record(id: &str, amount: Decimal, kind: Option<TransactionType>) -> TransactionRecord {
        TransactionRecord {
            id: id.to_string(),
            title: "Coffee".to_string(),
            note: None,
            amount,
            transaction_type: kind,
            date: "2024-01-14".to_string(),
            category: Some("Food".to_string()),
            pocket_id: None,
            tags: vec![],
        }
    }

    #[test]
    fn test_signed_amount_without_type_becomes_expense() {
        let tx = record("t1", Decimal::new(-8550, 2), None).normalize(&utc()).unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Expense);
        assert_eq!(tx.amount, Decimal::new(8550, 2));
        assert_eq!(tx.signed_amount(), Decimal::new(-8550, 2));
    }

    #[test]
    fn test_positive_amount_without_type_becomes_income() {
        let tx = record("t1", Decimal::new(3500, 0), None).normalize(&utc()).unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Income);
        assert!(tx.is_income());
    }

    #[test]
    fn test_explicit_type_wins_over_sign() {
        let tx = record("t1", Decimal::new(-20, 0), Some(TransactionType::Income))
            .normalize(&utc())
            .unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Income);
        assert_eq!(tx.amount, Decimal::new(20, 0));

        let tx = record("t2", Decimal::new(20, 0), Some(TransactionType::Expense))
            .normalize(&utc())
            .unwrap();
        assert!(tx.is_expense());
        assert_eq!(tx.amount, Decimal::new(20, 0));
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut rec = record("t1", Decimal::ONE, None);
        rec.title = "   ".to_string();
        let err = rec.normalize(&utc()).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
    }

    #[test]
    fn test_optional_fields_normalized() {
        let mut rec = record("t1", Decimal::ONE, None);
        rec.category = Some("  ".to_string());
        rec.pocket_id = Some("".to_string());
        rec.note = Some("  beans  ".to_string());
        rec.tags = vec!["recurring".into(), " ".into(), "coffee".into(), "recurring".into()];
        let tx = rec.normalize(&utc()).unwrap();
        assert_eq!(tx.category, UNCATEGORIZED_LABEL);
        assert_eq!(tx.pocket_id, None);
        assert_eq!(tx.note.as_deref(), Some("beans"));
        assert_eq!(tx.tags, vec!["recurring".to_string(), "coffee".to_string()]);
        assert!(tx.is_recurring());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let rfc = parse_timestamp("2024-01-14T10:00:00Z", &plus_two).unwrap();
        assert_eq!(rfc.to_rfc3339(), "2024-01-14T10:00:00+00:00");

        let naive = parse_timestamp("2024-01-14 10:00:00", &plus_two).unwrap();
        assert_eq!(naive.to_rfc3339(), "2024-01-14T08:00:00+00:00");

        let date_only = parse_timestamp("2024-01-14", &plus_two).unwrap();
        assert_eq!(date_only.to_rfc3339(), "2024-01-13T22:00:00+00:00");
        assert_eq!(
            date_only.with_timezone(&plus_two).date_naive(),
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()
        );

        assert!(parse_timestamp("14/01/2024", &plus_two).is_err());
    }

    #[test]
    fn test_pocket_record_normalize() {
        let rec = PocketRecord {
            id: "p1".to_string(),
            name: "Rainy day".to_string(),
            pocket_type: PocketType::Standard,
            current_balance: Decimal::new(-40, 0),
            target_amount: Some(Decimal::new(100, 0)),
            category: None,
        };
        let pocket = rec.normalize().unwrap();
        assert_eq!(pocket.current_balance, Decimal::new(40, 0));
        assert_eq!(pocket.target_amount, None);
        assert_eq!(pocket.category, UNCATEGORIZED_LABEL);
    }

    #[test]
    fn test_reserved_pocket_ids_rejected() {
        for id in ["all", " unlinked "] {
            let rec = PocketRecord {
                id: id.to_string(),
                name: "Sentinel".to_string(),
                pocket_type: PocketType::Standard,
                current_balance: Decimal::ZERO,
                target_amount: None,
                category: None,
            };
            assert!(matches!(rec.normalize(), Err(CoreError::ValidationError { .. })));
        }

        let json = r#"{"transactions": [],
                       "pockets": [{"id": "unlinked", "name": "Odd", "currentBalance": 5}]}"#;
        assert!(matches!(
            Snapshot::from_json(json, &utc()),
            Err(CoreError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_snapshot_from_json_camel_case() {
        let json = r#"{
            "transactions": [
                {"id": "t1", "description": "Lunch", "amount": -85.50, "date": "2024-01-14",
                 "category": "Food", "pocketId": "p1", "tags": ["work"]},
                {"id": "t2", "title": "Salary", "amount": "3500", "type": "income",
                 "date": "2024-01-15T09:00:00Z", "category": "Salary"}
            ],
            "pockets": [
                {"id": "p1", "name": "Groceries", "currentBalance": 120},
                {"id": "p2", "name": "Bike", "type": "goal",
                 "currentBalance": 150, "targetAmount": 100}
            ]
        }"#;
        let snapshot = Snapshot::from_json(json, &utc()).unwrap();
        assert_eq!(snapshot.transactions.len(), 2);
        assert_eq!(snapshot.transactions[0].title, "Lunch");
        assert_eq!(snapshot.transactions[0].amount, Decimal::new(8550, 2));
        assert!(snapshot.transactions[0].is_expense());
        assert_eq!(snapshot.transactions[0].pocket_id.as_deref(), Some("p1"));
        assert!(snapshot.transactions[1].is_income());
        assert_eq!(snapshot.pockets[1].target_amount, Some(Decimal::new(100, 0)));
    }

    #[test]
    fn test_snapshot_rejects_duplicate_ids() {
        let records = SnapshotRecords {
            transactions: vec![
                record("t1", Decimal::ONE, None),
                record("t1", Decimal::TEN, None),
            ],
            pockets: vec![],
        };
        let err = Snapshot::from_records(records, &utc()).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateEntry { .. }));
    }

    #[test]
    fn test_snapshot_from_json_invalid() {
        let err = Snapshot::from_json("[1, 2", &utc()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat { .. }));
    }

    #[test]
    fn test_pocket_index_label() {
        let pockets = vec![Pocket::standard("p1", "Groceries", Decimal::TEN)];
        let index = PocketIndex::new(&pockets);
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let linked = Transaction::new("t1", "Milk", Decimal::ONE, TransactionType::Expense, date)
            .with_pocket("p1");
        let dangling = Transaction::new("t2", "Bread", Decimal::ONE, TransactionType::Expense, date)
            .with_pocket("p9");
        let unlinked = Transaction::new("t3", "Eggs", Decimal::ONE, TransactionType::Expense, date);

        assert_eq!(index.label(&linked), "Groceries");
        assert_eq!(index.label(&dangling), UNLINKED_LABEL);
        assert!(index.resolve(&dangling).is_none());
        assert_eq!(index.label(&unlinked), UNLINKED_LABEL);
    }

    #[test]
    fn test_transaction_new_stores_magnitude() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let amount = Decimal::new(-500, 2);
        let tx = Transaction::new("t1", "Refund", amount, TransactionType::Income, date)
            .with_tags(["a", "a", "b"]);
        assert_eq!(tx.amount, Decimal::new(500, 2));
        assert_eq!(tx.tags, vec!["a".to_string(), "b".to_string()]);
    }
}
