//! Transaction ordering
//!
//! Sorting always goes through `slice::sort_by`, which is stable: items
//! whose keys compare equal keep their input order in both directions.

use std::cmp::Ordering;

use pocketbook_config::{SortKey, SortOrder};
use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::Transaction;

/// Sort configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortConfig {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }
}

/// Collation key: compatibility-decomposed, accents stripped, lowercased
pub fn collation_key(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Locale-style text comparison
///
/// Primary: accent- and case-insensitive key. Then lowercase text, then the
/// raw string, so distinct strings never compare equal.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Compare two transactions by a key in the given direction
pub fn compare(a: &Transaction, b: &Transaction, key: SortKey, order: SortOrder) -> Ordering {
    let ascending = match key {
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::Amount => a.magnitude().cmp(&b.magnitude()),
        SortKey::Title => compare_text(&a.title, &b.title),
        SortKey::Category => compare_text(&a.category, &b.category),
    };
    apply_order(ascending, order)
}

/// Flip an ascending comparison for descending order
pub fn apply_order(ascending: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Ascending => ascending,
        SortOrder::Descending => ascending.reverse(),
    }
}

/// Stable in-place sort
pub fn sort_transactions<T: AsRef<Transaction>>(items: &mut [T], config: SortConfig) {
    items.sort_by(|a, b| compare(a.as_ref(), b.as_ref(), config.key, config.order));
}

impl AsRef<Transaction> for Transaction {
    fn as_ref(&self) -> &Transaction {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionType;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn tx(id: &str, title: &str, cents: i64, kind: TransactionType, hour: u32) -> Transaction {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap();
        Transaction::new(id, title, Decimal::new(cents, 2), kind, date)
    }

    fn ids(items: &[Transaction]) -> Vec<&str> {
        items.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_amount_sorts_by_magnitude() {
        let mut items = vec![
            tx("income", "Gift", 10000, TransactionType::Income, 9),
            tx("expense", "Rent", 50000, TransactionType::Expense, 10),
        ];
        sort_transactions(&mut items, SortConfig::new(SortKey::Amount, SortOrder::Descending));
        assert_eq!(ids(&items), vec!["expense", "income"]);
    }

    #[test]
    fn test_date_uses_full_timestamp() {
        let mut items = vec![
            tx("late", "A", 100, TransactionType::Expense, 18),
            tx("early", "B", 100, TransactionType::Expense, 7),
        ];
        sort_transactions(&mut items, SortConfig::new(SortKey::Date, SortOrder::Ascending));
        assert_eq!(ids(&items), vec!["early", "late"]);
    }

    #[test]
    fn test_equal_keys_keep_input_order_both_directions() {
        let items = vec![
            tx("a", "A", 100, TransactionType::Expense, 12),
            tx("b", "B", 200, TransactionType::Expense, 9),
            tx("c", "C", 300, TransactionType::Expense, 12),
            tx("d", "D", 400, TransactionType::Expense, 12),
        ];

        let mut asc = items.clone();
        sort_transactions(&mut asc, SortConfig::new(SortKey::Date, SortOrder::Ascending));
        assert_eq!(ids(&asc), vec!["b", "a", "c", "d"]);

        let mut desc = items;
        sort_transactions(&mut desc, SortConfig::new(SortKey::Date, SortOrder::Descending));
        assert_eq!(ids(&desc), vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn test_descending_is_reverse_of_ascending() {
        let a = tx("a", "Apple", 100, TransactionType::Expense, 1);
        let b = tx("b", "banana", 200, TransactionType::Expense, 2);
        for key in [SortKey::Date, SortKey::Amount, SortKey::Title, SortKey::Category] {
            assert_eq!(
                compare(&a, &b, key, SortOrder::Descending),
                compare(&a, &b, key, SortOrder::Ascending).reverse()
            );
        }
    }

    #[test]
    fn test_title_collation() {
        let mut items = vec![
            tx("z", "zebra", 1, TransactionType::Expense, 1),
            tx("e", "Éclair", 1, TransactionType::Expense, 1),
            tx("a", "apple", 1, TransactionType::Expense, 1),
            tx("b", "Banana", 1, TransactionType::Expense, 1),
        ];
        sort_transactions(&mut items, SortConfig::new(SortKey::Title, SortOrder::Ascending));
        assert_eq!(ids(&items), vec!["a", "b", "e", "z"]);
    }

    #[test]
    fn test_compare_text_tiebreaks() {
        assert_eq!(compare_text("cafe", "Café"), Ordering::Less);
        assert_eq!(compare_text("Food", "food"), Ordering::Less);
        assert_eq!(compare_text("Food", "Food"), Ordering::Equal);
        assert_eq!(collation_key("Crème Brûlée"), "creme brulee");
    }

    #[test]
    fn test_sort_references() {
        let owned = vec![
            tx("b", "B", 200, TransactionType::Expense, 2),
            tx("a", "A", 100, TransactionType::Expense, 1),
        ];
        let mut refs: Vec<&Transaction> = owned.iter().collect();
        sort_transactions(&mut refs, SortConfig::new(SortKey::Amount, SortOrder::Ascending));
        assert_eq!(refs[0].id, "a");
    }
}
