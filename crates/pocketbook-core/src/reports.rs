//! Aggregates over filtered transaction sets and pockets

use std::collections::{BTreeMap, HashMap};

use chrono::FixedOffset;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::filter::FilterConfig;
use crate::models::{Pocket, Transaction};
use crate::sort::compare_text;
use crate::types::TransactionType;

/// Scale of category share percentages
pub const PERCENT_SCALE: u32 = 2;

/// Income / expense totals over a transaction set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    pub count: usize,
}

impl Summary {
    pub fn add(&mut self, transaction: &Transaction) {
        match transaction.transaction_type {
            TransactionType::Income => self.income += transaction.magnitude(),
            TransactionType::Expense => self.expenses += transaction.magnitude(),
        }
        self.net = self.income - self.expenses;
        self.count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Sum a transaction set; empty input yields zeros
pub fn summarize<'a, I>(transactions: I) -> Summary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut summary = Summary::default();
    for transaction in transactions {
        summary.add(transaction);
    }
    summary
}

/// Goal progress as a percentage in `[0, 100]`
///
/// A missing or non-positive target yields zero. The value is not rounded;
/// callers round when they display it.
pub fn progress_of(pocket: &Pocket) -> Decimal {
    let target = match pocket.target_amount {
        Some(target) if target > Decimal::ZERO => target,
        _ => return Decimal::ZERO,
    };

    let raw = pocket
        .current_balance
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(target));

    match raw {
        Some(value) => value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED),
        None if pocket.current_balance.is_sign_negative() => Decimal::ZERO,
        None => Decimal::ONE_HUNDRED,
    }
}

/// Whether a goal pocket's balance has reached its target
pub fn is_goal_complete(pocket: &Pocket) -> bool {
    match pocket.target_amount {
        Some(target) => {
            pocket.is_goal() && target > Decimal::ZERO && pocket.current_balance >= target
        }
        None => false,
    }
}

/// Number of filter dimensions away from their neutral state
pub fn active_filter_count(config: &FilterConfig) -> usize {
    config.active_count()
}

/// Transactions referencing each pocket id, dangling ids included
pub fn pocket_transaction_counts(transactions: &[Transaction]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for id in transactions.iter().filter_map(|t| t.pocket_id.as_deref()) {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

/// Share of one category within its transaction type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub total: Decimal,
    pub count: usize,
    pub percentage: Decimal,
}

/// Per-category totals for one transaction type, largest first
pub fn category_breakdown<'a, I>(
    transactions: I,
    transaction_type: TransactionType,
) -> Vec<CategoryBreakdown>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: HashMap<&str, (Decimal, usize)> = HashMap::new();
    let mut type_total = Decimal::ZERO;
    for transaction in transactions
        .into_iter()
        .filter(|t| t.transaction_type == transaction_type)
    {
        let entry = totals.entry(transaction.category.as_str()).or_default();
        entry.0 += transaction.magnitude();
        entry.1 += 1;
        type_total += transaction.magnitude();
    }

    let mut rows: Vec<CategoryBreakdown> = totals
        .into_iter()
        .map(|(category, (total, count))| CategoryBreakdown {
            category: category.to_string(),
            transaction_type,
            total,
            count,
            percentage: share_of(total, type_total),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| compare_text(&a.category, &b.category))
    });
    rows
}

/// Category label with its income/expense summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub summary: Summary,
}

/// Summary per category in collation order
pub fn summaries_by_category<'a, I>(transactions: I) -> Vec<CategorySummary>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut by_category: HashMap<&str, Summary> = HashMap::new();
    for transaction in transactions {
        by_category
            .entry(transaction.category.as_str())
            .or_default()
            .add(transaction);
    }

    let mut rows: Vec<CategorySummary> = by_category
        .into_iter()
        .map(|(category, summary)| CategorySummary {
            category: category.to_string(),
            summary,
        })
        .collect();
    rows.sort_by(|a, b| compare_text(&a.category, &b.category));
    rows
}

/// Totals for one local calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub summary: Summary,
}

/// Summary per local calendar month, oldest first
pub fn monthly_summaries<'a, I>(transactions: I, offset: &FixedOffset) -> Vec<MonthlySummary>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut by_month: BTreeMap<String, Summary> = BTreeMap::new();
    for transaction in transactions {
        let month = transaction.local_date(offset).format("%Y-%m").to_string();
        by_month.entry(month).or_default().add(transaction);
    }
    by_month
        .into_iter()
        .map(|(month, summary)| MonthlySummary { month, summary })
        .collect()
}

/// Totals across a set of pockets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PocketOverview {
    pub total_balance: Decimal,
    pub pocket_count: usize,
    pub goal_count: usize,
    pub completed_goals: usize,
}

pub fn pocket_overview<'a, I>(pockets: I) -> PocketOverview
where
    I: IntoIterator<Item = &'a Pocket>,
{
    let mut overview = PocketOverview::default();
    for pocket in pockets {
        overview.total_balance += pocket.current_balance;
        overview.pocket_count += 1;
        if pocket.is_goal() {
            overview.goal_count += 1;
            if is_goal_complete(pocket) {
                overview.completed_goals += 1;
            }
        }
    }
    overview
}

fn share_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
        .map(round_percent)
        .unwrap_or(Decimal::ZERO)
}

fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tx(id: &str, cents: i64, kind: TransactionType, category: &str) -> Transaction {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        Transaction::new(id, id, Decimal::new(cents, 2), kind, date).with_category(category)
    }

    fn dated(id: &str, cents: i64, kind: TransactionType, y: i32, m: u32, d: u32) -> Transaction {
        let date = Utc.with_ymd_and_hms(y, m, d, 23, 30, 0).unwrap();
        Transaction::new(id, id, Decimal::new(cents, 2), kind, date)
    }

    #[test]
    fn test_summarize() {
        let items = vec![
            tx("a", 8550, TransactionType::Expense, "Food"),
            tx("b", 350000, TransactionType::Income, "Salary"),
            tx("c", 1450, TransactionType::Expense, "Food"),
        ];
        let summary = summarize(&items);
        assert_eq!(summary.income, Decimal::new(350000, 2));
        assert_eq!(summary.expenses, Decimal::new(10000, 2));
        assert_eq!(summary.net, Decimal::new(340000, 2));
        assert_eq!(summary.count, 3);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&Vec::<Transaction>::new());
        assert_eq!(summary, Summary::default());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_progress_clamps() {
        let over = Pocket::goal("p", "Trip", Decimal::new(150, 0), Decimal::ONE_HUNDRED);
        assert_eq!(progress_of(&over), Decimal::ONE_HUNDRED);

        let mut negative = Pocket::goal("p", "Trip", Decimal::ZERO, Decimal::ONE_HUNDRED);
        negative.current_balance = Decimal::new(-20, 0);
        assert_eq!(progress_of(&negative), Decimal::ZERO);

        let partial = Pocket::goal("p", "Trip", Decimal::ONE, Decimal::new(3, 0));
        assert_eq!(progress_of(&partial).round_dp(2), Decimal::new(3333, 2));
        assert!(progress_of(&partial) > Decimal::new(3333, 2));
    }

    #[test]
    fn test_progress_without_target_is_zero() {
        let standard = Pocket::standard("p", "Bills", Decimal::new(500, 0));
        assert_eq!(progress_of(&standard), Decimal::ZERO);

        let zero = Pocket::goal("p", "Trip", Decimal::TEN, Decimal::ZERO);
        assert_eq!(progress_of(&zero), Decimal::ZERO);
    }

    #[test]
    fn test_category_breakdown() {
        let items = vec![
            tx("a", 3000, TransactionType::Expense, "Transport"),
            tx("b", 6000, TransactionType::Expense, "Food"),
            tx("c", 1000, TransactionType::Expense, "Fun"),
            tx("d", 3000, TransactionType::Expense, "Bills"),
            tx("e", 900000, TransactionType::Income, "Salary"),
        ];
        let rows = category_breakdown(&items, TransactionType::Expense);
        let labels: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(labels, vec!["Food", "Bills", "Transport", "Fun"]);
        assert_eq!(rows[0].percentage, Decimal::new(4615, 2));
        assert_eq!(rows[3].count, 1);

        let income = category_breakdown(&items, TransactionType::Income);
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].percentage, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_monthly_summaries_use_local_calendar() {
        let items = vec![
            dated("feb", 1000, TransactionType::Expense, 2024, 2, 3),
            dated("jan-utc", 500, TransactionType::Income, 2024, 1, 31),
        ];
        let utc = FixedOffset::east_opt(0).unwrap();
        let months: Vec<String> = monthly_summaries(&items, &utc)
            .into_iter()
            .map(|m| m.month)
            .collect();
        assert_eq!(months, vec!["2024-01", "2024-02"]);

        // 23:30 UTC on Jan 31 is already February one hour east
        let east = FixedOffset::east_opt(3600).unwrap();
        let rows = monthly_summaries(&items, &east);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].month, "2024-02");
        assert_eq!(rows[0].summary.count, 2);
    }

    #[test]
    fn test_summaries_by_category() {
        let items = vec![
            tx("a", 100, TransactionType::Expense, "food"),
            tx("b", 200, TransactionType::Income, "Bonus"),
            tx("c", 300, TransactionType::Expense, "food"),
        ];
        let rows = summaries_by_category(&items);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Bonus");
        assert_eq!(rows[1].summary.expenses, Decimal::new(400, 2));
    }

    #[test]
    fn test_pocket_overview() {
        let pockets = vec![
            Pocket::standard("p1", "Bills", Decimal::new(250, 0)),
            Pocket::goal("p2", "Bike", Decimal::new(400, 0), Decimal::new(400, 0)),
            Pocket::goal("p3", "Trip", Decimal::new(50, 0), Decimal::new(1000, 0)),
        ];
        let overview = pocket_overview(&pockets);
        assert_eq!(overview.total_balance, Decimal::new(700, 0));
        assert_eq!(overview.pocket_count, 3);
        assert_eq!(overview.goal_count, 2);
        assert_eq!(overview.completed_goals, 1);
    }

    #[test]
    fn test_nearly_reached_goal_is_not_complete() {
        let car = Pocket::goal("p", "Car", Decimal::new(99999, 0), Decimal::new(100000, 0));
        assert!(progress_of(&car) < Decimal::ONE_HUNDRED);
        assert!(!is_goal_complete(&car));
        assert_eq!(pocket_overview(&[car]).completed_goals, 0);

        let reached = Pocket::goal("p", "Car", Decimal::new(100000, 0), Decimal::new(100000, 0));
        assert!(is_goal_complete(&reached));
        assert_eq!(pocket_overview(&[reached]).completed_goals, 1);
    }

    #[test]
    fn test_pocket_transaction_counts() {
        let items = vec![
            tx("a", 100, TransactionType::Expense, "Food").with_pocket("p1"),
            tx("b", 100, TransactionType::Expense, "Food").with_pocket("p1"),
            tx("c", 100, TransactionType::Expense, "Food").with_pocket("gone"),
            tx("d", 100, TransactionType::Expense, "Food"),
        ];
        let counts = pocket_transaction_counts(&items);
        assert_eq!(counts.get("p1"), Some(&2));
        assert_eq!(counts.get("gone"), Some(&1));
        assert_eq!(counts.len(), 2);
    }
}
