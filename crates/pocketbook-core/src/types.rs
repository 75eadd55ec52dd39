//! Basic enumerations for transactions, pockets and filter dimensions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Transaction polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in
    Income,
    /// Money going out
    Expense,
}

impl std::str::FromStr for TransactionType {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" | "expenses" => Ok(TransactionType::Expense),
            _ => Err(CoreError::invalid_value("type", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => f.pad("income"),
            TransactionType::Expense => f.pad("expense"),
        }
    }
}

/// Pocket kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PocketType {
    /// Plain budget envelope
    Standard,
    /// Savings goal with a target amount
    Goal,
}

impl Default for PocketType {
    fn default() -> Self {
        PocketType::Standard
    }
}

impl std::str::FromStr for PocketType {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(PocketType::Standard),
            "goal" => Ok(PocketType::Goal),
            _ => Err(CoreError::invalid_value("pocket type", s)),
        }
    }
}

impl std::fmt::Display for PocketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PocketType::Standard => f.pad("standard"),
            PocketType::Goal => f.pad("goal"),
        }
    }
}

/// Coarse amount range, applied to the magnitude of a transaction
///
/// Every bucket is closed below and open above, so a boundary value belongs
/// to the higher bucket: exactly 50.00 is `From50To100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmountBucket {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "under50")]
    Under50,
    #[serde(rename = "50to100")]
    From50To100,
    #[serde(rename = "100to500")]
    From100To500,
    #[serde(rename = "over500")]
    Over500,
}

impl Default for AmountBucket {
    fn default() -> Self {
        AmountBucket::All
    }
}

impl AmountBucket {
    /// Lower (inclusive) and upper (exclusive) bounds; `None` means unbounded
    pub fn bounds(&self) -> (Decimal, Option<Decimal>) {
        match self {
            AmountBucket::All => (Decimal::ZERO, None),
            AmountBucket::Under50 => (Decimal::ZERO, Some(Decimal::from(50))),
            AmountBucket::From50To100 => (Decimal::from(50), Some(Decimal::ONE_HUNDRED)),
            AmountBucket::From100To500 => (Decimal::ONE_HUNDRED, Some(Decimal::from(500))),
            AmountBucket::Over500 => (Decimal::from(500), None),
        }
    }

    /// Check whether a magnitude falls inside the bucket
    pub fn contains(&self, magnitude: Decimal) -> bool {
        if matches!(self, AmountBucket::All) {
            return true;
        }
        let (low, high) = self.bounds();
        magnitude >= low && high.map_or(true, |h| magnitude < h)
    }
}

impl std::str::FromStr for AmountBucket {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(AmountBucket::All),
            "under50" => Ok(AmountBucket::Under50),
            "50to100" => Ok(AmountBucket::From50To100),
            "100to500" => Ok(AmountBucket::From100To500),
            "over500" => Ok(AmountBucket::Over500),
            _ => Err(CoreError::invalid_value("amount bucket", s)),
        }
    }
}

impl std::fmt::Display for AmountBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmountBucket::All => f.pad("all"),
            AmountBucket::Under50 => f.pad("under50"),
            AmountBucket::From50To100 => f.pad("50to100"),
            AmountBucket::From100To500 => f.pad("100to500"),
            AmountBucket::Over500 => f.pad("over500"),
        }
    }
}

/// Transaction type filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    All,
    Income,
    Expense,
}

impl Default for TypeFilter {
    fn default() -> Self {
        TypeFilter::All
    }
}

impl TypeFilter {
    /// The single type this filter admits, if it restricts at all
    pub fn as_type(&self) -> Option<TransactionType> {
        match self {
            TypeFilter::All => None,
            TypeFilter::Income => Some(TransactionType::Income),
            TypeFilter::Expense => Some(TransactionType::Expense),
        }
    }
}

impl std::str::FromStr for TypeFilter {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TypeFilter::All),
            "income" => Ok(TypeFilter::Income),
            "expense" | "expenses" => Ok(TypeFilter::Expense),
            _ => Err(CoreError::invalid_value("type", s)),
        }
    }
}

/// Pocket filter: everything, only unlinked transactions, or one pocket
///
/// Filter words that can never be used as pocket ids
pub const RESERVED_POCKET_IDS: [&str; 2] = ["all", "unlinked"];

/// Serialized as a plain string: `"all"`, `"unlinked"` or the pocket id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PocketFilter {
    All,
    Unlinked,
    Pocket(String),
}

impl Default for PocketFilter {
    fn default() -> Self {
        PocketFilter::All
    }
}

impl From<String> for PocketFilter {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        match trimmed {
            "" | "all" => PocketFilter::All,
            "unlinked" => PocketFilter::Unlinked,
            id => PocketFilter::Pocket(id.to_string()),
        }
    }
}

impl From<&str> for PocketFilter {
    fn from(value: &str) -> Self {
        PocketFilter::from(value.to_string())
    }
}

impl From<PocketFilter> for String {
    fn from(value: PocketFilter) -> Self {
        match value {
            PocketFilter::All => "all".to_string(),
            PocketFilter::Unlinked => "unlinked".to_string(),
            PocketFilter::Pocket(id) => id,
        }
    }
}

impl PocketFilter {
    /// Check a transaction's pocket reference against the filter
    pub fn matches(&self, pocket_id: Option<&str>) -> bool {
        match self {
            PocketFilter::All => true,
            PocketFilter::Unlinked => pocket_id.is_none(),
            PocketFilter::Pocket(id) => pocket_id == Some(id.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_honours_width() {
        assert_eq!(format!("{:<8}|", PocketType::Goal), "goal    |");
        assert_eq!(format!("{:>8}", TransactionType::Income), "  income");
    }

    fn d(units: i64, scale: u32) -> Decimal {
        Decimal::new(units, scale)
    }

    #[test]
    fn test_bucket_boundaries() {
        assert!(AmountBucket::Under50.contains(d(4999, 2)));
        assert!(!AmountBucket::Under50.contains(d(5000, 2)));
        assert!(AmountBucket::From50To100.contains(d(5000, 2)));
        assert!(!AmountBucket::From50To100.contains(d(100, 0)));
        assert!(AmountBucket::From100To500.contains(d(100, 0)));
        assert!(!AmountBucket::From100To500.contains(d(500, 0)));
        assert!(AmountBucket::Over500.contains(d(500, 0)));
        assert!(AmountBucket::Over500.contains(d(1_000_000, 0)));
        assert!(AmountBucket::Under50.contains(Decimal::ZERO));
    }

    #[test]
    fn test_bucket_all_matches_everything() {
        assert!(AmountBucket::All.contains(Decimal::ZERO));
        assert!(AmountBucket::All.contains(d(123456789, 2)));
    }

    #[test]
    fn test_bucket_from_str_and_serde() {
        assert_eq!("50to100".parse::<AmountBucket>().unwrap(), AmountBucket::From50To100);
        assert!("50-100".parse::<AmountBucket>().is_err());
        let json = serde_json::to_string(&AmountBucket::From100To500).unwrap();
        assert_eq!(json, "\"100to500\"");
        let parsed: AmountBucket = serde_json::from_str("\"over500\"").unwrap();
        assert_eq!(parsed, AmountBucket::Over500);
        assert!(serde_json::from_str::<AmountBucket>("\"huge\"").is_err());
    }

    #[test]
    fn test_pocket_filter_from_string() {
        assert_eq!(PocketFilter::from(""), PocketFilter::All);
        assert_eq!(PocketFilter::from("all"), PocketFilter::All);
        assert_eq!(PocketFilter::from("unlinked"), PocketFilter::Unlinked);
        assert_eq!(PocketFilter::from(" p1 "), PocketFilter::Pocket("p1".to_string()));
        let json = serde_json::to_string(&PocketFilter::Pocket("p7".to_string())).unwrap();
        assert_eq!(json, "\"p7\"");
    }

    #[test]
    fn test_pocket_filter_matches() {
        assert!(PocketFilter::All.matches(None));
        assert!(PocketFilter::All.matches(Some("p1")));
        assert!(PocketFilter::Unlinked.matches(None));
        assert!(!PocketFilter::Unlinked.matches(Some("p1")));
        let p1 = PocketFilter::Pocket("p1".to_string());
        assert!(p1.matches(Some("p1")));
        assert!(!p1.matches(Some("p2")));
        assert!(!p1.matches(None));
    }

    #[test]
    fn test_type_from_str() {
        assert_eq!("Expense".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert!("transfer".parse::<TransactionType>().is_err());
        let income = "income".parse::<TypeFilter>().unwrap();
        assert_eq!(income.as_type(), Some(TransactionType::Income));
        assert_eq!(TypeFilter::All.as_type(), None);
        assert_eq!("goal".parse::<PocketType>().unwrap(), PocketType::Goal);
    }
}
