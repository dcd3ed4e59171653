//! Seller reliability scoring output.

use serde::{Deserialize, Serialize};

/// Discrete trust tiers, ordered from least to most trustworthy.
///
/// `NoData` is a distinct category for sellers with no extractable signals,
/// not a numeric zero; `Ghost` is the lowest scored tier and also the forced
/// category for sellers inactive for more than thirty days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityCategory {
    NoData,
    Ghost,
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl ReliabilityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReliabilityCategory::NoData => "no_data",
            ReliabilityCategory::Ghost => "ghost",
            ReliabilityCategory::Bronze => "bronze",
            ReliabilityCategory::Silver => "silver",
            ReliabilityCategory::Gold => "gold",
            ReliabilityCategory::Diamond => "diamond",
        }
    }
}

impl std::fmt::Display for ReliabilityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Component-wise reliability score for a seller.
///
/// `total` is always the sum of the four components; the category is derived
/// from the total except where the inactivity override applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliabilityScore {
    pub activity: u32,
    pub rating: u32,
    pub reviews: u32,
    pub badge: u32,
    pub total: u32,
    pub category: ReliabilityCategory,
    /// Days since the seller's last observed activity, when known.
    pub days_since_activity: Option<i64>,
}

impl ReliabilityScore {
    /// Sentinel score for sellers with no extractable signals.
    pub fn no_data() -> Self {
        Self {
            activity: 0,
            rating: 0,
            reviews: 0,
            badge: 0,
            total: 0,
            category: ReliabilityCategory::NoData,
            days_since_activity: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ordering() {
        assert!(ReliabilityCategory::Diamond > ReliabilityCategory::Gold);
        assert!(ReliabilityCategory::Ghost > ReliabilityCategory::NoData);
        assert!(ReliabilityCategory::Bronze > ReliabilityCategory::Ghost);
    }
}
