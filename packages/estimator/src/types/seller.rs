//! Seller trust signals read from a profile page.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Signals extracted from a seller profile. Every field is optional and
/// extracted independently; one missing field never blocks the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerSignals {
    /// Average review rating, typically on a 0..=5 scale.
    pub rating: Option<Decimal>,
    pub review_count: Option<u32>,
    /// `Some(true)` when a trusted-seller badge was found, `Some(false)` when
    /// the profile rendered without one, `None` when the page never rendered.
    pub trusted_badge: Option<bool>,
    /// Most recent activity timestamp, resolved from the profile's relative
    /// time phrasing against the extraction clock.
    pub last_activity: Option<DateTime<Utc>>,
}

impl SellerSignals {
    /// Whether any usable signal was extracted. An all-empty signal set maps
    /// to the no-data reliability category rather than a zero score.
    pub fn has_signal(&self) -> bool {
        self.rating.is_some()
            || self.review_count.is_some()
            || self.trusted_badge == Some(true)
            || self.last_activity.is_some()
    }

    pub fn with_rating(mut self, rating: Decimal) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_review_count(mut self, count: u32) -> Self {
        self.review_count = Some(count);
        self
    }

    pub fn with_trusted_badge(mut self, badge: bool) -> Self {
        self.trusted_badge = Some(badge);
        self
    }

    pub fn with_last_activity(mut self, when: DateTime<Utc>) -> Self {
        self.last_activity = Some(when);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_empty_signals_have_no_signal() {
        assert!(!SellerSignals::default().has_signal());
    }

    #[test]
    fn test_absent_badge_alone_is_not_a_signal() {
        let s = SellerSignals::default().with_trusted_badge(false);
        assert!(!s.has_signal());
    }

    #[test]
    fn test_rating_is_a_signal() {
        let s = SellerSignals::default().with_rating(Decimal::new(48, 1));
        assert!(s.has_signal());
    }
}
