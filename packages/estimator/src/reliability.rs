//! Seller reliability scoring.
//!
//! A 100-point system across four criteria: activity recency (0-30),
//! average rating (0-35), review volume (0-25), and trusted badge (0-10).
//! Sellers inactive for more than thirty days are forced into the lowest
//! category no matter what the other criteria say, and sellers with no
//! extractable signals get a distinct no-data category instead of a zero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::types::{ReliabilityCategory, ReliabilityScore, SellerSignals};

const INACTIVITY_CUTOFF_DAYS: i64 = 30;

/// Score seller signals against the reference instant `now`.
pub fn score(signals: &SellerSignals, now: DateTime<Utc>) -> ReliabilityScore {
    if !signals.has_signal() {
        return ReliabilityScore::no_data();
    }

    let days_since_activity = signals
        .last_activity
        .map(|last| now.signed_duration_since(last).num_days());

    if let Some(days) = days_since_activity {
        if days > INACTIVITY_CUTOFF_DAYS {
            return ReliabilityScore {
                activity: 0,
                rating: 0,
                reviews: 0,
                badge: 0,
                total: 0,
                category: ReliabilityCategory::Ghost,
                days_since_activity,
            };
        }
    }

    let activity = activity_score(days_since_activity);
    let rating = rating_score(signals.rating);
    let reviews = review_score(signals.review_count);
    let badge = if signals.trusted_badge == Some(true) {
        10
    } else {
        0
    };

    let total = activity + rating + reviews + badge;

    ReliabilityScore {
        activity,
        rating,
        reviews,
        badge,
        total,
        category: category_for(total),
        days_since_activity,
    }
}

fn activity_score(days_since_activity: Option<i64>) -> u32 {
    match days_since_activity {
        Some(days) if days <= 2 => 30,
        Some(days) if days <= 7 => 24,
        Some(days) if days <= 30 => 12,
        // No activity evidence at all scores zero without triggering the
        // inactivity override.
        _ => 0,
    }
}

fn rating_score(rating: Option<Decimal>) -> u32 {
    let Some(rating) = rating else { return 0 };

    if rating >= Decimal::new(490, 2) {
        35
    } else if rating >= Decimal::new(470, 2) {
        30
    } else if rating >= Decimal::new(450, 2) {
        24
    } else if rating >= Decimal::new(400, 2) {
        12
    } else {
        0
    }
}

fn review_score(review_count: Option<u32>) -> u32 {
    match review_count {
        None | Some(0) => 0,
        Some(1..=9) => 5,
        Some(10..=49) => 15,
        Some(50..=199) => 20,
        Some(_) => 25,
    }
}

fn category_for(total: u32) -> ReliabilityCategory {
    if total >= 85 {
        ReliabilityCategory::Diamond
    } else if total >= 70 {
        ReliabilityCategory::Gold
    } else if total >= 55 {
        ReliabilityCategory::Silver
    } else if total >= 40 {
        ReliabilityCategory::Bronze
    } else {
        ReliabilityCategory::Ghost
    }
}

/// Buyer-facing advisories about a listing's seller.
pub mod advisory {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Serialize};

    use crate::types::SellerSignals;

    /// First matching concern, in priority order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Advisory {
        /// Rated 4.6 or below with actual reviews behind the number.
        LowRating,
        /// No reviews at all.
        NoReviews,
        /// Listing has no buy-now price.
        NotBuyable,
        /// Seller could not be analyzed.
        NoSellerData,
    }

    pub fn evaluate(signals: Option<&SellerSignals>, buyable: Option<bool>) -> Option<Advisory> {
        if let Some(signals) = signals {
            let reviews = signals.review_count.unwrap_or(0);
            if reviews > 0 {
                if let Some(rating) = signals.rating {
                    if rating <= Decimal::new(46, 1) {
                        return Some(Advisory::LowRating);
                    }
                }
            } else {
                return Some(Advisory::NoReviews);
            }
        }

        if buyable == Some(false) {
            return Some(Advisory::NotBuyable);
        }

        if signals.is_none() {
            return Some(Advisory::NoSellerData);
        }

        None
    }
}
