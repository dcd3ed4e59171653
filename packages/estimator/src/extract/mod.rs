//! Listing and seller-profile extraction.
//!
//! Item pages go through an ordered strategy chain (structured data first,
//! markup fallback); seller profiles need a rendered page and go through the
//! browser pool.

pub mod listing;
pub mod markup;
pub mod relative_time;
pub mod seller;
pub mod strategy;
pub mod structured;

pub use listing::ListingExtractor;
pub use seller::SellerSignalExtractor;
