//! Landed-cost computation.

pub mod engine;
pub mod weight;

pub use engine::PricingEngine;
pub use weight::{WeightEstimate, WeightTable};
