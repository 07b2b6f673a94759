//! Confidence learning from resolved outcomes.

pub mod insights;
pub mod weights;

pub use insights::{analyze_asset_performance, analyze_indicator_patterns, generate_insights};
pub use weights::{asset_key, indicator_key, LearningBook, LearningSnapshot, WeightUpdate};
