//! Signal generation: sentiment, rule cascade, levels and confidence.

pub mod confidence;
pub mod engine;
pub mod generator;
pub mod levels;
pub mod rules;
pub mod sentiment;

pub use engine::SignalEngine;
pub use generator::{SignalGenerator, SignalRequest};
pub use rules::{CascadeRule, Decision, RuleCascade, RuleContext};
