//! Pattern analysis over learned weights

use crate::learning::weights::LearningBook;
use crate::models::learning::{LearningWeight, WeightCategory};
use crate::outcome::stats::PerformanceStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternConfidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub pattern: String,
    /// Percent
    pub win_rate: f64,
    pub sample_size: u32,
    pub avg_pnl: f64,
    pub confidence: PatternConfidence,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Indicator,
    Asset,
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningInsight {
    pub category: InsightCategory,
    pub insight: String,
    pub actionable: bool,
}

fn sorted_by_win_rate(mut patterns: Vec<PatternAnalysis>) -> Vec<PatternAnalysis> {
    patterns.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
    patterns
}

fn qualifying<'a>(
    book: &'a LearningBook,
    category: WeightCategory,
    min_samples: u32,
) -> impl Iterator<Item = &'a LearningWeight> {
    book.weights()
        .filter(move |w| w.category == category && w.samples() >= min_samples)
}

/// Indicator+direction patterns with enough samples, best win rate first.
pub fn analyze_indicator_patterns(book: &LearningBook) -> Vec<PatternAnalysis> {
    let patterns = qualifying(book, WeightCategory::Indicator, book.config().min_samples)
        .map(|w| {
            let samples = w.samples();
            let win_rate = w.win_rate() * 100.0;
            let confidence = if samples >= 20 {
                PatternConfidence::High
            } else if samples >= 10 {
                PatternConfidence::Medium
            } else {
                PatternConfidence::Low
            };
            let recommendation = if win_rate >= 60.0 {
                "Increase weight - strong performer"
            } else if win_rate <= 40.0 {
                "Decrease weight - underperforming"
            } else {
                "Maintain current weight"
            };
            PatternAnalysis {
                pattern: w.key.clone(),
                win_rate,
                sample_size: samples,
                avg_pnl: w.avg_pnl(),
                confidence,
                recommendation: recommendation.to_string(),
            }
        })
        .collect();
    sorted_by_win_rate(patterns)
}

/// Per-asset predictability, best win rate first.
pub fn analyze_asset_performance(book: &LearningBook) -> Vec<PatternAnalysis> {
    let patterns = qualifying(book, WeightCategory::Asset, book.config().asset_min_samples)
        .map(|w| {
            let samples = w.samples();
            let win_rate = w.win_rate() * 100.0;
            let symbol = w.key.trim_start_matches("asset_").to_string();
            let confidence = if samples >= 15 {
                PatternConfidence::High
            } else if samples >= 7 {
                PatternConfidence::Medium
            } else {
                PatternConfidence::Low
            };
            let recommendation = if win_rate >= 65.0 {
                format!("{} shows strong predictability - prioritize", symbol)
            } else if win_rate <= 35.0 {
                format!("{} is hard to predict - reduce exposure", symbol)
            } else {
                format!("{} is average - standard weighting", symbol)
            };
            PatternAnalysis {
                pattern: symbol,
                win_rate,
                sample_size: samples,
                avg_pnl: w.avg_pnl(),
                confidence,
                recommendation,
            }
        })
        .collect();
    sorted_by_win_rate(patterns)
}

/// Human-readable findings: best/worst indicator and asset, plus an overall
/// line once at least 10 outcomes are in `stats`.
pub fn generate_insights(book: &LearningBook, stats: Option<&PerformanceStats>) -> Vec<LearningInsight> {
    let mut insights = Vec::new();

    let indicators = analyze_indicator_patterns(book);
    if let Some(best) = indicators.first().filter(|p| p.win_rate >= 55.0) {
        insights.push(LearningInsight {
            category: InsightCategory::Indicator,
            insight: format!(
                "{} is the best performing indicator ({:.1}% win rate over {} trades)",
                best.pattern, best.win_rate, best.sample_size
            ),
            actionable: true,
        });
    }
    if let Some(worst) = indicators.last().filter(|p| p.win_rate <= 45.0) {
        insights.push(LearningInsight {
            category: InsightCategory::Indicator,
            insight: format!(
                "{} is underperforming ({:.1}% win rate) - consider reducing its influence",
                worst.pattern, worst.win_rate
            ),
            actionable: true,
        });
    }

    let assets = analyze_asset_performance(book);
    if let Some(best) = assets.first().filter(|p| p.win_rate >= 60.0) {
        insights.push(LearningInsight {
            category: InsightCategory::Asset,
            insight: format!(
                "{} is highly predictable ({:.1}% win rate) - consider increasing coverage",
                best.pattern, best.win_rate
            ),
            actionable: false,
        });
    }
    if let Some(worst) = assets.last().filter(|p| p.win_rate <= 40.0) {
        insights.push(LearningInsight {
            category: InsightCategory::Asset,
            insight: format!(
                "{} signals are unreliable ({:.1}% win rate) - consider excluding",
                worst.pattern, worst.win_rate
            ),
            actionable: false,
        });
    }

    if let Some(stats) = stats.filter(|s| s.resolved >= 10) {
        let status = if stats.win_rate >= 55.0 {
            "performing well"
        } else if stats.win_rate >= 45.0 {
            "average"
        } else {
            "needs improvement"
        };
        insights.push(LearningInsight {
            category: InsightCategory::General,
            insight: format!(
                "Overall win rate is {:.1}% ({}). Average PnL: {:+.2}%",
                stats.win_rate, status, stats.avg_pnl
            ),
            actionable: false,
        });
    }

    insights
}
