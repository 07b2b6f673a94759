//! Unit tests for learning insights

use crate::common::ts;
use morpheus::config::LearningConfig;
use morpheus::learning::insights::{InsightCategory, PatternConfidence};
use morpheus::learning::{
    analyze_asset_performance, analyze_indicator_patterns, generate_insights, LearningBook,
};
use morpheus::models::learning::WeightCategory;
use morpheus::outcome::PerformanceStats;

fn record_many(book: &mut LearningBook, key: &str, category: WeightCategory, wins: u32, losses: u32) {
    for i in 0..wins {
        book.record(key, category, true, 4.0, ts(i as i64));
    }
    for i in 0..losses {
        book.record(key, category, false, -2.0, ts(i as i64));
    }
}

fn sample_book() -> LearningBook {
    let mut book = LearningBook::new(LearningConfig::default());
    record_many(&mut book, "rsi_4h_LONG", WeightCategory::Indicator, 8, 2);
    record_many(&mut book, "macd_histogram_SHORT", WeightCategory::Indicator, 1, 4);
    record_many(&mut book, "trend_strength_LONG", WeightCategory::Indicator, 2, 1);
    record_many(&mut book, "asset_BTC", WeightCategory::Asset, 3, 1);
    record_many(&mut book, "asset_DOGE", WeightCategory::Asset, 0, 3);
    book
}

#[test]
fn test_indicator_patterns_filter_and_sort() {
    let patterns = analyze_indicator_patterns(&sample_book());
    let names: Vec<&str> = patterns.iter().map(|p| p.pattern.as_str()).collect();
    assert_eq!(names, vec!["rsi_4h_LONG", "macd_histogram_SHORT"]);

    assert_eq!(patterns[0].win_rate, 80.0);
    assert_eq!(patterns[0].confidence, PatternConfidence::Medium);
    assert!(patterns[0].recommendation.starts_with("Increase"));
    assert_eq!(patterns[1].confidence, PatternConfidence::Low);
    assert!(patterns[1].recommendation.starts_with("Decrease"));
}

#[test]
fn test_asset_performance() {
    let assets = analyze_asset_performance(&sample_book());
    assert_eq!(assets.len(), 2);
    assert_eq!(assets[0].pattern, "BTC");
    assert_eq!(assets[0].win_rate, 75.0);
    assert!(assets[0].recommendation.contains("prioritize"));
    assert_eq!(assets[1].pattern, "DOGE");
    assert!(assets[1].recommendation.contains("reduce exposure"));
}

#[test]
fn test_generate_insights_without_stats() {
    let insights = generate_insights(&sample_book(), None);
    assert_eq!(insights.len(), 4);
    assert!(insights[0].insight.contains("rsi_4h_LONG"));
    assert!(insights[0].actionable);
    assert_eq!(insights[2].category, InsightCategory::Asset);
    assert!(insights.iter().all(|i| i.category != InsightCategory::General));
}

#[test]
fn test_overall_insight_needs_ten_outcomes() {
    let book = sample_book();
    let mut stats = PerformanceStats {
        resolved: 9,
        win_rate: 60.0,
        avg_pnl: 1.5,
        ..Default::default()
    };
    assert_eq!(generate_insights(&book, Some(&stats)).len(), 4);

    stats.resolved = 10;
    let insights = generate_insights(&book, Some(&stats));
    let general = insights.last().unwrap();
    assert_eq!(general.category, InsightCategory::General);
    assert!(general.insight.contains("performing well"));
    assert!(general.insight.contains("+1.50%"));
}

#[test]
fn test_empty_book_has_no_insights() {
    let book = LearningBook::new(LearningConfig::default());
    assert!(analyze_indicator_patterns(&book).is_empty());
    assert!(generate_insights(&book, None).is_empty());
}
