//! Signal generation: indicators on two timeframes -> rule cascade ->
//! levels, confidence and reasoning.

use crate::config::SignalConfig;
use crate::indicators::analyze;
use crate::indicators::volume::volume_score;
use crate::learning::{asset_key, indicator_key, LearningSnapshot};
use crate::models::candle::{Asset, Candle, Timeframe};
use crate::models::indicators::{
    Divergence, EmaAlignment, IndicatorSnapshot, PricePosition, RsiSignal, TrendDirection,
    VolumeConfirmation,
};
use crate::models::signal::{Reasoning, Signal, SignalAction, SignalAnalysis, TradeSide};
use crate::signals::confidence::{apply_learning, calculate_confidence, risk_level, summarize};
use crate::signals::levels::calculate_levels;
use crate::signals::rules::{RuleCascade, RuleContext};
use crate::signals::sentiment::{combined_sentiment, describe_sentiment};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Candle series for one asset, keyed by timeframe, plus optional context text.
#[derive(Debug, Clone)]
pub struct SignalRequest {
    pub asset: Asset,
    pub candles: HashMap<Timeframe, Vec<Candle>>,
    pub fundamental_context: Option<String>,
    pub sentiment_context: Option<String>,
}

impl SignalRequest {
    pub fn new(asset: Asset, candles: HashMap<Timeframe, Vec<Candle>>) -> Self {
        Self {
            asset,
            candles,
            fundamental_context: None,
            sentiment_context: None,
        }
    }

    pub fn with_fundamental_context(mut self, context: impl Into<String>) -> Self {
        self.fundamental_context = Some(context.into());
        self
    }

    pub fn with_sentiment_context(mut self, context: impl Into<String>) -> Self {
        self.sentiment_context = Some(context.into());
        self
    }

    fn series(&self, timeframe: Timeframe) -> &[Candle] {
        self.candles.get(&timeframe).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub struct SignalGenerator {
    config: SignalConfig,
    cascade: RuleCascade,
    learning: LearningSnapshot,
}

impl SignalGenerator {
    pub fn new(config: SignalConfig) -> Self {
        let cascade = RuleCascade::standard(config.min_sentiment_edge);
        Self {
            config,
            cascade,
            learning: LearningSnapshot::default(),
        }
    }

    pub fn with_cascade(mut self, cascade: RuleCascade) -> Self {
        self.cascade = cascade;
        self
    }

    /// Scale future confidence with learned weights frozen at this point.
    pub fn with_learning(mut self, learning: LearningSnapshot) -> Self {
        self.learning = learning;
        self
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn is_pegged(&self, symbol: &str) -> bool {
        self.config.is_pegged(symbol)
    }

    pub fn generate(&self, asset: &Asset, candles: &HashMap<Timeframe, Vec<Candle>>) -> Option<Signal> {
        let request = SignalRequest::new(asset.clone(), candles.clone());
        self.generate_at(&request, Utc::now())
    }

    pub fn generate_request(&self, request: &SignalRequest) -> Option<Signal> {
        self.generate_at(request, Utc::now())
    }

    /// Generate a signal as of `now`, or `None` when the asset is pegged, has
    /// no usable price, or the cascade holds.
    pub fn generate_at(&self, request: &SignalRequest, now: DateTime<Utc>) -> Option<Signal> {
        let symbol = request.asset.symbol.as_str();

        if self.is_pegged(symbol) {
            info!(asset = %symbol, "SignalGenerator: skipping pegged asset {}", symbol);
            return None;
        }

        let fast_tf = self.config.fast_timeframe;
        let slow_tf = self.config.slow_timeframe;
        let fast_candles = request.series(fast_tf);
        let slow_candles = request.series(slow_tf);

        let price = match self.current_price(request) {
            Some(p) => p,
            None => {
                warn!(asset = %symbol, "SignalGenerator: no valid current price, rejecting candidate");
                return None;
            }
        };

        let fast = analyze(fast_candles);
        let slow = analyze(slow_candles);
        let sentiment = combined_sentiment(&fast, &slow);
        let ctx = RuleContext::new(&fast, &slow, sentiment);

        let decision = self.cascade.evaluate(&ctx);
        let side = match decision.action.side() {
            Some(side) => side,
            None => {
                debug!(
                    asset = %symbol,
                    rule = decision.rule,
                    sentiment = sentiment,
                    "SignalGenerator: holding {}",
                    symbol
                );
                return None;
            }
        };

        let levels = match calculate_levels(side, price, &fast) {
            Some(levels) => levels,
            None => {
                warn!(
                    asset = %symbol,
                    action = side.as_str(),
                    entry = price,
                    "SignalGenerator: could not place valid levels, rejecting candidate"
                );
                return None;
            }
        };

        let indicators = indicator_map(&fast, &slow, fast_tf, slow_tf);
        let action = SignalAction::from(side);

        let mut learning_keys: Vec<String> = indicators
            .keys()
            .map(|name| indicator_key(name, action))
            .collect();
        learning_keys.push(asset_key(symbol));
        let multiplier = self.learning.multiplier_for(&learning_keys);

        let confidence = apply_learning(calculate_confidence(&ctx), multiplier);
        let risk = risk_level(confidence.total, &fast.trend);
        let timeframe = if slow.trend.strength > 70 { slow_tf } else { fast_tf };

        let technical = format!(
            "{}{}. {}: trend {}. Volume {}.",
            rsi_narrative(&fast, &slow, fast_tf, slow_tf),
            technical_summary(&fast, fast_tf),
            slow_tf,
            slow.trend.direction.as_str().to_lowercase(),
            volume_narrative(&fast, side),
        );
        let sentiment_text = request.sentiment_context.clone().unwrap_or_else(|| {
            format!("{} ({:+.0})", describe_sentiment(sentiment), sentiment)
        });

        let reasoning = Reasoning {
            technical: format!("{} {}", technical, summarize(&confidence, 3)),
            fundamental: request
                .fundamental_context
                .clone()
                .unwrap_or_else(|| "No significant fundamental factors".to_string()),
            sentiment: sentiment_text,
            rule: decision.rule.to_string(),
            confidence: confidence.clone(),
        };

        let signal = Signal {
            id: format!("sig_{}", Uuid::new_v4().simple()),
            created_at: now,
            expires_at: now + Duration::hours(self.config.validity_hours),
            asset: request.asset.clone(),
            action,
            entry: levels.entry,
            targets: levels.targets,
            stop_loss: levels.stop_loss,
            confidence: confidence.total,
            timeframe,
            risk_level: risk,
            reasoning,
            indicators,
            analysis: SignalAnalysis {
                fast_timeframe: fast_tf,
                slow_timeframe: slow_tf,
                fast,
                slow,
                sentiment_score: sentiment,
            },
        };

        info!(
            signal_id = %signal.id,
            asset = %symbol,
            action = action.as_str(),
            confidence = signal.confidence,
            rule = decision.rule,
            "SignalGenerator: {} {} at {} (confidence {}%)",
            action.as_str(),
            symbol,
            signal.entry,
            signal.confidence
        );

        Some(signal)
    }

    /// Last close of the price timeframe, falling back to the fast timeframe.
    /// `None` unless the price is finite and positive.
    pub fn current_price(&self, request: &SignalRequest) -> Option<f64> {
        request
            .series(self.config.price_timeframe)
            .last()
            .or_else(|| request.series(self.config.fast_timeframe).last())
            .map(|c| c.close)
            .filter(|p| p.is_finite() && *p > 0.0)
    }
}

fn indicator_map(
    fast: &IndicatorSnapshot,
    slow: &IndicatorSnapshot,
    fast_tf: Timeframe,
    slow_tf: Timeframe,
) -> BTreeMap<String, f64> {
    let mut map = BTreeMap::new();
    map.insert(format!("rsi_{}", fast_tf.as_str().to_lowercase()), fast.rsi.value);
    map.insert(format!("rsi_{}", slow_tf.as_str().to_lowercase()), slow.rsi.value);
    map.insert("trend_strength".to_string(), fast.trend.strength as f64);
    map.insert("macd_histogram".to_string(), fast.macd.histogram);
    map
}

fn rsi_narrative(
    fast: &IndicatorSnapshot,
    slow: &IndicatorSnapshot,
    fast_tf: Timeframe,
    slow_tf: Timeframe,
) -> String {
    let rsi = fast.rsi.value;
    let mut text = if rsi <= 20.0 {
        format!("EXTREME OVERSOLD: RSI({})={:.2}, high probability bounce zone. ", fast_tf, rsi)
    } else if rsi >= 80.0 {
        format!("EXTREME OVERBOUGHT: RSI({})={:.2}, high probability pullback zone. ", fast_tf, rsi)
    } else if fast.rsi.signal == RsiSignal::Oversold {
        format!("OVERSOLD: RSI({})={:.2}, potential reversal zone. ", fast_tf, rsi)
    } else if fast.rsi.signal == RsiSignal::Overbought {
        format!("OVERBOUGHT: RSI({})={:.2}, potential reversal zone. ", fast_tf, rsi)
    } else {
        String::new()
    };

    if fast.rsi.signal != RsiSignal::Neutral && fast.rsi.signal == slow.rsi.signal {
        text.push_str(&format!(
            "Multi-timeframe RSI alignment ({} RSI={:.2}). ",
            slow_tf, slow.rsi.value
        ));
    }
    match fast.rsi.divergence {
        Some(Divergence::Bullish) => text.push_str("Bullish RSI divergence forming. "),
        Some(Divergence::Bearish) => text.push_str("Bearish RSI divergence forming. "),
        None => {}
    }
    text
}

fn technical_summary(snapshot: &IndicatorSnapshot, timeframe: Timeframe) -> String {
    let trend = &snapshot.trend;
    let mut parts = vec![format!("RSI({}) {:.2}", timeframe, snapshot.rsi.value)];

    parts.push(match trend.direction {
        TrendDirection::Up => format!("uptrend (strength {}/100)", trend.strength),
        TrendDirection::Down => format!("downtrend (strength {}/100)", trend.strength),
        TrendDirection::Sideways => "sideways/consolidation".to_string(),
    });
    match trend.alignment {
        EmaAlignment::Bullish => parts.push("EMAs bullishly aligned (20 > 50 > 200)".to_string()),
        EmaAlignment::Bearish => parts.push("EMAs bearishly aligned (20 < 50 < 200)".to_string()),
        EmaAlignment::Mixed => {}
    }
    parts.push(format!(
        "MACD histogram {:.4} ({})",
        snapshot.macd.histogram,
        format!("{:?}", snapshot.macd.trend).to_lowercase()
    ));
    match snapshot.levels.position {
        PricePosition::NearSupport => parts.push("price near support".to_string()),
        PricePosition::NearResistance => parts.push("price near resistance".to_string()),
        PricePosition::MidRange => {}
    }
    if let Some(fib) = &snapshot.fibonacci {
        if fib.is_near_level(2.0) {
            parts.push(format!("near Fibonacci level {:.4}", fib.nearest_level));
        }
    }

    parts.join(", ")
}

fn volume_narrative(snapshot: &IndicatorSnapshot, side: TradeSide) -> String {
    let volume = &snapshot.volume;
    let label = match volume.confirmation {
        VolumeConfirmation::Strong => "confirms the move",
        VolumeConfirmation::Weak => "is unremarkable",
        VolumeConfirmation::Divergence => "diverges from price",
    };
    format!(
        "{} at {:.1}x average (score {:+})",
        label,
        volume.ratio,
        volume_score(volume, side)
    )
}
