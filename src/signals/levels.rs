//! Entry, stop-loss and take-profit placement

use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::TradeSide;

/// Targets sit at these multiples of the entry-to-stop distance.
pub const RISK_MULTIPLES: [f64; 3] = [1.5, 2.5, 4.0];
/// Stops go this far beyond the nearest structure level.
pub const STRUCTURE_BUFFER: f64 = 0.02;
/// Minimum stop distance as a fraction of entry.
pub const MIN_STOP_DISTANCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeLevels {
    pub entry: f64,
    pub stop_loss: f64,
    /// Ordered by increasing distance from entry.
    pub targets: [f64; 3],
    pub risk: f64,
}

/// Compute levels for a trade entered at `entry`.
///
/// LONG: stop = min(nearest support x 0.98, entry x 0.95); targets at
/// 1.5R/2.5R/4R above entry, each pulled in to the nearest unused resistance
/// or upside Fibonacci extension lying between the previous target and the
/// raw multiple. SHORT mirrors this below entry.
///
/// Returns `None` for a non-positive or non-finite entry, or when a SHORT
/// target would fall to zero or below.
pub fn calculate_levels(side: TradeSide, entry: f64, snapshot: &IndicatorSnapshot) -> Option<TradeLevels> {
    if !entry.is_finite() || entry <= 0.0 {
        return None;
    }

    let levels = &snapshot.levels;
    let fib = snapshot.fibonacci.as_ref();

    let (stop_loss, mut candidates) = match side {
        TradeSide::Long => {
            let support = levels
                .support
                .iter()
                .copied()
                .filter(|&s| s < entry)
                .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))))
                .unwrap_or(entry * (1.0 - MIN_STOP_DISTANCE));
            let stop = (support * (1.0 - STRUCTURE_BUFFER)).min(entry * (1.0 - MIN_STOP_DISTANCE));

            let candidates: Vec<f64> = levels
                .resistance
                .iter()
                .copied()
                .chain(fib.into_iter().flat_map(|f| f.extensions.iter().map(|l| l.price)))
                .filter(|&p| p.is_finite() && p > entry)
                .collect();
            (stop, candidates)
        }
        TradeSide::Short => {
            let resistance = levels
                .resistance
                .iter()
                .copied()
                .filter(|&r| r > entry)
                .fold(None, |acc: Option<f64>, r| Some(acc.map_or(r, |a| a.min(r))))
                .unwrap_or(entry * (1.0 + MIN_STOP_DISTANCE));
            let stop =
                (resistance * (1.0 + STRUCTURE_BUFFER)).max(entry * (1.0 + MIN_STOP_DISTANCE));

            let candidates: Vec<f64> = levels
                .support
                .iter()
                .copied()
                .chain(
                    fib.into_iter()
                        .flat_map(|f| f.downside_extensions.iter().map(|l| l.price)),
                )
                .filter(|&p| p.is_finite() && p > 0.0 && p < entry)
                .collect();
            (stop, candidates)
        }
    };

    let risk = (entry - stop_loss).abs();
    let direction = match side {
        TradeSide::Long => 1.0,
        TradeSide::Short => -1.0,
    };
    let distance = |price: f64| (price - entry) * direction;

    candidates.sort_by(|a, b| distance(*a).total_cmp(&distance(*b)));

    let mut targets = [0.0; 3];
    let mut previous = entry;
    for (slot, multiple) in targets.iter_mut().zip(RISK_MULTIPLES) {
        let raw = entry + risk * multiple * direction;
        let clamped = candidates
            .iter()
            .copied()
            .find(|&c| distance(c) > distance(previous))
            .filter(|&c| distance(c) < distance(raw));
        *slot = clamped.unwrap_or(raw);
        previous = *slot;
    }

    if targets.iter().any(|t| !t.is_finite() || *t <= 0.0) {
        return None;
    }

    Some(TradeLevels {
        entry,
        stop_loss,
        targets,
        risk,
    })
}

/// Check the ordering invariant: stop < entry < t1 < t2 < t3 for LONG,
/// reversed for SHORT.
pub fn levels_are_ordered(side: TradeSide, entry: f64, stop_loss: f64, targets: &[f64]) -> bool {
    let mut chain = Vec::with_capacity(targets.len() + 2);
    chain.push(stop_loss);
    chain.push(entry);
    chain.extend_from_slice(targets);
    chain.windows(2).all(|w| match side {
        TradeSide::Long => w[0] < w[1],
        TradeSide::Short => w[0] > w[1],
    })
}
