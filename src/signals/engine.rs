//! Multi-asset signal scan

use crate::models::signal::Signal;
use crate::signals::generator::{SignalGenerator, SignalRequest};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::info;

pub struct SignalEngine;

impl SignalEngine {
    /// Generate signals for every request in parallel, highest confidence first.
    pub fn scan(generator: &SignalGenerator, requests: &[SignalRequest]) -> Vec<Signal> {
        Self::scan_at(generator, requests, Utc::now())
    }

    pub fn scan_at(
        generator: &SignalGenerator,
        requests: &[SignalRequest],
        now: DateTime<Utc>,
    ) -> Vec<Signal> {
        let mut signals: Vec<Signal> = requests
            .par_iter()
            .filter_map(|request| generator.generate_at(request, now))
            .collect();

        signals.sort_by(|a, b| b.confidence.cmp(&a.confidence));

        info!(
            assets = requests.len(),
            signals = signals.len(),
            "SignalEngine: scan produced {} signals from {} assets",
            signals.len(),
            requests.len()
        );

        signals
    }
}
