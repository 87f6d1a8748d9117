//! Wall-clock timing harness and per-strategy statistics.
//!
//! [`measure`] wraps repeated invocations of one strategy, records the
//! elapsed wall-clock milliseconds of each run and derives order statistics
//! over the sample set.  Every call owns a fresh, empty sample vector, so
//! timings can never leak from one strategy's measurement into the next.

use std::time::Instant;

use crate::error::{BenchError, BenchResult};
use crate::strategy::ComputeStrategy;

/// Read-only statistics derived from one completed set of timing samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    pub runs: usize,
    pub median_ms: f64,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl RunStats {
    /// Derive the statistics from raw millisecond samples.
    ///
    /// For an even sample count the median is the midpoint of the two
    /// central samples.
    pub fn from_samples(mut samples_ms: Vec<f64>) -> BenchResult<Self> {
        if samples_ms.is_empty() {
            return Err(BenchError::InvalidConfig(
                "statistics need at least one timing sample".to_string(),
            ));
        }
        samples_ms.sort_by(|x, y| x.total_cmp(y));
        let runs = samples_ms.len();
        let median_ms = if runs % 2 == 1 {
            samples_ms[runs / 2]
        } else {
            (samples_ms[runs / 2 - 1] + samples_ms[runs / 2]) / 2.0
        };
        let mean_ms = samples_ms.iter().sum::<f64>() / runs as f64;
        Ok(Self {
            runs,
            median_ms,
            mean_ms,
            min_ms: samples_ms[0],
            max_ms: samples_ms[runs - 1],
        })
    }

    /// How many times faster than the baseline this strategy ran.
    ///
    /// Measured as baseline mean over this strategy's median, so a value
    /// above 1.0 means faster than the baseline.
    pub fn speedup_over(&self, baseline_mean_ms: f64) -> f64 {
        baseline_mean_ms / self.median_ms
    }
}

/// Run `strategy` `repetitions` times and collect per-run wall-clock stats.
///
/// Each repetition is timed individually and must fully complete before the
/// clock stops; strategies with asynchronous backends block on completion
/// inside `execute`, so the samples include device execution rather than
/// only submission latency.
pub fn measure(
    strategy: &mut dyn ComputeStrategy,
    repetitions: usize,
) -> BenchResult<RunStats> {
    if repetitions == 0 {
        return Err(BenchError::InvalidConfig(
            "repetition count must be positive".to_string(),
        ));
    }
    let mut samples_ms = Vec::with_capacity(repetitions);
    for _ in 0..repetitions {
        let start = Instant::now();
        strategy.execute()?;
        samples_ms.push(start.elapsed().as_secs_f64() * 1_000.0);
    }
    RunStats::from_samples(samples_ms)
}
