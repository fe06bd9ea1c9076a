//! Differential test driver
//!
//! Feeds identical insert streams to an implementation under test and to
//! the linear-scan oracle, then fires matched point and range probes at
//! both, asserting order-insensitive set equality on every round. Per-query
//! latencies and match-set sizes are recorded along the way and condensed
//! into a min/median/max report; the sizes characterize the workload's
//! selectivity, they are never part of the correctness check.

use std::fmt;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::accessor::Accessor;
use crate::oracle::ScanOracle;
use crate::range::RangeIndex;
use crate::workload::{Pattern, RangeGen, TokenSpace};

/// Parameters for one differential run.
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// Number of entries inserted before the query phase.
    pub samples: usize,
    /// Number of probe rounds; each round issues one point and one range query.
    pub rounds: usize,
    /// Workload shape for both inserts and range probes.
    pub pattern: Pattern,
    /// Keyspace probes and ranges are drawn from.
    pub space: TokenSpace,
    /// Seed for the run's `StdRng`; same seed, same run.
    pub seed: u64,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            samples: 1_000,
            rounds: 500,
            pattern: Pattern::Random,
            space: TokenSpace::default(),
            seed: 0,
        }
    }
}

/// Min/median/max over one recorded series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStats {
    /// Smallest observation.
    pub min: u64,
    /// Middle observation.
    pub median: u64,
    /// Largest observation.
    pub max: u64,
}

impl SeriesStats {
    fn from_series(series: &mut Vec<u64>) -> Self {
        if series.is_empty() {
            return Self {
                min: 0,
                median: 0,
                max: 0,
            };
        }
        series.sort_unstable();
        Self {
            min: series[0],
            median: series[series.len() / 2],
            max: series[series.len() - 1],
        }
    }
}

impl fmt::Display for SeriesStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min: {}, median: {}, max: {}",
            self.min, self.median, self.max
        )
    }
}

/// Timing and selectivity summary of one differential run.
///
/// Latencies are nanoseconds; sizes are match-set cardinalities per probe.
#[derive(Debug, Clone)]
pub struct DiffReport {
    /// Workload shape of the run.
    pub pattern: Pattern,
    /// Name of the implementation under test.
    pub backend: &'static str,
    /// Match-set sizes of the point probes.
    pub token_sizes: SeriesStats,
    /// Point-probe latency of the implementation under test.
    pub token_latency: SeriesStats,
    /// Point-probe latency of the oracle.
    pub token_oracle_latency: SeriesStats,
    /// Match-set sizes of the range probes.
    pub range_sizes: SeriesStats,
    /// Range-probe latency of the implementation under test.
    pub range_latency: SeriesStats,
    /// Range-probe latency of the oracle.
    pub range_oracle_latency: SeriesStats,
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=======")?;
        writeln!(f, "Pattern: {:?}", self.pattern)?;
        writeln!(f, "Backend: {}", self.backend)?;
        writeln!(f, "By token:")?;
        writeln!(f, "\tSizes: {}", self.token_sizes)?;
        writeln!(f, "\tOracle: {} ns", self.token_oracle_latency)?;
        writeln!(f, "\tBackend: {} ns", self.token_latency)?;
        writeln!(f, "By range:")?;
        writeln!(f, "\tSizes: {}", self.range_sizes)?;
        writeln!(f, "\tOracle: {} ns", self.range_oracle_latency)?;
        write!(f, "\tBackend: {} ns", self.range_latency)
    }
}

fn timed<T>(series: &mut Vec<u64>, query: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = query();
    series.push(start.elapsed().as_nanos() as u64);
    result
}

/// Sort into the canonical comparison order: (start, end, value).
fn canonical<V: Ord>(entries: &mut Vec<crate::Entry<i64, V>>) {
    entries.sort_by(|a, b| {
        a.range
            .start
            .cmp(&b.range.start)
            .then_with(|| a.range.end.cmp(&b.range.end))
            .then_with(|| a.value.cmp(&b.value))
    });
}

/// Run one differential pass of `index` against a fresh oracle.
///
/// Panics on the first probe whose result set diverges from the oracle's:
/// this is test tooling, and a divergence is a bug in the backend under
/// test. Returns the timing report otherwise; the same report is also
/// emitted through [`log`] at info level.
pub fn run_differential<A, I>(config: &DiffConfig, accessor: A, backend: &'static str, mut index: I) -> DiffReport
where
    A: Accessor<i64>,
    I: RangeIndex<i64, u32>,
{
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut oracle = ScanOracle::new(accessor);
    let mut gen = RangeGen::new(config.pattern, config.space, config.samples);

    for _ in 0..config.samples {
        let range = gen.next(&mut rng);
        let value = rng.gen_range(0..10u32);
        index
            .add(range.clone(), value)
            .unwrap_or_else(|e| panic!("insert into {backend} failed: {e}"));
        oracle
            .add(range, value)
            .unwrap_or_else(|e| panic!("insert into oracle failed: {e}"));
    }
    index.done();
    oracle.done();
    // Replay the tiling so NoOverlap range probes revisit the inserted tiles.
    gen.reset();

    let mut token_sizes = Vec::with_capacity(config.rounds);
    let mut token_latency = Vec::with_capacity(config.rounds);
    let mut token_oracle_latency = Vec::with_capacity(config.rounds);
    let mut range_sizes = Vec::with_capacity(config.rounds);
    let mut range_latency = Vec::with_capacity(config.rounds);
    let mut range_oracle_latency = Vec::with_capacity(config.rounds);

    for round in 0..config.rounds {
        {
            let token = config.space.token(&mut rng);
            let mut actual = timed(&mut token_latency, || index.search_token(&token));
            let mut expected = timed(&mut token_oracle_latency, || oracle.search_token(&token));
            canonical(&mut actual);
            canonical(&mut expected);
            token_sizes.push(expected.len() as u64);
            assert_eq!(
                actual, expected,
                "round {round}: {backend} diverged from oracle on token {token} ({:?})",
                config.pattern
            );
        }
        {
            let probe = gen.next(&mut rng);
            let mut actual = timed(&mut range_latency, || index.search(&probe));
            let mut expected = timed(&mut range_oracle_latency, || oracle.search(&probe));
            canonical(&mut actual);
            canonical(&mut expected);
            range_sizes.push(expected.len() as u64);
            assert_eq!(
                actual, expected,
                "round {round}: {backend} diverged from oracle on range {probe} ({:?})",
                config.pattern
            );
        }
    }

    let report = DiffReport {
        pattern: config.pattern,
        backend,
        token_sizes: SeriesStats::from_series(&mut token_sizes),
        token_latency: SeriesStats::from_series(&mut token_latency),
        token_oracle_latency: SeriesStats::from_series(&mut token_oracle_latency),
        range_sizes: SeriesStats::from_series(&mut range_sizes),
        range_latency: SeriesStats::from_series(&mut range_latency),
        range_oracle_latency: SeriesStats::from_series(&mut range_oracle_latency),
    };
    log::info!("{report}");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::EndInclusive;
    use crate::tree::IntervalTree;

    #[test]
    fn stats_of_known_series() {
        let mut series = vec![5, 1, 9, 3, 7];
        let stats = SeriesStats::from_series(&mut series);
        assert_eq!(
            stats,
            SeriesStats {
                min: 1,
                median: 5,
                max: 9
            }
        );
    }

    #[test]
    fn stats_of_empty_series_are_zero() {
        let stats = SeriesStats::from_series(&mut Vec::new());
        assert_eq!(stats.min, 0);
        assert_eq!(stats.median, 0);
        assert_eq!(stats.max, 0);
    }

    #[test]
    fn small_differential_run_completes() {
        let config = DiffConfig {
            samples: 200,
            rounds: 100,
            pattern: Pattern::SmallRanges,
            seed: 3,
            ..DiffConfig::default()
        };
        let report = run_differential(
            &config,
            EndInclusive,
            "interval-tree",
            IntervalTree::new(EndInclusive),
        );
        assert_eq!(report.backend, "interval-tree");
        // 200 small ranges over the keyspace: some probes must land.
        assert!(report.range_sizes.max > 0);
    }
}
