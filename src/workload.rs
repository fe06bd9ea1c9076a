//! Synthetic workload generation
//!
//! Produces range streams under three selectivity patterns so correctness
//! and performance get exercised across regimes: wide random ranges that
//! each match a large slice of the index, disjoint tiles that match O(1)
//! entries, and narrow random ranges in between. All randomness flows
//! through an explicit caller-supplied [`Rng`], so a seeded `StdRng` makes
//! every run exactly reproducible.

use rand::Rng;

use crate::range::KeyRange;

/// Default lower bound of the token keyspace.
pub const MIN_TOKEN: i64 = 0;
/// Default upper bound of the token keyspace.
pub const MAX_TOKEN: i64 = 1 << 16;

/// A selectivity pattern: how much overlap generated ranges exhibit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Two distinct random tokens, ordered. High overlap; probes tend to
    /// match a large fraction of the stored entries.
    Random,
    /// Deterministic tiling of the keyspace into equal-width disjoint
    /// tiles, emitted in sequence. Low overlap; probes match O(1) entries.
    NoOverlap,
    /// Random start with a width biased toward ~1% of the keyspace.
    /// Moderate overlap.
    SmallRanges,
}

impl Pattern {
    /// All patterns, for test matrices.
    pub const ALL: [Pattern; 3] = [Pattern::Random, Pattern::NoOverlap, Pattern::SmallRanges];
}

/// The closed token keyspace `[min, max]` ranges are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpace {
    /// Smallest token.
    pub min: i64,
    /// Largest token.
    pub max: i64,
}

impl TokenSpace {
    /// Width of the keyspace.
    pub fn width(&self) -> i64 {
        self.max - self.min
    }

    /// Draw one token uniformly from the keyspace.
    pub fn token(&self, rng: &mut impl Rng) -> i64 {
        rng.gen_range(self.min..=self.max)
    }
}

impl Default for TokenSpace {
    fn default() -> Self {
        Self {
            min: MIN_TOKEN,
            max: MAX_TOKEN,
        }
    }
}

/// Resettable range generator for one pattern over one keyspace.
///
/// `NoOverlap` is stateful (it walks the tiling); [`reset`](RangeGen::reset)
/// rewinds it so the identical tile sequence can be replayed for the probe
/// phase of a differential run. The other patterns are stateless and derive
/// everything from the supplied `Rng`.
#[derive(Debug, Clone)]
pub struct RangeGen {
    pattern: Pattern,
    space: TokenSpace,
    /// Tile width for `NoOverlap`; max width for `SmallRanges`.
    delta: i64,
    /// Next tile index for `NoOverlap`.
    idx: i64,
}

impl RangeGen {
    /// Create a generator for `pattern`, sized so `NoOverlap` tiles the
    /// keyspace into `samples` pieces.
    pub fn new(pattern: Pattern, space: TokenSpace, samples: usize) -> Self {
        let delta = match pattern {
            Pattern::NoOverlap => (space.width() / samples.max(1) as i64).max(1),
            // Bias small ranges toward ~1% of the keyspace width.
            Pattern::SmallRanges => (space.width() / 100).max(10),
            Pattern::Random => 0,
        };
        Self {
            pattern,
            space,
            delta,
            idx: 0,
        }
    }

    /// Produce the next range.
    pub fn next(&mut self, rng: &mut impl Rng) -> KeyRange<i64> {
        match self.pattern {
            Pattern::Random => {
                let a = self.space.token(rng);
                let mut b = self.space.token(rng);
                while a == b {
                    b = self.space.token(rng);
                }
                KeyRange::new(a.min(b), a.max(b))
            }
            Pattern::SmallRanges => {
                let width = rng.gen_range(10..=self.delta);
                let start = self.space.token(rng);
                if start + width > self.space.max {
                    // Slide left so the range stays inside the keyspace.
                    KeyRange::new(self.space.max - width, self.space.max)
                } else {
                    KeyRange::new(start, start + width)
                }
            }
            Pattern::NoOverlap => {
                let a = self.space.min + self.delta * self.idx;
                self.idx += 1;
                KeyRange::new(a, a + self.delta)
            }
        }
    }

    /// Rewind a `NoOverlap` generator to the first tile. No-op for the
    /// stateless patterns.
    pub fn reset(&mut self) {
        self.idx = 0;
    }
}
