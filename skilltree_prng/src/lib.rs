// Deterministic, stateless hash-based randomness for world generation.
//
// The skill lattice is infinite, so nothing about it can be generated ahead
// of time from a sequential stream. Instead every random decision is a pure
// function of an integer: `squirrel3` scrambles a 32-bit input into a 32-bit
// output, and callers derive inputs by adding the world seed, the
// coordinate, and small offsets (`+1`, `+2`, ...) for successive draws. The
// combinators in this crate (`UniformRange`, `random_dice`, `WeightTable`)
// each consume exactly one hashed integer per draw, so a given
// `(seed, coordinate)` always produces the same node no matter what order
// the lattice is explored in.
//
// `HashStream` wraps the "+1, +2, ..." convention for callers that want a
// sequential interface without giving up reproducibility.
//
// This crate is used by `skilltree_sim` for node contents, locks, and any
// other per-coordinate roll. It has no dependency on the simulation.
//
// **Critical constraint: determinism.** All integer arithmetic here is
// wrapping 32-bit arithmetic so results match bit-for-bit across platforms.
// Floating point appears only when converting a hash to a probability in
// [0, 1), which is exact for every `u32`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 2^32, the divisor that maps a `u32` hash into [0, 1).
pub const INTMAX32: f64 = 4_294_967_296.0;

/// Squirrel3 integer noise.
///
/// Stateless: the same input always gives the same output. Inputs are
/// interpreted modulo 2^32, so negative coordinates should be passed through
/// `as u32` (two's complement) before mixing.
pub fn squirrel3(i: u32) -> u32 {
    let mut n = i.wrapping_mul(0xb529_7a4d);
    n ^= n >> 8;
    n = n.wrapping_add(0x68e3_1da4);
    n ^= n << 8;
    n = n.wrapping_mul(0x1b56_c4e9);
    n ^= n >> 8;
    n
}

/// Hash `seed` and map the result into [0, 1).
pub fn unit_float(seed: u32) -> f64 {
    squirrel3(seed) as f64 / INTMAX32
}

// ---------------------------------------------------------------------------
// HashStream
// ---------------------------------------------------------------------------

/// A sequential view over `squirrel3(seed + n)` for n = 0, 1, 2, ...
///
/// Serializable, so a partially consumed stream can be saved and resumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashStream {
    seed: u32,
    position: u32,
}

impl HashStream {
    pub fn new(seed: u32) -> Self {
        Self { seed, position: 0 }
    }

    /// Return the next hashed value and advance.
    pub fn next_u32(&mut self) -> u32 {
        let value = squirrel3(self.seed.wrapping_add(self.position));
        self.position = self.position.wrapping_add(1);
        value
    }

    /// Return the next value mapped into [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / INTMAX32
    }

    /// The raw seed for the next draw, without hashing it.
    ///
    /// Useful for handing a sub-seed to a combinator that hashes its own
    /// input (`WeightTable::pick`, `UniformRange::sample`).
    pub fn next_seed(&mut self) -> u32 {
        let seed = self.seed.wrapping_add(self.position);
        self.position = self.position.wrapping_add(1);
        seed
    }
}

// ---------------------------------------------------------------------------
// Uniform ranges and dice
// ---------------------------------------------------------------------------

/// A bucketed uniform distribution over `min, min + increment, ...`.
///
/// The bucket count is `ceil((max - min) / increment)`. When `inclusive` is
/// set and the last bucket lands exactly on `max`, `max` itself becomes an
/// extra bucket, so `{min: 20, max: 24, increment: 2, inclusive: true}`
/// yields one of 20, 22, 24.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformRange {
    pub min: i32,
    pub max: i32,
    pub increment: i32,
    pub inclusive: bool,
}

impl UniformRange {
    /// Inclusive range with the given step.
    pub const fn stepped(min: i32, max: i32, increment: i32) -> Self {
        Self {
            min,
            max,
            increment,
            inclusive: true,
        }
    }

    /// True if `max >= min` and `increment > 0`.
    pub fn is_valid(&self) -> bool {
        self.max >= self.min && self.increment > 0
    }

    /// Number of distinct values this range can produce.
    pub fn bucket_count(&self) -> i64 {
        let span = self.max as i64 - self.min as i64;
        let inc = self.increment.max(1) as i64;
        let mut buckets = (span + inc - 1).div_euclid(inc);
        if self.inclusive && self.min as i64 + inc * buckets == self.max as i64 {
            buckets += 1;
        }
        buckets.max(0)
    }

    /// Draw one value using the hash of `seed`.
    pub fn sample(&self, seed: u32) -> i32 {
        self.sample_with_float(unit_float(seed))
    }

    /// Draw one value from an already-computed probability `p` in [0, 1).
    pub fn sample_with_float(&self, p: f64) -> i32 {
        let bucket = (p * self.bucket_count() as f64).floor() as i64;
        (self.min as i64 + bucket * self.increment.max(1) as i64) as i32
    }
}

/// Error returned when a dice formula like `"2d6"` cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid dice formula {formula:?}: expected \"NdM\" with N, M >= 1")]
pub struct ParseDiceError {
    pub formula: String,
}

/// `count` dice with `pips` faces each, written `"NdM"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceFormula {
    pub count: u32,
    pub pips: u32,
}

impl FromStr for DiceFormula {
    type Err = ParseDiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseDiceError {
            formula: s.to_string(),
        };
        let (count, pips) = s.trim().split_once('d').ok_or_else(err)?;
        let count: u32 = count.parse().map_err(|_| err())?;
        let pips: u32 = pips.parse().map_err(|_| err())?;
        if count == 0 || pips == 0 {
            return Err(err());
        }
        Ok(Self { count, pips })
    }
}

impl TryFrom<String> for DiceFormula {
    type Error = ParseDiceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DiceFormula> for String {
    fn from(d: DiceFormula) -> String {
        d.to_string()
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.pips)
    }
}

/// Roll `dice` and add `plus`. Die `i` is hashed from `seed + i`.
pub fn random_dice(seed: u32, dice: DiceFormula, plus: i32) -> i32 {
    let die = UniformRange::stepped(1, dice.pips as i32, 1);
    let rolled: i32 = (0..dice.count)
        .map(|i| die.sample(seed.wrapping_add(i)))
        .sum();
    rolled + plus
}

// ---------------------------------------------------------------------------
// Weighted selection
// ---------------------------------------------------------------------------

/// Error building a `WeightTable`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeightError {
    #[error("weight table has no entries")]
    Empty,
    #[error("weight table total must be positive")]
    ZeroTotal,
}

/// An ordered list of `(key, weight)` pairs with a positive total.
///
/// Selection is positional: a probability `p` is scaled to `p * total`, and
/// the table is walked in order, returning the first key whose weight covers
/// the remaining amount. Entry order therefore matters for reproducibility
/// and is preserved through serialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<(K, u32)>",
    into = "Vec<(K, u32)>",
    bound(
        serialize = "K: Clone + Serialize",
        deserialize = "K: Deserialize<'de>"
    )
)]
pub struct WeightTable<K> {
    entries: Vec<(K, u32)>,
    total: u64,
}

impl<K> WeightTable<K> {
    pub fn new(entries: Vec<(K, u32)>) -> Result<Self, WeightError> {
        if entries.is_empty() {
            return Err(WeightError::Empty);
        }
        let total: u64 = entries.iter().map(|(_, w)| *w as u64).sum();
        if total == 0 {
            return Err(WeightError::ZeroTotal);
        }
        Ok(Self { entries, total })
    }

    /// Build a table from literal weights in code.
    ///
    /// Panics if the table is empty or every weight is zero.
    pub fn fixed(entries: Vec<(K, u32)>) -> Self {
        assert!(!entries.is_empty(), "WeightTable::fixed: no entries");
        let total: u64 = entries.iter().map(|(_, w)| *w as u64).sum();
        assert!(total > 0, "WeightTable::fixed: weights sum to zero");
        Self { entries, total }
    }

    pub fn entries(&self) -> &[(K, u32)] {
        &self.entries
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Select a key from the hash of `seed`.
    pub fn pick(&self, seed: u32) -> &K {
        self.pick_with_float(unit_float(seed))
    }

    /// Select a key for a probability `p` in [0, 1).
    pub fn pick_with_float(&self, p: f64) -> &K {
        let mut unused = p * self.total as f64;
        for (key, weight) in &self.entries {
            let weight = *weight as f64;
            if unused <= weight {
                return key;
            }
            unused -= weight;
        }
        // Only reachable through float rounding at p ~ 1.0.
        &self.entries[self.entries.len() - 1].0
    }

    /// Select a key and also return the derived seed `squirrel3(seed)` for
    /// whatever the chosen branch does next.
    pub fn switch(&self, seed: u32) -> (&K, u32) {
        let hashed = squirrel3(seed);
        (self.pick_with_float(hashed as f64 / INTMAX32), hashed)
    }
}

impl<K: PartialEq + Clone> WeightTable<K> {
    /// A copy of this table with `key` removed, or `None` if nothing with a
    /// positive weight would remain.
    pub fn without(&self, key: &K) -> Option<Self> {
        let entries: Vec<(K, u32)> = self
            .entries
            .iter()
            .filter(|(k, _)| k != key)
            .cloned()
            .collect();
        Self::new(entries).ok()
    }
}

impl<K> TryFrom<Vec<(K, u32)>> for WeightTable<K> {
    type Error = WeightError;

    fn try_from(entries: Vec<(K, u32)>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl<K> From<WeightTable<K>> for Vec<(K, u32)> {
    fn from(table: WeightTable<K>) -> Self {
        table.entries
    }
}
