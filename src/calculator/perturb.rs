//! Result perturbation: turns a correct answer into a believable wrong one.
//!
//! The size of the nudge depends on the magnitude of the answer so that the
//! wrong value stays plausible:
//!
//! | correct value      | wrong value                          |
//! |--------------------|--------------------------------------|
//! | `0`                | `+1` or `-1`                         |
//! | `\|x\| < 10`       | `x ± 1..=3`                          |
//! | `10 ≤ \|x\| < 100` | `x ± 2..=5`                          |
//! | `\|x\| ≥ 100`      | `x × (1 ± p)`, `p` uniform in 5–15 % |
//!
//! Integer answers stay integers; fractional answers keep at most two of their
//! own decimal places.

use std::ops::RangeInclusive;

use rand::Rng;
use rand::rngs::SmallRng;

/// The random draws the perturbation engine needs.
///
/// Injected into the calculator so tests can script exact draws.
pub trait RandomSource {
    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Fair coin; `true` means "positive".
    fn coin(&mut self) -> bool;

    /// Uniform integer in `range`.
    fn int_in(&mut self, range: RangeInclusive<u32>) -> u32;
}

impl RandomSource for SmallRng {
    fn unit(&mut self) -> f64 {
        self.gen_range(0.0..1.0)
    }

    fn coin(&mut self) -> bool {
        self.gen_bool(0.5)
    }

    fn int_in(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.gen_range(range)
    }
}

/// Replays a fixed list of draws in `[0, 1)`, wrapping around at the end.
///
/// A draw `v` becomes `v < 0.5` for a coin and `lo + floor(v * len)` for an
/// integer range.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    pos: usize,
}

impl SequenceRandom {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self { values: values.into(), pos: 0 }
    }
}

impl RandomSource for SequenceRandom {
    fn unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }

    fn coin(&mut self) -> bool {
        self.unit() < 0.5
    }

    fn int_in(&mut self, range: RangeInclusive<u32>) -> u32 {
        let (lo, hi) = range.into_inner();
        let span = f64::from(hi - lo + 1);
        (lo + (self.unit() * span).floor() as u32).min(hi)
    }
}

const SMALL_LIMIT: f64 = 10.0;
const MEDIUM_LIMIT: f64 = 100.0;
const MAX_KEPT_DECIMALS: usize = 2;

/// Return `value` unchanged in correct mode, or a nearby wrong value in wrong mode.
///
/// `decimal_places` is the number of fractional digits in the display form of
/// `value`; it bounds the precision of a fractional result.
pub fn perturb<R: RandomSource + ?Sized>(
    value: f64,
    wrong_mode: bool,
    decimal_places: usize,
    rng: &mut R,
) -> f64 {
    if !wrong_mode {
        return value;
    }

    let magnitude = value.abs();
    let shifted = if value == 0.0 {
        if rng.coin() { 1.0 } else { -1.0 }
    } else if magnitude < SMALL_LIMIT {
        let offset = f64::from(rng.int_in(1..=3));
        value + signed(offset, rng)
    } else if magnitude < MEDIUM_LIMIT {
        let offset = f64::from(rng.int_in(2..=5));
        value + signed(offset, rng)
    } else {
        let pct = rng.unit() * 0.1 + 0.05;
        value * (1.0 + signed(pct, rng))
    };

    if is_integer(value) {
        round_half_up(shifted)
    } else {
        round_to(shifted, decimal_places.min(MAX_KEPT_DECIMALS))
    }
}

fn signed<R: RandomSource + ?Sized>(amount: f64, rng: &mut R) -> f64 {
    if rng.coin() { amount } else { -amount }
}

fn is_integer(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}

/// Nearest integer, exact halves going toward positive infinity (`-2.5` -> `-2`).
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// Round to a fixed number of decimal places, exact halves going away from zero
/// (`2.125` -> `2.13`, `-2.125` -> `-2.13`).
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    let magnitude = value.abs();
    // The formatter rounds exact ties to even; step just past the tie instead.
    let magnitude = if is_exact_tie(magnitude, places) {
        f64::from_bits(magnitude.to_bits() + 1)
    } else {
        magnitude
    };
    let rounded: f64 = format!("{magnitude:.places$}").parse().unwrap_or(magnitude);
    rounded.copysign(value)
}

/// Whether `magnitude` sits exactly halfway between two `places`-digit
/// decimals, i.e. `magnitude * 10^(places + 1)` is an integer ending in 5.
/// For a binary float that holds exactly when `magnitude * 2^(places + 1)`
/// is an odd integer.
fn is_exact_tie(magnitude: f64, places: usize) -> bool {
    let Ok(exp) = i32::try_from(places + 1) else { return false };
    let scaled = magnitude * 2f64.powi(exp);
    scaled.is_finite() && scaled.fract() == 0.0 && scaled % 2.0 == 1.0
}
