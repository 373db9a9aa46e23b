//! Abstractions for drawing random die values using various means.
//!
//! Randomness is always injected into evaluation through the [`Roller`] trait, never pulled from
//! a hidden process-wide generator, so tests can supply deterministic sources.

use std::iter::Peekable;

#[cfg(feature = "fastrand")]
use fastrand::Rng;

/// Source of random draws for dice evaluation
pub trait Roller {
	/// Draws a single uniformly-random value in `1..=sides`. Callers guarantee `sides >= 1`.
	#[must_use]
	fn roll(&mut self, sides: i64) -> i64;

	/// Picks a uniformly-random index in `0..len`, used to select a face of a custom die.
	/// Callers guarantee `len >= 1`.
	#[must_use]
	fn pick(&mut self, len: usize) -> usize;
}

/// Generates rolls with random values using [fastrand]. Requires the `fastrand` feature
/// (enabled by default).
///
/// # Examples
/// ```
/// use kismet::dice::roller::{FastRand, Roller};
///
/// let mut roller = FastRand::with_seed(0x750c38d574400);
/// let val = roller.roll(6);
/// assert!((1..=6).contains(&val));
/// ```
#[cfg(feature = "fastrand")]
#[derive(Debug, Clone, Default)]
pub struct FastRand(Rng);

#[cfg(feature = "fastrand")]
impl FastRand {
	/// Creates a new fastrand roller that uses the given RNG instance to generate rolls.
	#[must_use]
	pub const fn new(rng: Rng) -> Self {
		Self(rng)
	}

	/// Creates a new fastrand roller that uses a pre-seeded RNG instance to generate rolls.
	#[must_use]
	pub fn with_seed(seed: u64) -> Self {
		Self(Rng::with_seed(seed))
	}
}

#[cfg(feature = "fastrand")]
impl Roller for FastRand {
	fn roll(&mut self, sides: i64) -> i64 {
		if sides > 0 {
			self.0.i64(1..=sides)
		} else {
			0
		}
	}

	fn pick(&mut self, len: usize) -> usize {
		if len > 0 {
			self.0.usize(0..len)
		} else {
			0
		}
	}
}

/// Generates rolls that always have their max value. Useful for bounding results.
///
/// # Examples
/// ```
/// use kismet::dice::roller::{Max, Roller};
///
/// let mut roller = Max;
/// assert_eq!(roller.roll(20), 20);
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Max;

impl Roller for Max {
	/// Rolls a single die, always with the max value (same as the number of sides).
	fn roll(&mut self, sides: i64) -> i64 {
		sides
	}

	/// Picks the last face.
	fn pick(&mut self, len: usize) -> usize {
		len.saturating_sub(1)
	}
}

/// Generates rolls from an iterator of values. Mainly useful for testing purposes.
///
/// # Examples
/// ```
/// use kismet::dice::roller::{Iter, Roller};
///
/// let mut roller = Iter::new(vec![3, 6, 1]);
/// assert_eq!(roller.roll(6), 3);
/// assert_eq!(roller.roll(6), 6);
/// ```
#[derive(Debug, Clone)]
pub struct Iter<I: Iterator<Item = i64>>(Peekable<I>);

impl<I: Iterator<Item = i64>> Iter<I> {
	/// Creates a new roller that uses the given iterator to provide roll values.
	#[must_use]
	pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
		Self(iter.into_iter().peekable())
	}

	/// Checks whether the iterator still has values available.
	pub fn can_roll(&mut self) -> bool {
		self.0.peek().is_some()
	}
}

impl<I: Iterator<Item = i64>> Roller for Iter<I> {
	/// Rolls a die with the value from the next iteration.
	///
	/// # Panics
	/// If the iterator has finished, this will panic.
	#[expect(
		clippy::expect_used,
		reason = "Mostly for testing, otherwise manual checking of can_roll() is expected"
	)]
	fn roll(&mut self, _sides: i64) -> i64 {
		self.0.next().expect("roll iterator is finished")
	}

	/// Picks the index given by the next iteration value, modulo `len`.
	///
	/// # Panics
	/// If the iterator has finished, this will panic.
	#[expect(
		clippy::expect_used,
		reason = "Mostly for testing, otherwise manual checking of can_roll() is expected"
	)]
	fn pick(&mut self, len: usize) -> usize {
		let val = self.0.next().expect("roll iterator is finished");
		usize::try_from(val.rem_euclid(i64::try_from(len.max(1)).unwrap_or(1))).unwrap_or(0)
	}
}
