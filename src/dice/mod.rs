//! All functionality for directly creating dice, rolling them, and working with their resulting rolls.
//!
//! This is the home of the dice "primitives". For using as part of a larger expression, see
//! [`Expr::Dice`].
//!
//! [`Expr::Dice`]: crate::expr::Expr::Dice

pub mod modifier;
pub mod roller;

use std::fmt;

pub use self::{
	modifier::{Condition, Modifier},
	roller::Roller,
};
use crate::expr::{EvalError, Expr, Item};

/// Bounds applied while rolling, shared by every modifier that can add rolls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Limits {
	/// Maximum number of times a single die may be rerolled, and the maximum number of explosion
	/// rounds for a dice set. Exceeding it aborts the evaluation with
	/// [`EvalError::RerollCapExceeded`].
	pub reroll_cap: u32,

	/// Maximum number of dice in a single rolled set, and the maximum number of repetitions of a
	/// list expression. Counts are lazy sub-expressions, so this is checked at roll time;
	/// exceeding it aborts the evaluation with [`EvalError::TooManyRolls`].
	pub roll_cap: u32,
}

/// Default cap on recursive rerolls and explosion rounds
pub const DEFAULT_REROLL_CAP: u32 = 100;

/// Default cap on dice per set and repetitions per expression
pub const DEFAULT_ROLL_CAP: u32 = 255;

impl Default for Limits {
	fn default() -> Self {
		Self {
			reroll_cap: DEFAULT_REROLL_CAP,
			roll_cap: DEFAULT_ROLL_CAP,
		}
	}
}

/// A set of rollable dice, along with a collection of modifiers to apply to any resulting rolls.
///
/// Count and side counts are sub-expressions, evaluated lazily when the set is rolled, so
/// `(2 + 3)d6` and `2d(1d4)` are valid dice sets.
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Dice {
	/// Number of dice to roll; must evaluate to a non-negative integer (0 yields an empty set)
	pub count: Box<Expr>,

	/// Die definition rolled for each die in the set
	pub die: Die,

	/// Modifiers applied in order to the rolled set
	pub modifiers: Vec<Modifier>,
}

impl Dice {
	/// Creates a new set of dice with a given count and die, without any modifiers.
	#[must_use]
	pub fn new(count: Expr, die: Die) -> Self {
		Self {
			count: Box::new(count),
			die,
			modifiers: Vec::new(),
		}
	}

	/// Rolls the dice set: evaluates the count and die definition, draws every die, then applies
	/// all modifiers in order.
	///
	/// # Errors
	/// A negative count, a count past [`Limits::roll_cap`], a non-positive side count, or any
	/// error from a modifier or sub-expression produces an error variant.
	pub fn roll(&self, roller: &mut impl Roller, limits: &Limits) -> Result<Rolled, EvalError> {
		let count = self.count.eval(roller, limits)?.value.total()?;
		if count < 0 {
			return Err(EvalError::NegativeCount(count));
		}
		if count > i64::from(limits.roll_cap) {
			return Err(EvalError::TooManyRolls {
				count,
				cap: limits.roll_cap,
			});
		}

		let die = self.die.resolve(roller, limits)?;

		let mut rolls = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
		for _ in 0..count {
			rolls.push(DieRoll::new(die.roll(roller)));
		}

		let mut rolled = Rolled {
			rolls,
			notation: self.to_string(),
		};

		for modifier in &self.modifiers {
			modifier.apply(&mut rolled, &die, roller, limits)?;
		}

		Ok(rolled)
	}
}

impl fmt::Display for Dice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}{}{}",
			self.count,
			self.die,
			self.modifiers.iter().map(ToString::to_string).collect::<String>()
		)
	}
}

/// Definition of a single die
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_enums, reason = "Highly unlikely to change")]
pub enum Die {
	/// A die with faces `1..=sides`; the side count is evaluated at roll time and must be positive
	Sides(Box<Expr>),

	/// A die whose faces are an explicit list of expressions, e.g. `d{1, 2, 3, 10}`
	Faces(Vec<Expr>),
}

impl Die {
	/// Evaluates the die definition's sub-expressions, producing a directly rollable die.
	///
	/// # Errors
	/// A side count of zero or less is [`EvalError::NegativeOrZeroDieSides`]; an empty face list
	/// is [`EvalError::EmptyList`].
	pub fn resolve(&self, roller: &mut impl Roller, limits: &Limits) -> Result<ResolvedDie, EvalError> {
		match self {
			Self::Sides(expr) => {
				let sides = expr.eval(roller, limits)?.value.total()?;
				if sides <= 0 {
					return Err(EvalError::NegativeOrZeroDieSides(sides));
				}
				Ok(ResolvedDie::Sides(sides))
			}
			Self::Faces(exprs) => {
				if exprs.is_empty() {
					return Err(EvalError::EmptyList("custom die".to_owned()));
				}
				let mut faces = Vec::with_capacity(exprs.len());
				for expr in exprs {
					faces.push(expr.eval(roller, limits)?.value.total()?);
				}
				Ok(ResolvedDie::Faces(faces))
			}
		}
	}
}

impl fmt::Display for Die {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Sides(expr) => write!(f, "d{expr}"),
			Self::Faces(faces) => {
				f.write_str("d{")?;
				for (i, face) in faces.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{face}")?;
				}
				f.write_str("}")
			}
		}
	}
}

/// A die definition with all sub-expressions evaluated, ready to draw values from
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_enums, reason = "Highly unlikely to change")]
pub enum ResolvedDie {
	/// Faces `1..=sides`, sides ≥ 1
	Sides(i64),

	/// Explicit face values, at least one
	Faces(Vec<i64>),
}

impl ResolvedDie {
	/// Draws a single value from the die.
	pub fn roll(&self, roller: &mut impl Roller) -> i64 {
		match self {
			Self::Sides(sides) => roller.roll(*sides),
			Self::Faces(faces) => faces[roller.pick(faces.len()) % faces.len()],
		}
	}

	/// Checks whether a value is the highest the die can produce (the explosion default).
	#[must_use]
	pub fn is_max(&self, val: i64) -> bool {
		match self {
			Self::Sides(sides) => val == *sides,
			Self::Faces(faces) => faces.iter().max().is_some_and(|max| val == *max),
		}
	}
}

/// Single die produced from rolling [`Dice`] and optionally applying [`Modifier`]s
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct DieRoll {
	/// Final value of the roll
	pub val: i64,

	/// Whether the roll was dropped by a modifier
	pub dropped: bool,

	/// Values this die showed before each reroll, in order
	pub history: Vec<i64>,
}

impl DieRoll {
	/// Creates a new die roll with the given value.
	#[must_use]
	pub const fn new(val: i64) -> Self {
		Self {
			val,
			dropped: false,
			history: Vec::new(),
		}
	}

	/// Replaces the roll's value, recording the discarded value in its history.
	pub fn change(&mut self, new_val: i64) {
		self.history.push(self.val);
		self.val = new_val;
	}

	/// Marks the roll as dropped.
	pub fn mark_dropped(&mut self) {
		self.dropped = true;
	}

	/// Indicates whether this roll is being kept (has *not* been dropped by a modifier).
	#[must_use]
	pub const fn is_kept(&self) -> bool {
		!self.dropped
	}

	/// Builds the label describing how this roll was produced, e.g. `rerolled 1, 1`.
	/// Empty for a plain undisturbed roll.
	#[must_use]
	pub fn label(&self) -> String {
		if self.history.is_empty() {
			String::new()
		} else {
			format!(
				"rerolled {}",
				self.history
					.iter()
					.map(ToString::to_string)
					.collect::<Vec<_>>()
					.join(", ")
			)
		}
	}
}

impl fmt::Display for DieRoll {
	/// Formats the roll as its rerolled-away values (if any), the final value, and a `(dropped)`
	/// marker when a modifier dropped it, e.g. `1 -> 4` or `16 (dropped)`.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for prior in &self.history {
			write!(f, "{prior} -> ")?;
		}
		write!(f, "{}", self.val)?;
		if self.dropped {
			f.write_str(" (dropped)")?;
		}
		Ok(())
	}
}

/// Representation of the result from rolling [`Dice`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Rolled {
	/// Each individual die roll that was made, kept and dropped alike
	pub rolls: Vec<DieRoll>,

	/// Source notation of the dice set that was rolled, e.g. `4d6kh2`
	pub notation: String,
}

impl Rolled {
	/// Calculates the checked total of all kept roll values.
	///
	/// # Errors
	/// If summing the rolls overflows, [`EvalError::Overflow`] is returned.
	pub fn total(&self) -> Result<i64, EvalError> {
		let mut sum: i64 = 0;
		for roll in self.rolls.iter().filter(|roll| roll.is_kept()) {
			sum = sum.checked_add(roll.val).ok_or(EvalError::Overflow)?;
		}
		Ok(sum)
	}

	/// Builds the list-value elements for this roll: one labelled item per kept die, in the
	/// order the dice were rolled. Dropped dice appear only in [`Self::describe`].
	#[must_use]
	pub fn items(&self) -> Vec<Item> {
		self.rolls
			.iter()
			.filter(|roll| roll.is_kept())
			.map(|roll| Item {
				value: roll.val,
				label: roll.label(),
			})
			.collect()
	}

	/// Builds the trace fragment for this roll: the dice notation followed by every individual
	/// die, e.g. `4d6kh2[6, 2 (dropped), 5, 3 (dropped)]`.
	#[must_use]
	pub fn describe(&self) -> String {
		format!(
			"{}[{}]",
			self.notation,
			self.rolls
				.iter()
				.map(ToString::to_string)
				.collect::<Vec<_>>()
				.join(", ")
		)
	}
}

impl fmt::Display for Rolled {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.describe())
	}
}
