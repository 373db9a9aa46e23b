//! Dice modifiers and their related types.

use std::fmt;

use super::{roller::Roller, Limits, ResolvedDie, Rolled};
use crate::expr::{EvalError, Expr};

/// Routines that can be applied to a [`Dice`](super::Dice) set to manipulate its rolled results.
/// Modifiers are applied in source order, each consuming the output of the previous one.
///
/// Counts and condition values are sub-expressions, evaluated once when the modifier is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Modifier {
	/// Keeps only the highest n rolls, dropping the rest (`kh`, `kh2`, ...)
	KeepHigh(Box<Expr>),

	/// Keeps only the lowest n rolls, dropping the rest (`kl`, `kl2`, ...)
	KeepLow(Box<Expr>),

	/// Drops the highest n rolls, keeping the rest (`dh`, `dh2`, ...)
	DropHigh(Box<Expr>),

	/// Drops the lowest n rolls, keeping the rest (`dl`, `dl2`, ...)
	DropLow(Box<Expr>),

	/// Redraws rolls that meet a condition, in place, recording the discarded value in the
	/// roll's history (`rr1`, `rr<=2`). The recursive form (`rr1!`) keeps redrawing a die until
	/// it no longer meets the condition, bounded by [`Limits::reroll_cap`].
	Reroll {
		/// Condition a roll must pass in order to be redrawn
		cond: Condition,

		/// Whether to keep redrawing until the condition fails
		recurse: bool,
	},

	/// Adds a newly-rolled die for each roll that meets a condition (`x`, `x>4`). Without a
	/// condition, rolls showing the die's maximum explode. The once form (`xo`) never explodes
	/// the added rolls; the recursive form is bounded by [`Limits::reroll_cap`] rounds.
	Explode {
		/// Condition a roll must pass in order to explode; `None` means the die's maximum
		cond: Option<Condition>,

		/// Whether added rolls may explode in turn
		recurse: bool,
	},
}

impl Modifier {
	/// Applies the modifier to a set of rolls, drawing from the given die where additional or
	/// replacement rolls are needed.
	///
	/// # Errors
	/// A negative count is [`EvalError::NegativeCount`]; recursion past the cap is
	/// [`EvalError::RerollCapExceeded`]; sub-expression evaluation errors propagate.
	pub fn apply(
		&self,
		rolled: &mut Rolled,
		die: &ResolvedDie,
		roller: &mut impl Roller,
		limits: &Limits,
	) -> Result<(), EvalError> {
		match self {
			Self::KeepHigh(n) => Self::apply_keep(rolled, resolve_count(n, roller, limits)?, true),
			Self::KeepLow(n) => Self::apply_keep(rolled, resolve_count(n, roller, limits)?, false),
			Self::DropHigh(n) => Self::apply_drop(rolled, resolve_count(n, roller, limits)?, true),
			Self::DropLow(n) => Self::apply_drop(rolled, resolve_count(n, roller, limits)?, false),
			Self::Reroll { cond, recurse } => {
				Self::apply_reroll(rolled, die, roller, limits, cond, *recurse)?;
			}
			Self::Explode { cond, recurse } => {
				Self::apply_explode(rolled, die, roller, limits, cond.as_ref(), *recurse)?;
			}
		}

		Ok(())
	}

	/// Applies a keep-high or keep-low: all kept rolls except the n highest (or lowest) are
	/// dropped. Sorting is stable, so ties retain their positional order.
	fn apply_keep(rolled: &mut Rolled, n: usize, high: bool) {
		let mut indices = kept_indices(rolled);
		indices.sort_by_key(|&i| rolled.rolls[i].val);
		if high {
			indices.reverse();
		}
		for &i in indices.iter().skip(n) {
			rolled.rolls[i].mark_dropped();
		}
	}

	/// Applies a drop-high or drop-low: the n highest (or lowest) kept rolls are dropped.
	fn apply_drop(rolled: &mut Rolled, n: usize, high: bool) {
		let mut indices = kept_indices(rolled);
		indices.sort_by_key(|&i| rolled.rolls[i].val);
		if high {
			indices.reverse();
		}
		for &i in indices.iter().take(n) {
			rolled.rolls[i].mark_dropped();
		}
	}

	/// Applies the [`Self::Reroll`] variant to a set of rolled dice.
	fn apply_reroll(
		rolled: &mut Rolled,
		die: &ResolvedDie,
		roller: &mut impl Roller,
		limits: &Limits,
		cond: &Condition,
		recurse: bool,
	) -> Result<(), EvalError> {
		let cond = cond.resolve(roller, limits)?;

		for roll in rolled.rolls.iter_mut().filter(|roll| roll.is_kept()) {
			if recurse {
				let mut redraws: u32 = 0;
				while cond.check(roll.val) {
					if redraws >= limits.reroll_cap {
						return Err(EvalError::RerollCapExceeded(limits.reroll_cap));
					}
					roll.change(die.roll(roller));
					redraws += 1;
				}
			} else if cond.check(roll.val) {
				roll.change(die.roll(roller));
			}
		}

		Ok(())
	}

	/// Applies the [`Self::Explode`] variant to a set of rolled dice.
	fn apply_explode(
		rolled: &mut Rolled,
		die: &ResolvedDie,
		roller: &mut impl Roller,
		limits: &Limits,
		cond: Option<&Condition>,
		recurse: bool,
	) -> Result<(), EvalError> {
		let cond = cond.map(|cond| cond.resolve(roller, limits)).transpose()?;
		let qualifies = |val: i64| match &cond {
			Some(cond) => cond.check(val),
			None => die.is_max(val),
		};

		// Determine how many initial rolls qualify for explosion
		let mut to_explode = rolled
			.rolls
			.iter()
			.filter(|roll| roll.is_kept())
			.filter(|roll| qualifies(roll.val))
			.count();

		let mut rounds: u32 = 0;
		while to_explode > 0 {
			if rounds >= limits.reroll_cap {
				return Err(EvalError::RerollCapExceeded(limits.reroll_cap));
			}

			// Roll additional dice
			let mut explosions = Vec::with_capacity(to_explode);
			for _ in 0..to_explode {
				explosions.push(super::DieRoll::new(die.roll(roller)));
			}

			// Determine how many additional rolls qualify for explosion
			to_explode = if recurse {
				explosions.iter().filter(|roll| qualifies(roll.val)).count()
			} else {
				0
			};

			rolled.rolls.append(&mut explosions);
			rounds += 1;
		}

		Ok(())
	}
}

/// Collects the indices of all rolls that are still kept, in positional order.
fn kept_indices(rolled: &Rolled) -> Vec<usize> {
	rolled
		.rolls
		.iter()
		.enumerate()
		.filter(|(_, roll)| roll.is_kept())
		.map(|(i, _)| i)
		.collect()
}

/// Evaluates a keep/drop count expression to a non-negative usize.
fn resolve_count(expr: &Expr, roller: &mut impl Roller, limits: &Limits) -> Result<usize, EvalError> {
	let count = expr.eval(roller, limits)?.value.total()?;
	usize::try_from(count).map_err(|_| EvalError::NegativeCount(count))
}

impl fmt::Display for Modifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::KeepHigh(n) => write_counted(f, "kh", n),
			Self::KeepLow(n) => write_counted(f, "kl", n),
			Self::DropHigh(n) => write_counted(f, "dh", n),
			Self::DropLow(n) => write_counted(f, "dl", n),
			Self::Reroll { cond, recurse } => {
				write!(f, "rr{cond}{}", if *recurse { "!" } else { "" })
			}
			Self::Explode { cond, recurse } => {
				write!(f, "x{}", if *recurse { "" } else { "o" })?;
				match cond {
					Some(cond) => write!(f, "{cond}"),
					None => Ok(()),
				}
			}
		}
	}
}

/// Writes a keep/drop modifier, omitting the count when it is the default of 1.
fn write_counted(f: &mut fmt::Formatter<'_>, symbol: &str, n: &Expr) -> fmt::Result {
	if *n == Expr::Num(1) {
		f.write_str(symbol)
	} else {
		write!(f, "{symbol}{n}")
	}
}

/// Test that die values can be checked against. The comparison value is a sub-expression,
/// resolved once per modifier application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Condition {
	/// Comparison to perform
	pub op: CondOp,

	/// Value to compare against
	pub val: Box<Expr>,
}

impl Condition {
	/// Creates a new condition.
	#[must_use]
	pub fn new(op: CondOp, val: Expr) -> Self {
		Self {
			op,
			val: Box::new(val),
		}
	}

	/// Evaluates the comparison value, producing a directly checkable condition.
	///
	/// # Errors
	/// Any [`EvalError`] from evaluating the value expression is propagated.
	pub fn resolve(&self, roller: &mut impl Roller, limits: &Limits) -> Result<ResolvedCondition, EvalError> {
		Ok(ResolvedCondition {
			op: self.op,
			val: self.val.eval(roller, limits)?.value.total()?,
		})
	}
}

impl fmt::Display for Condition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.op.symbol(), self.val)
	}
}

/// A condition with its comparison value evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct ResolvedCondition {
	/// Comparison to perform
	pub op: CondOp,

	/// Value to compare against
	pub val: i64,
}

impl ResolvedCondition {
	/// Checks a value against the condition.
	#[must_use]
	pub const fn check(&self, val: i64) -> bool {
		match self.op {
			CondOp::Eq => val == self.val,
			CondOp::Gt => val > self.val,
			CondOp::Gte => val >= self.val,
			CondOp::Lt => val < self.val,
			CondOp::Lte => val <= self.val,
		}
	}
}

/// Comparison operator of a [`Condition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "Highly unlikely to change")]
pub enum CondOp {
	/// Equal to. Symbol: `=` (also the default when only a value is written)
	Eq,

	/// Greater than. Symbol: `>`
	Gt,

	/// Greater than or equal to. Symbol: `>=`
	Gte,

	/// Less than. Symbol: `<`
	Lt,

	/// Less than or equal to. Symbol: `<=`
	Lte,
}

impl CondOp {
	/// Gets the symbol that represents the comparison.
	#[must_use]
	pub const fn symbol(&self) -> &'static str {
		match self {
			Self::Eq => "=",
			Self::Gt => ">",
			Self::Gte => ">=",
			Self::Lt => "<",
			Self::Lte => "<=",
		}
	}
}
