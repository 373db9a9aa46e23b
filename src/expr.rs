//! AST data structures for dice expressions, the value model, and the evaluator that walks the
//! tree while accumulating a human-readable trace alongside the numeric result.

use std::fmt;

use crate::dice::{roller::Roller, Dice, Limits};
use crate::function;

/// Individual elements of a scalar dice expression
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Expr {
	/// Standalone integer
	Num(i64),

	/// Dice set literal; used in a scalar position, its kept rolls are summed
	Dice(Dice),

	/// Call of a registered function
	Call(Call),

	/// Explicitly parenthesised expression
	Paren(Box<Self>),

	/// Negation of an expression (makes the result of it negative)
	Neg(Box<Self>),

	/// Sum of two expressions
	Add(Box<Self>, Box<Self>),

	/// Difference of two expressions
	Sub(Box<Self>, Box<Self>),

	/// Product of two expressions
	Mul(Box<Self>, Box<Self>),

	/// Integer quotient of two expressions (truncated toward zero)
	Div(Box<Self>, Box<Self>),

	/// Exponentiation of two expressions (non-negative integer exponent)
	Pow(Box<Self>, Box<Self>),
}

/// Call of a named function from the registered function table.
/// The name is resolved at evaluation time, not parse time, so unknown functions parse fine and
/// produce a uniform [`EvalError::UnknownFunction`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Call {
	/// Function name as written in the source
	pub name: String,

	/// Arguments in source order
	pub args: Vec<Arg>,
}

/// A single function argument, parsed as either a scalar or a list expression
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_enums, reason = "Highly unlikely to change")]
pub enum Arg {
	/// Scalar-valued argument
	Scalar(Expr),

	/// List-valued argument
	List(ListExpr),
}

/// Expressions that produce an ordered sequence of values rather than a single integer
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ListExpr {
	/// Dice set; yields one element per kept roll
	Dice(Dice),

	/// Call of a registered function
	Call(Call),

	/// Repetition of an underlying list expression, concatenating the results
	Repeat {
		/// Number of independent evaluations to perform
		count: Box<Expr>,

		/// List expression to repeat
		inner: Box<ListExpr>,
	},
}

/// A parsed top-level expression, discriminated by the kind of value it produces
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_enums, reason = "Highly unlikely to change")]
pub enum Ast {
	/// Expression producing a single integer
	Scalar(Expr),

	/// Expression producing an ordered sequence of values
	List(ListExpr),
}

/// Kind of value an expression produces; used for function signatures and kind checking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::exhaustive_enums, reason = "Highly unlikely to change")]
pub enum Kind {
	/// A single integer
	Scalar,

	/// An ordered sequence of values
	List,
}

impl fmt::Display for Kind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Scalar => "scalar",
			Self::List => "list",
		})
	}
}

/// A single element of a list value, together with a label recording how it was produced
/// (e.g. reroll history). The label is empty for a plain roll.
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Item {
	/// Final value of the element
	pub value: i64,

	/// How the element came to be, beyond its value; empty when nothing noteworthy happened
	pub label: String,
}

/// Result value of evaluating an expression
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_enums, reason = "Highly unlikely to change")]
pub enum Value {
	/// A single integer
	Scalar(i64),

	/// An ordered sequence of labelled values
	List(Vec<Item>),
}

impl Value {
	/// Gets the kind of this value.
	#[must_use]
	pub const fn kind(&self) -> Kind {
		match self {
			Self::Scalar(..) => Kind::Scalar,
			Self::List(..) => Kind::List,
		}
	}

	/// Reduces the value to a single integer. A scalar is itself; a list is the checked sum of
	/// its values.
	///
	/// # Errors
	/// If summing a list overflows, [`EvalError::Overflow`] is returned.
	pub fn total(&self) -> Result<i64, EvalError> {
		match self {
			Self::Scalar(x) => Ok(*x),
			Self::List(items) => {
				let mut sum: i64 = 0;
				for item in items {
					sum = sum.checked_add(item.value).ok_or(EvalError::Overflow)?;
				}
				Ok(sum)
			}
		}
	}
}

/// Paired output of evaluating a node: the value and the trace fragment describing how it came
/// to be. The two are built in lockstep so they can never desynchronize.
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Evaled {
	/// Value the expression produced
	pub value: Value,

	/// Human-readable description of what happened, e.g. which faces were rolled
	pub trace: String,
}

impl Ast {
	/// Evaluates the expression with default [`Limits`].
	///
	/// A scalar expression always yields [`Value::Scalar`] (a bare dice set is summed); a list
	/// expression always yields [`Value::List`].
	///
	/// # Errors
	/// Any [`EvalError`] raised while walking the tree is propagated.
	pub fn eval(&self, roller: &mut impl Roller) -> Result<Evaled, EvalError> {
		self.eval_with(roller, &Limits::default())
	}

	/// Evaluates the expression with explicit [`Limits`].
	///
	/// # Errors
	/// Any [`EvalError`] raised while walking the tree is propagated.
	pub fn eval_with(&self, roller: &mut impl Roller, limits: &Limits) -> Result<Evaled, EvalError> {
		match self {
			Self::Scalar(expr) => {
				let evaled = expr.eval(roller, limits)?;
				let total = evaled.value.total()?;
				Ok(Evaled {
					value: Value::Scalar(total),
					trace: evaled.trace,
				})
			}
			Self::List(list) => list.eval(roller, limits),
		}
	}
}

impl Expr {
	/// Evaluates the expression. Dice sets yield list values; arithmetic coerces list operands
	/// to their kept sum, so `3d6 + 5d4` is the sum of all eight dice.
	///
	/// # Errors
	/// Division by zero, overflow, a negative exponent, or any dice rolling error produces an
	/// error variant.
	pub fn eval(&self, roller: &mut impl Roller, limits: &Limits) -> Result<Evaled, EvalError> {
		match self {
			Self::Num(x) => Ok(Evaled {
				value: Value::Scalar(*x),
				trace: x.to_string(),
			}),

			Self::Dice(dice) => {
				let rolled = dice.roll(roller, limits)?;
				Ok(Evaled {
					trace: rolled.describe(),
					value: Value::List(rolled.items()),
				})
			}

			Self::Call(call) => call.eval(roller, limits),

			Self::Paren(inner) => {
				let evaled = inner.eval(roller, limits)?;
				Ok(Evaled {
					value: evaled.value,
					trace: format!("({})", evaled.trace),
				})
			}

			Self::Neg(x) => {
				let evaled = x.eval(roller, limits)?;
				let val = evaled.value.total()?.checked_neg().ok_or(EvalError::Overflow)?;
				Ok(Evaled {
					value: Value::Scalar(val),
					trace: format!("-{}", evaled.trace),
				})
			}

			Self::Add(a, b) => Self::eval_binary('+', a, b, i64::checked_add, roller, limits),
			Self::Sub(a, b) => Self::eval_binary('-', a, b, i64::checked_sub, roller, limits),
			Self::Mul(a, b) => Self::eval_binary('*', a, b, i64::checked_mul, roller, limits),

			Self::Div(a, b) => {
				let (lhs, rhs, trace) = Self::eval_operands('/', a, b, roller, limits)?;
				if rhs == 0 {
					return Err(EvalError::DivideByZero);
				}
				let val = lhs.checked_div(rhs).ok_or(EvalError::Overflow)?;
				Ok(Evaled {
					value: Value::Scalar(val),
					trace,
				})
			}

			Self::Pow(a, b) => {
				let (lhs, rhs, trace) = Self::eval_operands('^', a, b, roller, limits)?;
				if rhs < 0 {
					return Err(EvalError::NegativeExponent(rhs));
				}
				let exp = u32::try_from(rhs).map_err(|_| EvalError::Overflow)?;
				let val = lhs.checked_pow(exp).ok_or(EvalError::Overflow)?;
				Ok(Evaled {
					value: Value::Scalar(val),
					trace,
				})
			}
		}
	}

	/// Evaluates both operands of a binary expression to scalars, joining their traces.
	fn eval_operands(
		op: char,
		a: &Self,
		b: &Self,
		roller: &mut impl Roller,
		limits: &Limits,
	) -> Result<(i64, i64, String), EvalError> {
		let ea = a.eval(roller, limits)?;
		let eb = b.eval(roller, limits)?;
		let lhs = ea.value.total()?;
		let rhs = eb.value.total()?;
		Ok((lhs, rhs, format!("{} {op} {}", ea.trace, eb.trace)))
	}

	/// Evaluates a binary expression whose operation is a plain checked integer op.
	fn eval_binary(
		op: char,
		a: &Self,
		b: &Self,
		f: fn(i64, i64) -> Option<i64>,
		roller: &mut impl Roller,
		limits: &Limits,
	) -> Result<Evaled, EvalError> {
		let (lhs, rhs, trace) = Self::eval_operands(op, a, b, roller, limits)?;
		let val = f(lhs, rhs).ok_or(EvalError::Overflow)?;
		Ok(Evaled {
			value: Value::Scalar(val),
			trace,
		})
	}
}

impl ListExpr {
	/// Evaluates the list expression.
	///
	/// # Errors
	/// Any [`EvalError`] raised while walking the tree is propagated. A [`Self::Repeat`] whose
	/// inner expression yields a scalar is an [`EvalError::ArgumentKindMismatch`].
	pub fn eval(&self, roller: &mut impl Roller, limits: &Limits) -> Result<Evaled, EvalError> {
		match self {
			Self::Dice(dice) => {
				let rolled = dice.roll(roller, limits)?;
				Ok(Evaled {
					trace: rolled.describe(),
					value: Value::List(rolled.items()),
				})
			}

			Self::Call(call) => call.eval(roller, limits),

			Self::Repeat { count, inner } => {
				let n = count.eval(roller, limits)?.value.total()?;
				if n < 0 {
					return Err(EvalError::NegativeCount(n));
				}
				if n > i64::from(limits.roll_cap) {
					return Err(EvalError::TooManyRolls {
						count: n,
						cap: limits.roll_cap,
					});
				}

				let mut items = Vec::new();
				let mut traces = Vec::with_capacity(usize::try_from(n).unwrap_or(0));
				for _ in 0..n {
					let evaled = inner.eval(roller, limits)?;
					match evaled.value {
						Value::List(mut batch) => items.append(&mut batch),
						Value::Scalar(..) => {
							return Err(EvalError::ArgumentKindMismatch {
								context: "repetition".to_owned(),
								expected: Kind::List,
								found: Kind::Scalar,
							})
						}
					}
					traces.push(evaled.trace);
				}

				Ok(Evaled {
					value: Value::List(items),
					trace: format!("{n}x[{}]", traces.join(", ")),
				})
			}
		}
	}
}

impl Call {
	/// Resolves the function in the registered table, evaluates and kind-checks every argument,
	/// then applies the function.
	///
	/// # Errors
	/// [`EvalError::UnknownFunction`], [`EvalError::ArityMismatch`], or
	/// [`EvalError::ArgumentKindMismatch`] for a bad call; argument evaluation errors propagate.
	pub fn eval(&self, roller: &mut impl Roller, limits: &Limits) -> Result<Evaled, EvalError> {
		let func = function::lookup(&self.name).ok_or_else(|| EvalError::UnknownFunction(self.name.clone()))?;

		if self.args.len() != func.params.len() {
			return Err(EvalError::ArityMismatch {
				function: self.name.clone(),
				expected: func.params.len(),
				found: self.args.len(),
			});
		}

		let mut values = Vec::with_capacity(self.args.len());
		let mut traces = Vec::with_capacity(self.args.len());
		for (arg, param) in self.args.iter().zip(func.params) {
			let evaled = arg.eval(roller, limits)?;
			if evaled.value.kind() != *param {
				return Err(EvalError::ArgumentKindMismatch {
					context: self.name.clone(),
					expected: *param,
					found: evaled.value.kind(),
				});
			}
			values.push(evaled.value);
			traces.push(evaled.trace);
		}

		let value = func.call(&values)?;
		Ok(Evaled {
			value,
			trace: format!("{}({})", self.name, traces.join(", ")),
		})
	}
}

impl Arg {
	/// Evaluates the argument, whichever kind it is.
	///
	/// # Errors
	/// Any [`EvalError`] raised while evaluating the underlying expression is propagated.
	pub fn eval(&self, roller: &mut impl Roller, limits: &Limits) -> Result<Evaled, EvalError> {
		match self {
			Self::Scalar(expr) => expr.eval(roller, limits),
			Self::List(list) => list.eval(roller, limits),
		}
	}
}

impl fmt::Display for Expr {
	/// Formats the expression as parseable source notation. Explicit [`Expr::Paren`] nodes are
	/// the only source of parentheses, so the output mirrors the original input's grouping.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Num(x) => write!(f, "{x}"),
			Self::Dice(dice) => write!(f, "{dice}"),
			Self::Call(call) => write!(f, "{call}"),
			Self::Paren(inner) => write!(f, "({inner})"),
			Self::Neg(x) => write!(f, "-{x}"),
			Self::Add(a, b) => write!(f, "{a} + {b}"),
			Self::Sub(a, b) => write!(f, "{a} - {b}"),
			Self::Mul(a, b) => write!(f, "{a} * {b}"),
			Self::Div(a, b) => write!(f, "{a} / {b}"),
			Self::Pow(a, b) => write!(f, "{a} ^ {b}"),
		}
	}
}

impl fmt::Display for ListExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Dice(dice) => write!(f, "{dice}"),
			Self::Call(call) => write!(f, "{call}"),
			Self::Repeat { count, inner } => write!(f, "{count}x{inner}"),
		}
	}
}

impl fmt::Display for Ast {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Scalar(expr) => write!(f, "{expr}"),
			Self::List(list) => write!(f, "{list}"),
		}
	}
}

impl fmt::Display for Call {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}(", self.name)?;
		for (i, arg) in self.args.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{arg}")?;
		}
		f.write_str(")")
	}
}

impl fmt::Display for Arg {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Scalar(expr) => write!(f, "{expr}"),
			Self::List(list) => write!(f, "{list}"),
		}
	}
}

/// Error that can occur while evaluating a structurally valid expression
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
	/// The right-hand side of a division evaluated to zero
	#[error("division by zero")]
	DivideByZero,

	/// A die's side count evaluated to zero or less
	#[error("dice must have at least one side, got {0}")]
	NegativeOrZeroDieSides(i64),

	/// A dice, repetition, or keep/drop count evaluated to a negative number
	#[error("count must not be negative, got {0}")]
	NegativeCount(i64),

	/// A dice or repetition count exceeded the configured roll cap
	#[error("count of {count} exceeds the roll cap of {cap}")]
	TooManyRolls {
		/// Count the expression evaluated to
		count: i64,
		/// Configured cap
		cap: u32,
	},

	/// The called function is not in the registered function table
	#[error("unknown function: {0}")]
	UnknownFunction(String),

	/// The called function was given the wrong number of arguments
	#[error("{function} takes {expected} argument(s), got {found}")]
	ArityMismatch {
		/// Name of the function
		function: String,
		/// Number of parameters the function declares
		expected: usize,
		/// Number of arguments supplied
		found: usize,
	},

	/// A value of the wrong kind (scalar vs list) was supplied
	#[error("{context} expected a {expected} value, got a {found} value")]
	ArgumentKindMismatch {
		/// Function name or construct that performed the check
		context: String,
		/// Kind that was required
		expected: Kind,
		/// Kind that was supplied
		found: Kind,
	},

	/// A recursive reroll or explosion did not settle within the configured cap
	#[error("reroll cap of {0} exceeded")]
	RerollCapExceeded(u32),

	/// The right-hand side of an exponentiation evaluated to a negative number
	#[error("exponent must not be negative, got {0}")]
	NegativeExponent(i64),

	/// A function that needs at least one element was applied to an empty list
	#[error("{0} of an empty list")]
	EmptyList(String),

	/// Integer overflow during arithmetic or totalling
	#[error("integer overflow")]
	Overflow,
}
