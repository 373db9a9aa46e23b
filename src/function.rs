//! The registered function table: every function callable from an expression, with its
//! signature, evaluation rule, and a short description for help listings.
//!
//! The table is static configuration. Names are resolved here at evaluation time only, so the
//! parser never needs access to it.

use crate::expr::{EvalError, Item, Kind, Value};

/// A registered function: name, signature, and evaluation rule
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Function {
	/// Name the function is called by
	pub name: &'static str,

	/// Expected kind of each parameter, in order
	pub params: &'static [Kind],

	/// Kind of value the function produces
	pub returns: Kind,

	/// One-line description for help listings
	pub description: &'static str,

	/// Evaluation rule; arguments have already been arity- and kind-checked by the caller
	apply: fn(&[Value]) -> Result<Value, EvalError>,
}

impl Function {
	/// Applies the function to already-evaluated argument values.
	///
	/// # Errors
	/// Function-specific errors such as [`EvalError::EmptyList`] or [`EvalError::Overflow`].
	pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
		(self.apply)(args)
	}

	/// Builds a human-readable signature, e.g. `sum(list) -> scalar`.
	#[must_use]
	pub fn signature(&self) -> String {
		let params = self
			.params
			.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join(", ");
		format!("{}({params}) -> {}", self.name, self.returns)
	}
}

/// Every registered function, ordered by name
pub static TABLE: &[Function] = &[
	Function {
		name: "abs",
		params: &[Kind::Scalar],
		returns: Kind::Scalar,
		description: "absolute value of a scalar",
		apply: apply_abs,
	},
	Function {
		name: "length",
		params: &[Kind::List],
		returns: Kind::Scalar,
		description: "number of elements in a list",
		apply: apply_length,
	},
	Function {
		name: "max",
		params: &[Kind::List],
		returns: Kind::Scalar,
		description: "largest value in a list",
		apply: apply_max,
	},
	Function {
		name: "min",
		params: &[Kind::List],
		returns: Kind::Scalar,
		description: "smallest value in a list",
		apply: apply_min,
	},
	Function {
		name: "sort",
		params: &[Kind::List],
		returns: Kind::List,
		description: "list sorted in ascending order",
		apply: apply_sort,
	},
	Function {
		name: "sum",
		params: &[Kind::List],
		returns: Kind::Scalar,
		description: "sum of all values in a list",
		apply: apply_sum,
	},
];

/// Resolves a function by name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static Function> {
	TABLE.iter().find(|func| func.name == name)
}

/// Lists every registered function as `(name, signature and description)` pairs, in table
/// order. Intended for generating "supported functions" help text.
pub fn listing() -> impl Iterator<Item = (&'static str, String)> {
	TABLE
		.iter()
		.map(|func| (func.name, format!("{} - {}", func.signature(), func.description)))
}

/// Extracts the single list argument of a function, or builds the kind-mismatch backstop error.
/// The caller has normally kind-checked already.
fn single_list<'a>(name: &str, args: &'a [Value]) -> Result<&'a [Item], EvalError> {
	match args {
		[Value::List(items)] => Ok(items),
		_ => Err(kind_backstop(name, Kind::List, args)),
	}
}

/// Builds an [`EvalError::ArgumentKindMismatch`] for arguments that slipped past checking.
fn kind_backstop(name: &str, expected: Kind, args: &[Value]) -> EvalError {
	EvalError::ArgumentKindMismatch {
		context: name.to_owned(),
		expected,
		found: args.first().map_or(expected, Value::kind),
	}
}

fn apply_abs(args: &[Value]) -> Result<Value, EvalError> {
	match args {
		[Value::Scalar(x)] => x.checked_abs().map(Value::Scalar).ok_or(EvalError::Overflow),
		_ => Err(kind_backstop("abs", Kind::Scalar, args)),
	}
}

fn apply_length(args: &[Value]) -> Result<Value, EvalError> {
	let items = single_list("length", args)?;
	let len = i64::try_from(items.len()).map_err(|_| EvalError::Overflow)?;
	Ok(Value::Scalar(len))
}

fn apply_max(args: &[Value]) -> Result<Value, EvalError> {
	let items = single_list("max", args)?;
	items
		.iter()
		.map(|item| item.value)
		.max()
		.map(Value::Scalar)
		.ok_or_else(|| EvalError::EmptyList("max".to_owned()))
}

fn apply_min(args: &[Value]) -> Result<Value, EvalError> {
	let items = single_list("min", args)?;
	items
		.iter()
		.map(|item| item.value)
		.min()
		.map(Value::Scalar)
		.ok_or_else(|| EvalError::EmptyList("min".to_owned()))
}

fn apply_sort(args: &[Value]) -> Result<Value, EvalError> {
	let items = single_list("sort", args)?;
	let mut sorted = items.to_vec();
	sorted.sort_by_key(|item| item.value);
	Ok(Value::List(sorted))
}

fn apply_sum(args: &[Value]) -> Result<Value, EvalError> {
	let items = single_list("sum", args)?;
	let mut sum: i64 = 0;
	for item in items {
		sum = sum.checked_add(item.value).ok_or(EvalError::Overflow)?;
	}
	Ok(Value::Scalar(sum))
}
