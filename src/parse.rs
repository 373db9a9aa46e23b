#![cfg(feature = "parse")]

//! Parser generators for dice expressions, built with [chumsky].
//!
//! The grammar is split between scalar expressions ([`Expr`]) and list expressions
//! ([`ListExpr`]); the two are mutually recursive, since dice counts and condition values are
//! scalar sub-expressions while function arguments may be either. At the top level the list form
//! is tried first but only accepted for a repetition or a dice set carrying at least one
//! modifier, so `1d20` and `3d6 + 5d4` read as scalars while `2d20kh1` and `6x4d6dl1` read as
//! lists.

use chumsky::prelude::*;

use crate::{
	dice::{
		modifier::{CondOp, Condition, Modifier},
		Dice, Die,
	},
	expr::{Arg, Ast, Call, Expr, ListExpr},
};

/// Generates a parser that handles a full expression, dispatching between the scalar and list
/// forms, and expects end of input. The dispatch needs to see where the input ends, so there is
/// no prefix variant of this parser.
pub fn ast<'src>() -> impl Parser<'src, &'src str, Ast, extra::Err<Rich<'src, char>>> + Clone {
	// Helper function for operators
	let op = |c| just(c).padded();

	let mut expr = Recursive::declare();
	let mut list = Recursive::declare();

	// Parser for integer literals
	let int = text::int::<&'src str, _, _>(10).try_map(|s: &str, span| {
		s.parse::<i64>()
			.map_err(|err| Rich::custom(span, format!("Number: {err}")))
	});

	// Parser for the small expressions allowed inside dice notation: an integer literal or a
	// parenthesised full expression, as in "(2 + 3)d6" or "4d6kh(1 + 1)"
	let subexpr = choice((
		int.clone().map(Expr::Num),
		expr.clone()
			.delimited_by(just('('), just(')'))
			.map(|inner| Expr::Paren(Box::new(inner))),
	));

	// Parser for modifier conditions; a bare value means equality
	let condition = choice((
		just(">=").to(CondOp::Gte),
		just("<=").to(CondOp::Lte),
		just('>').to(CondOp::Gt),
		just('<').to(CondOp::Lt),
		just('=').to(CondOp::Eq),
	))
	.or_not()
	.then(subexpr.clone())
	.map(|(op, val)| Condition::new(op.unwrap_or(CondOp::Eq), val));

	// Parser for keep/drop counts, defaulting to 1 when omitted
	let count_arg = subexpr
		.clone()
		.or_not()
		.map(|count| Box::new(count.unwrap_or(Expr::Num(1))));

	// Parser for dice modifiers
	let modifier = choice((
		// Reroll dice (e.g. rr1, rr<=2, rr1!)
		just("rr")
			.ignore_then(condition.clone())
			.then(just('!').or_not())
			.map(|(cond, bang)| Modifier::Reroll {
				cond,
				recurse: bang.is_some(),
			}),
		// Exploding dice (e.g. x, xo, x>4)
		just('x')
			.ignore_then(just('o').or_not())
			.then(condition.or_not())
			.map(|(once, cond)| Modifier::Explode {
				cond,
				recurse: once.is_none(),
			}),
		// Keep highest (e.g. kh, kh2)
		just("kh").ignore_then(count_arg.clone()).map(Modifier::KeepHigh),
		// Keep lowest (e.g. kl, kl2)
		just("kl").ignore_then(count_arg.clone()).map(Modifier::KeepLow),
		// Drop highest (e.g. dh, dh2)
		just("dh").ignore_then(count_arg.clone()).map(Modifier::DropHigh),
		// Drop lowest (e.g. dl, dl2)
		just("dl").ignore_then(count_arg).map(Modifier::DropLow),
	));

	// Parser for custom die faces (e.g. {1, 2, 3, 10})
	let faces = subexpr
		.clone()
		.padded()
		.separated_by(just(','))
		.at_least(1)
		.collect::<Vec<_>>()
		.delimited_by(just('{'), just('}'));

	// Parser for a die definition: standard sides or custom faces
	let die = just('d').ignore_then(choice((
		faces.map(Die::Faces),
		subexpr.clone().map(|sides| Die::Sides(Box::new(sides))),
	)));

	// Parser for dice sets (e.g. d20, 2d20kh, (1d4)d6)
	let dice = subexpr
		.clone()
		.or_not()
		.then(die)
		.then(modifier.repeated().collect::<Vec<_>>())
		.map(|((count, die), modifiers)| Dice {
			count: Box::new(count.unwrap_or(Expr::Num(1))),
			die,
			modifiers,
		});

	// Parser for function arguments: the list grammar is preferred, but only commits when the
	// argument ends there, so "abs(3d6 + 1)" still reads as a scalar argument
	let arg = choice((
		list.clone().then_ignore(one_of(",)").rewind()).map(Arg::List),
		expr.clone().map(Arg::Scalar),
	));

	// Parser for function calls (e.g. sum(3d6), sort(6x4d6dl1))
	let call = text::ascii::ident()
		.then(
			arg.separated_by(just(',').padded())
				.collect::<Vec<_>>()
				.delimited_by(just('('), just(')')),
		)
		.map(|(name, args): (&str, _)| Call {
			name: name.to_owned(),
			args,
		});

	// Parser for scalar primaries
	let atom = choice((
		dice.clone().map(Expr::Dice),
		call.clone().map(Expr::Call),
		int.map(Expr::Num),
		expr.clone()
			.delimited_by(just('('), just(')'))
			.map(|inner| Expr::Paren(Box::new(inner))),
	))
	.padded();

	// Parser for exponentiation, which is right-associative
	let pow = atom
		.clone()
		.then_ignore(op('^'))
		.repeated()
		.foldr(atom, |lhs, rhs| Expr::Pow(Box::new(lhs), Box::new(rhs)));

	// Parser for negative sign
	let unary = op('-').repeated().foldr(pow, |_op, rhs| Expr::Neg(Box::new(rhs)));

	// Parser for multiplication and division
	let product = unary.clone().foldl(
		choice((
			op('*').to(Expr::Mul as fn(_, _) -> _),
			op('/').to(Expr::Div as fn(_, _) -> _),
		))
		.then(unary)
		.repeated(),
		|lhs, (op, rhs)| op(Box::new(lhs), Box::new(rhs)),
	);

	// Parser for addition and subtraction operators
	let sum = product.clone().foldl(
		choice((
			op('+').to(Expr::Add as fn(_, _) -> _),
			op('-').to(Expr::Sub as fn(_, _) -> _),
		))
		.then(product)
		.repeated(),
		|lhs, (op, rhs)| op(Box::new(lhs), Box::new(rhs)),
	);

	expr.define(sum);

	// Parser for repetitions (e.g. 6x4d6dl1)
	let repeat = subexpr
		.then_ignore(just('x').padded())
		.then(list.clone())
		.map(|(count, inner)| ListExpr::Repeat {
			count: Box::new(count),
			inner: Box::new(inner),
		});

	list.define(choice((repeat, dice.map(ListExpr::Dice), call.map(ListExpr::Call))).padded());

	// The top-level list form covers repetitions and modified dice sets only; a bare dice set or
	// a function call at the top level is a scalar
	let list_top = list
		.try_map(|parsed, span| match &parsed {
			ListExpr::Dice(dice) if dice.modifiers.is_empty() => {
				Err(Rich::custom(span, "a bare dice roll is a scalar"))
			}
			ListExpr::Call(..) => Err(Rich::custom(span, "a function call is a scalar")),
			ListExpr::Dice(..) | ListExpr::Repeat { .. } => Ok(parsed),
		})
		.then_ignore(end());

	choice((
		list_top.map(Ast::List),
		expr.then_ignore(end()).map(Ast::Scalar),
	))
}

/// Parses a complete expression, dispatching between the scalar and list forms. Input is
/// lowercased first, so the notation is case-insensitive.
///
/// # Errors
/// If the input is not a valid expression, an [`Error`] with the combined parser messages and
/// the span of the first offending token is returned.
///
/// # Examples
/// ```
/// use kismet::{expr::Ast, parse::parse};
///
/// let parsed = parse("4d6kh3 + 2")?;
/// assert!(matches!(parsed, Ast::Scalar(..)));
/// # Ok::<(), kismet::parse::Error>(())
/// ```
pub fn parse(input: &str) -> Result<Ast, Error> {
	let lc = input.to_lowercase();
	// Bound separately so the parser and its borrow of `lc` are dropped before `lc` is
	let result = ast().parse(&lc).into_result();
	result.map_err(Error::from_rich)
}

/// Error while parsing an expression
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{details}")]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Error {
	/// Combined messages of everything that went wrong
	pub details: String,

	/// Byte range of the first offending token, if known
	pub span: Option<std::ops::Range<usize>>,
}

impl Error {
	/// Flattens chumsky's error list into a single displayable error.
	fn from_rich(errs: Vec<Rich<'_, char>>) -> Self {
		Self {
			details: errs.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
			span: errs.first().map(|err| err.span().into_range()),
		}
	}
}

impl std::str::FromStr for Ast {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse(s)
	}
}
