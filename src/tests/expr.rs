use crate::{
	dice::{
		modifier::Modifier,
		roller::{Iter, Max},
		Dice, Die, Limits,
	},
	expr::{Arg, Ast, Call, EvalError, Expr, Kind, ListExpr, Value},
};

#[test]
fn number_evaluates_to_itself() {
	let evaled = Expr::Num(42).eval(&mut Max, &Limits::default()).unwrap();
	assert_eq!(evaled.value, Value::Scalar(42));
	assert_eq!(evaled.trace, "42");
}

#[test]
fn negation() {
	let expr = Expr::Neg(Box::new(Expr::Num(42)));
	let evaled = expr.eval(&mut Max, &Limits::default()).unwrap();
	assert_eq!(evaled.value, Value::Scalar(-42));
	assert_eq!(evaled.trace, "-42");
}

#[test]
fn arithmetic_traces_every_operand() {
	let expr = Expr::Add(
		Box::new(Expr::Num(2)),
		Box::new(Expr::Mul(Box::new(Expr::Num(3)), Box::new(Expr::Num(4)))),
	);
	let evaled = expr.eval(&mut Max, &Limits::default()).unwrap();
	assert_eq!(evaled.value, Value::Scalar(14));
	assert_eq!(evaled.trace, "2 + 3 * 4");
}

#[test]
fn parens_survive_in_the_trace() {
	let expr = Expr::Mul(
		Box::new(Expr::Paren(Box::new(Expr::Add(
			Box::new(Expr::Num(2)),
			Box::new(Expr::Num(3)),
		)))),
		Box::new(Expr::Num(2)),
	);
	let evaled = expr.eval(&mut Max, &Limits::default()).unwrap();
	assert_eq!(evaled.value, Value::Scalar(10));
	assert_eq!(evaled.trace, "(2 + 3) * 2");
}

#[test]
fn division_truncates_toward_zero() {
	let div = |a, b| Expr::Div(Box::new(Expr::Num(a)), Box::new(Expr::Num(b)));
	assert_eq!(div(7, 2).eval(&mut Max, &Limits::default()).unwrap().value, Value::Scalar(3));
	assert_eq!(
		div(-7, 2).eval(&mut Max, &Limits::default()).unwrap().value,
		Value::Scalar(-3)
	);
}

#[test]
fn division_by_zero_errors() {
	let expr = Expr::Div(Box::new(Expr::Num(1)), Box::new(Expr::Num(0)));
	let result = expr.eval(&mut Max, &Limits::default());
	assert_eq!(result.unwrap_err(), EvalError::DivideByZero);
}

#[test]
fn exponentiation() {
	let expr = Expr::Pow(Box::new(Expr::Num(2)), Box::new(Expr::Num(10)));
	let evaled = expr.eval(&mut Max, &Limits::default()).unwrap();
	assert_eq!(evaled.value, Value::Scalar(1024));
}

#[test]
fn negative_exponent_errors() {
	let expr = Expr::Pow(Box::new(Expr::Num(2)), Box::new(Expr::Neg(Box::new(Expr::Num(1)))));
	let result = expr.eval(&mut Max, &Limits::default());
	assert_eq!(result.unwrap_err(), EvalError::NegativeExponent(-1));
}

#[test]
fn addition_overflow_errors() {
	let expr = Expr::Add(Box::new(Expr::Num(i64::MAX)), Box::new(Expr::Num(1)));
	let result = expr.eval(&mut Max, &Limits::default());
	assert_eq!(result.unwrap_err(), EvalError::Overflow);
}

#[test]
fn dice_coerce_to_their_sum_in_arithmetic() {
	let expr = Expr::Add(Box::new(Expr::Dice(plain(4, 6))), Box::new(Expr::Num(5)));
	let evaled = expr
		.eval(&mut Iter::new(vec![3, 6, 1, 2]), &Limits::default())
		.unwrap();
	assert_eq!(evaled.value, Value::Scalar(17));
	assert_eq!(evaled.trace, "4d6[3, 6, 1, 2] + 5");
}

#[test]
fn two_dice_sets_sum_every_die() {
	let expr = Expr::Add(Box::new(Expr::Dice(plain(3, 6))), Box::new(Expr::Dice(plain(2, 4))));
	let evaled = expr
		.eval(&mut Iter::new(vec![2, 4, 6, 1, 3]), &Limits::default())
		.unwrap();
	assert_eq!(evaled.value, Value::Scalar(16));
	assert_eq!(evaled.trace, "3d6[2, 4, 6] + 2d4[1, 3]");
}

#[test]
fn scalar_ast_totals_a_bare_dice_roll() {
	let ast = Ast::Scalar(Expr::Dice(plain(4, 6)));
	let evaled = ast.eval(&mut Iter::new(vec![3, 6, 1, 2])).unwrap();
	assert_eq!(evaled.value, Value::Scalar(12));
	assert_eq!(evaled.trace, "4d6[3, 6, 1, 2]");
}

#[test]
fn list_ast_keeps_individual_rolls() {
	let mut dice = plain(2, 20);
	dice.modifiers.push(Modifier::KeepHigh(Box::new(Expr::Num(1))));
	let ast = Ast::List(ListExpr::Dice(dice));
	let evaled = ast.eval(&mut Iter::new(vec![18, 4])).unwrap();

	match evaled.value {
		Value::List(items) => {
			assert_eq!(items.len(), 1);
			assert_eq!(items[0].value, 18);
			assert_eq!(items[0].label, "");
		}
		Value::Scalar(..) => panic!("expected a list value"),
	}
	assert_eq!(evaled.trace, "2d20kh[18, 4 (dropped)]");
}

#[test]
fn repeat_concatenates_batches() {
	let repeat = ListExpr::Repeat {
		count: Box::new(Expr::Num(3)),
		inner: Box::new(ListExpr::Dice(plain(2, 6))),
	};
	let evaled = repeat
		.eval(&mut Iter::new(vec![1, 2, 3, 4, 5, 6]), &Limits::default())
		.unwrap();

	match &evaled.value {
		Value::List(items) => {
			assert_eq!(items.iter().map(|item| item.value).collect::<Vec<_>>(), vec![
				1, 2, 3, 4, 5, 6
			]);
		}
		Value::Scalar(..) => panic!("expected a list value"),
	}
	assert_eq!(evaled.trace, "3x[2d6[1, 2], 2d6[3, 4], 2d6[5, 6]]");
}

#[test]
fn repeat_of_zero_is_empty() {
	let repeat = ListExpr::Repeat {
		count: Box::new(Expr::Num(0)),
		inner: Box::new(ListExpr::Dice(plain(2, 6))),
	};
	let evaled = repeat.eval(&mut Max, &Limits::default()).unwrap();
	assert_eq!(evaled.value, Value::List(Vec::new()));
	assert_eq!(evaled.trace, "0x[]");
}

#[test]
fn repeat_of_negative_errors() {
	let repeat = ListExpr::Repeat {
		count: Box::new(Expr::Neg(Box::new(Expr::Num(2)))),
		inner: Box::new(ListExpr::Dice(plain(2, 6))),
	};
	let result = repeat.eval(&mut Max, &Limits::default());
	assert_eq!(result.unwrap_err(), EvalError::NegativeCount(-2));
}

#[test]
fn huge_repetition_count_errors() {
	use crate::dice::DEFAULT_ROLL_CAP;

	let repeat = ListExpr::Repeat {
		count: Box::new(Expr::Num(i64::MAX)),
		inner: Box::new(ListExpr::Dice(plain(2, 6))),
	};
	let result = repeat.eval(&mut Max, &Limits::default());
	assert_eq!(result.unwrap_err(), EvalError::TooManyRolls {
		count: i64::MAX,
		cap: DEFAULT_ROLL_CAP,
	});
}

#[test]
fn call_resolves_and_traces_arguments() {
	let call = Call {
		name: "sum".to_owned(),
		args: vec![Arg::List(ListExpr::Dice(plain(3, 6)))],
	};
	let evaled = Expr::Call(call)
		.eval(&mut Iter::new(vec![2, 4, 6]), &Limits::default())
		.unwrap();
	assert_eq!(evaled.value, Value::Scalar(12));
	assert_eq!(evaled.trace, "sum(3d6[2, 4, 6])");
}

#[test]
fn unknown_function_errors() {
	let call = Call {
		name: "florble".to_owned(),
		args: Vec::new(),
	};
	let result = Expr::Call(call).eval(&mut Max, &Limits::default());
	assert_eq!(result.unwrap_err(), EvalError::UnknownFunction("florble".to_owned()));
}

#[test]
fn wrong_arity_errors() {
	let call = Call {
		name: "sum".to_owned(),
		args: Vec::new(),
	};
	let result = Expr::Call(call).eval(&mut Max, &Limits::default());
	assert_eq!(result.unwrap_err(), EvalError::ArityMismatch {
		function: "sum".to_owned(),
		expected: 1,
		found: 0,
	});
}

#[test]
fn wrong_argument_kind_errors() {
	let call = Call {
		name: "sum".to_owned(),
		args: vec![Arg::Scalar(Expr::Num(3))],
	};
	let result = Expr::Call(call).eval(&mut Max, &Limits::default());
	assert_eq!(result.unwrap_err(), EvalError::ArgumentKindMismatch {
		context: "sum".to_owned(),
		expected: Kind::List,
		found: Kind::Scalar,
	});
}

#[test]
fn display_round_trips_notation() {
	let expr = Expr::Add(
		Box::new(Expr::Dice(plain(4, 6))),
		Box::new(Expr::Paren(Box::new(Expr::Sub(
			Box::new(Expr::Num(5)),
			Box::new(Expr::Num(1)),
		)))),
	);
	assert_eq!(expr.to_string(), "4d6 + (5 - 1)");

	let repeat = ListExpr::Repeat {
		count: Box::new(Expr::Num(3)),
		inner: Box::new(ListExpr::Dice(plain(2, 6))),
	};
	assert_eq!(repeat.to_string(), "3x2d6");
}

/// Builds an unmodified dice set with a literal count and side count.
fn plain(count: i64, sides: i64) -> Dice {
	Dice::new(Expr::Num(count), Die::Sides(Box::new(Expr::Num(sides))))
}
