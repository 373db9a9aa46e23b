use crate::{
	display::{render, DEFAULT_BUDGET},
	expr::{Evaled, Item, Value},
};

#[test]
fn scalar_rendering_shows_trace_and_value() {
	let evaled = scalar(15, "4d6[3, 6, 2, 4]");
	assert_eq!(render(&evaled, DEFAULT_BUDGET), "4d6[3, 6, 2, 4].\nOutput: 15");
}

#[test]
fn unlabelled_list_rendering_is_compact() {
	let evaled = list(&[(18, ""), (4, "")], "2d20[18, 4]");
	assert_eq!(render(&evaled, DEFAULT_BUDGET), "2d20[18, 4].\nOutput: {18, 4}");
}

#[test]
fn labelled_list_rendering_gets_one_line_per_element() {
	let evaled = list(&[(4, ""), (5, "rerolled 1")], "2d6rr=1[4, 1 -> 5]");
	assert_eq!(
		render(&evaled, DEFAULT_BUDGET),
		"2d6rr=1[4, 1 -> 5].\nOutput:\n4\n5 (rerolled 1)"
	);
}

#[test]
fn over_budget_scalar_drops_the_trace() {
	let evaled = scalar(15, &"x".repeat(100));
	assert_eq!(render(&evaled, 50), "Output: 15");
}

#[test]
fn over_budget_list_truncates_labels_first() {
	let long_label = "rerolled ".to_owned() + &"1, ".repeat(40);
	let evaled = list(&[(5, long_label.as_str()), (4, "")], "trace");
	assert_eq!(render(&evaled, 40), "trace.\nOutput:\n5 (...)\n4");
}

#[test]
fn hopeless_budget_still_renders_the_values() {
	let evaled = list(&[(18, &"y".repeat(50)), (4, "")], &"x".repeat(100));
	assert_eq!(render(&evaled, 10), "{18, 4}");

	let evaled = scalar(15, &"x".repeat(100));
	assert_eq!(render(&evaled, 5), "15");
}

#[test]
fn markdown_markers_count_double() {
	let evaled = scalar(1, "*a*");
	// "*a*.\nOutput: 1" is 14 characters but weighs 16 with the doubled asterisks
	assert_eq!(render(&evaled, 17), "*a*.\nOutput: 1");
	assert_eq!(render(&evaled, 16), "Output: 1");
}

#[test]
fn final_fallback_ignores_the_budget() {
	let values = (1_i64..=40).map(|v| (v, "")).collect::<Vec<_>>();
	let evaled = list(&values, "trace");

	let rendered = render(&evaled, 5);
	assert!(rendered.starts_with('{') && rendered.ends_with('}'));
	assert!(rendered.len() > 5);
}

#[test]
fn values_are_never_altered_by_fallbacks() {
	let evaled = list(&[(11, &"z".repeat(30)), (-3, "")], &"t".repeat(30));
	for budget in [5, 30, 60, DEFAULT_BUDGET] {
		let rendered = render(&evaled, budget);
		assert!(rendered.contains("11"));
		assert!(rendered.contains("-3"));
	}
}

/// Builds a scalar evaluation result.
fn scalar(value: i64, trace: &str) -> Evaled {
	Evaled {
		value: Value::Scalar(value),
		trace: trace.to_owned(),
	}
}

/// Builds a list evaluation result from `(value, label)` pairs.
fn list(items: &[(i64, &str)], trace: &str) -> Evaled {
	Evaled {
		value: Value::List(
			items
				.iter()
				.map(|&(value, label)| Item {
					value,
					label: label.to_owned(),
				})
				.collect(),
		),
		trace: trace.to_owned(),
	}
}
