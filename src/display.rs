//! Rendering of evaluation results for chat display.
//!
//! The full rendering shows the trace and every labelled element. When it would not fit the
//! caller's character budget, progressively simpler renderings are substituted; numeric values
//! are never altered, only labels and the trace give way.

use crate::expr::{Evaled, Value};

/// Default formatting budget in weighted characters, sized for a chat message
pub const DEFAULT_BUDGET: usize = 1800;

/// Renders an evaluation result within a weighted character budget.
///
/// Tries, in order: the full rendering; the same with every non-empty element label replaced by
/// `...`; the bare values with no trace. The first rendering under the budget wins. When nothing
/// fits, the bare values are used regardless of the budget: values are never truncated, so a
/// long enough list still exceeds it.
#[must_use]
pub fn render(evaled: &Evaled, budget: usize) -> String {
	let full = render_full(evaled);
	if weighted_len(&full) < budget {
		return full;
	}

	let simple = render_simple(evaled);
	if weighted_len(&simple) < budget {
		return simple;
	}

	render_values(&evaled.value)
}

/// Measures display cost: every character costs 1, markdown emphasis and code markers cost 2
/// since chat platforms expand them during display.
fn weighted_len(text: &str) -> usize {
	text.chars()
		.map(|c| match c {
			'`' | '*' | '_' | '~' => 2,
			_ => 1,
		})
		.sum()
}

/// Builds the full rendering: trace plus value, with per-element labels for list results.
fn render_full(evaled: &Evaled) -> String {
	match &evaled.value {
		Value::Scalar(x) => format!("{}.\nOutput: {x}", evaled.trace),
		Value::List(items) => {
			if items.iter().any(|item| !item.label.is_empty()) {
				let lines = items
					.iter()
					.map(|item| {
						if item.label.is_empty() {
							item.value.to_string()
						} else {
							format!("{} ({})", item.value, item.label)
						}
					})
					.collect::<Vec<_>>()
					.join("\n");
				format!("{}.\nOutput:\n{lines}", evaled.trace)
			} else {
				format!("{}.\nOutput: {}", evaled.trace, compact(&evaled.value))
			}
		}
	}
}

/// Builds the simplified rendering: like the full one, but every non-empty element label is
/// replaced by a placeholder. Values and trace are preserved.
fn render_simple(evaled: &Evaled) -> String {
	match &evaled.value {
		Value::Scalar(x) => format!("Output: {x}"),
		Value::List(items) => {
			if items.iter().any(|item| !item.label.is_empty()) {
				let lines = items
					.iter()
					.map(|item| {
						if item.label.is_empty() {
							item.value.to_string()
						} else {
							format!("{} (...)", item.value)
						}
					})
					.collect::<Vec<_>>()
					.join("\n");
				format!("{}.\nOutput:\n{lines}", evaled.trace)
			} else {
				format!("Output: {}", compact(&evaled.value))
			}
		}
	}
}

/// Builds the minimal rendering: just the numeric values.
fn render_values(value: &Value) -> String {
	match value {
		Value::Scalar(x) => x.to_string(),
		Value::List(..) => compact(value),
	}
}

/// Builds the compact brace-delimited list form, e.g. `{3, 6, 1}`.
fn compact(value: &Value) -> String {
	match value {
		Value::Scalar(x) => x.to_string(),
		Value::List(items) => format!(
			"{{{}}}",
			items
				.iter()
				.map(|item| item.value.to_string())
				.collect::<Vec<_>>()
				.join(", ")
		),
	}
}
