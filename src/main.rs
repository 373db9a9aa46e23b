//! Simple executable that reads a dice expression (from its arguments or stdin), rolls it, and
//! prints the rendered result. Parse errors are reported with span annotations.

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use ariadne::{Color, Label, Report, ReportKind, Source};
use chumsky::{error::Rich, Parser};
use kismet::{dice::roller::FastRand, display};

fn main() -> ExitCode {
	let args = env::args();
	let input = if args.len() > 1 {
		// Obtain the expression by combining all args passed to the executable, so that it can be left unquoted
		// even with spaces. The first argument is ignored since it is typically the name of the executable itself.
		args.skip(1).collect::<Vec<String>>().join(" ")
	} else {
		let mut lines = io::stdin().lines();

		// If there isn't already input available in stdin, display a prompt for it
		if lines.size_hint().1.is_none() {
			print!("Enter dice expression: ");
			io::stdout().flush().unwrap();
		}

		// Grab the first line available from stdin
		lines.next().unwrap_or_else(|| Ok(String::new())).unwrap()
	};
	let input = input.to_lowercase();

	let parsed = match kismet::parse::ast().parse(&input).into_result() {
		Ok(parsed) => parsed,
		Err(errs) => {
			report_parse_errors(&input, &errs);
			return ExitCode::FAILURE;
		}
	};

	let mut roller = FastRand::default();
	match parsed.eval(&mut roller) {
		Ok(evaled) => {
			println!("{}", display::render(&evaled, display::DEFAULT_BUDGET));
			ExitCode::SUCCESS
		}
		Err(err) => {
			eprintln!("Evaluation error: {err}");
			ExitCode::FAILURE
		}
	}
}

/// Prints a span-annotated report for each parse error.
fn report_parse_errors(input: &str, errs: &[Rich<'_, char>]) {
	for err in errs {
		let report = Report::build(ReportKind::Error, ("input", err.span().into_range()))
			.with_message(err.to_string())
			.with_label(
				Label::new(("input", err.span().into_range()))
					.with_message(err.reason().to_string())
					.with_color(Color::Red),
			)
			.finish();
		let _ = report.eprint(("input", Source::from(input)));
	}
}
