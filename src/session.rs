// Session module: the interactive calculator loop. Each iteration shows
// the menu, reads a choice and two operands, computes, and reports the
// result or the error; then asks whether to go again. Anything that goes
// wrong inside an iteration stays inside it. Only an interrupt (or the end
// of input) leaves the loop without passing through the continue prompt.

use crate::arith::{self, format_float, ArithError, Number, Value};
use crate::config::Config;
use crate::input::{Input, LineSource};
use crossterm::style::Stylize;
use std::any::Any;
use std::io::{self, Write};
use std::num::IntErrorKind;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, error};

const RULE: &str = "========================================";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// Menu order. The 1-based position is the selector code.
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Operation::Add),
            2 => Some(Operation::Subtract),
            3 => Some(Operation::Multiply),
            4 => Some(Operation::Divide),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Operation::Add => 1,
            Operation::Subtract => 2,
            Operation::Multiply => 3,
            Operation::Divide => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Operation::Add => "Addition",
            Operation::Subtract => "Subtraction",
            Operation::Multiply => "Multiplication",
            Operation::Divide => "Division",
        }
    }
}

/// Everything that can end an iteration early. The display text is what
/// the user sees after the failure marker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Invalid input. Please enter a number between 1-4.")]
    InvalidChoice,
    #[error("Choice must be between 1 and 4")]
    ChoiceOutOfRange,
    #[error("Invalid input. Please enter numeric values.")]
    InvalidOperand,
    #[error("Cannot divide by zero")]
    DivisionByZero,
    #[error(transparent)]
    Arith(#[from] ArithError),
    #[error("{0}")]
    Unexpected(String),
}

/// Parse the menu selection. Non-integer text and out-of-range integers
/// are reported differently.
pub fn parse_choice(text: &str) -> Result<Operation, CalcError> {
    match text.trim().parse::<i64>() {
        Ok(code) => Operation::from_code(code).ok_or(CalcError::ChoiceOutOfRange),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(CalcError::ChoiceOutOfRange)
        }
        Err(_) => Err(CalcError::InvalidChoice),
    }
}

pub fn parse_operand(text: &str) -> Result<f64, CalcError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| CalcError::InvalidOperand)
}

/// Apply `op` to the two operands. A zero divisor is rejected here, so
/// `arith::divide` never sees one.
pub fn calculate(op: Operation, lhs: f64, rhs: f64) -> Result<Number, CalcError> {
    let result = match op {
        Operation::Add => arith::add(&[Value::from(lhs), Value::from(rhs)])?,
        Operation::Subtract => arith::subtract(&[Value::from(lhs), Value::from(rhs)])?,
        Operation::Multiply => Number::Float(arith::multiply(lhs, rhs)),
        Operation::Divide => {
            if rhs == 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            Number::Float(arith::divide(lhs, rhs))
        }
    };
    Ok(result)
}

/// Run `compute`, turning a panic into `CalcError::Unexpected` so a bug in
/// one calculation cannot take the whole session down.
pub fn contain_panics<F>(compute: F) -> Result<Number, CalcError>
where
    F: FnOnce() -> Result<Number, CalcError>,
{
    panic::catch_unwind(AssertUnwindSafe(compute))
        .unwrap_or_else(|payload| Err(CalcError::Unexpected(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "calculation panicked".into()
    }
}

/// A successful iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub op: Operation,
    pub lhs: f64,
    pub rhs: f64,
    pub result: Number,
}

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The user declined another calculation.
    Finished,
    /// Ctrl-C or end of input at a prompt.
    Interrupted,
}

enum Stop {
    Failed(CalcError),
    Interrupted,
    Io(io::Error),
}

impl From<CalcError> for Stop {
    fn from(e: CalcError) -> Self {
        Stop::Failed(e)
    }
}

impl From<io::Error> for Stop {
    fn from(e: io::Error) -> Self {
        Stop::Io(e)
    }
}

/// The calculator conversation over a line source and an output sink.
pub struct Session<S, W> {
    input: S,
    out: W,
    config: Config,
}

impl<S: LineSource, W: Write> Session<S, W> {
    pub fn new(input: S, out: W, config: Config) -> Self {
        Session { input, out, config }
    }

    /// Run until the user declines to continue or interrupts.
    ///
    /// Only write failures on the output are returned as errors.
    pub fn run(&mut self) -> io::Result<Outcome> {
        writeln!(self.out, "\nWelcome to CalcuLait - Your Rust Calculator!")?;

        loop {
            self.print_menu()?;
            match self.iteration() {
                Ok(calc) => self.show_result(&calc)?,
                Err(Stop::Failed(e)) => self.show_error(&e)?,
                Err(Stop::Interrupted) => return self.exit_interrupted(),
                Err(Stop::Io(e)) => return Err(e),
            }

            match self.read("\nDo another calculation? (y/n): ")? {
                None => return self.exit_interrupted(),
                Some(answer) if answer.eq_ignore_ascii_case("y") => continue,
                Some(answer) => {
                    debug!(%answer, "session finished");
                    writeln!(self.out, "\nThank you for using CalcuLait. Goodbye!")?;
                    self.out.flush()?;
                    return Ok(Outcome::Finished);
                }
            }
        }
    }

    fn iteration(&mut self) -> Result<Calculation, Stop> {
        let text = self.read("\nEnter your choice (1-4): ")?.ok_or(Stop::Interrupted)?;
        let op = parse_choice(&text)?;
        debug!(choice = op.code(), "operation selected");

        // The second operand is only read once the first one parsed.
        let text = self.read("Enter first number: ")?.ok_or(Stop::Interrupted)?;
        let lhs = parse_operand(&text)?;
        let text = self.read("Enter second number: ")?.ok_or(Stop::Interrupted)?;
        let rhs = parse_operand(&text)?;
        debug!(lhs, rhs, "operands read");

        let result = contain_panics(|| calculate(op, lhs, rhs))?;
        Ok(Calculation {
            op,
            lhs,
            rhs,
            result,
        })
    }

    /// Show `prompt` and wait for a line. `None` means interrupted.
    fn read(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        match self.input.next_line()? {
            Input::Line(line) => Ok(Some(line)),
            Input::Interrupted => Ok(None),
        }
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n{RULE}")?;
        writeln!(self.out, "      CALCULATOR MENU")?;
        writeln!(self.out, "{RULE}")?;
        for op in Operation::ALL {
            writeln!(self.out, "{}. {}", op.code(), op.label())?;
        }
        writeln!(self.out, "{RULE}")
    }

    fn show_result(&mut self, calc: &Calculation) -> io::Result<()> {
        debug!(op = calc.op.label(), result = %calc.result, "calculation done");
        let mark = self.marker(true);
        writeln!(
            self.out,
            "\n{mark} {} Result: {} → {} = {}",
            calc.op.label(),
            format_float(calc.lhs),
            format_float(calc.rhs),
            calc.result
        )
    }

    fn show_error(&mut self, err: &CalcError) -> io::Result<()> {
        let mark = self.marker(false);
        match err {
            CalcError::Unexpected(detail) => {
                error!(%detail, "unexpected failure during calculation");
                writeln!(self.out, "\n{mark} Unexpected error: {detail}")
            }
            other => {
                debug!(error = %other, "iteration failed");
                writeln!(self.out, "\n{mark} Error: {other}")
            }
        }
    }

    fn exit_interrupted(&mut self) -> io::Result<Outcome> {
        writeln!(self.out, "\n\nExiting calculator. Goodbye!")?;
        self.out.flush()?;
        Ok(Outcome::Interrupted)
    }

    fn marker(&self, ok: bool) -> String {
        match (ok, self.config.color) {
            (true, true) => "✓".green().to_string(),
            (true, false) => "✓".to_string(),
            (false, true) => "✗".red().to_string(),
            (false, false) => "✗".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_codes_map_to_operations() {
        assert_eq!(parse_choice("1"), Ok(Operation::Add));
        assert_eq!(parse_choice("2"), Ok(Operation::Subtract));
        assert_eq!(parse_choice("3"), Ok(Operation::Multiply));
        assert_eq!(parse_choice(" 4 "), Ok(Operation::Divide));
    }

    #[test]
    fn choice_out_of_range() {
        for text in ["0", "5", "-1", "99999999999999999999"] {
            let err = parse_choice(text).unwrap_err();
            assert_eq!(err, CalcError::ChoiceOutOfRange, "input {text:?}");
            assert_eq!(err.to_string(), "Choice must be between 1 and 4");
        }
    }

    #[test]
    fn choice_not_an_integer() {
        for text in ["abc", "", "1.5", "one"] {
            let err = parse_choice(text).unwrap_err();
            assert_eq!(err, CalcError::InvalidChoice, "input {text:?}");
            assert!(err.to_string().contains("Invalid input"));
        }
    }

    #[test]
    fn operands_parse_as_floats() {
        assert_eq!(parse_operand("5"), Ok(5.0));
        assert_eq!(parse_operand("5.5"), Ok(5.5));
        assert_eq!(parse_operand(" -3.2 "), Ok(-3.2));
        assert_eq!(parse_operand("1e3"), Ok(1000.0));
        assert!(parse_operand("inf").unwrap().is_infinite());
    }

    #[test]
    fn operand_rejects_text() {
        let err = parse_operand("xyz").unwrap_err();
        assert_eq!(err, CalcError::InvalidOperand);
        assert!(err.to_string().contains("Invalid input"));
    }

    #[test]
    fn dispatch_by_operation() {
        assert_eq!(calculate(Operation::Add, 10.0, 5.0), Ok(Number::Float(15.0)));
        assert_eq!(calculate(Operation::Subtract, 10.0, 5.0), Ok(Number::Float(5.0)));
        assert_eq!(calculate(Operation::Multiply, 10.0, 5.0), Ok(Number::Float(50.0)));
        assert_eq!(calculate(Operation::Divide, 10.0, 5.0), Ok(Number::Float(2.0)));
        assert_eq!(calculate(Operation::Divide, 7.0, 2.0), Ok(Number::Float(3.5)));
    }

    #[test]
    fn divide_by_zero_is_intercepted() {
        let err = calculate(Operation::Divide, 10.0, 0.0).unwrap_err();
        assert_eq!(err, CalcError::DivisionByZero);
        assert_eq!(err.to_string(), "Cannot divide by zero");
        assert_eq!(calculate(Operation::Divide, 1.0, -0.0), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn panics_become_unexpected_errors() {
        let err = contain_panics(|| panic!("boom")).unwrap_err();
        assert_eq!(err, CalcError::Unexpected("boom".into()));

        let ok = contain_panics(|| calculate(Operation::Add, 1.0, 2.0));
        assert_eq!(ok, Ok(Number::Float(3.0)));
    }

    #[test]
    fn arith_errors_keep_their_message() {
        let err: CalcError = ArithError::TypeKind { type_name: "str" }.into();
        assert_eq!(err.to_string(), "All arguments must be numeric, got str");
    }

    #[test]
    fn codes_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_code(op.code() as i64), Some(op));
        }
    }
}
