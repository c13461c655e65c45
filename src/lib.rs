// Library root
// -----------
// This crate exposes a small library surface for the calculator. The
// binary (`main.rs`) uses these modules to run the interactive session.
//
// Module responsibilities:
// - `arith`: Pure arithmetic (variadic add/subtract with validation,
//   multiply, divide) and float rendering.
// - `session`: The menu → choice → operands → result loop and its error
//   handling.
// - `input`: Line sources the session reads from (buffered readers and
//   the console with Ctrl-C support).
// - `config` / `logging`: Startup settings and stderr diagnostics.
//
// Keeping the session generic over its input and output makes the whole
// conversation testable without a terminal.
pub mod arith;
pub mod config;
pub mod input;
pub mod logging;
pub mod session;

pub use arith::{add, divide, multiply, subtract, ArithError, Number, Value};
pub use session::{CalcError, Operation, Outcome, Session};
