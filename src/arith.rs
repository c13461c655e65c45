// Arithmetic module: the calculator's "backend". Pure functions with no
// I/O. `add` and `subtract` take any number of values and validate every
// one of them before doing arithmetic; `multiply` and `divide` are plain
// two-operand helpers used by the session loop.

use std::fmt;
use thiserror::Error;

/// A single argument handed to the variadic operations. Only `Int` and
/// `Float` are numeric; the other variants are rejected with a
/// `TypeKind` error naming their type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    None,
}

impl Value {
    /// Type name reported in `TypeKind` errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "str",
            Value::None => "NoneType",
        }
    }

    fn as_number(&self) -> Result<Number, ArithError> {
        match self {
            Value::Int(i) => Ok(Number::Int(*i)),
            Value::Float(f) => Ok(Number::Float(*f)),
            other => Err(ArithError::TypeKind {
                type_name: other.type_name(),
            }),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// Result of an arithmetic operation. Integer-only input stays `Int`;
/// as soon as a float is involved (or an integer overflows) it is `Float`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn plus(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 + b as f64)),
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    fn minus(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 - b as f64)),
            (a, b) => Number::Float(a.as_f64() - b.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

/// Errors reported by the variadic operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithError {
    #[error("All arguments must be numeric, got {type_name}")]
    TypeKind { type_name: &'static str },
    #[error("{0}")]
    ValueKind(String),
}

fn validate(values: &[Value]) -> Result<Vec<Number>, ArithError> {
    values.iter().map(Value::as_number).collect()
}

/// Sum all values left to right. No values sums to `Int(0)`.
pub fn add(values: &[Value]) -> Result<Number, ArithError> {
    let numbers = validate(values)?;
    Ok(numbers.into_iter().fold(Number::Int(0), Number::plus))
}

/// Subtract every following value from the first one, left to right.
///
/// Unlike `add` there is no identity fallback: an empty slice is a
/// `ValueKind` error.
pub fn subtract(values: &[Value]) -> Result<Number, ArithError> {
    let numbers = validate(values)?;
    let (first, rest) = numbers.split_first().ok_or_else(|| {
        ArithError::ValueKind("At least one argument required for subtraction".into())
    })?;
    Ok(rest.iter().copied().fold(*first, Number::minus))
}

pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

/// The caller is responsible for rejecting a zero divisor.
pub fn divide(a: f64, b: f64) -> f64 {
    a / b
}

/// Render a float the way the calculator has always shown them: whole
/// values keep a trailing `.0`, very large or very small magnitudes switch
/// to exponent form with a signed two-digit exponent (`1e+16`, `1.5e-05`).
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".into();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".into() } else { "-inf".into() };
    }
    let magnitude = x.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let sci = format!("{x:e}");
        return match sci.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(d) => ('-', d),
                    None => ('+', exp),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => sci,
        };
    }
    if x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}
