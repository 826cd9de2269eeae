//! Dynamically typed runtime values and their arithmetic
//!
//! Operands are coerced before every arithmetic operation or comparison:
//! `Null` counts as integer zero, strings are parsed as an integer and then
//! as a double, and the operation runs in floating point as soon as either
//! side is a double.

use super::error::{ExecutionError, ExecutionResult};
use crate::tokens::Operator;
use crate::utils::{format_double, parse_integer_then_double, Number};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Double(f64),
    String(String),
}

impl Value {
    pub fn add(&self, other: &Value) -> ExecutionResult<Value> {
        self.apply(Operator::Add, other)
    }

    pub fn sub(&self, other: &Value) -> ExecutionResult<Value> {
        self.apply(Operator::Sub, other)
    }

    pub fn mul(&self, other: &Value) -> ExecutionResult<Value> {
        self.apply(Operator::Mul, other)
    }

    pub fn div(&self, other: &Value) -> ExecutionResult<Value> {
        self.apply(Operator::Div, other)
    }

    pub fn pow(&self, other: &Value) -> ExecutionResult<Value> {
        self.apply(Operator::Pow, other)
    }

    /// Apply a binary operator with `self` as the left operand
    pub fn apply(&self, op: Operator, other: &Value) -> ExecutionResult<Value> {
        match (self.to_number()?, other.to_number()?) {
            (Number::Integer(left), Number::Integer(right)) => integer_op(op, left, right),
            (left, right) => double_op(op, as_f64(left), as_f64(right)).map(Value::Double),
        }
    }

    /// Numeric comparison under the same coercion rule as arithmetic
    pub fn compare(&self, other: &Value) -> ExecutionResult<Ordering> {
        Ok(match (self.to_number()?, other.to_number()?) {
            (Number::Integer(left), Number::Integer(right)) => left.cmp(&right),
            (left, right) => as_f64(left).total_cmp(&as_f64(right)),
        })
    }

    /// Coerce to a number: Null is 0, strings must parse
    pub fn to_number(&self) -> ExecutionResult<Number> {
        match self {
            Self::Null => Ok(Number::Integer(0)),
            Self::Integer(value) => Ok(Number::Integer(*value)),
            Self::Double(value) => Ok(Number::Double(*value)),
            Self::String(text) => parse_integer_then_double(text)
                .ok_or_else(|| ExecutionError::invalid_operand(text.as_str(), "not a number")),
        }
    }

    /// Coerce to a double (used by numeric built-ins)
    pub fn to_f64(&self) -> ExecutionResult<f64> {
        self.to_number().map(as_f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Text written to the output for this value
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Double(value) => f.write_str(&format_double(*value)),
            Self::String(text) => f.write_str(text),
        }
    }
}

fn as_f64(number: Number) -> f64 {
    match number {
        Number::Integer(value) => value as f64,
        Number::Double(value) => value,
    }
}

fn overflow(op: Operator) -> ExecutionError {
    ExecutionError::ArithmeticOverflow {
        operation: op.symbol().to_string(),
    }
}

fn integer_op(op: Operator, left: i64, right: i64) -> ExecutionResult<Value> {
    let result = match op {
        Operator::Add => left.checked_add(right),
        Operator::Sub => left.checked_sub(right),
        Operator::Mul => left.checked_mul(right),
        Operator::Div => {
            if right == 0 {
                return Err(ExecutionError::DivisionByZero);
            }
            left.checked_div(right)
        }
        Operator::Pow => {
            if right < 0 {
                return double_op(op, left as f64, right as f64).map(Value::Double);
            }
            match left {
                1 => Some(1),
                0 => Some(if right == 0 { 1 } else { 0 }),
                -1 => Some(if right % 2 == 0 { 1 } else { -1 }),
                _ => u32::try_from(right)
                    .ok()
                    .and_then(|exponent| left.checked_pow(exponent)),
            }
        }
    };

    result.map(Value::Integer).ok_or_else(|| overflow(op))
}

fn double_op(op: Operator, left: f64, right: f64) -> ExecutionResult<f64> {
    let result = match op {
        Operator::Add => left + right,
        Operator::Sub => left - right,
        Operator::Mul => left * right,
        Operator::Div => {
            if right == 0.0 {
                return Err(ExecutionError::DivisionByZero);
            }
            left / right
        }
        Operator::Pow => left.powf(right),
    };

    if result.is_nan() && !left.is_nan() && !right.is_nan() {
        return Err(ExecutionError::invalid_operand(
            format!("{} {} {}", format_double(left), op, format_double(right)),
            "result is not a number",
        ));
    }
    if result.is_infinite() && left.is_finite() && right.is_finite() {
        // 0 raised to a negative power
        if matches!(op, Operator::Pow) && left == 0.0 {
            return Err(ExecutionError::DivisionByZero);
        }
        return Err(overflow(op));
    }

    Ok(result)
}
