use crate::error::{runtime_error, Error, Result};
use crate::tokenizer::{Number, Operator, FALSE_SPELLING, TRUE_SPELLING};
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Integer(n) => Value::Integer(n),
            Number::Float(n) => Value::Float(n),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(true) => write!(f, "{}", TRUE_SPELLING),
            Value::Boolean(false) => write!(f, "{}", FALSE_SPELLING),
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Integer(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Value::Integer(n) => *n == 0,
            Value::Float(n) => *n == 0.0,
            _ => false,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }
}

fn type_mismatch<T>(operator: Operator, left: &Value, right: &Value) -> Result<T> {
    Err(Error::TypeMismatch {
        operator: operator.as_str(),
        left: left.type_name(),
        right: right.type_name(),
    })
}

/// Integer arithmetic stays exact; any Float operand promotes the pair.
fn arithmetic(
    operator: Operator,
    left: &Value,
    right: &Value,
    integer: fn(i64, i64) -> Option<i64>,
    float: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => match integer(*a, *b) {
            Some(n) => Ok(Value::Integer(n)),
            None => runtime_error(format!(
                "integer overflow in {} {} {}",
                a,
                operator.as_str(),
                b
            )),
        },
        _ => match (left.as_float(), right.as_float()) {
            (Some(a), Some(b)) => Ok(Value::Float(float(a, b))),
            _ => type_mismatch(operator, left, right),
        },
    }
}

/// Ordering used by the comparison operators. Booleans order as 0 and 1.
fn compare(left: &Value, right: &Value) -> Option<Option<Ordering>> {
    let numeric = |value: &Value| match value {
        Value::Boolean(b) => Some(Value::Integer(*b as i64)),
        Value::Integer(_) | Value::Float(_) => Some(value.clone()),
        Value::String(_) => None,
    };

    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(Some(a.cmp(b))),
        _ => match (numeric(left)?, numeric(right)?) {
            (Value::Integer(a), Value::Integer(b)) => Some(Some(a.cmp(&b))),
            (a, b) => Some(a.as_float()?.partial_cmp(&b.as_float()?)),
        },
    }
}

pub fn negate(operand: Value) -> Result<Value> {
    match operand {
        Value::Integer(n) => match n.checked_neg() {
            Some(n) => Ok(Value::Integer(n)),
            None => runtime_error(format!("integer overflow in -{}", n)),
        },
        Value::Float(n) => Ok(Value::Float(-n)),
        other => runtime_error(format!(
            "bad operand type for unary '-': {}",
            other.type_name()
        )),
    }
}

pub fn evaluate_binary(operator: Operator, left: Value, right: Value) -> Result<Value> {
    match operator {
        Operator::Plus => match (&left, &right) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Ok(Value::String(format!("{}{}", left, right)))
            }
            _ => arithmetic(operator, &left, &right, i64::checked_add, |a, b| a + b),
        },
        Operator::Minus => arithmetic(operator, &left, &right, i64::checked_sub, |a, b| a - b),
        Operator::Star => arithmetic(operator, &left, &right, i64::checked_mul, |a, b| a * b),
        Operator::Slash => match (left.as_float(), right.as_float()) {
            (Some(_), Some(_)) if right.is_zero() => Err(Error::DivisionByZero),
            (Some(a), Some(b)) => Ok(Value::Float(a / b)),
            _ => type_mismatch(operator, &left, &right),
        },
        Operator::EqualEqual => Ok(Value::Boolean(
            compare(&left, &right) == Some(Some(Ordering::Equal)),
        )),
        Operator::BangEqual => Ok(Value::Boolean(
            compare(&left, &right) != Some(Some(Ordering::Equal)),
        )),
        Operator::Less | Operator::LessEqual | Operator::Greater | Operator::GreaterEqual => {
            let ordering = match compare(&left, &right) {
                Some(ordering) => ordering,
                None => return type_mismatch(operator, &left, &right),
            };

            Ok(Value::Boolean(match (operator, ordering) {
                (_, None) => false,
                (Operator::Less, Some(o)) => o == Ordering::Less,
                (Operator::LessEqual, Some(o)) => o != Ordering::Greater,
                (Operator::Greater, Some(o)) => o == Ordering::Greater,
                (_, Some(o)) => o != Ordering::Less,
            }))
        }
        Operator::Bang => type_mismatch(operator, &left, &right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Integer(n)
    }

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn test_value_display() {
        assert_eq!(int(42).to_string(), "42");
        assert_eq!(Value::Float(5.0).to_string(), "5.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(string("hello").to_string(), "hello");
        assert_eq!(Value::Boolean(true).to_string(), "unmai");
        assert_eq!(Value::Boolean(false).to_string(), "poi");
    }

    #[test]
    fn test_truthiness() {
        assert!(int(3).is_truthy());
        assert!(!int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!string("").is_truthy());
        assert!(string("poi").is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
    }

    #[test]
    fn test_arithmetic() -> Result<()> {
        assert_eq!(evaluate_binary(Operator::Plus, int(2), int(3))?, int(5));
        assert_eq!(evaluate_binary(Operator::Minus, int(2), int(3))?, int(-1));
        assert_eq!(evaluate_binary(Operator::Star, int(4), int(3))?, int(12));
        assert_eq!(
            evaluate_binary(Operator::Plus, int(1), Value::Float(0.5))?,
            Value::Float(1.5)
        );
        assert_eq!(
            evaluate_binary(Operator::Slash, int(10), int(4))?,
            Value::Float(2.5)
        );
        assert_eq!(negate(int(7))?, int(-7));
        Ok(())
    }

    #[test]
    fn test_arithmetic_errors() {
        assert!(matches!(
            evaluate_binary(Operator::Slash, int(10), int(0)),
            Err(Error::DivisionByZero)
        ));
        assert!(matches!(
            evaluate_binary(Operator::Slash, Value::Float(1.0), Value::Float(0.0)),
            Err(Error::DivisionByZero)
        ));
        assert!(matches!(
            evaluate_binary(Operator::Star, int(i64::MAX), int(2)),
            Err(Error::Runtime { .. })
        ));
        assert!(matches!(
            evaluate_binary(Operator::Minus, string("a"), int(1)),
            Err(Error::TypeMismatch { operator: "-", left: "string", right: "integer" })
        ));
        assert!(matches!(
            evaluate_binary(Operator::Plus, Value::Boolean(true), int(1)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(negate(string("x")).is_err());
    }

    #[test]
    fn test_string_concatenation() -> Result<()> {
        assert_eq!(
            evaluate_binary(Operator::Plus, string("Age: "), int(25))?,
            string("Age: 25")
        );
        assert_eq!(
            evaluate_binary(Operator::Plus, Value::Boolean(true), string("!"))?,
            string("unmai!")
        );
        Ok(())
    }

    #[test]
    fn test_comparisons() -> Result<()> {
        assert_eq!(
            evaluate_binary(Operator::Less, int(1), Value::Float(1.5))?,
            Value::Boolean(true)
        );
        assert_eq!(
            evaluate_binary(Operator::GreaterEqual, string("b"), string("a"))?,
            Value::Boolean(true)
        );
        assert_eq!(
            evaluate_binary(Operator::EqualEqual, int(2), Value::Float(2.0))?,
            Value::Boolean(true)
        );
        assert_eq!(
            evaluate_binary(Operator::EqualEqual, string("1"), int(1))?,
            Value::Boolean(false)
        );
        assert_eq!(
            evaluate_binary(Operator::BangEqual, string("1"), int(1))?,
            Value::Boolean(true)
        );
        // a boolean result keeps folding against numbers
        assert_eq!(
            evaluate_binary(Operator::Less, Value::Boolean(true), int(3))?,
            Value::Boolean(true)
        );
        assert!(matches!(
            evaluate_binary(Operator::Less, string("a"), int(1)),
            Err(Error::TypeMismatch { .. })
        ));
        Ok(())
    }
}
