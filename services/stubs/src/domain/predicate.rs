//! Request predicates: `{"field.path": {"<op>": operand, ...}, ...}`.
//!
//! Every entry must pass for the predicate set to match; an empty set matches
//! anything. A bare (non-object) value is shorthand for `{"==": value}`.

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredicateError {
    #[error("predicates must be a JSON object")]
    NotAnObject,
    #[error("invalid field path {0:?}")]
    InvalidPath(String),
    #[error("unknown operator {op:?} on {path}")]
    UnknownOperator { path: String, op: String },
    #[error("operator {op:?} on {path}: {reason}")]
    InvalidOperand {
        path: String,
        op: String,
        reason: String,
    },
}

/// Dot-separated path into a JSON value; numeric segments index arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<String> = path.split('.').map(str::to_owned).collect();
        if segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self(segments))
    }

    /// Path to the value itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        self.0
            .iter()
            .try_fold(value, |current, segment| match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

#[derive(Debug, Clone)]
enum Check {
    Eq(Value),
    NotEq(Value),
    Lt(Value),
    Lte(Value),
    Gt(Value),
    Gte(Value),
    Matches(Regex),
    Size(usize),
    Exists(bool),
    In(Vec<Value>),
    NotIn(Vec<Value>),
}

impl Check {
    fn parse(path: &str, op: &str, operand: &Value) -> Result<Self, PredicateError> {
        let invalid = |reason: String| PredicateError::InvalidOperand {
            path: path.to_owned(),
            op: op.to_owned(),
            reason,
        };
        let ordered = |operand: &Value| {
            if operand.is_number() || operand.is_string() {
                Ok(operand.clone())
            } else {
                Err(invalid("expected a number or a string".to_owned()))
            }
        };
        let list = |operand: &Value| {
            operand
                .as_array()
                .cloned()
                .ok_or_else(|| invalid("expected an array".to_owned()))
        };

        Ok(match op {
            "==" => Check::Eq(operand.clone()),
            "!=" => Check::NotEq(operand.clone()),
            "<" => Check::Lt(ordered(operand)?),
            "<=" => Check::Lte(ordered(operand)?),
            ">" => Check::Gt(ordered(operand)?),
            ">=" => Check::Gte(ordered(operand)?),
            "~=" => {
                let pattern = operand
                    .as_str()
                    .ok_or_else(|| invalid("expected a regex string".to_owned()))?;
                // Whole-value match, not substring search.
                let anchored = format!("^(?:{pattern})$");
                Check::Matches(Regex::new(&anchored).map_err(|e| invalid(e.to_string()))?)
            }
            "size" => {
                let size = operand
                    .as_u64()
                    .ok_or_else(|| invalid("expected a non-negative integer".to_owned()))?;
                Check::Size(size as usize)
            }
            "exists" => Check::Exists(
                operand
                    .as_bool()
                    .ok_or_else(|| invalid("expected a boolean".to_owned()))?,
            ),
            "[_]" => Check::In(list(operand)?),
            "![_]" => Check::NotIn(list(operand)?),
            _ => {
                return Err(PredicateError::UnknownOperator {
                    path: path.to_owned(),
                    op: op.to_owned(),
                });
            }
        })
    }

    fn holds(&self, field: Option<&Value>) -> bool {
        let present = field.filter(|v| !v.is_null());
        let Some(value) = present else {
            return matches!(self, Check::Exists(false) | Check::NotEq(_) | Check::NotIn(_));
        };
        match self {
            Check::Eq(expected) => loosely_equal(value, expected),
            Check::NotEq(expected) => !loosely_equal(value, expected),
            Check::Lt(bound) => compare(value, bound) == Some(Ordering::Less),
            Check::Lte(bound) => matches!(
                compare(value, bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Check::Gt(bound) => compare(value, bound) == Some(Ordering::Greater),
            Check::Gte(bound) => matches!(
                compare(value, bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Check::Matches(re) => scalar_text(value).is_some_and(|text| re.is_match(&text)),
            Check::Size(size) => match value {
                Value::Array(items) => items.len() == *size,
                Value::String(s) => s.chars().count() == *size,
                _ => false,
            },
            Check::Exists(expected) => *expected,
            Check::In(options) => options.iter().any(|o| loosely_equal(value, o)),
            Check::NotIn(options) => !options.iter().any(|o| loosely_equal(value, o)),
        }
    }
}

/// Protobuf JSON renders 64-bit integers as strings, so numbers compare by value
/// whichever side carries the quotes.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn loosely_equal(value: &Value, expected: &Value) -> bool {
    if value == expected {
        return true;
    }
    if value.is_number() || expected.is_number() {
        return matches!((as_number(value), as_number(expected)), (Some(a), Some(b)) if a == b);
    }
    false
}

fn compare(value: &Value, bound: &Value) -> Option<Ordering> {
    match bound {
        Value::Number(_) => as_number(value)?.partial_cmp(&as_number(bound)?),
        Value::String(b) => Some(value.as_str()?.cmp(b.as_str())),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone)]
struct FieldPredicate {
    path: FieldPath,
    checks: Vec<Check>,
}

/// A parsed predicate set. Keeps the JSON it was built from for listings.
#[derive(Debug, Clone)]
pub struct Predicates {
    fields: Vec<FieldPredicate>,
    raw: Value,
}

impl Default for Predicates {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            raw: Value::Object(Map::new()),
        }
    }
}

impl Predicates {
    /// Parse a predicate object. `null` is an empty (match-all) set.
    pub fn parse(raw: &Value) -> Result<Self, PredicateError> {
        let entries = match raw {
            Value::Null => return Ok(Self::default()),
            Value::Object(entries) => entries,
            _ => return Err(PredicateError::NotAnObject),
        };

        let mut fields = Vec::with_capacity(entries.len());
        for (path, rule) in entries {
            let parsed =
                FieldPath::parse(path).ok_or_else(|| PredicateError::InvalidPath(path.clone()))?;
            let checks = match rule {
                Value::Object(ops) if !ops.is_empty() => ops
                    .iter()
                    .map(|(op, operand)| Check::parse(path, op, operand))
                    .collect::<Result<Vec<_>, _>>()?,
                literal => vec![Check::Eq(literal.clone())],
            };
            fields.push(FieldPredicate {
                path: parsed,
                checks,
            });
        }

        Ok(Self {
            fields,
            raw: raw.clone(),
        })
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn matches(&self, value: &Value) -> bool {
        self.fields.iter().all(|field| {
            let current = field.path.lookup(value);
            field.checks.iter().all(|check| check.holds(current))
        })
    }
}
