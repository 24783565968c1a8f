//! Typed values and the kinds that drive casting.
//!
//! Every key carries an explicit [`Kind`]. The kind decides how a fragment
//! string is cast into a [`Value`] and how a value is rendered back. Casting
//! is permissive, rendering is canonical: `"1"` casts to `true` for a boolean
//! key, but `true` always renders as `"yes"`.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between array members in the fragment.
pub const ARRAY_SEPARATOR: char = ',';

/// Kind of a single (non-array) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Number,
    Str,
}

impl ScalarKind {
    /// Cast a fragment string into a value of this kind.
    pub fn cast(self, raw: &str) -> Value {
        match self {
            ScalarKind::Bool => Value::Bool(raw == "yes" || to_number(raw) == 1.0),
            ScalarKind::Number => Value::Number(to_number(raw)),
            ScalarKind::Str => Value::Str(raw.to_string()),
        }
    }

    /// Check whether a value already has this kind.
    pub fn admits(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ScalarKind::Bool, Value::Bool(_))
                | (ScalarKind::Number, Value::Number(_))
                | (ScalarKind::Str, Value::Str(_))
        )
    }

    /// Normalize a value to this kind.
    pub fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (ScalarKind::Number, Value::Bool(b)) => Value::Number(if b { 1.0 } else { 0.0 }),
            (kind, value) if kind.admits(&value) => value,
            (kind, value) => kind.cast(&value.render()),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Bool => write!(f, "bool"),
            ScalarKind::Number => write!(f, "number"),
            ScalarKind::Str => write!(f, "string"),
        }
    }
}

impl FromStr for ScalarKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" | "boolean" => Ok(ScalarKind::Bool),
            "number" => Ok(ScalarKind::Number),
            "string" => Ok(ScalarKind::Str),
            other => Err(Error::InvalidKind(other.to_string())),
        }
    }
}

/// Kind of a key, supplied alongside its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Kind {
    Bool,
    Number,
    Str,
    /// Multi-valued key, members separated by `,` in the fragment
    Array(ScalarKind),
}

impl Kind {
    /// Infer the kind of a default value.
    ///
    /// Empty arrays infer `string[]`. Returns `None` for nested or mixed arrays.
    pub fn of(value: &Value) -> Option<Kind> {
        match value {
            Value::Bool(_) => Some(Kind::Bool),
            Value::Number(_) => Some(Kind::Number),
            Value::Str(_) => Some(Kind::Str),
            Value::Array(items) => {
                let element = match items.first() {
                    None => return Some(Kind::Array(ScalarKind::Str)),
                    Some(first) => Kind::of(first)?.scalar()?,
                };
                items
                    .iter()
                    .all(|item| element.admits(item))
                    .then_some(Kind::Array(element))
            }
        }
    }

    /// The scalar kind for non-array kinds.
    pub fn scalar(self) -> Option<ScalarKind> {
        match self {
            Kind::Bool => Some(ScalarKind::Bool),
            Kind::Number => Some(ScalarKind::Number),
            Kind::Str => Some(ScalarKind::Str),
            Kind::Array(_) => None,
        }
    }

    /// The member kind for array kinds.
    pub fn element(self) -> Option<ScalarKind> {
        match self {
            Kind::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(self, Kind::Array(_))
    }

    /// Cast a fragment string into a value of this kind.
    pub fn cast(self, raw: &str) -> Value {
        match self {
            Kind::Array(_) if raw.is_empty() => Value::Array(Vec::new()),
            Kind::Array(element) => Value::Array(
                raw.split(ARRAY_SEPARATOR)
                    .map(|member| element.cast(member))
                    .collect(),
            ),
            Kind::Bool => ScalarKind::Bool.cast(raw),
            Kind::Number => ScalarKind::Number.cast(raw),
            Kind::Str => ScalarKind::Str.cast(raw),
        }
    }

    /// Check whether a value already has this kind.
    pub fn admits(self, value: &Value) -> bool {
        match (self, value) {
            (Kind::Array(element), Value::Array(items)) => {
                items.iter().all(|item| element.admits(item))
            }
            (Kind::Array(_), _) => false,
            (scalar, value) => scalar.scalar().is_some_and(|kind| kind.admits(value)),
        }
    }

    /// Normalize a caller-supplied value to this kind.
    ///
    /// Values that already match pass through untouched; anything else goes
    /// through its fragment rendering and is cast back.
    pub fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (Kind::Array(element), Value::Array(items)) => {
                Value::Array(items.into_iter().map(|v| element.coerce(v)).collect())
            }
            (kind, value) if kind.admits(&value) => value,
            (Kind::Array(_), value) => self.cast(&value.render()),
            (scalar, value) => match scalar.scalar() {
                Some(kind) => kind.coerce(value),
                None => value,
            },
        }
    }

    /// Canonical fragment rendering of a value for this kind.
    pub fn render(self, value: &Value) -> String {
        if self.admits(value) {
            value.render()
        } else {
            self.coerce(value.clone()).render()
        }
    }
}

impl From<ScalarKind> for Kind {
    fn from(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Kind::Bool,
            ScalarKind::Number => Kind::Number,
            ScalarKind::Str => Kind::Str,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => write!(f, "bool"),
            Kind::Number => write!(f, "number"),
            Kind::Str => write!(f, "string"),
            Kind::Array(element) => write!(f, "{}[]", element),
        }
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_suffix("[]") {
            Some(element) => Ok(Kind::Array(element.parse()?)),
            None => Ok(s.parse::<ScalarKind>()?.into()),
        }
    }
}

impl TryFrom<String> for Kind {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> Self {
        kind.to_string()
    }
}

/// A typed key value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Vec<Value>),
}

impl Value {
    /// Canonical fragment rendering.
    ///
    /// Booleans become `yes`/`no`, arrays join their members with `,`
    /// (the empty array renders as the empty string).
    pub fn render(&self) -> String {
        match self {
            Value::Bool(true) => "yes".to_string(),
            Value::Bool(false) => "no".to_string(),
            Value::Number(n) => format_number(*n),
            Value::Str(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(Value::render)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Numeric coercion with unary-plus semantics.
///
/// Whitespace is trimmed and the empty string is zero. Decimal and exponent
/// notation, `0x`/`0o`/`0b` prefixes and `Infinity` are accepted; everything
/// else is NaN.
pub fn to_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() || digits.starts_with('+') {
            return f64::NAN;
        }
        return u64::from_str_radix(digits, radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // `f64::from_str` also takes "inf", "nan" and friends
    if trimmed
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E'))
    {
        return f64::NAN;
    }

    trimmed.parse().unwrap_or(f64::NAN)
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}
