//! Dynamic values handed back by tool callbacks, and the copiers that turn them into JSON.
//!
//! Tool code is free to return things that have no JSON representation (an absent value,
//! a function handle, a symbol, an integer too wide for JSON). [`AnyValue`] models that
//! full range so the adapter can decide, explicitly, what reaches the model.
use serde_json::{Map, Number, Value};
use strum_macros::{AsRefStr, Display};

use crate::errors::{DeepCopyError, JsonValidationError, ValidationFailure};

/// Deepest nesting either copier will walk. Hand-built values can nest arbitrarily, parsed
/// JSON cannot go past 128 levels.
pub const MAX_COPY_DEPTH: usize = 512;

/// Classification of an [`AnyValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    Undefined,
    Null,
    Boolean,
    Number,
    BigInt,
    String,
    Array,
    Object,
    Function,
    Symbol,
}

/// Any value a tool can produce
#[derive(Debug, Clone, PartialEq)]
pub enum AnyValue {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    BigInt(i128),
    String(String),
    Array(Vec<AnyValue>),
    /// Members in insertion order
    Object(Vec<(String, AnyValue)>),
    /// A callable handle, identified by name only
    Function(String),
    /// An opaque unique token, identified by its description
    Symbol(String),
}

impl AnyValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            AnyValue::Undefined => ValueKind::Undefined,
            AnyValue::Null => ValueKind::Null,
            AnyValue::Bool(_) => ValueKind::Boolean,
            AnyValue::Int(_) | AnyValue::Float(_) => ValueKind::Number,
            AnyValue::BigInt(_) => ValueKind::BigInt,
            AnyValue::String(_) => ValueKind::String,
            AnyValue::Array(_) => ValueKind::Array,
            AnyValue::Object(_) => ValueKind::Object,
            AnyValue::Function(_) => ValueKind::Function,
            AnyValue::Symbol(_) => ValueKind::Symbol,
        }
    }

    pub fn function<S: Into<String>>(name: S) -> Self {
        AnyValue::Function(name.into())
    }

    pub fn symbol<S: Into<String>>(description: S) -> Self {
        AnyValue::Symbol(description.into())
    }

    /// Build an object from key/value pairs, keeping their order
    pub fn object<K, V, I>(members: I) -> Self
    where
        K: Into<String>,
        V: Into<AnyValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        AnyValue::Object(
            members
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// True for string, number and boolean values
    pub fn is_primitive(&self) -> bool {
        matches!(
            self.kind(),
            ValueKind::String | ValueKind::Number | ValueKind::Boolean
        )
    }

    /// Render a primitive the way a script runtime would stringify it.
    /// Returns `None` for anything that is not a string, number or boolean.
    pub fn to_primitive_string(&self) -> Option<String> {
        match self {
            AnyValue::String(s) => Some(s.clone()),
            AnyValue::Bool(b) => Some(b.to_string()),
            AnyValue::Int(i) => Some(i.to_string()),
            AnyValue::Float(f) => Some(format_float(*f)),
            _ => None,
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if f == 0.0 {
        // covers -0.0 too
        "0".to_string()
    } else if f.abs() >= 1e21 || f.abs() < 1e-6 {
        // `{:e}` gives the shortest mantissa, only the exponent sign differs
        let formatted = format!("{:e}", f);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        }
    } else {
        // f64's Display already drops a trailing `.0`
        f.to_string()
    }
}

fn float_to_json(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// Copy a value into JSON with round-trip semantics.
///
/// Object members that hold undefined, a function or a symbol are dropped and the same
/// values inside arrays become `null`. Non-finite floats become `null`. Big integers and a
/// top-level non-serializable value fail.
pub fn deep_copy(value: &AnyValue) -> Result<Value, DeepCopyError> {
    match value {
        AnyValue::Undefined | AnyValue::Function(_) | AnyValue::Symbol(_) => Err(DeepCopyError(
            format!("{} is not JSON serializable", value.kind()),
        )),
        other => copy_lossy(other, 0).map(|v| v.unwrap_or(Value::Null)),
    }
}

// `Ok(None)` marks a value that JSON encoding would omit
fn copy_lossy(value: &AnyValue, depth: usize) -> Result<Option<Value>, DeepCopyError> {
    if depth > MAX_COPY_DEPTH {
        return Err(DeepCopyError(format!(
            "nesting exceeds {} levels",
            MAX_COPY_DEPTH
        )));
    }
    let copied = match value {
        AnyValue::Undefined | AnyValue::Function(_) | AnyValue::Symbol(_) => return Ok(None),
        AnyValue::BigInt(_) => {
            return Err(DeepCopyError(
                "Do not know how to serialize a BigInt".to_string(),
            ))
        }
        AnyValue::Null => Value::Null,
        AnyValue::Bool(b) => Value::Bool(*b),
        AnyValue::Int(i) => Value::Number((*i).into()),
        AnyValue::Float(f) => float_to_json(*f),
        AnyValue::String(s) => Value::String(s.clone()),
        AnyValue::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(copy_lossy(item, depth + 1)?.unwrap_or(Value::Null));
            }
            Value::Array(out)
        }
        AnyValue::Object(members) => {
            let mut out = Map::new();
            for (key, member) in members {
                if let Some(v) = copy_lossy(member, depth + 1)? {
                    out.insert(key.clone(), v);
                }
            }
            Value::Object(out)
        }
    };
    Ok(Some(copied))
}

/// Copy a value into JSON, failing on the first node that has no JSON form.
///
/// `context_path` names the root in the error, e.g. `deep_copy_with_validation(v, "input")`
/// reports `input.items[3].callback` for a function nested in the fourth item.
pub fn deep_copy_with_validation(
    value: &AnyValue,
    context_path: &str,
) -> Result<Value, JsonValidationError> {
    copy_validated(value, context_path, 0)
}

fn copy_validated(
    value: &AnyValue,
    path: &str,
    depth: usize,
) -> Result<Value, JsonValidationError> {
    let fail = |failure| JsonValidationError {
        path: path.to_string(),
        kind: value.kind(),
        failure,
    };
    if depth > MAX_COPY_DEPTH {
        return Err(fail(ValidationFailure::TooDeep));
    }
    match value {
        AnyValue::Undefined
        | AnyValue::Function(_)
        | AnyValue::Symbol(_)
        | AnyValue::BigInt(_) => Err(fail(ValidationFailure::NotSerializable)),
        AnyValue::Null => Ok(Value::Null),
        AnyValue::Bool(b) => Ok(Value::Bool(*b)),
        AnyValue::Int(i) => Ok(Value::Number((*i).into())),
        AnyValue::Float(f) => Ok(float_to_json(*f)),
        AnyValue::String(s) => Ok(Value::String(s.clone())),
        AnyValue::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| copy_validated(item, &format!("{}[{}]", path, i), depth + 1))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AnyValue::Object(members) => {
            let mut out = Map::new();
            for (key, member) in members {
                let copied = copy_validated(member, &format!("{}.{}", path, key), depth + 1)?;
                out.insert(key.clone(), copied);
            }
            Ok(Value::Object(out))
        }
    }
}

impl From<Value> for AnyValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AnyValue::Null,
            Value::Bool(b) => AnyValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AnyValue::Int(i),
                // Unsigned values past i64::MAX become floats and may lose precision, the
                // same as any JSON number parsed by a script runtime. Mapping them to BigInt
                // would make valid JSON input fail to copy back out.
                None => AnyValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => AnyValue::String(s),
            Value::Array(items) => AnyValue::Array(items.into_iter().map(AnyValue::from).collect()),
            Value::Object(members) => AnyValue::Object(
                members
                    .into_iter()
                    .map(|(k, v)| (k, AnyValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<()> for AnyValue {
    fn from(_: ()) -> Self {
        AnyValue::Undefined
    }
}

impl From<bool> for AnyValue {
    fn from(b: bool) -> Self {
        AnyValue::Bool(b)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for AnyValue {
            fn from(i: $t) -> Self {
                AnyValue::Int(i as i64)
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for AnyValue {
    fn from(f: f32) -> Self {
        AnyValue::Float(f as f64)
    }
}

impl From<f64> for AnyValue {
    fn from(f: f64) -> Self {
        AnyValue::Float(f)
    }
}

impl From<i128> for AnyValue {
    fn from(i: i128) -> Self {
        AnyValue::BigInt(i)
    }
}

impl From<&str> for AnyValue {
    fn from(s: &str) -> Self {
        AnyValue::String(s.to_string())
    }
}

impl From<String> for AnyValue {
    fn from(s: String) -> Self {
        AnyValue::String(s)
    }
}

impl<T: Into<AnyValue>> From<Vec<T>> for AnyValue {
    fn from(items: Vec<T>) -> Self {
        AnyValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AnyValue>> From<Option<T>> for AnyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(AnyValue::Null)
    }
}
