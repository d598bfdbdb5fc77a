use crate::error::{HubspotError, Result};
use crate::time::Time;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::ops::{Range, RangeInclusive};
use url::form_urlencoded;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Time(Time),
}

impl Scalar {
    /// Query-string form: times become epoch milliseconds, anything else is
    /// stringified and escaped.
    fn converted(&self) -> String {
        match self {
            Scalar::Time(time) => time.to_param_millis().to_string(),
            other => escape(&other.to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Int(i) => write!(f, "{}", i),
            // Debug keeps the decimal point on whole floats (1.0, not 1)
            Scalar::Float(x) => write!(f, "{:?}", x),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Time(t) => write!(f, "{}", t.0),
        }
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<Time> for Scalar {
    fn from(value: Time) -> Self {
        Scalar::Time(value)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(value: DateTime<Utc>) -> Self {
        Scalar::Time(Time(value))
    }
}

/// Value stored in a parameter bag.
///
/// A `List` repeats its key once per element; a `Range` is only accepted
/// under keys containing `range` and expands to a start/end pair.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(Scalar),
    Range(Scalar, Scalar),
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Build a two-ended interval
    pub fn range(start: impl Into<Scalar>, end: impl Into<Scalar>) -> Self {
        ParamValue::Range(start.into(), end.into())
    }

    /// Anything other than an explicit `false` counts as set
    pub fn is_truthy(&self) -> bool {
        !matches!(self, ParamValue::Scalar(Scalar::Bool(false)))
    }

    fn converted(&self) -> String {
        match self {
            ParamValue::Scalar(scalar) => scalar.converted(),
            other => escape(&other.to_string()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Scalar(scalar) => scalar.fmt(f),
            ParamValue::Range(start, end) => write!(f, "{}..{}", start, end),
            ParamValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    item.fmt(f)?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::Scalar(value.into())
                }
            }
        )*
    };
}

impl_from_scalar!(String, &str, i32, u32, i64, f64, bool, Time, DateTime<Utc>);

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        ParamValue::Scalar(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Scalar>> From<Range<T>> for ParamValue {
    fn from(range: Range<T>) -> Self {
        ParamValue::range(range.start, range.end)
    }
}

impl<T: Into<Scalar>> From<RangeInclusive<T>> for ParamValue {
    fn from(range: RangeInclusive<T>) -> Self {
        let (start, end) = range.into_inner();
        ParamValue::range(start, end)
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Scalar::Str(String::new()).into(),
            Value::Bool(b) => b.into(),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => i.into(),
                (None, Some(x)) => x.into(),
                (None, None) => n.to_string().into(),
            },
            Value::String(s) => s.into(),
            Value::Array(items) => ParamValue::List(items.into_iter().map(Into::into).collect()),
            object @ Value::Object(_) => object.to_string().into(),
        }
    }
}

/// Params is the insertion-ordered parameter bag passed to a single call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(IndexMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Params(IndexMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove a value, preserving the order of the remaining entries
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = indexmap::map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<serde_json::Map<String, Value>> for Params {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

/// How a key is encoded, decided once from the key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRule {
    /// Key contains `range`: the value must be a range, emitted as two fragments
    Range,
    /// Key is `batch_<rest>`: emitted under the camel-cased `<rest>`
    BatchRename(String),
    Plain,
}

impl KeyRule {
    pub fn classify(key: &str) -> Self {
        if key.contains("range") {
            KeyRule::Range
        } else if let Some(rest) = key.strip_prefix("batch_") {
            KeyRule::BatchRename(camelize(rest))
        } else {
            KeyRule::Plain
        }
    }

    /// Encode one non-list value under this rule
    fn encode(&self, key: &str, value: &ParamValue) -> Result<String> {
        match (self, value) {
            (KeyRule::Range, ParamValue::Range(start, end)) => Ok(format!(
                "{key}={}&{key}={}",
                start.converted(),
                end.converted(),
                key = key
            )),
            (KeyRule::Range, _) => Err(HubspotError::InvalidParams(format!(
                "value for `{}` must be a range",
                key
            ))),
            (_, ParamValue::List(_)) => Err(HubspotError::InvalidParams(format!(
                "nested list for `{}` cannot be encoded",
                key
            ))),
            (KeyRule::BatchRename(name), value) => Ok(format!("{}={}", name, value.converted())),
            (KeyRule::Plain, value) => Ok(format!("{}={}", key, value.converted())),
        }
    }
}

/// `foo_bar_baz` -> `fooBarBaz`: the character after each underscore is
/// upper-cased and the underscore dropped.
fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars();
    while let Some(c) = chars.next() {
        if c != '_' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next) => out.extend(next.to_uppercase()),
            None => out.push('_'),
        }
    }
    out
}

/// Form-style percent escaping (space becomes `+`)
pub(crate) fn escape(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Encode one parameter into `key=value` fragments joined by `&`.
///
/// Lists fan out: every element is encoded under the same key rule.
pub fn encode_param(key: &str, value: &ParamValue) -> Result<String> {
    let rule = KeyRule::classify(key);
    match value {
        ParamValue::List(items) => {
            let fragments = items
                .iter()
                .map(|item| rule.encode(key, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(fragments.join("&"))
        }
        single => rule.encode(key, single),
    }
}

/// Encode a whole bag as a query string (without the leading `?`).
pub fn encode_query(params: &Params) -> Result<String> {
    let mut fragments = Vec::with_capacity(params.len());
    for (key, value) in params.iter() {
        let fragment = encode_param(key, value)?;
        // empty lists contribute nothing
        if !fragment.is_empty() {
            fragments.push(fragment);
        }
    }
    Ok(fragments.join("&"))
}
