//! Fields - Ordered key/value pairs attached to a structured log line

use serde_json::{Map, Value};
use shared::{Error, Result};
use std::fmt;

/// Ordered structured-logging context.
///
/// Built pair by pair, so it can never hold a key without a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(String, Value)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.push((key.into(), value.into()));
    }

    /// Build from a flat `key, value, key, value, ...` list.
    ///
    /// Odd-length lists and non-string keys are rejected with
    /// [`Error::InvalidInput`].
    pub fn from_key_values(key_values: Vec<Value>) -> Result<Self> {
        if key_values.len() % 2 != 0 {
            return Err(Error::invalid_input(format!(
                "odd number of structured log arguments ({})",
                key_values.len()
            )));
        }

        let mut fields = Fields::new();
        let mut iter = key_values.into_iter();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            match key {
                Value::String(key) => fields.insert(key, value),
                other => {
                    return Err(Error::invalid_input(format!(
                        "structured log key must be a string, got {}",
                        other
                    )))
                }
            }
        }
        Ok(fields)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// JSON object view; a repeated key keeps its last value
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self.0.iter().cloned().collect();
        Value::Object(map)
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match value {
                Value::String(s) => write!(f, "{}={}", key, s)?,
                other => write!(f, "{}={}", key, other)?,
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Fields(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Build [`Fields`] from `key => value` pairs
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Fields::new()$(.with($key, $value))+
    };
}
