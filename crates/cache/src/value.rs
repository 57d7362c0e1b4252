//! CacheValue - What a cache key holds

use serde::{Deserialize, Serialize};
use shared::{Error, Result};

/// Value stored under a cache key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheValue {
    /// The key exists but carries no value
    Nil,
    Text(String),
}

impl CacheValue {
    pub fn is_nil(&self) -> bool {
        matches!(self, CacheValue::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CacheValue::Nil => None,
            CacheValue::Text(s) => Some(s),
        }
    }

    /// Text content, or [`Error::CacheNil`] for the nil sentinel
    pub fn into_string(self) -> Result<String> {
        match self {
            CacheValue::Nil => Err(Error::CacheNil),
            CacheValue::Text(s) => Ok(s),
        }
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::Text(value)
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::Text(value.to_string())
    }
}

impl From<Option<String>> for CacheValue {
    fn from(value: Option<String>) -> Self {
        value.map(CacheValue::Text).unwrap_or(CacheValue::Nil)
    }
}

macro_rules! impl_from_display {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CacheValue {
                fn from(value: $t) -> Self {
                    CacheValue::Text(value.to_string())
                }
            }
        )*
    };
}

impl_from_display!(i32, i64, u32, u64, f64, bool);
