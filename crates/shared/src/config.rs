//! Configuration types for groundwork
//!
//! Settings are read from a YAML or JSON file; every section has defaults so
//! an empty document is valid.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogSettings {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub format: LogFormat,
    /// Logger name recorded on every event emitted through `TracingLogger`
    pub name: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            name: "groundwork".to_string(),
        }
    }
}

/// Cache section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheSettings {
    /// Prefix prepended to every key by the memory adapter
    pub namespace: Option<String>,
}

/// Pub/sub section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PubSubSettings {
    /// Per-subscriber delivery buffer
    pub buffer: usize,
}

impl Default for PubSubSettings {
    fn default() -> Self {
        Self { buffer: 1024 }
    }
}

/// Object storage section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BucketSettings {
    pub name: String,
    /// Largest object the memory adapter accepts, in bytes
    pub max_object_size: u64,
}

impl Default for BucketSettings {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            max_object_size: 64 * 1024 * 1024,
        }
    }
}

/// Top-level settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub log: LogSettings,
    pub cache: CacheSettings,
    pub pubsub: PubSubSettings,
    pub bucket: BucketSettings,
    /// Upper bound for graceful shutdown, in seconds
    pub shutdown_timeout_secs: Option<u64>,
}

impl Settings {
    /// Load settings from a YAML (`.yaml`/`.yml`) or JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            other => {
                return Err(Error::Config(format!(
                    "unsupported settings format: {}",
                    other.unwrap_or("<none>")
                )))
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the adapters cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.pubsub.buffer == 0 {
            return Err(Error::Config("pubsub.buffer must be positive".to_string()));
        }
        if self.bucket.name.trim().is_empty() {
            return Err(Error::Config("bucket.name must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs.unwrap_or(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    #[test]
    fn test_config_parse_yaml() {
        let yaml = r#"
log:
  level: debug
  format: json
pubsub:
  buffer: 16
shutdownTimeoutSecs: 3
"#;

        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.log.level, "debug");
        assert_eq!(settings.log.format, LogFormat::Json);
        assert_eq!(settings.pubsub.buffer, 16);
        assert_eq!(settings.bucket, BucketSettings::default());
        assert_eq!(settings.shutdown_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_from_file_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"bucket": {{"name": "media"}}, "cache": {{"namespace": "app"}}}}"#)
            .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.bucket.name, "media");
        assert_eq!(settings.cache.namespace.as_deref(), Some("app"));
        assert_eq!(settings.log, LogSettings::default());
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let err = Settings::from_file(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_validate_zero_buffer() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "pubsub:\n  buffer: 0").unwrap();

        let err = Settings::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("pubsub.buffer"));
    }
}
