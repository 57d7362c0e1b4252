//! groundwork CLI library: subcommands and settings loading

pub mod commands;

use anyhow::Context as _;
use shared::Settings;
use std::path::Path;

/// Settings from `path`, or the defaults when no file is given
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let settings = load_settings(None).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "pubsub:\n  buffer: 8\nbucket:\n  name: media").unwrap();

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.pubsub.buffer, 8);
        assert_eq!(settings.bucket.name, "media");
    }

    #[test]
    fn test_error_names_file() {
        let err = load_settings(Some(Path::new("/nonexistent/groundwork.yaml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/groundwork.yaml"));
    }
}
