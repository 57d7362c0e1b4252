//! Stats - Object metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata of an object, retrieved without transferring its body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of objects in the bucket at the time of the call
    pub total: u64,
    /// Object size in bytes
    pub size: u64,
    pub content_type: String,
    pub last_modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_camel_case_json() {
        let stats = Stats {
            total: 3,
            size: 12,
            content_type: "image/png".to_string(),
            last_modified: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["contentType"], "image/png");
        assert_eq!(json["lastModified"], "2024-05-01T12:00:00Z");

        let back: Stats = serde_json::from_value(json).unwrap();
        assert_eq!(back, stats);
    }
}
