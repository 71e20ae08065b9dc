//! Player record type and timestamp handling

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp layout used by the upstream source (naive, source-local)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A player record as returned by the upstream source.
///
/// `id` and `name` are mandatory; a page containing an item without them
/// fails to parse as a whole. `updated_at` is nullable upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Upstream-assigned identifier; monotonically increasing but not
    /// guaranteed contiguous
    pub id: u64,
    /// Display name
    pub name: String,
    /// Last-update timestamp in `TIMESTAMP_FORMAT`, if known
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Player {
    /// Calendar date of the last update. `None` when the timestamp is
    /// absent or does not match `TIMESTAMP_FORMAT`.
    pub fn updated_date(&self) -> Option<NaiveDate> {
        let raw = self.updated_at.as_deref()?;
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
            .ok()
            .map(|ts| ts.date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updated_date_parses() {
        let player = Player {
            id: 1,
            name: "somebody".to_string(),
            updated_at: Some("2024-03-01T12:30:00".to_string()),
        };
        assert_eq!(
            player.updated_date(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn test_updated_date_absent() {
        let player = Player {
            id: 1,
            name: "somebody".to_string(),
            updated_at: None,
        };
        assert!(player.updated_date().is_none());
    }

    #[test]
    fn test_updated_date_malformed() {
        let player = Player {
            id: 1,
            name: "somebody".to_string(),
            updated_at: Some("01/03/2024".to_string()),
        };
        assert!(player.updated_date().is_none());
    }

    #[test]
    fn test_json_round_trip_keeps_fields() {
        let player = Player {
            id: 42,
            name: "somebody".to_string(),
            updated_at: Some("2024-03-01T12:30:00".to_string()),
        };
        let json = serde_json::to_string(&player).unwrap();
        let back: Player = serde_json::from_str(&json).unwrap();
        assert_eq!(back, player);
    }
}
