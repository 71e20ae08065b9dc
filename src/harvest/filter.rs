//! Page parsing and record retention predicates

use chrono::{Days, NaiveDate};
use serde_json::Value;

use super::errors::SourceError;
use super::models::Player;

/// Display names at or above this length are dropped
const MAX_NAME_LEN: usize = 13;

/// A parsed page: the retained records plus the raw-page statistics the
/// cursor needs.
#[derive(Debug)]
pub struct ParsedPage {
    /// Records that survived both retention predicates, in page order
    pub players: Vec<Player>,
    /// Maximum identifier of the RAW page (before filtering); `None` for an
    /// empty page. The cursor advances on this, not on the filtered subset,
    /// so filtered-out records are never refetched forever.
    pub max_raw_id: Option<u64>,
    /// Raw page size before filtering (undersized-page detection input)
    pub raw_len: usize,
}

/// True if the record's last-update date falls inside the inclusive range
/// `[today - delta_days, today]`. Absent or unparseable timestamps are
/// outside the range.
pub fn in_lookback(player: &Player, today: NaiveDate, delta_days: i64) -> bool {
    let Some(date) = player.updated_date() else {
        return false;
    };
    let limit = today - Days::new(delta_days.max(0) as u64);
    limit <= date && date <= today
}

/// Retention predicate: short name AND not freshly updated. Records inside
/// the lookback range are deferred to a later cycle rather than dropped for
/// good; the daily reset or a window shrink re-includes them.
pub fn retain(player: &Player, today: NaiveDate, delta_days: i64) -> bool {
    player.name.chars().count() < MAX_NAME_LEN && !in_lookback(player, today, delta_days)
}

/// Parse a raw page into `Player`s and apply the retention predicates.
///
/// Any item missing a mandatory field fails the WHOLE page with
/// `SourceError::PageParse`; there is no per-item skip.
pub fn parse_page(
    items: Vec<Value>,
    today: NaiveDate,
    delta_days: i64,
) -> Result<ParsedPage, SourceError> {
    let raw_len = items.len();
    let mut players = Vec::with_capacity(raw_len);
    for item in items {
        let player: Player = serde_json::from_value(item)
            .map_err(|e| SourceError::PageParse(e.to_string()))?;
        players.push(player);
    }

    let max_raw_id = players.iter().map(|p| p.id).max();
    players.retain(|p| retain(p, today, delta_days));

    Ok(ParsedPage {
        players,
        max_raw_id,
        raw_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn player(id: u64, name: &str, updated_at: Option<&str>) -> Player {
        Player {
            id,
            name: name.to_string(),
            updated_at: updated_at.map(String::from),
        }
    }

    fn today() -> NaiveDate {
        day(2024, 3, 15)
    }

    #[test]
    fn test_fresh_record_deferred() {
        // updated today, window 7 -> inside range -> dropped this cycle
        let p = player(1, "shortname12", Some("2024-03-15T08:00:00"));
        assert!(!retain(&p, today(), 7));
    }

    #[test]
    fn test_stale_record_retained() {
        // updated 14 days ago, window 7 -> outside range -> kept
        let p = player(1, "shortname12", Some("2024-03-01T08:00:00"));
        assert!(retain(&p, today(), 7));
    }

    #[test]
    fn test_range_is_inclusive_at_both_ends() {
        let boundary = player(1, "abc", Some("2024-03-08T00:00:00"));
        assert!(in_lookback(&boundary, today(), 7));

        let today_edge = player(2, "abc", Some("2024-03-15T23:59:59"));
        assert!(in_lookback(&today_edge, today(), 7));

        let just_outside = player(3, "abc", Some("2024-03-07T23:59:59"));
        assert!(!in_lookback(&just_outside, today(), 7));
    }

    #[test]
    fn test_long_name_excluded_regardless_of_timestamp() {
        let p = player(1, "exactly13char", Some("2023-01-01T00:00:00"));
        assert!(!retain(&p, today(), 7));

        let p = player(2, "exactly13char", None);
        assert!(!retain(&p, today(), 7));
    }

    #[test]
    fn test_twelve_char_name_retained() {
        let p = player(1, "exactly12cha", None);
        assert!(retain(&p, today(), 7));
    }

    #[test]
    fn test_missing_timestamp_outside_range() {
        let p = player(1, "abc", None);
        assert!(!in_lookback(&p, today(), 7));
        assert!(retain(&p, today(), 7));
    }

    #[test]
    fn test_malformed_timestamp_outside_range() {
        let p = player(1, "abc", Some("not-a-date"));
        assert!(!in_lookback(&p, today(), 7));
        assert!(retain(&p, today(), 7));
    }

    #[test]
    fn test_parse_page_tracks_raw_max_id() {
        // max id comes from the raw page even though that record is filtered
        let items = vec![
            json!({"id": 5001, "name": "keepable", "updated_at": "2024-01-01T00:00:00"}),
            json!({"id": 5042, "name": "waytoolongname99", "updated_at": "2024-01-01T00:00:00"}),
        ];
        let page = parse_page(items, today(), 7).unwrap();
        assert_eq!(page.max_raw_id, Some(5042));
        assert_eq!(page.raw_len, 2);
        assert_eq!(page.players.len(), 1);
        assert_eq!(page.players[0].id, 5001);
    }

    #[test]
    fn test_parse_page_preserves_page_order() {
        let items = vec![
            json!({"id": 3, "name": "c", "updated_at": null}),
            json!({"id": 1, "name": "a", "updated_at": null}),
            json!({"id": 2, "name": "b", "updated_at": null}),
        ];
        let page = parse_page(items, today(), 7).unwrap();
        let ids: Vec<u64> = page.players.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_parse_page_empty() {
        let page = parse_page(Vec::new(), today(), 7).unwrap();
        assert_eq!(page.max_raw_id, None);
        assert_eq!(page.raw_len, 0);
        assert!(page.players.is_empty());
    }

    #[test]
    fn test_missing_mandatory_field_fails_whole_page() {
        let items = vec![
            json!({"id": 1, "name": "fine", "updated_at": null}),
            json!({"id": 2, "updated_at": null}),
        ];
        let err = parse_page(items, today(), 7).unwrap_err();
        assert!(matches!(err, SourceError::PageParse(_)));
    }
}
