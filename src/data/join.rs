use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::RawBar;

/// Outer join of several providers' bar sequences on timestamp.
///
/// The result holds the union of all timestamps, ordered. Fields merge
/// per timestamp: the first frame carrying a value for a field wins,
/// later frames only fill gaps. A field no frame carries stays absent,
/// to be dropped by cleaning. Duplicate timestamps within one frame
/// merge the same way.
pub fn outer_join(frames: Vec<Vec<RawBar>>) -> Vec<RawBar> {
    let mut merged: BTreeMap<DateTime<Utc>, RawBar> = BTreeMap::new();

    for frame in frames {
        for bar in frame {
            merged
                .entry(bar.timestamp)
                .and_modify(|existing| fill_missing(existing, &bar))
                .or_insert(bar);
        }
    }

    merged.into_values().collect()
}

fn fill_missing(existing: &mut RawBar, other: &RawBar) {
    existing.open = existing.open.or(other.open);
    existing.high = existing.high.or(other.high);
    existing.low = existing.low.or(other.low);
    existing.close = existing.close.or(other.close);
    existing.volume = existing.volume.or(other.volume);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap()
    }

    /// Bar carrying only a close price (e.g. a quotes-only provider).
    fn close_only(timestamp: DateTime<Utc>, close: f64) -> RawBar {
        RawBar {
            timestamp,
            open: None,
            high: None,
            low: None,
            close: Some(close),
            volume: None,
        }
    }

    #[test]
    fn test_union_of_timestamps() {
        // Provider A covers t1, t2 with partial fields; provider B
        // covers t2, t3 in full
        let a = vec![close_only(ts(1), 100.0), close_only(ts(2), 101.0)];
        let b = vec![
            RawBar::complete(ts(2), 101.0, 102.0, 100.0, 101.5, 500.0),
            RawBar::complete(ts(3), 101.5, 103.0, 101.0, 102.0, 600.0),
        ];

        let joined = outer_join(vec![a, b]);

        assert_eq!(joined.len(), 3);
        assert_eq!(joined[0].timestamp, ts(1));
        assert_eq!(joined[1].timestamp, ts(2));
        assert_eq!(joined[2].timestamp, ts(3));

        // t1 only has A's close; the rest stays absent
        assert!(joined[0].clean().is_none());
        // t2 merges: A's close wins, B fills the rest
        let t2 = joined[1].clean().unwrap();
        assert_eq!(t2.close, 101.0);
        assert_eq!(t2.volume, 500.0);
        // t3 is B's complete bar
        assert!(joined[2].clean().is_some());
    }

    #[test]
    fn test_first_frame_wins_on_conflict() {
        let a = vec![RawBar::complete(ts(0), 1.0, 1.0, 1.0, 1.0, 10.0)];
        let b = vec![RawBar::complete(ts(0), 2.0, 2.0, 2.0, 2.0, 20.0)];

        let joined = outer_join(vec![a, b]);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].close, Some(1.0));
    }

    #[test]
    fn test_duplicates_within_one_frame_merge() {
        let a = vec![close_only(ts(0), 5.0), close_only(ts(0), 6.0)];

        let joined = outer_join(vec![a]);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].close, Some(5.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(outer_join(vec![]).is_empty());
        assert!(outer_join(vec![vec![], vec![]]).is_empty());
    }

    #[test]
    fn test_output_is_ordered() {
        let a = vec![close_only(ts(9), 1.0), close_only(ts(3), 2.0)];
        let b = vec![close_only(ts(6), 3.0)];

        let joined = outer_join(vec![a, b]);
        let stamps: Vec<_> = joined.iter().map(|b| b.timestamp).collect();
        assert_eq!(stamps, vec![ts(3), ts(6), ts(9)]);
    }
}
