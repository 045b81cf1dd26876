use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::aggregate::{TrackRollup, top_tracks};
use super::{QueryError, Result};
use crate::data::Dataset;

/// Average chart position of a track in one chart week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionPoint {
    pub week: NaiveDate,
    pub average_position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioFeatures {
    pub danceability: f64,
    pub tempo: f64,
    pub energy: f64,
    pub valence: f64,
}

/// Headline artist figures, from the first joined row of the track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackInfo {
    pub artist_name: String,
    pub popularity: Option<f64>,
    pub followers: Option<f64>,
    pub explicit: bool,
}

/// Everything displayed for one (year, track) selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSelection {
    pub year: i32,
    #[serde(flatten)]
    pub rollup: TrackRollup,
    pub info: TrackInfo,
    pub performance: Vec<PositionPoint>,
    pub features: AudioFeatures,
}

/// Format milliseconds as `"{minutes}m {seconds}s"`, truncating.
pub fn format_duration(ms: i64) -> Result<String> {
    if ms < 0 {
        return Err(QueryError::InvalidArgument(format!(
            "duration must be non-negative, got {ms} ms"
        )));
    }
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    Ok(format!("{minutes}m {seconds}s"))
}

/// Resolve a year and track name into a display record.
///
/// The track must be among the year's top `limit` tracks. When several
/// track ids share the name, the first rollup row (lowest track id) wins.
pub fn resolve(
    dataset: &Dataset,
    rollups: &[TrackRollup],
    year: i32,
    track_name: &str,
    limit: usize,
) -> Result<TrackSelection> {
    let top = top_tracks(dataset.weekly(), year, limit)?;
    if !top.iter().any(|t| t.track_name == track_name) {
        return Err(QueryError::NotFound(format!(
            "\"{track_name}\" is not among the top {limit} tracks of {year}"
        )));
    }

    let rollup = rollups
        .iter()
        .find(|r| r.track_name == track_name)
        .ok_or_else(|| {
            QueryError::NotFound(format!("no track/artist rows for \"{track_name}\""))
        })?;

    let rows: Vec<_> = dataset
        .tracks()
        .iter()
        .filter(|r| r.track_name == track_name)
        .collect();
    let Some(first) = rows.first() else {
        return Err(QueryError::NotFound(format!(
            "no track/artist rows for \"{track_name}\""
        )));
    };

    // Co-credited artists repeat the same week; average them out.
    let mut by_week: BTreeMap<NaiveDate, (u64, u32)> = BTreeMap::new();
    for row in &rows {
        let slot = by_week.entry(row.chart_week).or_insert((0, 0));
        slot.0 += u64::from(row.list_position);
        slot.1 += 1;
    }
    let performance = by_week
        .into_iter()
        .map(|(week, (sum, n))| PositionPoint {
            week,
            average_position: sum as f64 / f64::from(n),
        })
        .collect();

    log::debug!(
        "Resolved \"{}\" ({}) for {}: {} rows",
        track_name,
        rollup.track_id,
        year,
        rows.len()
    );

    Ok(TrackSelection {
        year,
        rollup: rollup.clone(),
        info: TrackInfo {
            artist_name: first.artist_name.clone(),
            popularity: first.popularity,
            followers: first.followers,
            explicit: first.explicit,
        },
        performance,
        features: AudioFeatures {
            danceability: first.danceability,
            tempo: first.tempo,
            energy: first.energy,
            valence: first.valence,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::aggregate::tests::{entry, record, week};
    use crate::query::aggregate::{WeeksPolicy, build_rollup};

    fn scenario() -> Dataset {
        let weekly = vec![
            entry("A", week(2020, 1, 1), 5),
            entry("A", week(2020, 1, 8), 3),
            entry("A", week(2020, 1, 15), 1),
            entry("B", week(2020, 1, 1), 7),
            entry("Old", week(2019, 12, 25), 2),
        ];
        let tracks = vec![
            record("a1", "A", "Singer", week(2020, 1, 15), 1),
            record("a1", "A", "Singer", week(2020, 1, 1), 5),
            record("a1", "A", "Singer", week(2020, 1, 8), 3),
            record("b1", "B", "Lead", week(2020, 1, 1), 7),
            record("b1", "B", "Guest", week(2020, 1, 1), 9),
            record("o1", "Old", "Someone", week(2019, 12, 25), 2),
        ];
        Dataset::from_records(weekly, tracks)
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0).unwrap(), "0m 0s");
        assert_eq!(format_duration(61_000).unwrap(), "1m 1s");
        assert_eq!(format_duration(600_000).unwrap(), "10m 0s");
        // Truncates, never rounds up
        assert_eq!(format_duration(119_999).unwrap(), "1m 59s");
        assert_eq!(format_duration(999).unwrap(), "0m 0s");
    }

    #[test]
    fn test_format_duration_negative() {
        assert!(matches!(format_duration(-1), Err(QueryError::InvalidArgument(_))));
    }

    #[test]
    fn test_resolve_scenario() {
        let ds = scenario();
        let rollups = build_rollup(ds.tracks(), WeeksPolicy::Distinct).unwrap();
        let sel = resolve(&ds, &rollups, 2020, "A", 10).unwrap();

        assert_eq!(sel.rollup.weeks_on_chart, 3);
        assert_eq!(sel.rollup.track_id, "a1");
        let weeks: Vec<_> = sel.performance.iter().map(|p| p.week).collect();
        assert_eq!(weeks, vec![week(2020, 1, 1), week(2020, 1, 8), week(2020, 1, 15)]);
        let positions: Vec<_> = sel.performance.iter().map(|p| p.average_position).collect();
        assert_eq!(positions, vec![5.0, 3.0, 1.0]);
    }

    #[test]
    fn test_resolve_averages_co_artist_rows() {
        let ds = scenario();
        let rollups = build_rollup(ds.tracks(), WeeksPolicy::Distinct).unwrap();
        let sel = resolve(&ds, &rollups, 2020, "B", 10).unwrap();

        assert_eq!(sel.performance.len(), 1);
        assert!((sel.performance[0].average_position - 8.0).abs() < 1e-9);
        assert_eq!(sel.rollup.artist_names, vec!["Lead", "Guest"]);
        assert_eq!(sel.info.artist_name, "Lead");
    }

    #[test]
    fn test_resolve_features_from_first_row() {
        let mut ds_tracks = scenario().tracks().to_vec();
        ds_tracks[0].valence = 0.9;
        ds_tracks[1].valence = 0.1;
        let ds = Dataset::from_records(scenario().weekly().to_vec(), ds_tracks);
        let rollups = build_rollup(ds.tracks(), WeeksPolicy::Distinct).unwrap();

        let sel = resolve(&ds, &rollups, 2020, "A", 10).unwrap();
        assert_eq!(sel.features.valence, 0.9);
        assert_eq!(sel.features.tempo, 171.005);
        assert!(!sel.info.explicit);
    }

    #[test]
    fn test_resolve_not_in_top_tracks() {
        let ds = scenario();
        let rollups = build_rollup(ds.tracks(), WeeksPolicy::Distinct).unwrap();

        // Charted, but in a different year
        assert!(matches!(
            resolve(&ds, &rollups, 2020, "Old", 10),
            Err(QueryError::NotFound(_))
        ));
        // Never charted
        assert!(matches!(
            resolve(&ds, &rollups, 2020, "Missing", 10),
            Err(QueryError::NotFound(_))
        ));
        // Cut off by the limit: A has 3 weeks, B has 1
        assert!(matches!(
            resolve(&ds, &rollups, 2020, "B", 1),
            Err(QueryError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_without_joined_rows() {
        let ds = Dataset::from_records(vec![entry("Ghost", week(2020, 1, 1), 4)], Vec::new());
        let rollups = build_rollup(ds.tracks(), WeeksPolicy::Distinct).unwrap();
        assert!(matches!(
            resolve(&ds, &rollups, 2020, "Ghost", 10),
            Err(QueryError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_duplicate_names_take_first_track_id() {
        let weekly = vec![entry("Same", week(2021, 2, 6), 1)];
        let tracks = vec![
            record("zz9", "Same", "Cover Band", week(2021, 2, 6), 40),
            record("aa1", "Same", "Original", week(2021, 2, 6), 1),
        ];
        let ds = Dataset::from_records(weekly, tracks);
        let rollups = build_rollup(ds.tracks(), WeeksPolicy::Distinct).unwrap();

        let sel = resolve(&ds, &rollups, 2021, "Same", 10).unwrap();
        assert_eq!(sel.rollup.track_id, "aa1");
        // The time series is keyed by name, so both ids contribute
        assert!((sel.performance[0].average_position - 20.5).abs() < 1e-9);
    }

    #[test]
    fn test_selection_serializes_flat() {
        let ds = scenario();
        let rollups = build_rollup(ds.tracks(), WeeksPolicy::Distinct).unwrap();
        let sel = resolve(&ds, &rollups, 2020, "A", 10).unwrap();
        let json = serde_json::to_value(&sel).unwrap();
        assert_eq!(json["track_name"], "A");
        assert_eq!(json["weeks_on_chart"], 3);
        assert_eq!(json["duration_formatted"], "3m 20s");
        assert_eq!(json["performance"][0]["week"], "2020-01-01");
        assert_eq!(json["artist_type"], "Solo");
    }
}
