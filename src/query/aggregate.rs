use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::resolve::format_duration;
use super::{QueryError, Result};
use crate::data::dates::parse_release_year;
use crate::data::models::{TrackArtistRecord, WeeklyChartEntry};

/// How `weeks_on_chart` is counted for a track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeeksPolicy {
    /// Number of distinct chart weeks for the track id.
    #[default]
    Distinct,
    /// Group row count divided by the number of credited artists, rounded.
    Apportioned,
}

/// One entry of a year ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopTrack {
    pub year: i32,
    pub track_name: String,
    pub week_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArtistType {
    Solo,
    Multiple,
}

impl fmt::Display for ArtistType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solo => write!(f, "Solo Artist"),
            Self::Multiple => write!(f, "Multiple Artists"),
        }
    }
}

/// A credited artist with their aligned popularity and follower figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistDetail {
    pub artist_name: String,
    pub popularity: Option<f64>,
    pub followers: Option<f64>,
}

/// Per-track summary built from the joined table.
///
/// `artist_names`, `popularity` and `followers` are index-aligned: position
/// `i` of each describes the same artist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRollup {
    pub track_id: String,
    pub track_name: String,
    pub release_date: String,
    pub release_year: i32,
    pub duration_ms: i64,
    pub duration_formatted: String,
    pub explicit: bool,
    pub danceability: f64,
    pub energy: f64,
    pub tempo: f64,
    pub weeks_on_chart: u32,
    pub first_chart_week: NaiveDate,
    pub last_chart_week: NaiveDate,
    pub artist_names: Vec<String>,
    pub popularity: Vec<Option<f64>>,
    pub followers: Vec<Option<f64>>,
    pub artist_type: ArtistType,
}

impl TrackRollup {
    pub fn artist_count(&self) -> usize {
        self.artist_names.len()
    }

    /// Credited artists in order of first appearance.
    pub fn artists(&self) -> impl Iterator<Item = ArtistDetail> + '_ {
        (0..self.artist_names.len()).map(|i| self.detail_at(i))
    }

    /// Look up one credited artist by name.
    pub fn artist_detail(&self, artist_name: &str) -> Option<ArtistDetail> {
        self.artist_names
            .iter()
            .position(|a| a == artist_name)
            .map(|i| self.detail_at(i))
    }

    fn detail_at(&self, i: usize) -> ArtistDetail {
        ArtistDetail {
            artist_name: self.artist_names[i].clone(),
            popularity: self.popularity.get(i).copied().flatten(),
            followers: self.followers.get(i).copied().flatten(),
        }
    }
}

/// Sorted unique calendar years present in the weekly table.
pub fn available_years(weekly: &[WeeklyChartEntry]) -> Vec<i32> {
    weekly
        .iter()
        .map(|e| e.chart_week.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Rank track names by the number of weeks they charted in `year`.
///
/// Sorted by descending week count; ties are ordered by track name.
pub fn top_tracks(weekly: &[WeeklyChartEntry], year: i32, limit: usize) -> Result<Vec<TopTrack>> {
    if limit == 0 {
        return Err(QueryError::InvalidArgument(
            "top track limit must be positive".to_string(),
        ));
    }

    let mut by_name: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in weekly.iter().filter(|e| e.chart_week.year() == year) {
        *by_name.entry(entry.track_name.as_str()).or_insert(0) += 1;
    }

    // Stable sort over name-ordered counts
    let mut counts: Vec<(&str, usize)> = by_name.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);

    Ok(counts
        .into_iter()
        .map(|(name, week_count)| TopTrack {
            year,
            track_name: name.to_string(),
            week_count,
        })
        .collect())
}

/// Build one rollup row per track id, ordered by track id.
pub fn build_rollup(tracks: &[TrackArtistRecord], policy: WeeksPolicy) -> Result<Vec<TrackRollup>> {
    let mut groups: BTreeMap<&str, Vec<&TrackArtistRecord>> = BTreeMap::new();
    for record in tracks {
        groups.entry(record.track_id.as_str()).or_default().push(record);
    }

    let rollups = groups
        .into_values()
        .map(|rows| rollup_group(&rows, policy))
        .collect::<Result<Vec<_>>>()?;

    log::debug!("Built {} track rollups from {} rows", rollups.len(), tracks.len());
    Ok(rollups)
}

fn rollup_group(rows: &[&TrackArtistRecord], policy: WeeksPolicy) -> Result<TrackRollup> {
    let first = rows[0];

    let mut artist_names: Vec<String> = Vec::new();
    let mut popularity = Vec::new();
    let mut followers = Vec::new();
    for row in rows {
        if !artist_names.contains(&row.artist_name) {
            artist_names.push(row.artist_name.clone());
            popularity.push(row.popularity);
            followers.push(row.followers);
        }
    }

    let weeks: BTreeSet<NaiveDate> = rows.iter().map(|r| r.chart_week).collect();
    let weeks_on_chart = match policy {
        WeeksPolicy::Distinct => weeks.len() as u32,
        WeeksPolicy::Apportioned => {
            let share = rows.len() as f64 / artist_names.len() as f64;
            (share.round() as u32).max(1)
        }
    };

    let release_year = parse_release_year(&first.release_date).ok_or_else(|| QueryError::Parse {
        track_id: first.track_id.clone(),
        column: "release_date",
        value: first.release_date.clone(),
    })?;

    let artist_type = if artist_names.len() == 1 {
        ArtistType::Solo
    } else {
        ArtistType::Multiple
    };

    Ok(TrackRollup {
        track_id: first.track_id.clone(),
        track_name: first.track_name.clone(),
        release_date: first.release_date.clone(),
        release_year,
        duration_ms: first.duration_ms,
        duration_formatted: format_duration(first.duration_ms)?,
        explicit: first.explicit,
        danceability: first.danceability,
        energy: first.energy,
        tempo: first.tempo,
        weeks_on_chart,
        // groups are never empty
        first_chart_week: weeks.first().copied().unwrap_or(first.chart_week),
        last_chart_week: weeks.last().copied().unwrap_or(first.chart_week),
        artist_names,
        popularity,
        followers,
        artist_type,
    })
}
