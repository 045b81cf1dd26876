use chrono::NaiveDate;
use serde::Deserialize;

/// One week a track spent on the chart (weekly chart-appearance table).
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyChartEntry {
    pub track_name: String,
    pub chart_week: NaiveDate,
    pub list_position: u32,
}

/// One row of the joined track/artist table.
/// A track appears once per chart week per co-credited artist.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackArtistRecord {
    pub track_id: String,
    pub track_name: String,
    pub artist_name: String,
    pub chart_week: NaiveDate,
    pub list_position: u32,
    pub duration_ms: i64,
    /// Kept raw; the release year is extracted when the rollup is built.
    pub release_date: String,
    pub explicit: bool,
    pub danceability: f64,
    pub energy: f64,
    pub tempo: f64,
    pub valence: f64,
    pub popularity: Option<f64>,
    pub followers: Option<f64>,
}

/// Raw CSV row of the weekly chart table, before type coercion.
#[derive(Debug, Deserialize)]
pub(crate) struct WeeklyRow {
    #[serde(rename = "name", alias = "track_name")]
    pub track_name: String,
    pub chart_week: String,
    pub list_position: String,
}

/// Raw CSV row of the joined table. Column names follow the pandas merge
/// output (`name_x` = track, `name_y` = artist).
#[derive(Debug, Deserialize)]
pub(crate) struct TrackArtistRow {
    pub track_id: String,
    #[serde(rename = "name_x", alias = "track_name")]
    pub track_name: String,
    #[serde(rename = "name_y", alias = "artist_name")]
    pub artist_name: String,
    pub chart_week: String,
    pub list_position: String,
    pub duration_ms: String,
    pub release_date: String,
    pub explicit: String,
    pub danceability: String,
    pub energy: String,
    pub tempo: String,
    pub valence: String,
    #[serde(default)]
    pub popularity: Option<String>,
    #[serde(default)]
    pub followers: Option<String>,
}
