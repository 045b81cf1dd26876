pub mod config;
pub mod data;
pub mod query;

/// Default file name of the weekly chart-appearance table.
pub const DEFAULT_CHART_FILE: &str = "chart_filter_release.csv";

/// Default file name of the joined track/artist table.
pub const DEFAULT_TRACK_FILE: &str = "all_track_artist.csv";

/// Number of tracks in a year ranking unless configured otherwise.
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Application name for XDG paths
pub const APP_NAME: &str = "chartscope";
