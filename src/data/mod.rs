pub mod dates;
pub mod load;
pub mod models;

use std::fs::File;
use std::path::Path;
use thiserror::Error;

use models::{TrackArtistRecord, WeeklyChartEntry};

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Parse error at line {line}, column {column} ({value:?}): {message}")]
    Parse {
        line: u64,
        column: &'static str,
        value: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, DataError>;

/// Row counts from loading the two tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub weekly_rows: usize,
    pub weekly_dropped: usize,
    pub track_rows: usize,
}

/// The two source tables, loaded once and read-only afterwards.
#[derive(Debug)]
pub struct Dataset {
    weekly: Vec<WeeklyChartEntry>,
    tracks: Vec<TrackArtistRecord>,
    report: LoadReport,
}

impl Dataset {
    /// Load both tables from CSV files.
    pub fn load(chart_path: &Path, track_path: &Path) -> Result<Self> {
        log::info!("Weekly chart table: {}", chart_path.display());
        log::info!("Track/artist table: {}", track_path.display());
        Self::from_readers(open(chart_path)?, open(track_path)?)
    }

    pub fn from_readers<W: std::io::Read, T: std::io::Read>(weekly: W, tracks: T) -> Result<Self> {
        let weekly = load::read_weekly(weekly)?;
        let tracks = load::read_track_artists(tracks)?;

        let report = LoadReport {
            weekly_rows: weekly.entries.len(),
            weekly_dropped: weekly.dropped,
            track_rows: tracks.len(),
        };
        log::info!(
            "Loaded {} weekly rows ({} dropped), {} track/artist rows",
            report.weekly_rows,
            report.weekly_dropped,
            report.track_rows
        );

        Ok(Self {
            weekly: weekly.entries,
            tracks,
            report,
        })
    }

    /// Build a dataset from already-typed records (no rows dropped).
    pub fn from_records(weekly: Vec<WeeklyChartEntry>, tracks: Vec<TrackArtistRecord>) -> Self {
        let report = LoadReport {
            weekly_rows: weekly.len(),
            weekly_dropped: 0,
            track_rows: tracks.len(),
        };
        Self {
            weekly,
            tracks,
            report,
        }
    }

    pub fn weekly(&self) -> &[WeeklyChartEntry] {
        &self.weekly
    }

    pub fn tracks(&self) -> &[TrackArtistRecord] {
        &self.tracks
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const WEEKLY: &str = "name,chart_week,list_position\n\
                          A,2020-01-01,5\n\
                          A,garbage,4\n";

    const TRACKS: &str = "track_id,name_x,name_y,chart_week,list_position,duration_ms,release_date,explicit,danceability,energy,tempo,valence,popularity,followers\n\
                          t1,A,X,2020-01-01,5,200000,2019-11-29,False,0.7,0.6,118.0,0.5,80,1000\n";

    #[test]
    fn test_from_readers_report() {
        let ds = Dataset::from_readers(WEEKLY.as_bytes(), TRACKS.as_bytes()).unwrap();
        assert_eq!(
            ds.report(),
            LoadReport {
                weekly_rows: 1,
                weekly_dropped: 1,
                track_rows: 1,
            }
        );
        assert_eq!(ds.weekly().len(), 1);
        assert_eq!(ds.tracks()[0].artist_name, "X");
    }

    #[test]
    fn test_load_from_disk() {
        let mut weekly = tempfile::NamedTempFile::new().unwrap();
        weekly.write_all(WEEKLY.as_bytes()).unwrap();
        let mut tracks = tempfile::NamedTempFile::new().unwrap();
        tracks.write_all(TRACKS.as_bytes()).unwrap();

        let ds = Dataset::load(weekly.path(), tracks.path()).unwrap();
        assert_eq!(ds.report().weekly_rows, 1);
        assert_eq!(ds.report().track_rows, 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        match Dataset::load(&missing, &missing) {
            Err(DataError::Io { path, .. }) => assert!(path.ends_with("nope.csv")),
            other => panic!("expected IO error, got {:?}", other.map(|d| d.report())),
        }
    }
}
