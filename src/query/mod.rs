pub mod aggregate;
pub mod resolve;

pub use aggregate::{
    ArtistDetail, ArtistType, TopTrack, TrackRollup, WeeksPolicy, available_years, build_rollup,
    top_tracks,
};
pub use resolve::{AudioFeatures, PositionPoint, TrackInfo, TrackSelection, format_duration, resolve};

use thiserror::Error;

use crate::data::Dataset;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Parse error for track {track_id}: {column} = {value:?}")]
    Parse {
        track_id: String,
        column: &'static str,
        value: String,
    },
    #[error("No data: {0}")]
    NotFound(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, QueryError>;

/// Read-only view over a loaded dataset with its rollup built once.
pub struct Catalog<'a> {
    dataset: &'a Dataset,
    rollups: Vec<TrackRollup>,
    top_limit: usize,
}

impl<'a> Catalog<'a> {
    pub fn new(dataset: &'a Dataset, policy: WeeksPolicy, top_limit: usize) -> Result<Self> {
        if top_limit == 0 {
            return Err(QueryError::InvalidArgument(
                "top track limit must be positive".to_string(),
            ));
        }
        let rollups = build_rollup(dataset.tracks(), policy)?;
        log::info!("Catalog ready: {} tracks ({:?} weeks policy)", rollups.len(), policy);
        Ok(Self {
            dataset,
            rollups,
            top_limit,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        self.dataset
    }

    pub fn rollups(&self) -> &[TrackRollup] {
        &self.rollups
    }

    pub fn top_limit(&self) -> usize {
        self.top_limit
    }

    pub fn years(&self) -> Vec<i32> {
        available_years(self.dataset.weekly())
    }

    /// Year ranking; `None` uses the catalog's configured length.
    pub fn top_tracks(&self, year: i32, limit: Option<usize>) -> Result<Vec<TopTrack>> {
        top_tracks(self.dataset.weekly(), year, limit.unwrap_or(self.top_limit))
    }

    pub fn resolve(&self, year: i32, track_name: &str) -> Result<TrackSelection> {
        resolve(self.dataset, &self.rollups, year, track_name, self.top_limit)
    }
}
