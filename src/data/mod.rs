//! Data ingestion and storage
//!
//! Raw results store, event importer, dataset builder and dataset store.

pub mod database;
pub mod dataset;
pub mod sportsdb;
pub mod store;

pub use database::Database;
pub use dataset::{Dataset, DatasetBuilder};
pub use store::DatasetStore;

use crate::{RawGameResult, Result};

/// Anything that can supply a season's raw game results
pub trait GameSource {
    /// All known games of `season`; empty when the season has no data
    fn season_games(&self, season: u16) -> Result<Vec<RawGameResult>>;
}

impl GameSource for [RawGameResult] {
    fn season_games(&self, season: u16) -> Result<Vec<RawGameResult>> {
        Ok(self.iter().filter(|g| g.season == season).cloned().collect())
    }
}

impl GameSource for Vec<RawGameResult> {
    fn season_games(&self, season: u16) -> Result<Vec<RawGameResult>> {
        self.as_slice().season_games(season)
    }
}
