//! Startup loading and command execution.

use std::sync::Arc;

use rentmap_api::{AppState, PlaceSummary};
use rentmap_core::Result;
use rentmap_index::{BuildStats, IndexBuilder, MapView, StratifiedIndex, TrendView};
use rentmap_ingest::{DatasetLoader, PlaceDirectory, open_source};
use serde_json::Value;

use crate::cli::QueryCommand;
use crate::config::RentmapConfig;

/// A built index with everything loaded alongside it.
#[derive(Debug)]
pub struct LoadedIndex {
    /// The immutable index.
    pub index: StratifiedIndex,
    /// Statistics from the build.
    pub stats: BuildStats,
    /// FIPS codes, empty when no directory is configured.
    pub directory: PlaceDirectory,
}

/// Load every configured year and build the index.
///
/// Any missing or malformed input aborts the whole load.
pub async fn load_index(config: &RentmapConfig) -> Result<LoadedIndex> {
    let source = open_source(&config.data.root);
    let loader = DatasetLoader::new(source).with_layout(config.layout()?);

    let dataset = loader.load(config.years).await?;
    let (index, stats) = IndexBuilder::new()
        .with_duplicate_policy(config.index.duplicate_policy)
        .build(dataset)?;

    let directory = match config.data.fips_file {
        Some(ref location) => loader.load_place_directory(location).await?,
        None => PlaceDirectory::default(),
    };

    log::info!(
        "Index ready: {} places, {} partitions, {} records",
        index.available_places().len(),
        stats.partitions,
        stats.records_indexed
    );

    Ok(LoadedIndex {
        index,
        stats,
        directory,
    })
}

/// Run a query command and return its JSON result.
pub fn run_query(loaded: &LoadedIndex, query: &QueryCommand) -> Result<Value> {
    let index = &loaded.index;

    let value = match query {
        QueryCommand::Places => {
            serde_json::to_value(PlaceSummary::collect(index, &loaded.directory))?
        }
        QueryCommand::Years { place } => {
            let summary = PlaceSummary::for_place(index, &loaded.directory, place).unwrap_or(
                PlaceSummary {
                    place: place.clone(),
                    fips: None,
                    years: Vec::new(),
                    default_year: None,
                },
            );
            serde_json::to_value(summary)?
        }
        QueryCommand::Tracts { place, year } => {
            serde_json::to_value(index.tract_options(*year, place)?)?
        }
        QueryCommand::Records { place, year } => {
            serde_json::to_value(index.lookup(*year, place)?)?
        }
        QueryCommand::Series { place, tract } => {
            serde_json::to_value(TrendView::build(index, place, tract))?
        }
        QueryCommand::Map { place, year, tract } => {
            serde_json::to_value(MapView::build(index, *year, place, tract.as_deref())?)?
        }
    };

    Ok(value)
}

/// Serve the API over a loaded index until the process exits.
pub async fn serve(config: &RentmapConfig, loaded: LoadedIndex) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let state = AppState::new(Arc::new(loaded.index)).with_directory(loaded.directory);
    rentmap_api::serve(state, addr).await?;
    Ok(())
}
