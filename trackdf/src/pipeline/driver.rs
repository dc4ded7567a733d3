//! Batch driver: load hits, search every base layer, write the triplet table.
//!
//! The run is one linear pass with no intermediate state on disk. The output
//! file is only created after the search has finished, so a failed load never
//! leaves a partial table behind.

use rayon::ThreadPoolBuilder;
use tracing::{debug, info};
use trackcore::algorithm::search::{LayerOutcome, TripletSearch};
use trackcore::data::layer_index::LayerIndex;
use trackcore::data::triplet::TripletResult;

use crate::data::hits::read_hits;
use crate::data::triplets::write_triplets;
use crate::error::TrackResult;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::summary::{LayerSummary, RunSummary};

/// Run the whole pipeline described by `config`.
pub fn run(config: &PipelineConfig) -> TrackResult<RunSummary> {
    config.validate()?;

    let table = read_hits(&config.input)?;
    let index = LayerIndex::new(&table.hits);
    debug!("{} hits spread over layers {:?}", index.num_hits(), index.layer_ids());

    info!("Starting triplet search over base layers {:?}", config.base_layers());
    let outcomes = match config.threads {
        Some(num_threads) => {
            let thread_pool = ThreadPoolBuilder::new().num_threads(num_threads).build()?;
            thread_pool.install(|| search_layers(config, &index))
        }
        None => search_layers(config, &index),
    };

    let triplets: Vec<TripletResult> = outcomes.iter().flat_map(|o| o.triplets.iter().copied()).collect();
    write_triplets(&config.output, &triplets)?;

    let mut summary = RunSummary {
        lines: table.lines,
        valid_hits: table.hits.len(),
        row_errors: table.row_errors,
        layers: outcomes.iter().map(LayerSummary::from).collect(),
        triplets: triplets.len(),
        ..RunSummary::default()
    };
    for outcome in &outcomes {
        summary.genuine += outcome.num_genuine();
        summary.diagnostics.merge(&outcome.diagnostics);
    }

    info!(
        "Done: {} triplets ({} genuine, {} background) written to {}",
        summary.triplets,
        summary.genuine,
        summary.background(),
        config.output.display()
    );
    debug!("{}", summary.diagnostics.summary());

    if let Some(path) = &config.summary {
        summary.save_json(path)?;
        info!("Run summary saved to {}", path.display());
    }

    Ok(summary)
}

fn search_layers(config: &PipelineConfig, index: &LayerIndex) -> Vec<LayerOutcome> {
    let search: &TripletSearch = &config.search;

    config
        .base_layers()
        .map(|l| {
            info!("Processing base layer {}", l);
            let outcome = search.search_layer(index, l);
            let [n0, n1, n2] = outcome.layer_sizes;
            info!("  - hits on layers {}/{}/{}: {}/{}/{}", l, l + 1, l + 2, n0, n1, n2);
            info!("  - triplets found for base layer {}: {}", l, outcome.triplets.len());
            outcome
        })
        .collect()
}
