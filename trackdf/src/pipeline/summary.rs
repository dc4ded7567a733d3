use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};
use trackcore::algorithm::search::{LayerOutcome, SearchDiagnostics};

use crate::error::{TrackError, TrackResult};

/// Per base layer counts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub base_layer: i32,
    /// Hits on the base layer and the two layers above it.
    pub hits: [usize; 3],
    pub triplets: usize,
    pub genuine: usize,
}

impl From<&LayerOutcome> for LayerSummary {
    fn from(outcome: &LayerOutcome) -> Self {
        LayerSummary {
            base_layer: outcome.base_layer,
            hits: outcome.layer_sizes,
            triplets: outcome.triplets.len(),
            genuine: outcome.num_genuine(),
        }
    }
}

/// What one pipeline run read, found and wrote.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub lines: usize,
    pub valid_hits: usize,
    pub row_errors: usize,
    pub layers: Vec<LayerSummary>,
    pub triplets: usize,
    pub genuine: usize,
    pub diagnostics: SearchDiagnostics,
}

impl RunSummary {
    pub fn background(&self) -> usize {
        self.triplets - self.genuine
    }

    pub fn save_json(&self, path: &Path) -> TrackResult<()> {
        let file = File::create(path).map_err(|e| TrackError::io(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| TrackError::json(path, e))
    }
}
