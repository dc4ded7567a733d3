//! Pipeline configuration.
//!
//! [`PipelineConfig::default()`] is the standard batch run: hits are
//! read from `data_075.csv`, base layers 1 to 8 are searched with the default
//! filters, and triplets are written to `resultado.csv`. A config can be stored
//! to and restored from JSON; the command line overrides individual fields.
//!
//! # Example
//!
//! ```rust
//! use trackdf::pipeline::config::PipelineConfig;
//!
//! let cfg = PipelineConfig::default();
//! cfg.validate().expect("default config is valid");
//! assert_eq!(cfg.base_layers(), 1..=8);
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trackcore::algorithm::search::{TripletSearch, DEFAULT_BASE_LAYERS};

use crate::error::{ConfigError, TrackError, TrackResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Hit table to read. Default: **data_075.csv**.
    pub input: PathBuf,

    /// Triplet table to write. Default: **resultado.csv**.
    pub output: PathBuf,

    /// Optional JSON run summary.
    pub summary: Option<PathBuf>,

    /// Innermost base layer searched. Default: **1**.
    pub first_base_layer: i32,

    /// Outermost base layer searched; its triplets reach `last_base_layer + 2`. Default: **8**.
    pub last_base_layer: i32,

    /// Duplet and triplet filters and the labeling policy.
    pub search: TripletSearch,

    /// Worker threads; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input: PathBuf::from("data_075.csv"),
            output: PathBuf::from("resultado.csv"),
            summary: None,
            first_base_layer: *DEFAULT_BASE_LAYERS.start(),
            last_base_layer: *DEFAULT_BASE_LAYERS.end(),
            search: TripletSearch::default(),
            threads: None,
        }
    }
}

impl PipelineConfig {
    pub fn base_layers(&self) -> RangeInclusive<i32> {
        self.first_base_layer..=self.last_base_layer
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.first_base_layer > self.last_base_layer {
            return Err(ConfigError::LayerRange {
                first: self.first_base_layer,
                last: self.last_base_layer,
            });
        }
        if self.last_base_layer > i32::MAX - 2 {
            return Err(ConfigError::LayerOverflow { last: self.last_base_layer });
        }

        let thresholds = [
            ("max_abs_z0", self.search.duplet.max_abs_z0),
            ("max_abs_slope", self.search.duplet.max_abs_slope),
            ("max_theta_break", self.search.triplet.max_theta_break),
            ("max_phi_break", self.search.triplet.max_phi_break),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Threshold { name, value });
            }
        }

        if self.threads == Some(0) {
            return Err(ConfigError::Threads);
        }

        if self.input == self.output {
            return Err(ConfigError::SamePath(self.output.clone()));
        }

        Ok(())
    }

    pub fn from_json(path: &Path) -> TrackResult<Self> {
        let file = File::open(path).map_err(|e| TrackError::io(path, e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| TrackError::json(path, e))
    }

    pub fn to_json(&self, path: &Path) -> TrackResult<()> {
        let file = File::create(path).map_err(|e| TrackError::io(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| TrackError::json(path, e))
    }
}
