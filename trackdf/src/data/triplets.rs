//! Triplet table writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;
use trackcore::data::triplet::TripletResult;

use crate::data::hits::is_zstd;
use crate::error::{TrackError, TrackResult};

pub const HEADER: &str = "r1,phi1,z1,r2,phi2,z2,r3,phi3,z3,theta_break,phi_break,label";

/// Write `triplets` as CSV to any writer, header first. Returns the number of rows.
pub fn write_triplets_to<W: Write>(sink: W, triplets: &[TripletResult]) -> Result<usize, csv::Error> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(sink);

    writer.write_record(HEADER.split(','))?;
    for t in triplets {
        writer.write_record(&[
            t.r1.to_string(),
            t.phi1.to_string(),
            t.z1.to_string(),
            t.r2.to_string(),
            t.phi2.to_string(),
            t.z2.to_string(),
            t.r3.to_string(),
            t.phi3.to_string(),
            t.z3.to_string(),
            t.theta_break.to_string(),
            t.phi_break.to_string(),
            t.label.to_string(),
        ])?;
    }
    writer.flush()?;

    Ok(triplets.len())
}

/// Write the triplet table to `path`, zstd-compressed when the path ends in `.zst`.
pub fn write_triplets(path: &Path, triplets: &[TripletResult]) -> TrackResult<usize> {
    info!("Writing {} triplets to {}", triplets.len(), path.display());
    let file = File::create(path).map_err(|e| TrackError::io(path, e))?;

    if is_zstd(path) {
        let mut encoder = zstd::Encoder::new(file, 3).map_err(|e| TrackError::io(path, e))?;
        let n = write_triplets_to(&mut encoder, triplets).map_err(|e| TrackError::csv(path, e))?;
        encoder.finish().map_err(|e| TrackError::io(path, e))?;
        Ok(n)
    } else {
        write_triplets_to(BufWriter::new(file), triplets).map_err(|e| TrackError::csv(path, e))
    }
}
