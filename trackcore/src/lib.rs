// geometry module
pub mod geometry {
    pub mod cylindrical;
    pub mod vector;
}

// data module
pub mod data {
    pub mod hit;
    pub mod layer_index;
    pub mod triplet;
}

// algorithm module
pub mod algorithm {
    pub mod duplet;
    pub mod triplet;
    pub mod labeler;
    pub mod search;
}

pub use algorithm::duplet::{DupletFilter, DupletVerdict};
pub use algorithm::labeler::LabelPolicy;
pub use algorithm::search::{LayerOutcome, SearchDiagnostics, TripletSearch, DEFAULT_BASE_LAYERS};
pub use algorithm::triplet::{TripletFilter, TripletVerdict};
pub use data::hit::{Hit, ProjectedHit};
pub use data::layer_index::LayerIndex;
pub use data::triplet::{BreakAngles, TripletResult};
pub use geometry::cylindrical::{to_cylindrical, to_cylindrical_with, AngleUnit, CylindricalCoords};
