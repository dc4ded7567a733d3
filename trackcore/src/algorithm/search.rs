//! Triplet enumeration over consecutive layers.
//!
//! The search is expressed as two lazy stages:
//!
//! 1. [`TripletSearch::duplet_stage`] pairs an inner hit with every hit on the
//!    next layer and tags each pair with its [`DupletVerdict`].
//! 2. [`TripletSearch::triplet_stage`] extends an accepted duplet with every hit
//!    on the outer layer, testing the second duplet and, if it passes, the
//!    triplet angles.
//!
//! Each inner hit is an independent unit of work. [`TripletSearch::search_layer`]
//! runs the units on the rayon pool and concatenates their results in inner-hit
//! order, so the output does not depend on the number of threads.

use std::ops::RangeInclusive;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithm::duplet::{DupletFilter, DupletVerdict};
use crate::algorithm::labeler::{LabelPolicy, LABEL_GENUINE};
use crate::algorithm::triplet::{TripletFilter, TripletVerdict};
use crate::data::hit::{Hit, ProjectedHit};
use crate::data::layer_index::LayerIndex;
use crate::data::triplet::TripletResult;

/// Default range of base layers, the outermost triplet reaching layer 10.
pub const DEFAULT_BASE_LAYERS: RangeInclusive<i32> = 1..=8;

/// Filters and labeling policy applied by the search.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripletSearch {
    pub duplet: DupletFilter,
    pub triplet: TripletFilter,
    pub label_policy: LabelPolicy,
}

/// A candidate third hit for an accepted duplet.
#[derive(Clone, Copy, Debug)]
pub struct Extension<'a> {
    pub hit: ProjectedHit<'a>,
    /// Verdict on the second duplet (middle hit, this hit).
    pub duplet: DupletVerdict,
    /// Only evaluated when the second duplet is accepted.
    pub triplet: Option<TripletVerdict>,
}

/// Everything found for one base layer.
#[derive(Clone, Debug)]
pub struct LayerOutcome {
    pub base_layer: i32,
    /// Hit counts on the base layer and the two layers above it.
    pub layer_sizes: [usize; 3],
    pub triplets: Vec<TripletResult>,
    pub diagnostics: SearchDiagnostics,
}

impl LayerOutcome {
    pub fn num_genuine(&self) -> usize {
        self.triplets.iter().filter(|t| t.is_genuine()).count()
    }
}

impl TripletSearch {
    pub fn new(duplet: DupletFilter, triplet: TripletFilter, label_policy: LabelPolicy) -> Self {
        TripletSearch { duplet, triplet, label_policy }
    }

    /// Pair `inner` with each hit of `candidates`.
    pub fn duplet_stage<'s, 'a: 's>(
        &'s self,
        inner: ProjectedHit<'a>,
        candidates: &'s [&'a Hit],
    ) -> impl Iterator<Item = (ProjectedHit<'a>, DupletVerdict)> + 's {
        candidates.iter().map(move |&hit| {
            let outer = ProjectedHit::new(hit);
            let verdict = self.duplet.evaluate(&inner, &outer);
            (outer, verdict)
        })
    }

    /// Extend the accepted duplet `(first, second)` with each hit of `candidates`.
    pub fn triplet_stage<'s, 'a: 's>(
        &'s self,
        first: ProjectedHit<'a>,
        second: ProjectedHit<'a>,
        candidates: &'s [&'a Hit],
    ) -> impl Iterator<Item = Extension<'a>> + 's {
        self.duplet_stage(second, candidates).map(move |(third, duplet)| {
            let triplet = duplet
                .is_accepted()
                .then(|| self.triplet.evaluate(&first, &second, &third));
            Extension { hit: third, duplet, triplet }
        })
    }

    /// All accepted triplets starting at `h1`, in (middle, outer) enumeration order.
    pub fn search_from(
        &self,
        h1: &Hit,
        middle: &[&Hit],
        outer: &[&Hit],
    ) -> (Vec<TripletResult>, SearchDiagnostics) {
        let mut found = Vec::new();
        let mut diagnostics = SearchDiagnostics::default();
        let first = ProjectedHit::new(h1);

        for (second, verdict) in self.duplet_stage(first, middle) {
            diagnostics.record_duplet(verdict);
            if !verdict.is_accepted() {
                continue;
            }

            for ext in self.triplet_stage(first, second, outer) {
                diagnostics.record_duplet(ext.duplet);
                let angles = match ext.triplet {
                    Some(verdict) => {
                        diagnostics.record_triplet(&verdict);
                        match verdict {
                            TripletVerdict::Accepted(angles) => angles,
                            _ => continue,
                        }
                    }
                    None => continue,
                };

                let label = self.label_policy.label(first.hit, second.hit, ext.hit.hit);
                diagnostics.record_label(label);
                found.push(TripletResult::new(
                    [first.coords, second.coords, ext.hit.coords],
                    angles,
                    label,
                ));
            }
        }

        (found, diagnostics)
    }

    /// Search the layers `base_layer`, `base_layer + 1`, `base_layer + 2`.
    pub fn search_layer(&self, index: &LayerIndex, base_layer: i32) -> LayerOutcome {
        let triple = index.triple(base_layer);

        let units: Vec<(Vec<TripletResult>, SearchDiagnostics)> = triple
            .inner
            .par_iter()
            .map(|h1| self.search_from(h1, triple.middle, triple.outer))
            .collect();

        let mut triplets = Vec::new();
        let mut diagnostics = SearchDiagnostics::default();
        for (found, diag) in units {
            triplets.extend(found);
            diagnostics.merge(&diag);
        }

        LayerOutcome {
            base_layer,
            layer_sizes: triple.sizes(),
            triplets,
            diagnostics,
        }
    }

    /// Search every base layer in `base_layers`, in ascending order.
    pub fn search(&self, index: &LayerIndex, base_layers: RangeInclusive<i32>) -> Vec<LayerOutcome> {
        base_layers.map(|l| self.search_layer(index, l)).collect()
    }
}

/// Counts of what happened to the candidates of a search.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDiagnostics {
    pub duplets_tested: usize,
    pub duplets_accepted: usize,
    pub rejected_degenerate_x: usize,
    pub rejected_slope: usize,
    pub rejected_origin: usize,

    pub triplets_tested: usize,
    pub triplets_accepted: usize,
    pub rejected_degenerate_segment: usize,
    pub rejected_theta: usize,
    pub rejected_phi: usize,

    pub genuine: usize,
    pub background: usize,
}

impl SearchDiagnostics {
    pub fn record_duplet(&mut self, verdict: DupletVerdict) {
        self.duplets_tested += 1;
        match verdict {
            DupletVerdict::Accepted => self.duplets_accepted += 1,
            DupletVerdict::DegenerateX => self.rejected_degenerate_x += 1,
            DupletVerdict::SlopeTooSteep => self.rejected_slope += 1,
            DupletVerdict::OriginTooFar => self.rejected_origin += 1,
        }
    }

    pub fn record_triplet(&mut self, verdict: &TripletVerdict) {
        self.triplets_tested += 1;
        match verdict {
            TripletVerdict::Accepted(_) => self.triplets_accepted += 1,
            TripletVerdict::Degenerate => self.rejected_degenerate_segment += 1,
            TripletVerdict::ThetaTooLarge(_) => self.rejected_theta += 1,
            TripletVerdict::PhiTooLarge(_) => self.rejected_phi += 1,
        }
    }

    pub fn record_label(&mut self, label: u8) {
        if label == LABEL_GENUINE {
            self.genuine += 1;
        } else {
            self.background += 1;
        }
    }

    pub fn merge(&mut self, other: &SearchDiagnostics) {
        self.duplets_tested += other.duplets_tested;
        self.duplets_accepted += other.duplets_accepted;
        self.rejected_degenerate_x += other.rejected_degenerate_x;
        self.rejected_slope += other.rejected_slope;
        self.rejected_origin += other.rejected_origin;
        self.triplets_tested += other.triplets_tested;
        self.triplets_accepted += other.triplets_accepted;
        self.rejected_degenerate_segment += other.rejected_degenerate_segment;
        self.rejected_theta += other.rejected_theta;
        self.rejected_phi += other.rejected_phi;
        self.genuine += other.genuine;
        self.background += other.background;
    }

    pub fn summary(&self) -> String {
        let pct = |part: usize, total: usize| {
            if total > 0 {
                (part as f64 / total as f64) * 100.0
            } else {
                0.0
            }
        };

        format!(
            "SearchDiagnostics: {}/{} duplets passed ({:.1}%), {}/{} triplets passed ({:.1}%)\n\
             Duplet rejections:\n\
             - degenerate x: {}\n\
             - slope: {}\n\
             - origin: {}\n\
             Triplet rejections:\n\
             - degenerate segment: {}\n\
             - theta break: {}\n\
             - phi break: {}\n\
             Labels: {} genuine, {} background",
            self.duplets_accepted,
            self.duplets_tested,
            pct(self.duplets_accepted, self.duplets_tested),
            self.triplets_accepted,
            self.triplets_tested,
            pct(self.triplets_accepted, self.triplets_tested),
            self.rejected_degenerate_x,
            self.rejected_slope,
            self.rejected_origin,
            self.rejected_degenerate_segment,
            self.rejected_theta,
            self.rejected_phi,
            self.genuine,
            self.background,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn hit(hit_id: i32, x: f64, y: f64, z: f64, layer_id: i32, particle_id: i64) -> Hit {
        Hit::new(hit_id, x, y, z, 8, layer_id, 1, particle_id)
    }

    /// Hits of a straight track from the origin crossing layers 1..=n at radius 10 * layer.
    fn straight_track(particle_id: i64, phi: f64, dz_dr: f64, layers: i32, first_id: i32) -> Vec<Hit> {
        (1..=layers)
            .map(|l| {
                let r = 10.0 * l as f64;
                hit(first_id + l, r * phi.cos(), r * phi.sin(), dz_dr * r, l, particle_id)
            })
            .collect()
    }

    fn random_event(seed: u64, tracks: usize) -> Vec<Hit> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut hits = Vec::new();
        for t in 0..tracks {
            let phi = rng.gen_range(0.0..std::f64::consts::TAU);
            let dz_dr = rng.gen_range(-2.0..2.0);
            hits.extend(straight_track(t as i64 + 1, phi, dz_dr, 10, (t * 100) as i32));
        }
        for n in 0..tracks {
            let layer = rng.gen_range(1..=10);
            let r = 10.0 * layer as f64;
            let phi: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            hits.push(hit(100_000 + n as i32, r * phi.cos(), r * phi.sin(), rng.gen_range(-50.0..50.0), layer, 0));
        }
        hits
    }

    #[test]
    fn test_collinear_track_is_found() {
        let hits = straight_track(42, 0.3, 0.5, 3, 0);
        let index = LayerIndex::new(&hits);
        let outcome = TripletSearch::default().search_layer(&index, 1);

        assert_eq!(outcome.layer_sizes, [1, 1, 1]);
        assert_eq!(outcome.triplets.len(), 1);

        let t = outcome.triplets[0];
        assert!(t.theta_break < 1e-7);
        assert!(t.phi_break < 1e-7);
        assert_eq!(t.label, 1);
        assert!((t.r1 - 10.0).abs() < 1e-9);
        assert!((t.r2 - 20.0).abs() < 1e-9);
        assert!((t.r3 - 30.0).abs() < 1e-9);
        assert!((t.phi1 - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_label_follows_particle_ids() {
        let mut hits = straight_track(42, 1.0, 0.1, 3, 0);
        hits[2].particle_id = 7;
        let index = LayerIndex::new(&hits);
        let outcome = TripletSearch::default().search_layer(&index, 1);

        assert_eq!(outcome.triplets.len(), 1);
        assert_eq!(outcome.triplets[0].label, 0);
        assert_eq!(outcome.num_genuine(), 0);
        assert_eq!(outcome.diagnostics.background, 1);
    }

    #[test]
    fn test_layer_above_range_is_not_used() {
        // a track on layers 2, 3, 4 must not show up in the triplets anchored at layer 1
        let hits: Vec<Hit> = straight_track(5, 2.0, 0.0, 4, 0).into_iter().filter(|h| h.layer_id != 1).collect();
        let index = LayerIndex::new(&hits);
        let search = TripletSearch::default();

        let outcome = search.search_layer(&index, 1);
        assert!(outcome.triplets.is_empty());
        assert_eq!(outcome.diagnostics.duplets_tested, 0);

        let outcome = search.search_layer(&index, 2);
        assert_eq!(outcome.triplets.len(), 1);
        assert!((outcome.triplets[0].r3 - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_layers_yield_nothing() {
        let hits = straight_track(1, 0.0, 0.0, 3, 0);
        let index = LayerIndex::new(&hits);
        let outcomes = TripletSearch::default().search(&index, 5..=8);

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.iter().all(|o| o.triplets.is_empty()));
        assert_eq!(outcomes[0].base_layer, 5);
    }

    #[test]
    fn test_highest_base_layer_is_searched_without_overflow() {
        let hits = vec![hit(1, 10.0, 0.0, 0.0, i32::MAX, 3)];
        let index = LayerIndex::new(&hits);
        let outcomes = TripletSearch::default().search(&index, i32::MAX - 1..=i32::MAX);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].layer_sizes, [1, 0, 0]);
        assert!(outcomes.iter().all(|o| o.triplets.is_empty()));
    }

    #[test]
    fn test_diagnostics_account_for_every_candidate() {
        let hits = random_event(7, 20);
        let index = LayerIndex::new(&hits);
        let search = TripletSearch::default();

        for outcome in search.search(&index, DEFAULT_BASE_LAYERS) {
            let d = &outcome.diagnostics;
            assert_eq!(
                d.duplets_tested,
                d.duplets_accepted + d.rejected_degenerate_x + d.rejected_slope + d.rejected_origin
            );
            assert_eq!(
                d.triplets_tested,
                d.triplets_accepted + d.rejected_degenerate_segment + d.rejected_theta + d.rejected_phi
            );
            assert_eq!(d.triplets_accepted, outcome.triplets.len());
            assert_eq!(d.genuine, outcome.num_genuine());
            assert_eq!(d.genuine + d.background, outcome.triplets.len());
            // every straight track contributes one genuine triplet per base layer
            assert!(outcome.num_genuine() >= 20);
        }
    }

    #[test]
    fn test_output_independent_of_thread_count() {
        let hits = random_event(11, 30);
        let index = LayerIndex::new(&hits);
        let search = TripletSearch::default();

        let run = |threads: usize| {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build().unwrap();
            pool.install(|| {
                search
                    .search(&index, DEFAULT_BASE_LAYERS)
                    .into_iter()
                    .flat_map(|o| o.triplets)
                    .collect::<Vec<_>>()
            })
        };

        let sequential = run(1);
        assert!(!sequential.is_empty());
        assert_eq!(sequential, run(4));
    }

    #[test]
    fn test_diagnostics_merge() {
        let mut a = SearchDiagnostics::default();
        a.record_duplet(DupletVerdict::Accepted);
        a.record_duplet(DupletVerdict::SlopeTooSteep);
        a.record_label(1);

        let mut b = SearchDiagnostics::default();
        b.record_duplet(DupletVerdict::DegenerateX);
        b.record_triplet(&TripletVerdict::Degenerate);
        b.record_label(0);

        a.merge(&b);
        assert_eq!(a.duplets_tested, 3);
        assert_eq!(a.duplets_accepted, 1);
        assert_eq!(a.rejected_degenerate_x, 1);
        assert_eq!(a.triplets_tested, 1);
        assert_eq!(a.genuine, 1);
        assert_eq!(a.background, 1);
        assert!(a.summary().contains("1/3 duplets passed"));
    }
}
