use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::data::hit::Hit;

/// Hits grouped by layer id.
///
/// Built once per run; every base layer of the search queries it instead of
/// rescanning the full hit collection. Within a layer, hits keep their input order.
#[derive(Clone, Debug, Default)]
pub struct LayerIndex<'a> {
    layers: FxHashMap<i32, Vec<&'a Hit>>,
}

/// The three consecutive layer subsets a triplet is built from.
#[derive(Clone, Copy, Debug)]
pub struct LayerTriple<'i, 'a> {
    pub base_layer: i32,
    pub inner: &'i [&'a Hit],
    pub middle: &'i [&'a Hit],
    pub outer: &'i [&'a Hit],
}

impl<'i, 'a> LayerTriple<'i, 'a> {
    pub fn sizes(&self) -> [usize; 3] {
        [self.inner.len(), self.middle.len(), self.outer.len()]
    }
}

impl<'a> LayerIndex<'a> {
    pub fn new(hits: &'a [Hit]) -> Self {
        let mut layers: FxHashMap<i32, Vec<&'a Hit>> = FxHashMap::default();
        for hit in hits {
            layers.entry(hit.layer_id).or_default().push(hit);
        }
        LayerIndex { layers }
    }

    /// Hits on `layer_id`, empty if the layer holds none.
    pub fn layer(&self, layer_id: i32) -> &[&'a Hit] {
        self.layers.get(&layer_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Subsets for layers `base_layer`, `base_layer + 1` and `base_layer + 2`.
    /// Layers past `i32::MAX` do not exist and are empty.
    pub fn triple(&self, base_layer: i32) -> LayerTriple<'_, 'a> {
        let above = |step: i32| base_layer.checked_add(step).map_or(&[][..], |id| self.layer(id));
        LayerTriple {
            base_layer,
            inner: self.layer(base_layer),
            middle: above(1),
            outer: above(2),
        }
    }

    /// Sorted ids of all non-empty layers.
    pub fn layer_ids(&self) -> Vec<i32> {
        self.layers.keys().copied().sorted().collect()
    }

    pub fn num_hits(&self) -> usize {
        self.layers.values().map(|v| v.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(hit_id: i32, layer_id: i32) -> Hit {
        Hit::new(hit_id, hit_id as f64, 1.0, 0.0, 8, layer_id, 1, 0)
    }

    #[test]
    fn test_partition_keeps_order() {
        let hits = vec![hit(1, 2), hit(2, 1), hit(3, 2), hit(4, 3), hit(5, 2)];
        let index = LayerIndex::new(&hits);

        let ids: Vec<i32> = index.layer(2).iter().map(|h| h.hit_id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
        assert_eq!(index.layer_ids(), vec![1, 2, 3]);
        assert_eq!(index.num_hits(), 5);
    }

    #[test]
    fn test_missing_layer_is_empty() {
        let hits = vec![hit(1, 1)];
        let index = LayerIndex::new(&hits);
        assert!(index.layer(7).is_empty());

        let triple = index.triple(5);
        assert_eq!(triple.sizes(), [0, 0, 0]);
    }

    #[test]
    fn test_triple_selects_consecutive_layers() {
        let hits = vec![hit(1, 3), hit(2, 4), hit(3, 5), hit(4, 6), hit(5, 4)];
        let index = LayerIndex::new(&hits);
        let triple = index.triple(3);

        assert_eq!(triple.sizes(), [1, 2, 1]);
        assert!(triple.outer.iter().all(|h| h.layer_id == 5));
    }

    #[test]
    fn test_triple_at_top_of_id_range() {
        let hits = vec![hit(1, i32::MAX - 1), hit(2, i32::MAX)];
        let index = LayerIndex::new(&hits);

        assert_eq!(index.triple(i32::MAX).sizes(), [1, 0, 0]);
        assert_eq!(index.triple(i32::MAX - 1).sizes(), [1, 1, 0]);
    }
}
