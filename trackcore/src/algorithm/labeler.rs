use serde::{Deserialize, Serialize};

use crate::data::hit::Hit;

pub const LABEL_GENUINE: u8 = 1;
pub const LABEL_BACKGROUND: u8 = 0;

/// How particle ids are compared when labeling a triplet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelPolicy {
    /// Genuine iff the three raw ids are equal. Three noise hits (id 0) count as genuine.
    #[default]
    RawIdentity,
    /// As `RawIdentity`, but any noise hit makes the triplet background.
    NoiseIsBackground,
}

impl LabelPolicy {
    pub fn label(&self, h1: &Hit, h2: &Hit, h3: &Hit) -> u8 {
        let same = h1.particle_id == h2.particle_id && h2.particle_id == h3.particle_id;
        let genuine = match self {
            LabelPolicy::RawIdentity => same,
            LabelPolicy::NoiseIsBackground => same && !h1.is_noise(),
        };
        if genuine { LABEL_GENUINE } else { LABEL_BACKGROUND }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(particle_id: i64) -> Hit {
        Hit::new(0, 1.0, 1.0, 1.0, 8, 1, 1, particle_id)
    }

    #[test]
    fn test_shared_particle_is_genuine() {
        let policy = LabelPolicy::default();
        assert_eq!(policy.label(&hit(42), &hit(42), &hit(42)), LABEL_GENUINE);
        assert_eq!(policy.label(&hit(42), &hit(42), &hit(7)), LABEL_BACKGROUND);
        assert_eq!(policy.label(&hit(7), &hit(42), &hit(42)), LABEL_BACKGROUND);
    }

    #[test]
    fn test_wide_particle_ids() {
        let id = 4_503_737_066_323_968_i64;
        let policy = LabelPolicy::default();
        assert_eq!(policy.label(&hit(id), &hit(id), &hit(id)), LABEL_GENUINE);
        // differs only above 32 bits
        assert_eq!(policy.label(&hit(id), &hit(id), &hit(id + (1 << 40))), LABEL_BACKGROUND);
    }

    #[test]
    fn test_noise_policies() {
        assert_eq!(LabelPolicy::RawIdentity.label(&hit(0), &hit(0), &hit(0)), LABEL_GENUINE);
        assert_eq!(LabelPolicy::NoiseIsBackground.label(&hit(0), &hit(0), &hit(0)), LABEL_BACKGROUND);
        assert_eq!(LabelPolicy::NoiseIsBackground.label(&hit(9), &hit(9), &hit(9)), LABEL_GENUINE);
    }
}
