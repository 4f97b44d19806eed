use anyhow::{bail, Result};
use rand::Rng;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::image::Image;

/// Raw attribute reading for one cropped face region, before any
/// normalization or aggregation.
#[derive(Clone, Debug)]
pub struct FaceAttributes {
    pub age: u32,
    pub dominant_gender: String,
    pub dominant_expression: String,
}

/// External face-attribute model contract. A failure means "no observation
/// this frame" and must never abort the frame loop.
pub trait FaceClassifier {
    fn classify(&mut self, crop: &Image) -> Result<FaceAttributes>;
}

const EXPRESSIONS: [&str; 5] = ["neutral", "happy", "sad", "surprise", "angry"];

// Gender labels deliberately use the raw model vocabulary; the aggregator
// owns normalization.
const PERSONAS: [(u32, &str); 4] = [(24, "Man"), (31, "Woman"), (45, "Man"), (58, "Woman")];

/// Seeded stand-in for the external attribute model, used by the offline
/// replay binary. Attributes derive from the crop geometry with rng jitter,
/// and a configurable share of calls fails to exercise the skip path.
pub struct SyntheticClassifier {
    rng: Xoshiro256PlusPlus,
    failure_rate: f64,
}

impl SyntheticClassifier {
    pub fn new(seed: u64, failure_rate: f64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            failure_rate,
        }
    }
}

impl FaceClassifier for SyntheticClassifier {
    fn classify(&mut self, crop: &Image) -> Result<FaceAttributes> {
        if crop.is_empty() {
            bail!("empty crop");
        }
        if self.failure_rate > 0.0 && self.rng.gen_bool(self.failure_rate) {
            bail!("no usable face in crop");
        }

        // Same box size, same persona, so readings stay noisy but coherent.
        let (base_age, gender) = PERSONAS[(crop.width * 31 + crop.height) % PERSONAS.len()];
        let age = base_age.saturating_add_signed(self.rng.gen_range(-2..=2));
        let expression = EXPRESSIONS[self.rng.gen_range(0..EXPRESSIONS.len())];

        Ok(FaceAttributes {
            age,
            dominant_gender: gender.to_string(),
            dominant_expression: expression.to_string(),
        })
    }
}
