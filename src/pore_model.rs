//! Pore models: the expected signal level of each k-mer.
use crate::error::{HmmError, Result};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

const LOG_SQRT_2PI: f64 = 0.918_938_533_204_672_7;

/// A normal distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianParameters {
    pub mean: f64,
    pub stdev: f64,
}

impl GaussianParameters {
    pub fn new(mean: f64, stdev: f64) -> Self {
        Self { mean, stdev }
    }
    /// log of the density at `x`.
    pub fn log_pdf(&self, x: f64) -> f64 {
        let z = (x - self.mean) / self.stdev;
        -LOG_SQRT_2PI - self.stdev.ln() - 0.5 * z * z
    }
}

/// Per-read calibration of a pore model.
/// The level of a k-mer is shifted and scaled, and its spread is scaled by `var`.
/// `drift` is the linear change of the baseline over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingParameters {
    pub shift: f64,
    pub scale: f64,
    pub drift: f64,
    pub var: f64,
}

impl std::default::Default for ScalingParameters {
    fn default() -> Self {
        Self {
            shift: 0f64,
            scale: 1f64,
            drift: 0f64,
            var: 1f64,
        }
    }
}

fn check_spread(name: &'static str, value: f64) -> Result<()> {
    match value > 0f64 && value.is_finite() {
        true => Ok(()),
        false => Err(HmmError::InvalidModel { name, value }),
    }
}

/// A pore model. The `rank`-th state is the level distribution of the k-mer with that rank
/// (See [`crate::kmer::kmer_rank`]).
/// Deserialization goes through the same checks as [`PoreModel::new`] and [`PoreModel::with_scaling`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PoreModelRecord")]
pub struct PoreModel {
    k: usize,
    states: Vec<GaussianParameters>,
    scaling: ScalingParameters,
}

#[derive(Deserialize)]
struct PoreModelRecord {
    k: usize,
    states: Vec<GaussianParameters>,
    #[serde(default)]
    scaling: ScalingParameters,
}

impl TryFrom<PoreModelRecord> for PoreModel {
    type Error = HmmError;
    fn try_from(record: PoreModelRecord) -> Result<Self> {
        PoreModel::new(record.k, record.states)?.with_scaling(record.scaling)
    }
}

impl PoreModel {
    /// Create a new, unscaled, pore model. `states` should have 4^k elements, each with a positive stdev.
    pub fn new(k: usize, states: Vec<GaussianParameters>) -> Result<Self> {
        let expected = crate::kmer::num_states(k)?;
        if states.len() != expected {
            return Err(HmmError::ModelSize {
                k,
                expected,
                found: states.len(),
            });
        }
        for state in states.iter() {
            check_spread("stdev", state.stdev)?;
        }
        Ok(Self {
            k,
            states,
            scaling: ScalingParameters::default(),
        })
    }
    /// Calibrate this model to a read. Both `scale` and `var` should be positive.
    pub fn with_scaling(mut self, scaling: ScalingParameters) -> Result<Self> {
        check_spread("scale", scaling.scale)?;
        check_spread("var", scaling.var)?;
        self.scaling = scaling;
        Ok(self)
    }
    pub fn k(&self) -> usize {
        self.k
    }
    pub fn scaling(&self) -> &ScalingParameters {
        &self.scaling
    }
    /// Level distribution of the k-mer `rank` after applying the scaling of this read.
    pub fn scaled_parameters(&self, rank: usize) -> GaussianParameters {
        let state = &self.states[rank];
        GaussianParameters {
            mean: state.mean * self.scaling.scale + self.scaling.shift,
            stdev: state.stdev * self.scaling.var,
        }
    }
    /// Correct the drift of the baseline for an observation at `time`.
    pub fn drift_corrected(&self, level: f64, time: f64) -> f64 {
        level - self.scaling.drift * time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    #[test]
    fn log_pdf() {
        let gp = GaussianParameters::new(0f64, 1f64);
        assert_abs_diff_eq!(gp.log_pdf(0f64), -LOG_SQRT_2PI, epsilon = 1e-12);
        let gp = GaussianParameters::new(80f64, 2f64);
        let expected = (-(0.5f64 * 0.5) / 2f64).exp() / (2f64 * (2f64 * std::f64::consts::PI).sqrt());
        assert_abs_diff_eq!(gp.log_pdf(81f64), expected.ln(), epsilon = 1e-9);
    }
    #[test]
    fn scaling() {
        let states = vec![GaussianParameters::new(50f64, 1.5f64); 16];
        assert!(PoreModel::new(2, states[..15].to_vec()).is_err());
        let scaling = ScalingParameters {
            shift: 3f64,
            scale: 1.1,
            drift: 0.5,
            var: 2f64,
        };
        let model = PoreModel::new(2, states)
            .unwrap()
            .with_scaling(scaling)
            .unwrap();
        let gp = model.scaled_parameters(5);
        assert_abs_diff_eq!(gp.mean, 58f64, epsilon = 1e-9);
        assert_abs_diff_eq!(gp.stdev, 3f64, epsilon = 1e-9);
        assert_abs_diff_eq!(model.drift_corrected(60f64, 4f64), 58f64, epsilon = 1e-9);
    }
    #[test]
    fn too_long_kmers() {
        assert_eq!(
            PoreModel::new(32, vec![]).err(),
            Some(HmmError::KmerTooLong { k: 32 })
        );
    }
    #[test]
    fn non_positive_spread() {
        let mut states = vec![GaussianParameters::new(60f64, 1f64); 4];
        states[3].stdev = 0f64;
        assert_eq!(
            PoreModel::new(1, states.clone()).err(),
            Some(HmmError::InvalidModel {
                name: "stdev",
                value: 0f64
            })
        );
        states[3].stdev = 1f64;
        let model = PoreModel::new(1, states).unwrap();
        let scaling = ScalingParameters {
            var: -1f64,
            ..ScalingParameters::default()
        };
        assert!(model.clone().with_scaling(scaling).is_err());
        let scaling = ScalingParameters {
            scale: 0f64,
            ..ScalingParameters::default()
        };
        assert!(model.with_scaling(scaling).is_err());
    }
    #[test]
    fn deserialize_checks_model() {
        let json = r#"{"k":1,"states":[{"mean":50.0,"stdev":1.0},{"mean":60.0,"stdev":1.0},
            {"mean":70.0,"stdev":1.0},{"mean":80.0,"stdev":1.5}]}"#;
        let model: PoreModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.k(), 1);
        assert_eq!(model.scaling(), &ScalingParameters::default());
        assert_eq!(model.scaled_parameters(3), GaussianParameters::new(80f64, 1.5));
        let restored: PoreModel = serde_json::from_str(&serde_json::to_string(&model).unwrap()).unwrap();
        assert_eq!(restored.scaled_parameters(2), model.scaled_parameters(2));
        // Three states for k = 1.
        let json = r#"{"k":1,"states":[{"mean":50.0,"stdev":1.0},{"mean":60.0,"stdev":1.0},
            {"mean":70.0,"stdev":1.0}]}"#;
        assert!(serde_json::from_str::<PoreModel>(json).is_err());
        let json = r#"{"k":1,"states":[{"mean":50.0,"stdev":1.0},{"mean":60.0,"stdev":1.0},
            {"mean":70.0,"stdev":1.0},{"mean":80.0,"stdev":1.0}],
            "scaling":{"shift":0.0,"scale":1.0,"drift":0.0,"var":0.0}}"#;
        assert!(serde_json::from_str::<PoreModel>(json).is_err());
    }
}
