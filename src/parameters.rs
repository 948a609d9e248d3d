//! Per-read (and per-strand) transition parameters of the profile HMM.
use crate::error::{HmmError, Result};
use serde::{Deserialize, Serialize};

const SKIP_BIN_WIDTH: f64 = 0.5;
const SKIP_BINS: usize = 30;
// Pr{skip} = SKIP_MAX * exp(-SKIP_DECAY * |level difference|).
const SKIP_MAX: f64 = 0.31;
const SKIP_DECAY: f64 = 0.128;

/// Transition parameters. Each field is a probability, not a log-probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionParameters {
    /// Pr{Match -> EventSplit | no k-mer skip}
    pub trans_m_to_e_not_k: f64,
    /// Pr{EventSplit -> EventSplit}
    pub trans_e_to_e: f64,
    /// Pr{Start -> silent pre state}, i.e., no event is explained by the background.
    pub trans_start_to_pre: f64,
    /// Pr{Background -> Background}
    pub trans_pre_self: f64,
    /// Width of a bin of level differences.
    pub skip_bin_width: f64,
    /// Pr{skip} for each bin of |level difference| between adjacent k-mers.
    pub skip_probabilities: Vec<f64>,
}

impl std::default::Default for TransitionParameters {
    fn default() -> Self {
        let skip_probabilities = (0..SKIP_BINS)
            .map(|bin| {
                let level_diff = (bin as f64 + 0.5) * SKIP_BIN_WIDTH;
                SKIP_MAX * (-SKIP_DECAY * level_diff).exp()
            })
            .collect();
        Self {
            trans_m_to_e_not_k: 0.15,
            trans_e_to_e: 0.33,
            trans_start_to_pre: 0.5,
            trans_pre_self: 0.9,
            skip_bin_width: SKIP_BIN_WIDTH,
            skip_probabilities,
        }
    }
}

impl std::fmt::Display for TransitionParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "M->E:{:.3}\tE->E:{:.3}",
            self.trans_m_to_e_not_k, self.trans_e_to_e
        )?;
        writeln!(
            f,
            "S->P:{:.3}\tP->P:{:.3}",
            self.trans_start_to_pre, self.trans_pre_self
        )?;
        let skips: Vec<_> = self
            .skip_probabilities
            .iter()
            .map(|x| format!("{:.3}", x))
            .collect();
        write!(f, "Skip({:.2}):{}", self.skip_bin_width, skips.join("\t"))
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<()> {
    match (0f64..=1f64).contains(&value) {
        true => Ok(()),
        false => Err(HmmError::InvalidParameter { name, value }),
    }
}

impl TransitionParameters {
    /// Pr{skipping a k-mer}, given the expected levels of the k-mer and its predecessor.
    /// The closer the two levels are, the more likely the pore moves without a visible change.
    pub fn skip_probability(&self, level_i: f64, level_j: f64) -> f64 {
        let bin = ((level_i - level_j).abs() / self.skip_bin_width) as usize;
        let bin = bin.min(self.skip_probabilities.len() - 1);
        self.skip_probabilities[bin]
    }
    /// Check that every outgoing group of transitions is a distribution.
    pub fn validate(&self) -> Result<()> {
        check_probability("trans_m_to_e_not_k", self.trans_m_to_e_not_k)?;
        check_probability("trans_e_to_e", self.trans_e_to_e)?;
        check_probability("trans_start_to_pre", self.trans_start_to_pre)?;
        check_probability("trans_pre_self", self.trans_pre_self)?;
        if !(self.skip_bin_width > 0f64) {
            return Err(HmmError::InvalidParameter {
                name: "skip_bin_width",
                value: self.skip_bin_width,
            });
        }
        if self.skip_probabilities.is_empty() {
            return Err(HmmError::InvalidParameter {
                name: "skip_probabilities",
                value: 0f64,
            });
        }
        for &p_skip in self.skip_probabilities.iter() {
            check_probability("skip_probabilities", p_skip)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn default_is_valid() {
        let params = TransitionParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.skip_probabilities.len(), SKIP_BINS);
        assert!(params
            .skip_probabilities
            .windows(2)
            .all(|w| w[1] < w[0]));
    }
    #[test]
    fn skip_probability() {
        let params = TransitionParameters::default();
        let closest = params.skip_probability(80f64, 80.1);
        assert_eq!(closest, params.skip_probabilities[0]);
        assert_eq!(params.skip_probability(80.1, 80f64), closest);
        assert_eq!(params.skip_probability(80f64, 81.2), params.skip_probabilities[2]);
        let farthest = params.skip_probability(0f64, 1000f64);
        assert_eq!(farthest, *params.skip_probabilities.last().unwrap());
    }
    #[test]
    fn invalid() {
        let mut params = TransitionParameters::default();
        params.trans_e_to_e = 1.2;
        assert_eq!(
            params.validate(),
            Err(HmmError::InvalidParameter {
                name: "trans_e_to_e",
                value: 1.2
            })
        );
        let mut params = TransitionParameters::default();
        params.skip_probabilities.clear();
        assert!(params.validate().is_err());
        let mut params = TransitionParameters::default();
        params.skip_bin_width = 0f64;
        assert!(params.validate().is_err());
    }
    #[test]
    fn serde() {
        let params = TransitionParameters::default();
        let json = serde_json::to_string(&params).unwrap();
        let restored: TransitionParameters = serde_json::from_str(&json).unwrap();
        assert!((params.trans_e_to_e - restored.trans_e_to_e).abs() < 1e-12);
        assert_eq!(params.skip_probabilities.len(), restored.skip_probabilities.len());
        let json = r#"{"trans_m_to_e_not_k":0.1,"trans_e_to_e":0.2,"trans_start_to_pre":0.5,
            "trans_pre_self":0.9,"skip_bin_width":1.0,"skip_probabilities":[0.3,0.1]}"#;
        let params: TransitionParameters = serde_json::from_str(json).unwrap();
        assert!(params.validate().is_ok());
        assert_eq!(params.skip_probability(0f64, 5f64), 0.1);
    }
}
