//! This module is to generate random sequences and simulated reads to assess the performance.
//! Usually, it would not be used in the real-applications.
use crate::error::Result;
use crate::parameters::TransitionParameters;
use crate::pore_model::{GaussianParameters, PoreModel};
use crate::read::{Event, SquiggleRead};
use rand::seq::SliceRandom;
use rand::Rng;

/// Range of the mean levels of a random pore model, in pA.
pub const LEVEL_RANGE: (f64, f64) = (60f64, 120f64);
/// Range of the standard deviations of a random pore model.
pub const STDEV_RANGE: (f64, f64) = (0.8, 1.6);

pub fn generate_seq<T: Rng>(rng: &mut T, len: usize) -> Vec<u8> {
    let bases = b"ACTG";
    (0..len)
        .filter_map(|_| bases.choose(rng))
        .copied()
        .collect()
}

/// Substitute `sub` distinct positions of `seq` by other bases.
pub fn introduce_substitutions<T: Rng>(seq: &[u8], rng: &mut T, sub: usize) -> Vec<u8> {
    let mut res = seq.to_vec();
    let positions = rand::seq::index::sample(rng, seq.len(), sub.min(seq.len()));
    for pos in positions.iter() {
        res[pos] = choose_base(rng, res[pos]);
    }
    res
}

fn choose_base<T: Rng>(rng: &mut T, base: u8) -> u8 {
    let bases: Vec<u8> = b"ATCG"
        .iter()
        .filter(|&&e| e != base.to_ascii_uppercase())
        .copied()
        .collect();
    bases[rng.gen_range(0..bases.len())]
}

/// A draw from N(mean, stdev^2), by the Box-Muller transform.
pub fn sample_gaussian<T: Rng>(rng: &mut T, gaussian: &GaussianParameters) -> f64 {
    let u1: f64 = 1f64 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let z = (-2f64 * u1.ln()).sqrt() * (2f64 * std::f64::consts::PI * u2).cos();
    gaussian.mean + gaussian.stdev * z
}

/// A pore model of `k`-mers whose levels are drawn uniformly from [`LEVEL_RANGE`].
pub fn random_pore_model<T: Rng>(rng: &mut T, k: usize) -> Result<PoreModel> {
    let num_states = crate::kmer::num_states(k)?;
    let states: Vec<_> = (0..num_states)
        .map(|_| {
            let mean = rng.gen_range(LEVEL_RANGE.0..LEVEL_RANGE.1);
            let stdev = rng.gen_range(STDEV_RANGE.0..STDEV_RANGE.1);
            GaussianParameters::new(mean, stdev)
        })
        .collect();
    PoreModel::new(k, states)
}

/// Simulate the template events of a read passing `template` through a pore described by `model`.
///
/// Each k-mer, except the first and the last one, is skipped with the probability given by
/// `params` for its level and the level of the preceding k-mer.
/// A k-mer not skipped emits an event, then another one with probability `trans_m_to_e_not_k`,
/// and more with probability `trans_e_to_e` each.
pub fn simulate_read<T: Rng>(
    rng: &mut T,
    id: &str,
    template: &[u8],
    model: &PoreModel,
    params: &TransitionParameters,
) -> Result<SquiggleRead> {
    params.validate()?;
    let k = model.k();
    crate::kmer::validate(template, k)?;
    let ranks = crate::kmer::kmer_ranks(template, k, false);
    let levels: Vec<_> = ranks.iter().map(|&r| model.scaled_parameters(r)).collect();
    let drift = model.scaling().drift;
    let mut events = vec![];
    let mut time = 0f64;
    let last = ranks.len() - 1;
    for (i, level) in levels.iter().enumerate() {
        if 0 < i && i < last {
            let p_skip = params.skip_probability(levels[i - 1].mean, level.mean);
            if rng.gen_bool(p_skip) {
                continue;
            }
        }
        let mut p_extend = params.trans_m_to_e_not_k;
        loop {
            let duration = rng.gen_range(0.002..0.02);
            events.push(Event {
                mean: sample_gaussian(rng, level) + drift * time,
                stdv: rng.gen_range(0.5..2.0),
                start_time: time,
                duration,
            });
            time += duration;
            if !rng.gen_bool(p_extend) {
                break;
            }
            p_extend = params.trans_e_to_e;
        }
    }
    debug!("SIM\t{}\t{}\t{}", id, ranks.len(), events.len());
    SquiggleRead::template_only(id.to_string(), events, model.clone(), params.clone())
}
