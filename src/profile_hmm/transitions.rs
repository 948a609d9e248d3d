//! Transition probabilities of each block.
use super::BlockTransitions;
use crate::parameters::TransitionParameters;
use crate::read::{HmmInput, SignalRead};

impl BlockTransitions {
    /// Transitions into a k-mer skipped with probability `p_skip` from its predecessor.
    pub fn new(p_skip: f64, parameters: &TransitionParameters) -> Self {
        // From the match state of the previous block.
        let p_mk = p_skip;
        let p_me = (1f64 - p_skip) * parameters.trans_m_to_e_not_k;
        let p_mm = (1f64 - p_me - p_mk).max(0f64);
        // From the event split state of the previous block. EventSplit -> KmerSkip is not allowed.
        let p_ee = parameters.trans_e_to_e;
        let p_em = 1f64 - p_ee;
        // From the k-mer skip state of the previous block. KmerSkip -> EventSplit is not allowed.
        let p_kk = p_skip;
        let p_km = 1f64 - p_skip;
        Self {
            lp_me: p_me.ln(),
            lp_mk: p_mk.ln(),
            lp_mm: p_mm.ln(),
            lp_ee: p_ee.ln(),
            lp_em: p_em.ln(),
            lp_kk: p_kk.ln(),
            lp_km: p_km.ln(),
        }
    }
}

/// Transitions of each k-mer, ranked by `ranks`.
/// The first k-mer could not be skipped, as it has no predecessor.
pub fn calculate_transitions<R: SignalRead>(
    ranks: &[usize],
    input: &HmmInput<R>,
) -> Vec<BlockTransitions> {
    let parameters = input.parameters();
    let levels: Vec<_> = ranks
        .iter()
        .map(|&rank| input.read().scaled_parameters(rank, input.strand()).mean)
        .collect();
    std::iter::once(0f64)
        .chain(
            levels
                .windows(2)
                .map(|w| parameters.skip_probability(w[0], w[1])),
        )
        .map(|p_skip| BlockTransitions::new(p_skip, parameters))
        .collect()
}
