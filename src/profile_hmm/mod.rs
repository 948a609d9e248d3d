//! A profile hidden Markov model aligning events to a sequence of k-mers.
//!
//! Each k-mer has a block of three states:
//! - Match: the k-mer emits an event.
//! - EventSplit: the k-mer emits one more event (the segmentation split a level into two or more events).
//! - KmerSkip: the k-mer emits nothing (the pore moved without a visible change of the level).
//!
//! The DP matrix has one row per event (plus the initial row) and three columns per block.
//! There are two additional blocks, the start block and the end block, surrounding the k-mers.
//! So, the cell of the `s` state of the `i`-th k-mer is at column `3 * (i + 1) + s`.
//!
//! The same fill loop computes either the total probability over all the alignments
//! (Forward, [`Objective::SumOfPaths`]) or the most likely alignment (Viterbi, [`Objective::BestPath`]).
//! The difference is only in how the incoming paths are combined (See [`output::HMMOutput`]).
use crate::error::Result;
use crate::read::{HmmInput, SignalRead};
pub mod backtrack;
pub mod fill;
pub mod flanking;
pub mod output;
pub mod transitions;
use fill::ProfileTables;
use output::{ForwardOutput, HMMOutput, ViterbiOutput};

/// Log-probability of an impossible event.
pub const EP: f64 = f64::NEG_INFINITY;
/// Number of states in a block.
pub const NUM_STATES: usize = 3;

/// States of a block. The discriminant is the offset of the state in the block.
/// `PreSoft` is not a column of the matrix; it tags the cells entered from the leading flank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum State {
    KmerSkip = 0,
    EventSplit = 1,
    Match = 2,
    PreSoft = 3,
}

impl State {
    pub fn from_u8(tag: u8) -> Self {
        match tag {
            0 => State::KmerSkip,
            1 => State::EventSplit,
            2 => State::Match,
            3 => State::PreSoft,
            _ => panic!("invalid state tag {}", tag),
        }
    }
    /// Offset in a block.
    pub fn offset(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        let state = match self {
            State::KmerSkip => 'K',
            State::EventSplit => 'E',
            State::Match => 'M',
            State::PreSoft => 'S',
        };
        f.write_char(state)
    }
}

/// Log-transition probabilities into and inside the block of a k-mer.
/// `lp_mm` is log Pr{Match of the previous k-mer -> Match of this k-mer}, and so on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockTransitions {
    pub lp_me: f64,
    pub lp_mk: f64,
    pub lp_mm: f64,
    pub lp_ee: f64,
    pub lp_em: f64,
    pub lp_kk: f64,
    pub lp_km: f64,
}

/// What to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Forward algorithm.
    SumOfPaths,
    /// Viterbi algorithm.
    BestPath,
}

/// How the ends of the alignment are anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentMode {
    /// The alignment may end at any event, the rest of the events are explained by the background.
    Local,
    /// The alignment starts at the first event and the first k-mer, and
    /// ends at the last event in the Match state of the last k-mer.
    Global,
}

impl std::default::Default for AlignmentMode {
    fn default() -> Self {
        AlignmentMode::Local
    }
}

/// The cell where the best alignment ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndCell {
    pub row: usize,
    pub column: usize,
}

impl EndCell {
    pub fn block(&self) -> usize {
        self.column / NUM_STATES
    }
    pub fn state(&self) -> State {
        State::from_u8((self.column % NUM_STATES) as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentResult {
    /// log-likelihood, either summed over all the alignments or of the best one.
    pub log_probability: f64,
    /// The end of the best alignment. `None` for [`Objective::SumOfPaths`] or
    /// if there is no alignment with a positive probability.
    pub end: Option<EndCell>,
}

/// A step of the best alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentStep {
    pub event_idx: usize,
    pub kmer_idx: usize,
    pub state: State,
    /// Value of the DP cell.
    pub lp_cell: f64,
    /// Transition into this state.
    pub lp_transition: f64,
    /// Emission of this state. Zero for KmerSkip.
    pub lp_emission: f64,
}

/// log(exp(x) + exp(y)). Negative infinity is the identity.
#[inline]
pub fn add_logs(x: f64, y: f64) -> f64 {
    let max = x.max(y);
    if max == EP {
        EP
    } else {
        max + (-(x - y).abs()).exp().ln_1p()
    }
}

fn run<R: SignalRead, O: HMMOutput>(tables: &ProfileTables, input: &HmmInput<R>) -> (f64, O) {
    let mut output = O::new(input.num_events() + 1, tables.num_columns());
    let lp = fill::fill(tables, input, &mut output);
    (lp, output)
}

/// Align the events of `input` to `sequence`.
/// Returns the total log-probability over all the alignments ([`Objective::SumOfPaths`]),
/// or the log-probability and the end of the best alignment ([`Objective::BestPath`]).
pub fn evaluate<R: SignalRead>(
    sequence: &[u8],
    input: &HmmInput<R>,
    objective: Objective,
    mode: AlignmentMode,
) -> Result<AlignmentResult> {
    let tables = ProfileTables::new(sequence, input, mode)?;
    let result = match objective {
        Objective::SumOfPaths => {
            let (log_probability, _) = run::<_, ForwardOutput>(&tables, input);
            AlignmentResult {
                log_probability,
                end: None,
            }
        }
        Objective::BestPath => {
            let (log_probability, output) = run::<_, ViterbiOutput>(&tables, input);
            AlignmentResult {
                log_probability,
                end: output.end_cell(),
            }
        }
    };
    debug!(
        "{:?}\t{:?}\t{}x{}\t{:.3}",
        objective,
        mode,
        input.num_events(),
        tables.num_kmers(),
        result.log_probability
    );
    Ok(result)
}

/// Total log-probability of the events, summing over all the alignments to `sequence`.
pub fn score<R: SignalRead>(sequence: &[u8], input: &HmmInput<R>, mode: AlignmentMode) -> Result<f64> {
    evaluate(sequence, input, Objective::SumOfPaths, mode).map(|r| r.log_probability)
}

/// The best alignment between the events of `input` and `sequence`, with its log-probability.
/// If no alignment is possible, the path is empty and the log-probability is negative infinity.
pub fn align<R: SignalRead>(
    sequence: &[u8],
    input: &HmmInput<R>,
    mode: AlignmentMode,
) -> Result<(f64, Vec<AlignmentStep>)> {
    let tables = ProfileTables::new(sequence, input, mode)?;
    let (lp, output) = run::<_, ViterbiOutput>(&tables, input);
    let path = backtrack::backtrack(&output, &tables, input);
    debug!("ALIGN\t{:?}\t{:.3}\t{}", tables.boundary.mode(), lp, path.len());
    Ok((lp, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen_seq;
    use crate::parameters::TransitionParameters;
    use crate::read::tests::MockRead;
    use crate::read::Strand;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    #[test]
    fn log_space() {
        assert_eq!(add_logs(EP, EP), EP);
        assert_eq!(add_logs(EP, -2f64), -2f64);
        assert_eq!(add_logs(-2f64, EP), -2f64);
        assert_abs_diff_eq!(add_logs(0.5f64.ln(), 0.5f64.ln()), 0f64, epsilon = 1e-12);
        let xs = [0.1f64.ln(), 0.2f64.ln(), EP, 0.3f64.ln()];
        let sum = xs.iter().fold(EP, |acc, &x| add_logs(acc, x));
        assert_abs_diff_eq!(sum, 0.6f64.ln(), epsilon = 1e-12);
    }
    #[test]
    fn state_tags() {
        for state in [State::KmerSkip, State::EventSplit, State::Match, State::PreSoft] {
            assert_eq!(State::from_u8(state as u8), state);
        }
        assert_eq!(State::Match.offset(), 2);
        let cell = EndCell { row: 3, column: 7 };
        assert_eq!((cell.block(), cell.state()), (2, State::EventSplit));
    }
    #[test]
    fn invalid_sequence() {
        let read = MockRead::uniform(5, -1f64);
        let input = HmmInput::whole_strand(&read, Strand::Template).unwrap();
        assert!(score(b"", &input, AlignmentMode::Local).is_err());
        assert!(align(b"ACXT", &input, AlignmentMode::Global).is_err());
    }
    fn simulated(seed: u64) -> (Vec<u8>, crate::read::SquiggleRead) {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
        let model = gen_seq::random_pore_model(&mut rng, 5).unwrap();
        let template = gen_seq::generate_seq(&mut rng, 40);
        let params = TransitionParameters::default();
        let read = gen_seq::simulate_read(&mut rng, "sim", &template, &model, &params).unwrap();
        (template, read)
    }
    #[test]
    fn sum_of_paths_dominates_best_path() {
        for seed in 0..10 {
            let (template, read) = simulated(seed);
            let input = HmmInput::whole_strand(&read, Strand::Template).unwrap();
            for &mode in &[AlignmentMode::Global, AlignmentMode::Local] {
                let forward = evaluate(&template, &input, Objective::SumOfPaths, mode).unwrap();
                let viterbi = evaluate(&template, &input, Objective::BestPath, mode).unwrap();
                assert!(viterbi.log_probability.is_finite());
                assert!(viterbi.log_probability <= forward.log_probability + 1e-9);
                assert!(forward.end.is_none());
                assert!(viterbi.end.is_some());
            }
        }
    }
    #[test]
    fn idempotent() {
        let (template, read) = simulated(24);
        let input = HmmInput::whole_strand(&read, Strand::Template).unwrap();
        for &objective in &[Objective::SumOfPaths, Objective::BestPath] {
            let first = evaluate(&template, &input, objective, AlignmentMode::Local).unwrap();
            let second = evaluate(&template, &input, objective, AlignmentMode::Local).unwrap();
            assert_eq!(first.log_probability.to_bits(), second.log_probability.to_bits());
            assert_eq!(first.end, second.end);
        }
    }
    #[test]
    fn true_sequence_scores_better() {
        let mut better = 0;
        for seed in 0..10 {
            let (template, read) = simulated(seed);
            let input = HmmInput::whole_strand(&read, Strand::Template).unwrap();
            let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed + 100);
            let other = gen_seq::generate_seq(&mut rng, template.len());
            let lk_true = score(&template, &input, AlignmentMode::Global).unwrap();
            let lk_other = score(&other, &input, AlignmentMode::Global).unwrap();
            better += (lk_other < lk_true) as usize;
        }
        assert!(better >= 9, "{}", better);
    }
    #[test]
    fn backward_window() {
        let (template, read) = simulated(3);
        let num_events = read.events(Strand::Template).len();
        let input = HmmInput::new(&read, Strand::Template, num_events - 1, 0, false).unwrap();
        let (lp, path) = align(&template, &input, AlignmentMode::Local).unwrap();
        assert!(lp.is_finite());
        assert!(path.windows(2).all(|w| w[0].event_idx >= w[1].event_idx));
    }
}
