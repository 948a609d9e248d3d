//! The fill loop shared by the Forward and the Viterbi algorithms, and by local and global alignments.
use super::flanking::{make_post_flanking, make_pre_flanking};
use super::output::HMMOutput;
use super::transitions::calculate_transitions;
use super::{AlignmentMode, BlockTransitions, State, EP, NUM_STATES};
use crate::error::Result;
use crate::read::{HmmInput, SignalRead};

/// Flanking probabilities used by a local alignment.
#[derive(Debug, Clone)]
pub struct Flanks {
    pre: Vec<f64>,
    post: Vec<f64>,
    // log Pr{Start -> the i-th k-mer}, uniform over the k-mers.
    lp_sm: f64,
    // log Pr{the i-th k-mer -> End}, uniform over the k-mers.
    lp_ms: f64,
}

impl Flanks {
    pub fn new<R: SignalRead>(input: &HmmInput<R>, num_kmers: usize) -> Self {
        let lp_uniform = (num_kmers as f64).recip().ln();
        Self {
            pre: make_pre_flanking(input),
            post: make_post_flanking(input),
            lp_sm: lp_uniform,
            lp_ms: lp_uniform,
        }
    }
    pub fn pre(&self) -> &[f64] {
        &self.pre
    }
    pub fn post(&self) -> &[f64] {
        &self.post
    }
    /// log-probability of entering the first aligned k-mer at `row` after skipping
    /// the preceding events. It would be `lp_sm + pre[row - 1]`, but the entry from the leading flank is
    /// currently disabled: only the trailing end of a local alignment is free.
    pub fn entry(&self, row: usize) -> f64 {
        debug_assert!(0 < row && row <= self.pre.len() && self.lp_sm <= 0f64);
        EP
    }
    /// log-probability of leaving the last k-mer at `row` and emitting the rest of the events by the background.
    pub fn exit(&self, row: usize) -> f64 {
        self.lp_ms + self.post[row - 1]
    }
}

/// How the boundaries of the alignment are treated.
#[derive(Debug, Clone)]
pub enum Boundary {
    Local(Flanks),
    Global,
}

impl Boundary {
    pub fn new<R: SignalRead>(mode: AlignmentMode, input: &HmmInput<R>, num_kmers: usize) -> Self {
        match mode {
            AlignmentMode::Local => Boundary::Local(Flanks::new(input, num_kmers)),
            AlignmentMode::Global => Boundary::Global,
        }
    }
    pub fn mode(&self) -> AlignmentMode {
        match self {
            Boundary::Local(_) => AlignmentMode::Local,
            Boundary::Global => AlignmentMode::Global,
        }
    }
}

/// Everything precomputed before a fill: k-mer ranks, their transitions, and the boundary policy.
#[derive(Debug, Clone)]
pub struct ProfileTables {
    pub ranks: Vec<usize>,
    pub transitions: Vec<BlockTransitions>,
    pub boundary: Boundary,
}

impl ProfileTables {
    /// Validate `sequence` and `input`, then precompute the tables for aligning `input` to it.
    pub fn new<R: SignalRead>(
        sequence: &[u8],
        input: &HmmInput<R>,
        mode: AlignmentMode,
    ) -> Result<Self> {
        input.check()?;
        crate::kmer::validate(sequence, input.k())?;
        let ranks = input.kmer_ranks(sequence);
        let transitions = calculate_transitions(&ranks, input);
        let boundary = Boundary::new(mode, input, ranks.len());
        Ok(Self {
            ranks,
            transitions,
            boundary,
        })
    }
    pub fn num_kmers(&self) -> usize {
        self.ranks.len()
    }
    /// Number of blocks, including the start and the end block.
    pub fn num_blocks(&self) -> usize {
        self.num_kmers() + 2
    }
    pub fn num_columns(&self) -> usize {
        self.num_blocks() * NUM_STATES
    }
}

/// Fill `output` by aligning the events of `input` to the k-mers of `tables`, and
/// return the log-probability of the end state.
/// Panics if the dimensions of `output` do not agree with `tables` and `input`.
pub fn fill<R: SignalRead, O: HMMOutput>(
    tables: &ProfileTables,
    input: &HmmInput<R>,
    output: &mut O,
) -> f64 {
    let num_kmers = tables.num_kmers();
    let num_events = input.num_events();
    assert!(num_kmers >= 1, "no k-mer to align");
    assert_eq!(tables.transitions.len(), num_kmers);
    assert_eq!(output.num_columns(), tables.num_columns());
    assert_eq!(output.num_rows(), num_events + 1);
    if let Boundary::Local(flanks) = &tables.boundary {
        assert_eq!(flanks.pre().len(), num_events + 1);
        assert_eq!(flanks.post().len(), num_events);
    }
    debug_assert!(2 <= num_events);
    let (read, strand) = (input.read(), input.strand());
    let last_kmer_idx = num_kmers - 1;
    let (m_ofs, e_ofs, k_ofs) = (State::Match as usize, State::EventSplit as usize, State::KmerSkip as usize);
    for row in 1..output.num_rows() {
        let event_idx = input.event_index(row - 1);
        // The start block and the end block are not filled.
        for block in 1..tables.num_blocks() - 1 {
            let kmer_idx = block - 1;
            let bt = &tables.transitions[kmer_idx];
            let rank = tables.ranks[kmer_idx];
            let prev = NUM_STATES * (block - 1);
            let curr = NUM_STATES * block;
            let lp_emission_m = read.log_probability_match(rank, event_idx, strand);
            let lp_emission_e = read.log_probability_event_insert(rank, event_idx, strand);
            // Match
            let m_m = bt.lp_mm + output.get(row - 1, prev + m_ofs);
            let m_e = bt.lp_em + output.get(row - 1, prev + e_ofs);
            let m_k = bt.lp_km + output.get(row - 1, prev + k_ofs);
            let m_s = match &tables.boundary {
                Boundary::Local(flanks) => flanks.entry(row),
                Boundary::Global => EP,
            };
            output.update_4(row, curr + m_ofs, m_m, m_e, m_k, m_s, lp_emission_m);
            // EventSplit
            let e_m = bt.lp_me + output.get(row - 1, curr + m_ofs);
            let e_e = bt.lp_ee + output.get(row - 1, curr + e_ofs);
            output.update_4(row, curr + e_ofs, e_m, e_e, EP, EP, lp_emission_e);
            // KmerSkip. No emission.
            let k_m = bt.lp_mk + output.get(row, prev + m_ofs);
            let k_k = bt.lp_kk + output.get(row, prev + k_ofs);
            output.update_4(row, curr + k_ofs, k_m, EP, k_k, EP, 0f64);
            if let (Boundary::Local(flanks), true) = (&tables.boundary, kmer_idx == last_kmer_idx) {
                let lp_exit = flanks.exit(row);
                for &ofs in &[m_ofs, e_ofs, k_ofs] {
                    output.update_end(lp_exit + output.get(row, curr + ofs), row, curr + ofs);
                }
            }
            if log_enabled!(log::Level::Trace) {
                trace!(
                    "[{} {}]\tM:{:.2}\tE:{:.2}\tK:{:.2}\tEM:{:.2}\tEE:{:.2}",
                    event_idx,
                    kmer_idx,
                    output.get(row, curr + m_ofs),
                    output.get(row, curr + e_ofs),
                    output.get(row, curr + k_ofs),
                    lp_emission_m,
                    lp_emission_e
                );
            }
        }
    }
    if let Boundary::Global = tables.boundary {
        let last_row = output.num_rows() - 1;
        let terminal = NUM_STATES * num_kmers + m_ofs;
        output.update_end(output.get(last_row, terminal), last_row, terminal);
    }
    output.get_end()
}
