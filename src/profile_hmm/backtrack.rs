//! Recover the best alignment from a filled Viterbi matrix.
use super::fill::ProfileTables;
use super::output::{HMMOutput, ViterbiOutput};
use super::{AlignmentStep, EndCell, State, NUM_STATES};
use crate::read::{HmmInput, SignalRead};

/// Trace the backpointers of `output` from the end of the best alignment.
/// The steps are in the order of the events. If there is no alignment, the path is empty.
pub fn backtrack<R: SignalRead>(
    output: &ViterbiOutput,
    tables: &ProfileTables,
    input: &HmmInput<R>,
) -> Vec<AlignmentStep> {
    let end = match output.end_cell() {
        Some(end) if output.get_end().is_finite() => end,
        _ => return vec![],
    };
    let (read, strand) = (input.read(), input.strand());
    let mut cell = end;
    let mut path = vec![];
    // Stop at the start block.
    while 0 < cell.row && 0 < cell.block() {
        let (row, col) = (cell.row, cell.column);
        let (block, state) = (cell.block(), cell.state());
        let kmer_idx = block - 1;
        let event_idx = input.event_index(row - 1);
        let rank = tables.ranks[kmer_idx];
        let bt = &tables.transitions[kmer_idx];
        let from = output.backpointer(row, col);
        if from == State::PreSoft {
            break;
        }
        let (lp_transition, lp_emission, next) = match state {
            State::Match => {
                let lp_transition = match from {
                    State::Match => bt.lp_mm,
                    State::EventSplit => bt.lp_em,
                    _ => bt.lp_km,
                };
                let lp_emission = read.log_probability_match(rank, event_idx, strand);
                let next = (row - 1, NUM_STATES * (block - 1) + from.offset());
                (lp_transition, lp_emission, next)
            }
            State::EventSplit => {
                let lp_transition = match from {
                    State::Match => bt.lp_me,
                    _ => bt.lp_ee,
                };
                let lp_emission = read.log_probability_event_insert(rank, event_idx, strand);
                let next = (row - 1, NUM_STATES * block + from.offset());
                (lp_transition, lp_emission, next)
            }
            _ => {
                let lp_transition = match from {
                    State::Match => bt.lp_mk,
                    _ => bt.lp_kk,
                };
                let next = (row, NUM_STATES * (block - 1) + from.offset());
                (lp_transition, 0f64, next)
            }
        };
        path.push(AlignmentStep {
            event_idx,
            kmer_idx,
            state,
            lp_cell: output.get(row, col),
            lp_transition,
            lp_emission,
        });
        cell = EndCell {
            row: next.0,
            column: next.1,
        };
    }
    path.reverse();
    path
}
