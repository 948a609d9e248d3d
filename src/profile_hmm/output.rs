//! Output writers of the fill. The fill loop hands the incoming log-probabilities of each cell
//! to a writer, which decides how to combine them.
//! [`ForwardOutput`] sums over the paths, [`ViterbiOutput`] keeps the best one.
use super::{add_logs, EndCell, State, EP, NUM_STATES};
use crate::dptable::DPTable;

/// A writer of the DP matrix.
pub trait HMMOutput {
    /// A (rows x columns) matrix, initialized so that every path starts at
    /// the Match state of the start block in the 0-th row.
    fn new(rows: usize, columns: usize) -> Self;
    /// Set the (row, col) cell from the incoming paths from a Match (`m`), an EventSplit (`e`),
    /// a KmerSkip (`k`), and the leading flank (`s`), then emit `lp_emission`.
    #[allow(clippy::too_many_arguments)]
    fn update_4(&mut self, row: usize, col: usize, m: f64, e: f64, k: f64, s: f64, lp_emission: f64);
    /// Add the probability `v` of ending the alignment at (row, col).
    fn update_end(&mut self, v: f64, row: usize, col: usize);
    /// The log-probability stored at (row, col).
    fn get(&self, row: usize, col: usize) -> f64;
    /// The log-probability of the end state.
    fn get_end(&self) -> f64;
    fn num_rows(&self) -> usize;
    fn num_columns(&self) -> usize;
}

fn initial_table(rows: usize, columns: usize) -> DPTable<f64> {
    assert!(0 < rows && 0 < columns && columns % NUM_STATES == 0);
    let mut table = DPTable::new(rows, columns, EP);
    table.set(0, State::Match.offset(), 0f64);
    table
}

/// Writer for the Forward algorithm.
#[derive(Debug, Clone)]
pub struct ForwardOutput {
    table: DPTable<f64>,
    lp_end: f64,
}

impl HMMOutput for ForwardOutput {
    fn new(rows: usize, columns: usize) -> Self {
        Self {
            table: initial_table(rows, columns),
            lp_end: EP,
        }
    }
    #[inline]
    fn update_4(&mut self, row: usize, col: usize, m: f64, e: f64, k: f64, s: f64, lp_emission: f64) {
        let sum = add_logs(add_logs(m, e), add_logs(k, s)) + lp_emission;
        self.table.set(row, col, sum);
    }
    #[inline]
    fn update_end(&mut self, v: f64, _row: usize, _col: usize) {
        self.lp_end = add_logs(self.lp_end, v);
    }
    fn get(&self, row: usize, col: usize) -> f64 {
        self.table.get(row, col)
    }
    fn get_end(&self) -> f64 {
        self.lp_end
    }
    fn num_rows(&self) -> usize {
        self.table.num_rows()
    }
    fn num_columns(&self) -> usize {
        self.table.num_columns()
    }
}

/// The best end of the alignment seen so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestEnd {
    lp_end: f64,
    cell: Option<EndCell>,
}

impl std::default::Default for BestEnd {
    fn default() -> Self {
        Self {
            lp_end: EP,
            cell: None,
        }
    }
}

impl BestEnd {
    /// Keep (row, column) if `v` is strictly better than the current best.
    pub fn offer(&mut self, v: f64, row: usize, column: usize) {
        if self.lp_end < v {
            self.lp_end = v;
            self.cell = Some(EndCell { row, column });
        }
    }
    pub fn lp(&self) -> f64 {
        self.lp_end
    }
    pub fn cell(&self) -> Option<EndCell> {
        self.cell
    }
}

/// Writer for the Viterbi algorithm. Along with the matrix, it records
/// which state each cell came from.
#[derive(Debug, Clone)]
pub struct ViterbiOutput {
    table: DPTable<f64>,
    backpointers: DPTable<u8>,
    end: BestEnd,
}

impl ViterbiOutput {
    /// The state the best path into (row, col) came from.
    pub fn backpointer(&self, row: usize, col: usize) -> State {
        State::from_u8(self.backpointers.get(row, col))
    }
    /// The cell where the best alignment ends.
    pub fn end_cell(&self) -> Option<EndCell> {
        self.end.cell()
    }
}

impl HMMOutput for ViterbiOutput {
    fn new(rows: usize, columns: usize) -> Self {
        Self {
            table: initial_table(rows, columns),
            backpointers: DPTable::new(rows, columns, State::Match as u8),
            end: BestEnd::default(),
        }
    }
    #[inline]
    fn update_4(&mut self, row: usize, col: usize, m: f64, e: f64, k: f64, s: f64, lp_emission: f64) {
        // Ties are broken by Match, EventSplit, KmerSkip, and then PreSoft.
        let (from, max) = [(State::EventSplit, e), (State::KmerSkip, k), (State::PreSoft, s)]
            .iter()
            .fold((State::Match, m), |(from, max), &(state, lp)| {
                if max < lp {
                    (state, lp)
                } else {
                    (from, max)
                }
            });
        self.table.set(row, col, max + lp_emission);
        self.backpointers.set(row, col, from as u8);
    }
    #[inline]
    fn update_end(&mut self, v: f64, row: usize, col: usize) {
        self.end.offer(v, row, col);
    }
    fn get(&self, row: usize, col: usize) -> f64 {
        self.table.get(row, col)
    }
    fn get_end(&self) -> f64 {
        self.end.lp()
    }
    fn num_rows(&self) -> usize {
        self.table.num_rows()
    }
    fn num_columns(&self) -> usize {
        self.table.num_columns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    #[test]
    fn initialization() {
        let forward = ForwardOutput::new(3, 9);
        assert_eq!(forward.get(0, State::Match.offset()), 0f64);
        assert_eq!(forward.get(0, State::EventSplit.offset()), EP);
        assert_eq!(forward.get(1, State::Match.offset()), EP);
        assert_eq!(forward.get_end(), EP);
        let viterbi = ViterbiOutput::new(3, 9);
        assert_eq!(viterbi.get(0, State::Match.offset()), 0f64);
        assert_eq!(viterbi.end_cell(), None);
        assert_eq!((viterbi.num_rows(), viterbi.num_columns()), (3, 9));
    }
    #[test]
    fn forward_update() {
        let mut forward = ForwardOutput::new(2, 6);
        let (m, e) = (0.2f64.ln(), 0.3f64.ln());
        forward.update_4(1, 4, m, e, EP, EP, -1f64);
        assert_abs_diff_eq!(forward.get(1, 4), 0.5f64.ln() - 1f64, epsilon = 1e-12);
        forward.update_4(1, 5, EP, EP, EP, EP, -1f64);
        assert_eq!(forward.get(1, 5), EP);
        forward.update_end(0.25f64.ln(), 1, 4);
        forward.update_end(EP, 1, 5);
        forward.update_end(0.25f64.ln(), 1, 3);
        assert_abs_diff_eq!(forward.get_end(), 0.5f64.ln(), epsilon = 1e-12);
    }
    #[test]
    fn viterbi_update() {
        let mut viterbi = ViterbiOutput::new(2, 6);
        viterbi.update_4(1, 3, -3f64, -1f64, -2f64, EP, -0.5);
        assert_eq!(viterbi.get(1, 3), -1.5);
        assert_eq!(viterbi.backpointer(1, 3), State::EventSplit);
        // Ties.
        viterbi.update_4(1, 4, -1f64, -1f64, -1f64, -1f64, 0f64);
        assert_eq!(viterbi.backpointer(1, 4), State::Match);
        viterbi.update_4(1, 5, EP, -2f64, -2f64, EP, 0f64);
        assert_eq!(viterbi.backpointer(1, 5), State::EventSplit);
        viterbi.update_4(1, 2, EP, EP, -2f64, -2f64, 0f64);
        assert_eq!(viterbi.backpointer(1, 2), State::KmerSkip);
        viterbi.update_4(1, 1, EP, EP, EP, -4f64, 0f64);
        assert_eq!(viterbi.backpointer(1, 1), State::PreSoft);
    }
    #[test]
    fn best_end() {
        let mut end = BestEnd::default();
        end.offer(EP, 1, 1);
        assert_eq!(end.cell(), None);
        end.offer(-3f64, 1, 5);
        end.offer(-3f64, 2, 5);
        end.offer(-4f64, 3, 5);
        assert_eq!(end.cell(), Some(EndCell { row: 1, column: 5 }));
        end.offer(-2f64, 4, 3);
        assert_eq!(end.lp(), -2f64);
        assert_eq!(end.cell(), Some(EndCell { row: 4, column: 3 }));
    }
}
