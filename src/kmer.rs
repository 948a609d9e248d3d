// k-mer ranks: the index of a k-mer in a pore model.
//
// A k-mer over ACGT is read as a base-4 number, the first base being the
// most significant digit. So, for k = 3, AAA -> 0, AAC -> 1, ..., TTT -> 63.
// The reverse-complement rank of a window is the rank of its reverse complement,
// which is what the complement strand of a read observes.
use crate::error::{HmmError, Result};
use std::convert::TryFrom;

// Two bit encoding for each base, and a "sentinel" for anything else.
pub(crate) const ADENINE: u8 = 0b00;
pub(crate) const CYTOSINE: u8 = 0b01;
pub(crate) const GUANINE: u8 = 0b10;
pub(crate) const THYMINE: u8 = 0b11;
pub(crate) const NULL: u8 = 0b100;

const fn lookup_table() -> [u8; 256] {
    let mut slots = [NULL; 256];
    slots[b'A' as usize] = ADENINE;
    slots[b'a' as usize] = ADENINE;
    slots[b'C' as usize] = CYTOSINE;
    slots[b'c' as usize] = CYTOSINE;
    slots[b'G' as usize] = GUANINE;
    slots[b'g' as usize] = GUANINE;
    slots[b'T' as usize] = THYMINE;
    slots[b't' as usize] = THYMINE;
    slots
}
pub(crate) const LOOKUP_TABLE: [u8; 256] = lookup_table();

/// Convert a base into its two bit encoding. Invalid bases would be `NULL`.
pub const fn convert_to_twobit(base: &u8) -> u8 {
    LOOKUP_TABLE[*base as usize]
}

/// Number of distinct k-mers, i.e., 4^k, if it fits in a `usize`.
pub fn num_states(k: usize) -> Result<usize> {
    k.checked_mul(2)
        .and_then(|bits| u32::try_from(bits).ok())
        .and_then(|bits| 1usize.checked_shl(bits))
        .ok_or(HmmError::KmerTooLong { k })
}

/// Number of k-mers in `seq`. Zero if `seq` is shorter than `k`.
pub fn num_kmers(seq: &[u8], k: usize) -> usize {
    (seq.len() + 1).saturating_sub(k)
}

/// Check that `seq` consists of ACGT and contains at least one k-mer.
pub fn validate(seq: &[u8], k: usize) -> Result<()> {
    if let Some(position) = seq.iter().position(|b| convert_to_twobit(b) == NULL) {
        let base = seq[position] as char;
        return Err(HmmError::InvalidBase { position, base });
    }
    if num_kmers(seq, k) == 0 {
        return Err(HmmError::SequenceTooShort { len: seq.len(), k });
    }
    Ok(())
}

/// Rank of the k-mer starting at `pos`.
/// The sequence should be validated beforehand.
pub fn kmer_rank(seq: &[u8], pos: usize, k: usize) -> usize {
    debug_assert!(pos + k <= seq.len());
    seq[pos..pos + k]
        .iter()
        .fold(0, |rank, b| (rank << 2) | convert_to_twobit(b) as usize)
}

/// Rank of the reverse complement of the k-mer starting at `pos`.
pub fn rc_kmer_rank(seq: &[u8], pos: usize, k: usize) -> usize {
    debug_assert!(pos + k <= seq.len());
    seq[pos..pos + k]
        .iter()
        .rev()
        .fold(0, |rank, b| (rank << 2) | (THYMINE - convert_to_twobit(b)) as usize)
}

/// Ranks of all the k-mers in `seq`, in order.
pub fn kmer_ranks(seq: &[u8], k: usize, rc: bool) -> Vec<usize> {
    (0..num_kmers(seq, k))
        .map(|pos| match rc {
            true => rc_kmer_rank(seq, pos, k),
            false => kmer_rank(seq, pos, k),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn rank() {
        assert_eq!(kmer_rank(b"AAA", 0, 3), 0);
        assert_eq!(kmer_rank(b"AAC", 0, 3), 1);
        assert_eq!(kmer_rank(b"TTT", 0, 3), 63);
        assert_eq!(kmer_rank(b"GATTACA", 2, 3), kmer_rank(b"TTA", 0, 3));
        assert_eq!(kmer_rank(b"acgt", 0, 4), kmer_rank(b"ACGT", 0, 4));
    }
    #[test]
    fn rc_rank() {
        // ACG <-> CGT
        assert_eq!(rc_kmer_rank(b"ACG", 0, 3), kmer_rank(b"CGT", 0, 3));
        // Palindrome.
        assert_eq!(rc_kmer_rank(b"ACGT", 0, 4), kmer_rank(b"ACGT", 0, 4));
        let ranks = kmer_ranks(b"AACCGGTT", 5, true);
        assert_eq!(ranks.len(), 4);
        assert_eq!(ranks[0], kmer_rank(b"CGGTT", 0, 5));
    }
    #[test]
    fn states() {
        assert_eq!(num_states(1), Ok(4));
        assert_eq!(num_states(5), Ok(1024));
        assert_eq!(num_states(31), Ok(1 << 62));
        assert_eq!(num_states(32), Err(HmmError::KmerTooLong { k: 32 }));
        assert_eq!(num_states(usize::MAX), Err(HmmError::KmerTooLong { k: usize::MAX }));
    }
    #[test]
    fn validation() {
        assert!(validate(b"ACGTA", 5).is_ok());
        assert_eq!(
            validate(b"ACGT", 5),
            Err(HmmError::SequenceTooShort { len: 4, k: 5 })
        );
        assert_eq!(
            validate(b"ACNT", 2),
            Err(HmmError::InvalidBase {
                position: 2,
                base: 'N'
            })
        );
        assert_eq!(num_kmers(b"ACGTACGT", 5), 4);
        assert_eq!(num_kmers(b"", 5), 0);
    }
}
