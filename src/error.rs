//! Errors reported by the front doors of the profile HMM.
use thiserror::Error;

/// Input problems detected before a matrix is allocated.
/// Failures inside the fill itself are never reported here: they show up as
/// a negative infinite log-probability.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HmmError {
    /// The sequence is shorter than a single k-mer.
    #[error("sequence of length {len} contains no {k}-mer")]
    SequenceTooShort { len: usize, k: usize },
    /// A base outside of ACGT.
    #[error("invalid base {base:?} at position {position}")]
    InvalidBase { position: usize, base: char },
    /// The event window should contain at least two events.
    #[error("event window [{start}, {stop}] has fewer than two events")]
    EventWindowTooShort { start: usize, stop: usize },
    /// The event window runs past the events of the strand.
    #[error("event index {index} is out of range ({num_events} events)")]
    EventOutOfRange { index: usize, num_events: usize },
    /// A transition parameter out of its valid range.
    #[error("invalid transition parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    /// 4^k does not fit in the address space.
    #[error("{k}-mers are too long to be ranked")]
    KmerTooLong { k: usize },
    /// A level distribution or a scaling with a non-positive spread.
    #[error("invalid pore model: {name} = {value}")]
    InvalidModel { name: &'static str, value: f64 },
    /// The pore model does not have 4^k states.
    #[error("pore model with k={k} should have {expected} states, found {found}")]
    ModelSize {
        k: usize,
        expected: usize,
        found: usize,
    },
}

/// Shorthand used throughout this crate.
pub type Result<T> = std::result::Result<T, HmmError>;
