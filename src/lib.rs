//! A profile hidden Markov model aligning nanopore events to a nucleotide sequence.
//!
//! A read is a series of events, each of which is a segment of the raw current with a roughly constant level.
//! Given a candidate sequence, [`score`] computes the probability that the events were produced
//! by passing the sequence through the pore, and [`align`] recovers the most likely assignment of
//! the events to the k-mers of the sequence.
//!
//! ```ignore
//! let read = SquiggleRead::template_only(id, events, pore_model, TransitionParameters::default())?;
//! let input = HmmInput::whole_strand(&read, Strand::Template)?;
//! let lk = score(b"ACGTTGCA...", &input, AlignmentMode::Local)?;
//! ```
#[macro_use]
extern crate log;
pub mod dptable;
pub mod error;
pub mod gen_seq;
pub mod kmer;
pub mod parameters;
pub mod pore_model;
pub mod profile_hmm;
pub mod read;

pub use error::{HmmError, Result};
pub use parameters::TransitionParameters;
pub use pore_model::{GaussianParameters, PoreModel, ScalingParameters};
pub use profile_hmm::{
    align, evaluate, score, AlignmentMode, AlignmentResult, AlignmentStep, Objective, State,
};
pub use read::{Event, HmmInput, SignalRead, SquiggleRead, Strand};
