//! Reads, i.e., the events observed on each strand, and the event windows fed into the HMM.
use crate::error::{HmmError, Result};
use crate::parameters::TransitionParameters;
use crate::pore_model::{GaussianParameters, PoreModel};

/// Log-probability of an event emitted by the background, i.e., not by the aligned sequence.
pub const BACKGROUND_LOG_PROBABILITY: f64 = -3.0;

/// The strand of a 2D read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Template,
    Complement,
}

impl std::convert::From<Strand> for usize {
    fn from(strand: Strand) -> usize {
        match strand {
            Strand::Template => 0,
            Strand::Complement => 1,
        }
    }
}

/// A segment of the signal with (roughly) a constant level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub mean: f64,
    pub stdv: f64,
    pub start_time: f64,
    pub duration: f64,
}

/// Everything the profile HMM needs to know about a read.
/// The HMM only queries a read, it never modifies it.
pub trait SignalRead {
    /// Length of the k-mers of the pore model on `strand`.
    fn k(&self, strand: Strand) -> usize;
    /// Number of events on `strand`.
    fn num_events(&self, strand: Strand) -> usize;
    /// Transition parameters calibrated for `strand`.
    fn parameters(&self, strand: Strand) -> &TransitionParameters;
    /// Scaled level distribution of the k-mer `rank`.
    fn scaled_parameters(&self, rank: usize, strand: Strand) -> GaussianParameters;
    /// log Pr{event | Match state of k-mer `rank`}
    fn log_probability_match(&self, rank: usize, event_idx: usize, strand: Strand) -> f64;
    /// log Pr{event | EventSplit state of k-mer `rank`}
    fn log_probability_event_insert(&self, rank: usize, event_idx: usize, strand: Strand) -> f64;
    /// log Pr{event | background}
    fn log_probability_background(&self, event_idx: usize, strand: Strand) -> f64;
}

/// A read with events and a calibrated pore model on both strands.
#[derive(Debug, Clone)]
pub struct SquiggleRead {
    pub id: String,
    events: [Vec<Event>; 2],
    pore_models: [PoreModel; 2],
    parameters: [TransitionParameters; 2],
}

impl SquiggleRead {
    /// Create a new read. `[template, complement]` order for each array.
    pub fn new(
        id: String,
        events: [Vec<Event>; 2],
        pore_models: [PoreModel; 2],
        parameters: [TransitionParameters; 2],
    ) -> Result<Self> {
        for params in parameters.iter() {
            params.validate()?;
        }
        Ok(Self {
            id,
            events,
            pore_models,
            parameters,
        })
    }
    /// Create a read with only template events. The complement strand is empty.
    pub fn template_only(
        id: String,
        events: Vec<Event>,
        pore_model: PoreModel,
        parameters: TransitionParameters,
    ) -> Result<Self> {
        let complement = pore_model.clone();
        Self::new(
            id,
            [events, vec![]],
            [pore_model, complement],
            [parameters.clone(), parameters],
        )
    }
    pub fn events(&self, strand: Strand) -> &[Event] {
        &self.events[usize::from(strand)]
    }
    pub fn pore_model(&self, strand: Strand) -> &PoreModel {
        &self.pore_models[usize::from(strand)]
    }
}

impl SignalRead for SquiggleRead {
    fn k(&self, strand: Strand) -> usize {
        self.pore_model(strand).k()
    }
    fn num_events(&self, strand: Strand) -> usize {
        self.events(strand).len()
    }
    fn parameters(&self, strand: Strand) -> &TransitionParameters {
        &self.parameters[usize::from(strand)]
    }
    fn scaled_parameters(&self, rank: usize, strand: Strand) -> GaussianParameters {
        self.pore_model(strand).scaled_parameters(rank)
    }
    fn log_probability_match(&self, rank: usize, event_idx: usize, strand: Strand) -> f64 {
        let model = self.pore_model(strand);
        let event = &self.events(strand)[event_idx];
        let level = model.drift_corrected(event.mean, event.start_time);
        model.scaled_parameters(rank).log_pdf(level)
    }
    fn log_probability_event_insert(&self, rank: usize, event_idx: usize, strand: Strand) -> f64 {
        self.log_probability_match(rank, event_idx, strand)
    }
    fn log_probability_background(&self, _event_idx: usize, _strand: Strand) -> f64 {
        BACKGROUND_LOG_PROBABILITY
    }
}

/// A window of events on a strand of a read.
/// The window runs from `event_start` to `event_stop`, both inclusive.
/// If `event_stop < event_start`, the events are visited backward.
/// `rc` tells whether the events should be compared to the reverse complement of the sequence.
pub struct HmmInput<'a, R: SignalRead> {
    read: &'a R,
    strand: Strand,
    event_start: usize,
    event_stop: usize,
    rc: bool,
}

impl<'a, R: SignalRead> Clone for HmmInput<'a, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, R: SignalRead> Copy for HmmInput<'a, R> {}

impl<'a, R: SignalRead> HmmInput<'a, R> {
    pub fn new(
        read: &'a R,
        strand: Strand,
        event_start: usize,
        event_stop: usize,
        rc: bool,
    ) -> Result<Self> {
        let input = Self {
            read,
            strand,
            event_start,
            event_stop,
            rc,
        };
        input.check()?;
        Ok(input)
    }
    /// Check that the window has at least two events, all inside the strand,
    /// and that the parameters of the strand are valid.
    pub fn check(&self) -> Result<()> {
        let num_events = self.read.num_events(self.strand);
        let max = self.event_start.max(self.event_stop);
        if num_events <= max {
            return Err(HmmError::EventOutOfRange {
                index: max,
                num_events,
            });
        }
        if self.event_start == self.event_stop {
            return Err(HmmError::EventWindowTooShort {
                start: self.event_start,
                stop: self.event_stop,
            });
        }
        self.read.parameters(self.strand).validate()
    }
    /// The whole strand, forward.
    pub fn whole_strand(read: &'a R, strand: Strand) -> Result<Self> {
        let stop = read.num_events(strand).saturating_sub(1);
        Self::new(read, strand, 0, stop, false)
    }
    pub fn read(&self) -> &'a R {
        self.read
    }
    pub fn strand(&self) -> Strand {
        self.strand
    }
    /// +1 or -1.
    pub fn event_stride(&self) -> isize {
        match self.event_start <= self.event_stop {
            true => 1,
            false => -1,
        }
    }
    pub fn num_events(&self) -> usize {
        match self.event_start <= self.event_stop {
            true => self.event_stop - self.event_start + 1,
            false => self.event_start - self.event_stop + 1,
        }
    }
    /// Index of the `i`-th event in this window.
    pub fn event_index(&self, i: usize) -> usize {
        (self.event_start as isize + i as isize * self.event_stride()) as usize
    }
    pub fn parameters(&self) -> &'a TransitionParameters {
        self.read.parameters(self.strand)
    }
    pub fn k(&self) -> usize {
        self.read.k(self.strand)
    }
    /// Ranks of the k-mers of `sequence`, as seen from this window.
    pub fn kmer_ranks(&self, sequence: &[u8]) -> Vec<usize> {
        crate::kmer::kmer_ranks(sequence, self.k(), self.rc)
    }
}
