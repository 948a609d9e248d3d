//! Flanking probabilities: events outside of the aligned region are emitted by the background.
//!
//! Between the start state and the first aligned event there is a silent "pre" state,
//! optionally visited after a few events emitted by a background state with a self loop.
//! The same holds for the "post" state after the last aligned event.
use crate::read::{HmmInput, SignalRead};

/// `pre[i]` is the log-probability that the first `i` events are emitted by the background.
pub fn make_pre_flanking<R: SignalRead>(input: &HmmInput<R>) -> Vec<f64> {
    let num_events = input.num_events();
    debug_assert!(2 <= num_events);
    let params = input.parameters();
    let (read, strand) = (input.read(), input.strand());
    let mut pre_flank = vec![0f64; num_events + 1];
    // No event is skipped.
    pre_flank[0] = params.trans_start_to_pre.ln();
    // The first event is skipped, including start -> background and background -> pre.
    pre_flank[1] = (1f64 - params.trans_start_to_pre).ln()
        + read.log_probability_background(input.event_index(0), strand)
        + (1f64 - params.trans_pre_self).ln();
    let lp_self = params.trans_pre_self.ln();
    for i in 2..num_events + 1 {
        let event_idx = input.event_index(i - 1);
        pre_flank[i] =
            lp_self + read.log_probability_background(event_idx, strand) + pre_flank[i - 1];
    }
    pre_flank
}

/// `post[i]` is the log-probability that the `i`-th event is the last aligned one and
/// the rest of the events are emitted by the background.
pub fn make_post_flanking<R: SignalRead>(input: &HmmInput<R>) -> Vec<f64> {
    let num_events = input.num_events();
    debug_assert!(2 <= num_events);
    let params = input.parameters();
    let (read, strand) = (input.read(), input.strand());
    let mut post_flank = vec![0f64; num_events];
    // All the events are aligned.
    post_flank[num_events - 1] = params.trans_start_to_pre.ln();
    // All but the last event are aligned.
    post_flank[num_events - 2] = (1f64 - params.trans_start_to_pre).ln()
        + read.log_probability_background(input.event_index(num_events - 1), strand)
        + (1f64 - params.trans_pre_self).ln();
    let lp_self = params.trans_pre_self.ln();
    for i in (0..num_events.saturating_sub(2)).rev() {
        let event_idx = input.event_index(i + 1);
        post_flank[i] =
            lp_self + read.log_probability_background(event_idx, strand) + post_flank[i + 1];
    }
    post_flank
}
