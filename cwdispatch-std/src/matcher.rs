//! Selecting the registrations that apply to an envelope.
//!
//! # Precedence
//!
//! A registration is a candidate when its source pattern and its
//! detail-type pattern both match, and its filter (if any) accepts the
//! envelope. Each axis is ranked on its own: an exact pattern beats any
//! wildcard, and a longer wildcard prefix beats a shorter one.
//!
//! A candidate is dropped when another candidate is at least as specific on
//! both axes and strictly more specific on one. What remains fires, so
//! candidates that each win on a different axis fan out. Should two
//! candidates ever tie on both axes the earlier registration wins.
//!
//! Selection is pure: it never decodes a detail or calls a handler.

use crate::{
    pattern::Specificity,
    registration::Registration,
    registry::Registry,
};
use cwdispatch_core::EventEnvelope;

type Rank = (Specificity, Specificity);

/// Registrations that apply to `envelope`, in registration order.
///
/// An empty result is not an error; the dispatcher reports it as
/// [`NoMatch`](cwdispatch_core::DispatchResult::NoMatch).
pub fn select<'r>(registry: &'r Registry, envelope: &EventEnvelope) -> Vec<&'r Registration> {
    let candidates: Vec<(&Registration, Rank)> = registry
        .iter()
        .filter_map(|registration| {
            registration
                .specificity(envelope)
                .map(|rank| (registration, rank))
        })
        .collect();

    candidates
        .iter()
        .enumerate()
        .filter(|(i, (_, rank))| {
            !candidates
                .iter()
                .enumerate()
                .any(|(j, (_, other))| dominates(other, rank) || (other == rank && j < *i))
        })
        .map(|(_, (registration, _))| *registration)
        .collect()
}

fn dominates(a: &Rank, b: &Rank) -> bool {
    a.0 >= b.0 && a.1 >= b.1 && a != b
}
