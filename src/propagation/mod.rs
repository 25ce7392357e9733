//! Constraint propagation after an edit.
//!
//! Two policies, selected by [`Policy`]:
//!
//! | Policy | Who moves | Module |
//! |--------|-----------|--------|
//! | Free | every affected task, shifted with duration preserved | [`free`] |
//! | Enforced | only the edited task, clamped against its neighbours | [`enforced`] |
//!
//! Both operate on an [`EphemeralSet`] and read adjacency from a
//! [`DependencyGraph`]. Tasks without a complete span are skipped, both as
//! the thing being corrected and as a bound on something else.

pub mod enforced;
pub mod free;

use std::collections::BTreeSet;

use crate::graph::DependencyGraph;
use crate::models::{IterationLimits, Policy};
use crate::rules::ClampMode;
use crate::session::EphemeralSet;

pub use enforced::clamp_task;
pub use free::propagate_free;

/// Outcome of one propagation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationReport {
    /// False when an iteration cap was hit before a fixed point.
    pub converged: bool,
    /// Queue pops (free) or full scans (enforced) performed.
    pub steps: usize,
    /// Tasks whose span changed, edited task excluded unless it was moved
    /// by propagation itself.
    pub shifted: BTreeSet<String>,
}

impl Default for PropagationReport {
    fn default() -> Self {
        Self {
            converged: true,
            steps: 0,
            shifted: BTreeSet::new(),
        }
    }
}

impl PropagationReport {
    /// Folds a follow-up run into this report.
    pub fn absorb(&mut self, other: PropagationReport) {
        self.converged &= other.converged;
        self.steps += other.steps;
        self.shifted.extend(other.shifted);
    }
}

/// Propagates an edit of `task_id` under `policy`.
///
/// `mode` only matters for the enforced policy.
pub fn propagate(
    set: &mut EphemeralSet,
    graph: &DependencyGraph,
    task_id: &str,
    policy: Policy,
    mode: ClampMode,
    limits: &IterationLimits,
) -> PropagationReport {
    match policy {
        Policy::Free => propagate_free(set, graph, task_id, limits.max_propagation_steps),
        Policy::Enforced => clamp_task(set, graph, task_id, mode, limits.max_clamp_passes),
    }
}
