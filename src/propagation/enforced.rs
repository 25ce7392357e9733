//! Enforced-policy clamping: only the edited task moves.
//!
//! The edited task is checked against each of its own dependencies (it must
//! not start or end before they allow) and each of its dependents (it must
//! not push past them). Which edge may move depends on the [`ClampMode`] of
//! the gesture. Scans repeat until one full scan changes nothing, bounded by
//! the pass cap. No other task in the working set is written.

use tracing::{debug, warn};

use super::PropagationReport;
use crate::graph::DependencyGraph;
use crate::models::Span;
use crate::rules::{clamp_to_child, clamp_to_parent, ClampMode};
use crate::session::EphemeralSet;

/// Clamps `task_id` against its neighbours.
pub fn clamp_task(
    set: &mut EphemeralSet,
    graph: &DependencyGraph,
    task_id: &str,
    mode: ClampMode,
    max_passes: usize,
) -> PropagationReport {
    let mut report = PropagationReport::default();
    let Some(original) = set.span(task_id) else {
        return report;
    };

    let mut current = original;
    loop {
        if report.steps >= max_passes {
            warn!(task = %task_id, max_passes, "clamp did not settle");
            report.converged = false;
            break;
        }
        report.steps += 1;

        let next = scan(set, graph, task_id, current, mode);
        set.set_span(task_id, next);
        if next == current {
            break;
        }
        current = next;
    }

    if current != original {
        debug!(task = %task_id, ?mode, from = ?original, to = ?current, "clamped");
        report.shifted.insert(task_id.to_string());
    }
    report
}

/// One full scan over parents, then dependents.
fn scan(set: &EphemeralSet, graph: &DependencyGraph, task_id: &str, task: Span, mode: ClampMode) -> Span {
    let mut span = task;
    for link in graph.upstream(task_id) {
        let parent = if link.task_id == task_id {
            Some(span)
        } else {
            set.span(&link.task_id)
        };
        if let Some(parent) = parent {
            span = clamp_to_parent(span, link.dependency_type, parent, mode);
        }
    }
    for link in graph.downstream(task_id) {
        let child = if link.task_id == task_id {
            Some(span)
        } else {
            set.span(&link.task_id)
        };
        if let Some(child) = child {
            span = clamp_to_child(span, link.dependency_type, child, mode);
        }
    }
    span
}
