//! Free-policy propagation: shift whatever must move.
//!
//! # Algorithm
//!
//! 1. **Downstream pass.** BFS from the edited task over dependents. Each
//!    dependent is pushed later by [`push_child`] against all of its parents
//!    (in declaration order); a dependent that moved is enqueued in turn.
//! 2. **Upstream pass.** BFS from the edited task over dependencies. Each
//!    dependency is pulled earlier by [`pull_parent`] against all of its
//!    dependents in the working set; one that moved is enqueued in turn.
//!
//! Every shift preserves duration. A group with a derived side that gets
//! shifted carries its whole subtree by the same delta, so the next
//! aggregation lands it where propagation put it; the carried members are
//! enqueued like any other moved task. Both passes share one step budget;
//! on a dependency cycle the budget runs out and the report is marked
//! non-converged.
//!
//! # Complexity
//! O(steps * d) where d is the largest number of links on one task.

use std::collections::VecDeque;

use tracing::{trace, warn};

use super::PropagationReport;
use crate::graph::DependencyGraph;
use crate::rules::{pull_parent, push_child};
use crate::session::EphemeralSet;

/// Propagates an edit of `changed_id` in both directions.
pub fn propagate_free(
    set: &mut EphemeralSet,
    graph: &DependencyGraph,
    changed_id: &str,
    max_steps: usize,
) -> PropagationReport {
    let mut report = PropagationReport::default();
    recalc_downstream(set, graph, changed_id, max_steps, &mut report);
    if report.converged {
        recalc_upstream(set, graph, changed_id, max_steps, &mut report);
    }
    report
}

fn recalc_downstream(
    set: &mut EphemeralSet,
    graph: &DependencyGraph,
    changed_id: &str,
    max_steps: usize,
    report: &mut PropagationReport,
) {
    let mut queue = VecDeque::from([changed_id.to_string()]);
    while let Some(parent_id) = queue.pop_front() {
        if report.steps >= max_steps {
            warn!(task = %changed_id, max_steps, "downstream propagation did not converge");
            report.converged = false;
            return;
        }
        report.steps += 1;
        for link in graph.downstream(&parent_id) {
            let Some(delta) = apply_parent_constraints(set, graph, &link.task_id) else {
                continue;
            };
            trace!(task = %link.task_id, parent = %parent_id, delta, "pushed later");
            let carried = carry_members(set, graph, &link.task_id, delta);
            for id in std::iter::once(link.task_id.clone()).chain(carried) {
                report.shifted.insert(id.clone());
                queue.push_back(id);
            }
        }
    }
}

fn recalc_upstream(
    set: &mut EphemeralSet,
    graph: &DependencyGraph,
    changed_id: &str,
    max_steps: usize,
    report: &mut PropagationReport,
) {
    let mut queue = VecDeque::from([changed_id.to_string()]);
    while let Some(child_id) = queue.pop_front() {
        if report.steps >= max_steps {
            warn!(task = %changed_id, max_steps, "upstream propagation did not converge");
            report.converged = false;
            return;
        }
        report.steps += 1;
        for link in graph.upstream(&child_id) {
            let Some(delta) = apply_child_constraints(set, graph, &link.task_id) else {
                continue;
            };
            trace!(task = %link.task_id, child = %child_id, delta, "pulled earlier");
            let carried = carry_members(set, graph, &link.task_id, delta);
            for id in std::iter::once(link.task_id.clone()).chain(carried) {
                report.shifted.insert(id.clone());
                queue.push_back(id);
            }
        }
    }
}

/// Pushes `child_id` to satisfy all of its parents. Returns the shift, if
/// it moved.
fn apply_parent_constraints(
    set: &mut EphemeralSet,
    graph: &DependencyGraph,
    child_id: &str,
) -> Option<i64> {
    let child = set.span(child_id)?;
    let pushed = push_child(
        child,
        graph
            .upstream(child_id)
            .iter()
            .filter_map(|link| set.span(&link.task_id).map(|p| (link.dependency_type, p))),
    );
    set.set_span(child_id, pushed)
        .then(|| pushed.start_ms.saturating_sub(child.start_ms))
}

/// Pulls `parent_id` to satisfy all of its dependents. Returns the shift,
/// if it moved.
fn apply_child_constraints(
    set: &mut EphemeralSet,
    graph: &DependencyGraph,
    parent_id: &str,
) -> Option<i64> {
    let parent = set.span(parent_id)?;
    let mut requirements = Vec::new();
    for child_id in graph.dependents(parent_id) {
        let Some(child) = set.span(child_id) else {
            continue;
        };
        requirements.extend(
            graph
                .upstream(child_id)
                .iter()
                .filter(|link| link.task_id == parent_id)
                .map(|link| (link.dependency_type, child)),
        );
    }
    let pulled = pull_parent(parent, requirements);
    set.set_span(parent_id, pulled)
        .then(|| pulled.start_ms.saturating_sub(parent.start_ms))
}

/// Shifts the subtree of `group_id` by `delta_ms` when the group has a
/// derived side. Returns the descendants that moved.
fn carry_members(
    set: &mut EphemeralSet,
    graph: &DependencyGraph,
    group_id: &str,
    delta_ms: i64,
) -> Vec<String> {
    if delta_ms == 0 || !set.get(group_id).is_some_and(|g| g.has_derived_side()) {
        return Vec::new();
    }
    graph
        .descendants(group_id)
        .into_iter()
        .filter(|id| set.get_mut(id).is_some_and(|member| member.shift(delta_ms)))
        .map(str::to_string)
        .collect()
}
