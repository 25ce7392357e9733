//! Group span aggregation.
//!
//! A group's unpinned start is the earliest start among all of its
//! descendants (through nested groups); its unpinned end is the latest end.
//! Pinned sides are left alone. Descendants lacking an instant contribute
//! nothing for that side; a group with no contributing descendant keeps
//! whatever value it had.
//!
//! Groups are recomputed in sorted ID order, repeated until a pass changes
//! nothing, so nested groups settle regardless of order.

use tracing::warn;

use crate::graph::DependencyGraph;
use crate::models::{IterationLimits, Task};
use crate::session::EphemeralSet;

/// Outcome of one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationReport {
    /// False when the pass cap was hit before a fixed point.
    pub converged: bool,
    /// Passes performed, including the final one that changed nothing.
    pub passes: usize,
}

impl Default for AggregationReport {
    fn default() -> Self {
        Self {
            converged: true,
            passes: 0,
        }
    }
}

/// Recomputes every group span in `set` until stable.
pub fn aggregate_groups(
    set: &mut EphemeralSet,
    graph: &DependencyGraph,
    max_passes: usize,
) -> AggregationReport {
    let groups = set.group_ids();
    if groups.is_empty() {
        return AggregationReport::default();
    }

    for pass in 1..=max_passes {
        let mut changed = false;
        for group_id in &groups {
            changed |= recompute_group(set, graph, group_id);
        }
        if !changed {
            return AggregationReport {
                converged: true,
                passes: pass,
            };
        }
    }

    warn!(groups = groups.len(), max_passes, "group aggregation did not settle");
    AggregationReport {
        converged: false,
        passes: max_passes,
    }
}

/// Returns a copy of `tasks` with every group's unpinned sides filled in
/// from its descendants.
///
/// Computed values are flagged in [`Task::derived`], so feeding the result
/// back in yields the same list.
///
/// ```
/// use gantt_constraints::aggregation::recompute_group_spans;
/// use gantt_constraints::models::{Span, Task};
///
/// let tasks = vec![
///     Task::group("G"),
///     Task::new("A").with_span(200, 400).with_parent("G"),
///     Task::new("B").with_span(500, 800).with_parent("G"),
/// ];
/// let resolved = recompute_group_spans(&tasks);
/// assert_eq!(resolved[0].span(), Some(Span::new(200, 800)));
/// assert_eq!(recompute_group_spans(&resolved), resolved);
/// ```
pub fn recompute_group_spans(tasks: &[Task]) -> Vec<Task> {
    recompute_group_spans_with(tasks, &IterationLimits::default())
}

/// [`recompute_group_spans`] with explicit iteration caps.
pub fn recompute_group_spans_with(tasks: &[Task], limits: &IterationLimits) -> Vec<Task> {
    let graph = DependencyGraph::build(tasks);
    let mut set = EphemeralSet::from_tasks(tasks.iter().filter(|t| t.is_group || t.parent_id.is_some()));
    aggregate_groups(&mut set, &graph, limits.max_aggregation_passes);
    set.merge(tasks)
}

/// Earliest start and latest end among the descendants of `group_id`.
fn descendant_bounds(set: &EphemeralSet, graph: &DependencyGraph, group_id: &str) -> (Option<i64>, Option<i64>) {
    let mut min_start: Option<i64> = None;
    let mut max_end: Option<i64> = None;
    for task in graph.descendants(group_id).into_iter().filter_map(|id| set.get(id)) {
        if let Some(start) = task.start {
            min_start = Some(min_start.map_or(start, |m| m.min(start)));
        }
        if let Some(end) = task.end {
            max_end = Some(max_end.map_or(end, |m| m.max(end)));
        }
    }
    (min_start, max_end)
}

fn recompute_group(set: &mut EphemeralSet, graph: &DependencyGraph, group_id: &str) -> bool {
    let (min_start, max_end) = descendant_bounds(set, graph, group_id);
    let Some(group) = set.get_mut(group_id) else {
        return false;
    };

    let mut changed = false;
    if !group.start_pinned && min_start.is_some() && group.start != min_start {
        group.start = min_start;
        changed = true;
    }
    if !group.end_pinned && max_end.is_some() && group.end != max_end {
        group.end = max_end;
        changed = true;
    }
    changed
}
