//! Constraint rules for FS/SS/FF/SF links.
//!
//! Pure functions over [`Span`]s. For a link of type `t` between a child
//! span `c` and a parent span `p`, the **violation** is how far the child
//! edge falls short of the parent edge bounding it (0 when satisfied):
//!
//! | Type | Invariant | Violation |
//! |------|-----------|-----------|
//! | FS | `c.start >= p.end`   | `p.end - c.start`   |
//! | SS | `c.start >= p.start` | `p.start - c.start` |
//! | FF | `c.end >= p.end`     | `p.end - c.end`     |
//! | SF | `c.end >= p.start`   | `p.start - c.end`   |
//!
//! Corrections always move by exactly the violation, the minimal delta that
//! restores equality at the binding edge.

use crate::models::{DependencyType, Edge, Span};

/// How the edited task may move in enforced mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampMode {
    /// Both edges shift together (whole-bar drag).
    Move,
    /// Only the start edge moves (resize from the start).
    Left,
    /// Only the end edge moves (resize from the end).
    Right,
}

#[inline]
fn edge_of(span: Span, edge: Edge) -> i64 {
    match edge {
        Edge::Start => span.start_ms,
        Edge::End => span.end_ms,
    }
}

/// Amount (ms, ≥ 0) by which `child` violates its link to `parent`.
pub fn violation(dependency_type: DependencyType, child: Span, parent: Span) -> i64 {
    let bound = edge_of(parent, dependency_type.parent_edge());
    let edge = edge_of(child, dependency_type.child_edge());
    bound.saturating_sub(edge).max(0)
}

/// Whether the link invariant holds.
pub fn is_satisfied(dependency_type: DependencyType, child: Span, parent: Span) -> bool {
    violation(dependency_type, child, parent) == 0
}

/// Forward application: pushes `child` later until every parent link holds.
///
/// Links are applied in order, each against the child as already corrected
/// by the previous ones. Duration is preserved.
pub fn push_child<I>(child: Span, parents: I) -> Span
where
    I: IntoIterator<Item = (DependencyType, Span)>,
{
    parents
        .into_iter()
        .fold(child, |cur, (t, parent)| cur.shifted(violation(t, cur, parent)))
}

/// Reverse application: pulls `parent` earlier until every dependent link
/// holds.
///
/// Each child's requirement is checked against the parent as already
/// corrected, so the parent ends up absorbing the most restrictive shift.
/// Duration is preserved.
pub fn pull_parent<I>(parent: Span, children: I) -> Span
where
    I: IntoIterator<Item = (DependencyType, Span)>,
{
    children
        .into_iter()
        .fold(parent, |cur, (t, child)| cur.shifted(-violation(t, child, cur)))
}

/// Clamps `task` against one of its own parents (task is the child).
///
/// `Move` shifts the whole task later; `Left` pins the start to the bound on
/// a start-edge violation; `Right` pins the end on an end-edge violation.
/// Violations on the edge a mode may not move are left alone.
pub fn clamp_to_parent(
    task: Span,
    dependency_type: DependencyType,
    parent: Span,
    mode: ClampMode,
) -> Span {
    let v = violation(dependency_type, task, parent);
    if v == 0 {
        return task;
    }
    match (mode, dependency_type.child_edge()) {
        (ClampMode::Move, _) => task.shifted(v),
        (ClampMode::Left, Edge::Start) => Span::new(task.start_ms.saturating_add(v), task.end_ms),
        (ClampMode::Right, Edge::End) => Span::new(task.start_ms, task.end_ms.saturating_add(v)),
        _ => task,
    }
}

/// Clamps `task` against one of its dependents (task is the parent).
///
/// The inverse of [`clamp_to_parent`]: the task edge is pulled back to the
/// child edge it must not pass.
pub fn clamp_to_child(
    task: Span,
    dependency_type: DependencyType,
    child: Span,
    mode: ClampMode,
) -> Span {
    let v = violation(dependency_type, child, task);
    if v == 0 {
        return task;
    }
    match (mode, dependency_type.parent_edge()) {
        (ClampMode::Move, _) => task.shifted(-v),
        (ClampMode::Left, Edge::Start) => Span::new(task.start_ms.saturating_sub(v), task.end_ms),
        (ClampMode::Right, Edge::End) => Span::new(task.start_ms, task.end_ms.saturating_sub(v)),
        _ => task,
    }
}
