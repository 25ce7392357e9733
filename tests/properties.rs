//! Property-based tests for editing invariants.
//!
//! These tests verify the behavioral contracts of the engine:
//! - Free policy leaves every dependency satisfied after commit (acyclic input),
//!   including links to and from nested groups
//! - Group span recomputation does not drift when repeated
//! - Snapping is idempotent
//! - Minimum duration holds across the working set after every apply
//! - Enforced policy only moves the dragged task

use std::collections::HashMap;

use chrono::{FixedOffset, Utc};
use gantt_constraints::models::{Dependency, DependencyType, EditConfig, Span, Task, DAY_MS, HOUR_MS};
use gantt_constraints::recompute_group_spans;
use gantt_constraints::rules::{is_satisfied, push_child};
use gantt_constraints::session::{EdgeKind, EditSession};
use gantt_constraints::snap::snap_in;
use proptest::prelude::*;
use proptest::sample::Index;

const MIN_DURATION: i64 = 4 * HOUR_MS;
const ORIGIN: i64 = 10 * DAY_MS;

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// One generated task: placement slack, duration, and links to earlier tasks.
#[derive(Debug, Clone)]
struct TaskSpec {
    slack_h: i64,
    duration_h: i64,
    deps: Vec<(usize, DependencyType)>,
}

fn dependency_type_strategy() -> impl Strategy<Value = DependencyType> {
    proptest::sample::select(DependencyType::ALL.to_vec())
}

fn edge_strategy() -> impl Strategy<Value = EdgeKind> {
    prop_oneof![
        Just(EdgeKind::Whole),
        Just(EdgeKind::Start),
        Just(EdgeKind::End)
    ]
}

/// Generate a DAG of task specs.
///
/// Tasks only depend on tasks with lower indices, so no cycles arise.
fn dag_strategy(
    max_tasks: usize,
    min_duration_h: i64,
) -> impl Strategy<Value = Vec<TaskSpec>> {
    (2..=max_tasks).prop_flat_map(move |task_count| {
        (0..task_count)
            .map(|i| {
                let deps = if i == 0 {
                    Just(Vec::new()).boxed()
                } else {
                    proptest::collection::vec((0..i, dependency_type_strategy()), 0..=i.min(3))
                        .boxed()
                };
                (0..72_i64, min_duration_h..120_i64, deps).prop_map(|(slack_h, duration_h, deps)| {
                    TaskSpec {
                        slack_h,
                        duration_h,
                        deps,
                    }
                })
            })
            .collect::<Vec<_>>()
    })
}

/// Places each task at its slack, then pushes it past its parents, so the
/// resulting list satisfies every link.
fn build_consistent(specs: &[TaskSpec]) -> Vec<Task> {
    let mut tasks: Vec<Task> = Vec::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        let start = ORIGIN + spec.slack_h * HOUR_MS;
        let own = Span::new(start, start + spec.duration_h * HOUR_MS);
        let span = push_child(
            own,
            spec.deps
                .iter()
                .filter_map(|(j, t)| tasks[*j].span().map(|s| (*t, s))),
        );

        let mut task = Task::new(format!("t{i}")).with_span(span.start_ms, span.end_ms);
        for (j, t) in &spec.deps {
            task = task.with_dependency(Dependency::new(format!("t{j}"), *t));
        }
        tasks.push(task);
    }
    tasks
}

/// One generated task in preorder: group flag, which still-open group it
/// joins, placement, and links to earlier tasks.
#[derive(Debug, Clone)]
struct NodeSpec {
    is_group: bool,
    parent: Option<Index>,
    slack_h: i64,
    duration_h: i64,
    deps: Vec<(Index, DependencyType)>,
}

fn grouped_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<NodeSpec>> {
    proptest::collection::vec(
        (
            any::<bool>(),
            proptest::option::of(any::<Index>()),
            0..72_i64,
            4..120_i64,
            proptest::collection::vec((any::<Index>(), dependency_type_strategy()), 0..=2),
        ),
        2..=max_tasks,
    )
    .prop_map(|nodes| {
        nodes
            .into_iter()
            .map(|(is_group, parent, slack_h, duration_h, deps)| NodeSpec {
                is_group,
                parent,
                slack_h,
                duration_h,
                deps,
            })
            .collect()
    })
}

/// Builds a consistent list with groups on both ends of links.
///
/// Tasks are laid out in preorder, so every group's subtree is a contiguous
/// run of indices. A task only joins a group whose subtree is still open and
/// only depends on earlier tasks that are not its ancestors; every link then
/// points at a fully built subtree. Each leaf is pushed past its own links
/// and those of all its ancestors, which keeps every group envelope
/// satisfied as well.
fn build_grouped(specs: &[NodeSpec]) -> Vec<Task> {
    let mut tasks: Vec<Task> = Vec::with_capacity(specs.len());
    let mut links: Vec<Vec<(usize, DependencyType)>> = Vec::with_capacity(specs.len());
    let mut open: Vec<usize> = Vec::new();

    for (i, spec) in specs.iter().enumerate() {
        match spec.parent.filter(|_| !open.is_empty()) {
            Some(idx) => open.truncate(idx.index(open.len()) + 1),
            None => open.clear(),
        }
        let ancestors = open.clone();

        let own: Vec<(usize, DependencyType)> = if i == 0 {
            Vec::new()
        } else {
            spec.deps
                .iter()
                .map(|(idx, t)| (idx.index(i), *t))
                .filter(|(j, _)| !ancestors.contains(j))
                .collect()
        };

        let id = format!("n{i}");
        let mut task = if spec.is_group {
            Task::group(id)
        } else {
            let resolved = recompute_group_spans(&tasks);
            let start = ORIGIN + spec.slack_h * HOUR_MS;
            let bounds = own
                .iter()
                .chain(ancestors.iter().flat_map(|a| links[*a].iter()))
                .filter_map(|(j, t)| resolved[*j].span().map(|s| (*t, s)))
                .collect::<Vec<_>>();
            let span = push_child(Span::new(start, start + spec.duration_h * HOUR_MS), bounds);
            Task::new(id).with_span(span.start_ms, span.end_ms)
        };
        if let Some(parent) = ancestors.last() {
            task = task.with_parent(format!("n{parent}"));
        }
        for (j, t) in &own {
            task = task.with_dependency(Dependency::new(format!("n{j}"), *t));
        }

        tasks.push(task);
        links.push(own);
        if spec.is_group {
            open.push(i);
        }
    }
    tasks
}

/// Generate a group forest. Parents are always earlier groups.
fn forest_strategy() -> impl Strategy<Value = Vec<Task>> {
    proptest::collection::vec(
        (
            any::<bool>(),
            proptest::option::of(any::<Index>()),
            proptest::option::of(0..1000_i64),
            proptest::option::of(0..500_i64),
        ),
        1..12,
    )
    .prop_map(|nodes| {
        let mut tasks: Vec<Task> = Vec::new();
        for (i, (is_group, parent, start, len)) in nodes.into_iter().enumerate() {
            let id = format!("n{i}");
            let mut task = if is_group { Task::group(id) } else { Task::new(id) };

            let groups: Vec<usize> = (0..i).filter(|j| tasks[*j].is_group).collect();
            if let Some(idx) = parent.filter(|_| !groups.is_empty()) {
                task = task.with_parent(format!("n{}", groups[idx.index(groups.len())]));
            }
            if let Some(start) = start {
                task = task.with_start(start * HOUR_MS);
                if let Some(len) = len {
                    task = task.with_end((start + len) * HOUR_MS);
                }
            }
            tasks.push(task);
        }
        tasks
    })
}

fn violations(tasks: &[Task]) -> Vec<String> {
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut found = Vec::new();
    for task in tasks {
        for dep in &task.dependencies {
            let parent = by_id.get(dep.target_id.as_str()).and_then(|p| p.span());
            if let (Some(child), Some(parent)) = (task.span(), parent) {
                if !is_satisfied(dep.dependency_type, child, parent) {
                    found.push(format!(
                        "{} -{}-> {}: {:?} vs {:?}",
                        task.id, dep.dependency_type, dep.target_id, child, parent
                    ));
                }
            }
        }
    }
    found
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// After a free-policy edit and commit, every link holds.
    #[test]
    fn free_policy_commit_satisfies_all_links(
        specs in dag_strategy(8, 4),
        pick in any::<Index>(),
        offset_h in -240_i64..240,
        edge in edge_strategy(),
    ) {
        let mut tasks = build_consistent(&specs);
        prop_assert!(violations(&tasks).is_empty());

        let id = tasks[pick.index(tasks.len())].id.clone();
        let config = EditConfig::default().with_snap(false);
        let mut session = EditSession::begin(&tasks, &id, config).unwrap();
        let converged = session.apply(ORIGIN + offset_h * HOUR_MS, edge).converged();
        prop_assert!(converged);
        session.commit(&mut tasks);

        let found = violations(&tasks);
        prop_assert!(found.is_empty(), "violations after commit: {:?}", found);
    }

    /// With groups on either end of links, every link holds on the resolved
    /// list after a free-policy edit and commit.
    #[test]
    fn free_policy_commit_satisfies_links_through_groups(
        specs in grouped_strategy(10),
        pick in any::<Index>(),
        offset_h in -240_i64..240,
        edge in edge_strategy(),
    ) {
        let mut tasks = build_grouped(&specs);
        let found = violations(&recompute_group_spans(&tasks));
        prop_assert!(found.is_empty(), "generated list inconsistent: {:?}", found);

        let id = tasks[pick.index(tasks.len())].id.clone();
        let config = EditConfig::default().with_snap(false);
        let mut session = EditSession::begin(&tasks, &id, config).unwrap();
        let converged = session.apply(ORIGIN + offset_h * HOUR_MS, edge).converged();
        prop_assert!(converged);
        session.commit(&mut tasks);

        let found = violations(&recompute_group_spans(&tasks));
        prop_assert!(found.is_empty(), "violations after commit: {:?}", found);
    }

    /// Recomputing group spans a second time changes nothing.
    #[test]
    fn recompute_group_spans_is_idempotent(tasks in forest_strategy()) {
        let once = recompute_group_spans(&tasks);
        let twice = recompute_group_spans(&once);
        prop_assert_eq!(once, twice);
    }

    /// Snapping an already-snapped instant returns it unchanged.
    #[test]
    fn snap_is_idempotent(
        t in -100 * DAY_MS..100 * DAY_MS,
        increment_min in 1_i64..(3 * 24 * 60),
        quarter_hours in -48_i32..=56,
    ) {
        let inc = increment_min * 60_000;
        let once = snap_in(&Utc, t, true, inc);
        prop_assert_eq!(snap_in(&Utc, once, true, inc), once);

        let tz = FixedOffset::east_opt(quarter_hours * 15 * 60).unwrap();
        let once = snap_in(&tz, t, true, inc);
        prop_assert_eq!(snap_in(&tz, once, true, inc), once);
    }

    /// Every non-group task in the working set meets the minimum duration
    /// after an apply, whatever the policy and however short it started.
    #[test]
    fn apply_enforces_min_duration(
        specs in dag_strategy(8, 0),
        pick in any::<Index>(),
        offset_h in -240_i64..240,
        edge in edge_strategy(),
        enforce in any::<bool>(),
    ) {
        let tasks = build_consistent(&specs);
        let id = tasks[pick.index(tasks.len())].id.clone();
        let config = EditConfig::default()
            .with_snap(false)
            .with_enforce_constraints(enforce);
        let mut session = EditSession::begin(&tasks, &id, config).unwrap();
        session.apply(ORIGIN + offset_h * HOUR_MS, edge);

        for task in session.working_set().iter().filter(|t| !t.is_group) {
            if let Some(span) = task.span() {
                prop_assert!(
                    span.duration_ms() >= MIN_DURATION,
                    "{} too short: {:?}", task.id, span
                );
            }
        }
    }

    /// Under the enforced policy only the dragged task changes.
    #[test]
    fn enforced_policy_moves_only_dragged_task(
        specs in dag_strategy(8, 4),
        pick in any::<Index>(),
        offset_h in -240_i64..240,
        edge in edge_strategy(),
    ) {
        let original = build_consistent(&specs);
        let mut tasks = original.clone();
        let id = tasks[pick.index(tasks.len())].id.clone();
        let config = EditConfig::default()
            .with_snap(false)
            .with_enforce_constraints(true);
        let mut session = EditSession::begin(&tasks, &id, config).unwrap();
        session.apply(ORIGIN + offset_h * HOUR_MS, edge);
        session.commit(&mut tasks);

        for (before, after) in original.iter().zip(&tasks) {
            if before.id != id {
                prop_assert_eq!(before, after);
            }
        }
    }
}
