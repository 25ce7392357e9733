//! Input validation for task lists.
//!
//! The engine tolerates every issue reported here (unknown targets are
//! ignored, short intervals are extended, cycles stop at an iteration cap),
//! so validation is never required. It lets a caller find the data that
//! would make an edit behave surprisingly. Detects:
//! - Duplicate IDs
//! - Dependencies on unknown tasks, or on the task itself
//! - Unknown or non-group parents
//! - Circular dependencies and circular grouping
//! - Non-group tasks with a missing instant or `start > end`
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{BTreeSet, HashMap, HashSet};

use thiserror::Error;

use crate::models::Task;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// Two tasks share the same ID.
    DuplicateId,
    /// A dependency targets a task that is not in the list.
    UnknownDependencyTarget,
    /// A task depends on itself.
    SelfDependency,
    /// A task names a parent that is not in the list.
    UnknownParent,
    /// A task names a parent that is not a group.
    ParentNotGroup,
    /// The dependency graph contains a cycle.
    CyclicDependency,
    /// A parent chain loops back on itself.
    CyclicGrouping,
    /// A non-group task starts after it ends.
    InvalidInterval,
    /// A non-group task lacks a start or an end.
    MissingInstant,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a task list.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_tasks(tasks: &[Task]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut by_id: HashMap<&str, &Task> = HashMap::new();
    for task in tasks {
        if by_id.insert(task.id.as_str(), task).is_some() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.id),
            ));
        }
    }

    for task in tasks {
        for dep in &task.dependencies {
            if dep.target_id == task.id {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SelfDependency,
                    format!("Task '{}' depends on itself ({})", task.id, dep.dependency_type),
                ));
            } else if !by_id.contains_key(dep.target_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownDependencyTarget,
                    format!(
                        "Task '{}' depends on unknown task '{}'",
                        task.id, dep.target_id
                    ),
                ));
            }
        }

        if let Some(parent_id) = &task.parent_id {
            match by_id.get(parent_id.as_str()) {
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownParent,
                    format!("Task '{}' has unknown parent '{}'", task.id, parent_id),
                )),
                Some(parent) if !parent.is_group => errors.push(ValidationError::new(
                    ValidationErrorKind::ParentNotGroup,
                    format!("Task '{}' has parent '{}' which is not a group", task.id, parent_id),
                )),
                Some(_) => {}
            }
        }

        if !task.is_group {
            match (task.start, task.end) {
                (Some(start), Some(end)) if start > end => errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidInterval,
                    format!("Task '{}' starts after it ends ({start} > {end})", task.id),
                )),
                (Some(_), Some(_)) => {}
                _ => errors.push(ValidationError::new(
                    ValidationErrorKind::MissingInstant,
                    format!("Task '{}' is missing a start or end", task.id),
                )),
            }
        }
    }

    if let Some(cycle_err) = detect_dependency_cycles(tasks, &by_id) {
        errors.push(cycle_err);
    }
    errors.extend(detect_grouping_cycles(tasks, &by_id));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the dependency graph using DFS.
///
/// Self-dependencies are reported separately and skipped here.
fn detect_dependency_cycles<'a>(
    tasks: &'a [Task],
    by_id: &HashMap<&'a str, &'a Task>,
) -> Option<ValidationError> {
    // parent → dependents
    let mut adj: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
    for task in tasks {
        for dep in &task.dependencies {
            let target = dep.target_id.as_str();
            if target != task.id && by_id.contains_key(target) {
                adj.entry(target).or_default().push(task.id.as_str());
            }
        }
    }

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();
    let mut ids: Vec<&str> = by_id.keys().copied().collect();
    ids.sort_unstable();

    for node in ids {
        if !visited.contains(node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular dependency detected involving task '{node}'"),
            ));
        }
    }

    None
}

fn has_cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(neighbors) = adj.get(node) {
        for &next in neighbors {
            if in_stack.contains(next) {
                return true; // Back edge → cycle
            }
            if !visited.contains(next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(node);
    false
}

/// Follows each parent chain; reports every distinct loop once.
fn detect_grouping_cycles<'a>(
    tasks: &'a [Task],
    by_id: &HashMap<&'a str, &'a Task>,
) -> Vec<ValidationError> {
    let mut cycles: BTreeSet<Vec<&'a str>> = BTreeSet::new();

    for task in tasks {
        let mut chain: Vec<&'a str> = vec![task.id.as_str()];
        let mut cur: &'a Task = task;
        while let Some(parent_id) = cur.parent_id.as_deref() {
            if let Some(pos) = chain.iter().position(|id| *id == parent_id) {
                let mut members = chain[pos..].to_vec();
                // Rotate to the smallest ID so each loop is recorded once.
                if let Some(min_pos) = members
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, id)| **id)
                    .map(|(i, _)| i)
                {
                    members.rotate_left(min_pos);
                }
                cycles.insert(members);
                break;
            }
            let Some(&parent) = by_id.get(parent_id) else {
                break;
            };
            chain.push(parent_id);
            cur = parent;
        }
    }

    cycles
        .into_iter()
        .map(|members| {
            ValidationError::new(
                ValidationErrorKind::CyclicGrouping,
                format!(
                    "Circular grouping: {} -> {}",
                    members.join(" -> "),
                    members[0]
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dependency;

    fn kinds(tasks: &[Task]) -> Vec<ValidationErrorKind> {
        match validate_tasks(tasks) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.into_iter().map(|e| e.kind).collect(),
        }
    }

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::group("G").with_name("Phase 1"),
            Task::new("A").with_span(0, 100).with_parent("G"),
            Task::new("B")
                .with_span(100, 200)
                .with_parent("G")
                .with_dependency(Dependency::finish_to_start("A")),
            Task::new("C")
                .with_span(200, 300)
                .with_dependency(Dependency::start_to_start("B"))
                .with_dependency(Dependency::finish_to_finish("G")),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_tasks(&sample_tasks()).is_ok());
        assert!(validate_tasks(&[]).is_ok());
    }

    #[test]
    fn test_duplicate_task_id() {
        let mut tasks = sample_tasks();
        tasks.push(Task::new("A").with_span(0, 1));
        assert_eq!(kinds(&tasks), vec![ValidationErrorKind::DuplicateId]);
    }

    #[test]
    fn test_unknown_and_self_dependency() {
        let tasks = vec![Task::new("A")
            .with_span(0, 10)
            .with_dependency(Dependency::finish_to_start("NONEXISTENT"))
            .with_dependency(Dependency::start_to_start("A"))];
        let errors = validate_tasks(&tasks).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].kind, ValidationErrorKind::UnknownDependencyTarget);
        assert!(errors[0].to_string().contains("NONEXISTENT"));
        assert_eq!(errors[1].kind, ValidationErrorKind::SelfDependency);
    }

    #[test]
    fn test_parent_checks() {
        let tasks = vec![
            Task::new("plain").with_span(0, 10),
            Task::new("A").with_span(0, 10).with_parent("plain"),
            Task::new("B").with_span(0, 10).with_parent("ghost"),
        ];
        assert_eq!(
            kinds(&tasks),
            vec![
                ValidationErrorKind::ParentNotGroup,
                ValidationErrorKind::UnknownParent
            ]
        );
    }

    #[test]
    fn test_interval_checks() {
        let tasks = vec![
            Task::new("inverted").with_span(100, 0),
            Task::new("open").with_start(0),
            // Groups may leave both sides open.
            Task::group("G"),
        ];
        assert_eq!(
            kinds(&tasks),
            vec![
                ValidationErrorKind::InvalidInterval,
                ValidationErrorKind::MissingInstant
            ]
        );
    }

    #[test]
    fn test_cyclic_dependency() {
        // A -> B -> C -> A
        let tasks = vec![
            Task::new("A")
                .with_span(0, 10)
                .with_dependency(Dependency::finish_to_start("C")),
            Task::new("B")
                .with_span(0, 10)
                .with_dependency(Dependency::finish_to_start("A")),
            Task::new("C")
                .with_span(0, 10)
                .with_dependency(Dependency::start_to_finish("B")),
        ];
        assert_eq!(kinds(&tasks), vec![ValidationErrorKind::CyclicDependency]);
    }

    #[test]
    fn test_no_cycle_in_diamond() {
        let tasks = vec![
            Task::new("A").with_span(0, 10),
            Task::new("B")
                .with_span(0, 10)
                .with_dependency(Dependency::finish_to_start("A")),
            Task::new("C")
                .with_span(0, 10)
                .with_dependency(Dependency::finish_to_start("A")),
            Task::new("D")
                .with_span(0, 10)
                .with_dependency(Dependency::finish_to_start("B"))
                .with_dependency(Dependency::finish_to_start("C")),
        ];
        assert!(validate_tasks(&tasks).is_ok());
    }

    #[test]
    fn test_cyclic_grouping_reported_once() {
        let tasks = vec![
            Task::group("G1").with_parent("G2"),
            Task::group("G2").with_parent("G1"),
            Task::new("L").with_span(0, 10).with_parent("G1"),
            Task::group("S").with_parent("S"),
        ];
        let errors = validate_tasks(&tasks).unwrap_err();
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "Circular grouping: G1 -> G2 -> G1".to_string(),
                "Circular grouping: S -> S".to_string(),
            ]
        );
    }

    #[test]
    fn test_multiple_errors() {
        let tasks = vec![
            Task::new("A"),
            Task::new("A")
                .with_span(0, 10)
                .with_dependency(Dependency::finish_to_start("X")),
        ];
        let errors = validate_tasks(&tasks).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
