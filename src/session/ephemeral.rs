//! Copy-on-write working set for one edit gesture.
//!
//! Holds value copies of the instants of every task an edit may touch,
//! keyed by ID. Nothing here aliases the canonical list: changes only reach
//! it through [`EphemeralSet::commit`]. Dependencies are not copied; they are
//! read from the [`DependencyGraph`](crate::graph::DependencyGraph) the
//! session was built with.

use std::collections::{BTreeSet, HashMap};

use crate::models::{Span, Task};

/// Working copy of one task's instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EphemeralTask {
    pub id: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
    /// Start was set explicitly on the canonical task (or by this gesture).
    pub start_pinned: bool,
    /// End was set explicitly on the canonical task (or by this gesture).
    pub end_pinned: bool,
    pub is_group: bool,
}

impl EphemeralTask {
    /// Copies the instants and pinned state of a canonical task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            start: task.start,
            end: task.end,
            start_pinned: task.is_start_pinned(),
            end_pinned: task.is_end_pinned(),
            is_group: task.is_group,
        }
    }

    /// Current span, if both instants are known.
    pub fn span(&self) -> Option<Span> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(Span::new(start, end)),
            _ => None,
        }
    }

    /// Overwrites both instants. Returns whether anything changed.
    pub fn set_span(&mut self, span: Span) -> bool {
        let changed = self.span() != Some(span);
        self.start = Some(span.start_ms);
        self.end = Some(span.end_ms);
        changed
    }

    /// Moves whichever instants are known by `delta_ms`. Returns whether
    /// anything changed.
    pub fn shift(&mut self, delta_ms: i64) -> bool {
        let before = (self.start, self.end);
        self.start = self.start.map(|s| s.saturating_add(delta_ms));
        self.end = self.end.map(|e| e.saturating_add(delta_ms));
        (self.start, self.end) != before
    }

    /// Whether this is a group with at least one side derived from its
    /// members.
    pub fn has_derived_side(&self) -> bool {
        self.is_group && !(self.start_pinned && self.end_pinned)
    }

    /// Copies the working values onto `task` for display.
    ///
    /// Unpinned group sides are flagged as derived.
    fn preview_into(&self, task: &mut Task) {
        task.start = self.start;
        task.end = self.end;
        task.derived.start = self.is_group && !self.start_pinned && self.start.is_some();
        task.derived.end = self.is_group && !self.end_pinned && self.end.is_some();
    }

    /// Writes the working values back onto the canonical `task`.
    ///
    /// Groups keep only their pinned sides; unpinned sides are cleared so a
    /// derived value is never stored as if it had been set.
    fn commit_into(&self, task: &mut Task) {
        if self.is_group {
            task.start = self.start.filter(|_| self.start_pinned);
            task.end = self.end.filter(|_| self.end_pinned);
        } else {
            task.start = self.start;
            task.end = self.end;
        }
        task.derived = Default::default();
    }
}

/// Working copies keyed by task ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EphemeralSet {
    tasks: HashMap<String, EphemeralTask>,
}

impl EphemeralSet {
    /// Copies every given task.
    pub fn from_tasks<'a, I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        Self {
            tasks: tasks
                .into_iter()
                .map(|t| (t.id.clone(), EphemeralTask::from_task(t)))
                .collect(),
        }
    }

    /// Copies the tasks whose IDs are in `ids`.
    pub fn select(tasks: &[Task], ids: &BTreeSet<String>) -> Self {
        Self::from_tasks(tasks.iter().filter(|t| ids.contains(&t.id)))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&EphemeralTask> {
        self.tasks.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut EphemeralTask> {
        self.tasks.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EphemeralTask> {
        self.tasks.values()
    }

    /// Span of a task in the set.
    pub fn span(&self, id: &str) -> Option<Span> {
        self.tasks.get(id).and_then(EphemeralTask::span)
    }

    /// Sets the span of a task in the set. Returns whether it changed;
    /// unknown IDs are ignored.
    pub fn set_span(&mut self, id: &str, span: Span) -> bool {
        self.tasks
            .get_mut(id)
            .is_some_and(|task| task.set_span(span))
    }

    /// IDs of all group tasks in the set, sorted.
    pub fn group_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .tasks
            .values()
            .filter(|t| t.is_group)
            .map(|t| t.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// IDs whose instants differ from `earlier` (or that `earlier` lacks),
    /// sorted.
    pub fn changed_since(&self, earlier: &EphemeralSet) -> Vec<String> {
        let mut changed: Vec<String> = self
            .tasks
            .values()
            .filter(|t| {
                earlier
                    .get(&t.id)
                    .map_or(true, |e| (e.start, e.end) != (t.start, t.end))
            })
            .map(|t| t.id.clone())
            .collect();
        changed.sort();
        changed
    }

    /// Extends the end of every non-group task shorter than `min_duration_ms`.
    ///
    /// Returns the IDs that were extended, sorted.
    pub fn enforce_min_duration(&mut self, min_duration_ms: i64) -> Vec<String> {
        let mut extended: Vec<String> = self
            .tasks
            .values_mut()
            .filter(|t| !t.is_group)
            .filter_map(|t| {
                let span = t.span()?;
                t.set_span(span.with_min_duration(min_duration_ms))
                    .then(|| t.id.clone())
            })
            .collect();
        extended.sort();
        extended
    }

    /// The canonical list with working values laid over it.
    pub fn merge(&self, tasks: &[Task]) -> Vec<Task> {
        tasks
            .iter()
            .map(|task| {
                let mut merged = task.clone();
                if let Some(working) = self.tasks.get(&task.id) {
                    working.preview_into(&mut merged);
                }
                merged
            })
            .collect()
    }

    /// Writes working values into the canonical list. Returns how many
    /// tasks were written.
    pub fn commit(&self, tasks: &mut [Task]) -> usize {
        let mut written = 0;
        for task in tasks.iter_mut() {
            if let Some(working) = self.tasks.get(&task.id) {
                working.commit_into(task);
                written += 1;
            }
        }
        written
    }
}
