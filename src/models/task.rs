//! Task model.
//!
//! A task is a schedulable bar with a start and end instant, optional
//! membership in a group, and a list of dependencies on other tasks.
//!
//! # Pinned vs. derived instants
//! `start`/`end` are `Some` when the value was set explicitly (by a user or a
//! previous commit) and `None` when it is left for the engine to derive.
//! Only group tasks derive instants (from their descendants). When
//! [`recompute_group_spans`](crate::recompute_group_spans) fills a derived
//! value in, it also raises the matching [`DerivedSides`] flag so the value
//! keeps being treated as unpinned.
//!
//! # Time Representation
//! All times are epoch milliseconds.

use serde::{Deserialize, Serialize};

use super::{Dependency, Span};

/// Marks group sides whose value was derived rather than pinned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedSides {
    pub start: bool,
    pub end: bool,
}

impl DerivedSides {
    fn is_empty(&self) -> bool {
        !self.start && !self.end
    }
}

/// A task (bar) on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Start instant (ms). `None` = unpinned.
    #[serde(default)]
    pub start: Option<i64>,
    /// End instant (ms). `None` = unpinned.
    #[serde(default)]
    pub end: Option<i64>,
    /// Owning group, if any.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Whether this is a group (summary) task.
    #[serde(default)]
    pub is_group: bool,
    /// Tasks this one depends on. Order is kept; duplicates are allowed.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Sides holding a derived (not pinned) value.
    #[serde(default, skip_serializing_if = "DerivedSides::is_empty")]
    pub derived: DerivedSides,
}

impl Task {
    /// Creates a new task with the given ID and no instants.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            start: None,
            end: None,
            parent_id: None,
            is_group: false,
            dependencies: Vec::new(),
            derived: DerivedSides::default(),
        }
    }

    /// Creates a group task with both sides unpinned.
    pub fn group(id: impl Into<String>) -> Self {
        Self {
            is_group: true,
            ..Self::new(id)
        }
    }

    /// Sets the task name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Pins the start instant.
    pub fn with_start(mut self, start_ms: i64) -> Self {
        self.start = Some(start_ms);
        self.derived.start = false;
        self
    }

    /// Pins the end instant.
    pub fn with_end(mut self, end_ms: i64) -> Self {
        self.end = Some(end_ms);
        self.derived.end = false;
        self
    }

    /// Pins both instants.
    pub fn with_span(self, start_ms: i64, end_ms: i64) -> Self {
        self.with_start(start_ms).with_end(end_ms)
    }

    /// Places this task inside a group.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Adds a dependency.
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Whether the start instant was set explicitly.
    pub fn is_start_pinned(&self) -> bool {
        self.start.is_some() && !self.derived.start
    }

    /// Whether the end instant was set explicitly.
    pub fn is_end_pinned(&self) -> bool {
        self.end.is_some() && !self.derived.end
    }

    /// The task's span, if both instants are known.
    pub fn span(&self) -> Option<Span> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(Span::new(start, end)),
            _ => None,
        }
    }

    /// Duration (ms), if both instants are known.
    pub fn duration_ms(&self) -> Option<i64> {
        self.span().map(|s| s.duration_ms())
    }
}
