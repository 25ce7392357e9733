//! Dependency links between tasks.
//!
//! A dependency is declared on the **child** (dependent) task and points at
//! the **parent** task it depends on. Each of the four link types imposes
//! exactly one inequality between an edge of the child and an edge of the
//! parent:
//!
//! | Type | Invariant |
//! |------|-----------|
//! | FS (Finish→Start)  | `child.start >= parent.end`   |
//! | SS (Start→Start)   | `child.start >= parent.start` |
//! | FF (Finish→Finish) | `child.end >= parent.end`     |
//! | SF (Start→Finish)  | `child.end >= parent.start`   |
//!
//! # Reference
//! PMI (2021), "PMBOK Guide", Precedence Diagramming Method

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four precedence link types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    /// Child cannot start until the parent finishes.
    #[serde(rename = "FS")]
    FinishToStart,
    /// Child cannot start until the parent starts.
    #[serde(rename = "SS")]
    StartToStart,
    /// Child cannot finish until the parent finishes.
    #[serde(rename = "FF")]
    FinishToFinish,
    /// Child cannot finish until the parent starts.
    #[serde(rename = "SF")]
    StartToFinish,
}

/// One edge of a task interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

impl DependencyType {
    /// All link types, in declaration order.
    pub const ALL: [DependencyType; 4] = [
        Self::FinishToStart,
        Self::StartToStart,
        Self::FinishToFinish,
        Self::StartToFinish,
    ];

    /// Two-letter code (`"FS"`, `"SS"`, `"FF"`, `"SF"`).
    pub fn code(self) -> &'static str {
        match self {
            Self::FinishToStart => "FS",
            Self::StartToStart => "SS",
            Self::FinishToFinish => "FF",
            Self::StartToFinish => "SF",
        }
    }

    /// The child edge constrained by this link.
    pub fn child_edge(self) -> Edge {
        match self {
            Self::FinishToStart | Self::StartToStart => Edge::Start,
            Self::FinishToFinish | Self::StartToFinish => Edge::End,
        }
    }

    /// The parent edge that bounds the child edge.
    pub fn parent_edge(self) -> Edge {
        match self {
            Self::FinishToStart | Self::FinishToFinish => Edge::End,
            Self::StartToStart | Self::StartToFinish => Edge::Start,
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A dependency declared by a child task on `target_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// ID of the task this one depends on (the parent).
    pub target_id: String,
    /// Link type.
    #[serde(rename = "type")]
    pub dependency_type: DependencyType,
    /// Offset carried with the link (ms). Not consulted by the rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lag_ms: Option<i64>,
}

impl Dependency {
    /// Creates a dependency of the given type.
    pub fn new(target_id: impl Into<String>, dependency_type: DependencyType) -> Self {
        Self {
            target_id: target_id.into(),
            dependency_type,
            lag_ms: None,
        }
    }

    /// Creates a Finish→Start dependency.
    pub fn finish_to_start(target_id: impl Into<String>) -> Self {
        Self::new(target_id, DependencyType::FinishToStart)
    }

    /// Creates a Start→Start dependency.
    pub fn start_to_start(target_id: impl Into<String>) -> Self {
        Self::new(target_id, DependencyType::StartToStart)
    }

    /// Creates a Finish→Finish dependency.
    pub fn finish_to_finish(target_id: impl Into<String>) -> Self {
        Self::new(target_id, DependencyType::FinishToFinish)
    }

    /// Creates a Start→Finish dependency.
    pub fn start_to_finish(target_id: impl Into<String>) -> Self {
        Self::new(target_id, DependencyType::StartToFinish)
    }

    /// Attaches a lag value.
    pub fn with_lag(mut self, lag_ms: i64) -> Self {
        self.lag_ms = Some(lag_ms);
        self
    }
}
