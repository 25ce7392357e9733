//! Caller-facing façade over a canonical task list.
//!
//! [`Timeline`] owns the task list and the editing configuration and allows
//! at most one open [`EditSession`] at a time, addressed by a
//! [`SessionHandle`]. Observers are notified after every preview and commit
//! with read-only slices.
//!
//! ```
//! use gantt_constraints::models::{Dependency, EditConfig, Span, Task, DAY_MS};
//! use gantt_constraints::session::EdgeKind;
//! use gantt_constraints::timeline::Timeline;
//!
//! let tasks = vec![
//!     Task::new("A").with_span(DAY_MS, 3 * DAY_MS),
//!     Task::new("B")
//!         .with_span(2 * DAY_MS, 5 * DAY_MS)
//!         .with_dependency(Dependency::finish_to_start("A")),
//! ];
//! let mut timeline = Timeline::with_config(tasks, EditConfig::default().with_snap(false))?;
//!
//! let handle = timeline.begin_edit("B")?;
//! let preview = timeline.apply_edit(handle, DAY_MS, EdgeKind::Whole)?;
//! assert_eq!(preview[1].span(), Some(Span::new(DAY_MS, 4 * DAY_MS)));
//! timeline.commit_edit(handle)?;
//!
//! // Moving B earlier pulled A back with it.
//! assert_eq!(timeline.tasks()[0].span(), Some(Span::new(-DAY_MS, DAY_MS)));
//! # Ok::<(), gantt_constraints::error::EditError>(())
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::aggregation::recompute_group_spans_with;
use crate::error::{EditError, Result};
use crate::models::{time_range, EditConfig, Span, Task};
use crate::session::{EdgeKind, EditReport, EditSession};
use crate::validation::{validate_tasks, ValidationResult};

/// Receives previews and commits.
///
/// Both methods default to doing nothing.
pub trait TimelineObserver {
    /// Called after every applied edit with the merged list.
    fn on_preview(&self, _merged: &[Task]) {}

    /// Called after a commit with the updated canonical list.
    fn on_commit(&self, _tasks: &[Task]) {}
}

/// Identifies one edit session on a [`Timeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(u64);

impl SessionHandle {
    /// Numeric session ID, increasing per timeline.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A canonical task list plus its editing state.
pub struct Timeline {
    tasks: Vec<Task>,
    config: EditConfig,
    open: Option<(SessionHandle, EditSession)>,
    next_session: u64,
    last_report: Option<EditReport>,
    observers: Vec<Arc<dyn TimelineObserver>>,
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("tasks", &self.tasks.len())
            .field("config", &self.config)
            .field("open", &self.open.as_ref().map(|(h, s)| (h.0, s.task_id())))
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Timeline {
    /// Creates a timeline with the default configuration.
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            config: EditConfig::default(),
            open: None,
            next_session: 1,
            last_report: None,
            observers: Vec::new(),
        }
    }

    /// Creates a timeline with `config`, rejecting unusable values.
    pub fn with_config(tasks: Vec<Task>, config: EditConfig) -> Result<Self> {
        config.validate()?;
        let mut timeline = Self::new(tasks);
        timeline.config = config;
        Ok(timeline)
    }

    /// Registers an observer.
    pub fn add_observer(&mut self, observer: Arc<dyn TimelineObserver>) {
        self.observers.push(observer);
    }

    /// The canonical task list.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    /// Replaces the configuration. An open session keeps the configuration
    /// it was started with.
    pub fn set_config(&mut self, config: EditConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Replaces the task list wholesale, cancelling any open session.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        if let Some((handle, session)) = self.open.take() {
            warn!(session = handle.0, task = %session.task_id(), "task list replaced during an edit; session cancelled");
            session.cancel();
        }
        debug!(count = tasks.len(), "task list replaced");
        self.tasks = tasks;
    }

    /// Whether an edit session is open.
    pub fn is_editing(&self) -> bool {
        self.open.is_some()
    }

    /// Report of the most recent applied edit, if any.
    pub fn last_report(&self) -> Option<&EditReport> {
        self.last_report.as_ref()
    }

    /// The canonical list with every group span filled in.
    pub fn resolved_tasks(&self) -> Vec<Task> {
        recompute_group_spans_with(&self.tasks, &self.config.limits)
    }

    /// Earliest start to latest end over the resolved list.
    pub fn time_range(&self) -> Option<Span> {
        time_range(&self.resolved_tasks())
    }

    /// Checks the canonical list for structural problems.
    pub fn validate(&self) -> ValidationResult {
        validate_tasks(&self.tasks)
    }

    /// Opens an edit session for `task_id`.
    pub fn begin_edit(&mut self, task_id: &str) -> Result<SessionHandle> {
        if let Some((handle, _)) = &self.open {
            return Err(EditError::SessionInProgress(handle.0));
        }
        let session = EditSession::begin(&self.tasks, task_id, self.config)?;
        let handle = SessionHandle(self.next_session);
        self.next_session += 1;
        self.open = Some((handle, session));
        Ok(handle)
    }

    /// Applies a proposed instant and returns the merged list.
    pub fn apply_edit(
        &mut self,
        handle: SessionHandle,
        proposed_ms: i64,
        edge: EdgeKind,
    ) -> Result<Vec<Task>> {
        let session = match &mut self.open {
            Some((open, session)) if *open == handle => session,
            _ => return Err(EditError::SessionClosed(handle.0)),
        };
        self.last_report = Some(session.apply(proposed_ms, edge).clone());
        let merged = session.merged(&self.tasks);
        for observer in &self.observers {
            observer.on_preview(&merged);
        }
        Ok(merged)
    }

    /// Writes the session's working values into the canonical list.
    pub fn commit_edit(&mut self, handle: SessionHandle) -> Result<()> {
        let session = self.take_session(handle)?;
        session.commit(&mut self.tasks);
        for observer in &self.observers {
            observer.on_commit(&self.tasks);
        }
        Ok(())
    }

    /// Discards the session.
    pub fn cancel_edit(&mut self, handle: SessionHandle) -> Result<()> {
        self.take_session(handle)?.cancel();
        Ok(())
    }

    fn take_session(&mut self, handle: SessionHandle) -> Result<EditSession> {
        match self.open.take() {
            Some((open, session)) if open == handle => Ok(session),
            other => {
                self.open = other;
                Err(EditError::SessionClosed(handle.0))
            }
        }
    }
}
