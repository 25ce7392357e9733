//! Interactive edit sessions.
//!
//! One session covers one drag gesture: it starts on pointer-down
//! ([`EditSession::begin`]), receives proposed instants while dragging
//! ([`EditSession::apply`]), and ends with either [`EditSession::commit`] or
//! [`EditSession::cancel`]. All intermediate state lives in an
//! [`EphemeralSet`] over the affected closure of the edited task; the
//! canonical list is only read until commit.
//!
//! # Algorithm (per `apply`)
//!
//! 1. Snap the proposed instant.
//! 2. Move the dragged edge (or the whole bar); groups pin the moved sides.
//! 3. Extend the dragged task to the minimum duration.
//! 4. Propagate under the configured policy.
//! 5. Aggregate group spans.
//! 6. Extend every non-group task in the working set to the minimum
//!    duration.
//! 7. Under the free policy, propagate again from every task that steps 5
//!    and 6 changed (a group whose derived span moved, a task that was
//!    extended) and repeat from step 5 until a round changes nothing.

mod ephemeral;

pub use ephemeral::{EphemeralSet, EphemeralTask};

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::aggregation::{aggregate_groups, AggregationReport};
use crate::error::{EditError, Result};
use crate::graph::DependencyGraph;
use crate::models::{EditConfig, Policy, Task};
use crate::propagation::{propagate, PropagationReport};
use crate::rules::ClampMode;

/// Which part of a task bar is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// The whole bar; duration is kept.
    Whole,
    /// The start edge only.
    Start,
    /// The end edge only.
    End,
}

impl EdgeKind {
    /// How the enforced policy may move the task for this gesture.
    pub fn clamp_mode(self) -> ClampMode {
        match self {
            EdgeKind::Whole => ClampMode::Move,
            EdgeKind::Start => ClampMode::Left,
            EdgeKind::End => ClampMode::Right,
        }
    }
}

/// Outcome of the latest [`EditSession::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditReport {
    /// All propagation runs of the apply folded together. `shifted` only
    /// keeps tasks that ended up somewhere other than where they started.
    pub propagation: PropagationReport,
    pub aggregation: AggregationReport,
    /// Non-group tasks whose end was pushed out to the minimum duration.
    pub extended: Vec<String>,
}

impl EditReport {
    /// Whether every fixed-point loop settled.
    pub fn converged(&self) -> bool {
        self.propagation.converged && self.aggregation.converged
    }
}

/// One in-progress drag gesture.
#[derive(Debug, Clone)]
pub struct EditSession {
    task_id: String,
    config: EditConfig,
    graph: DependencyGraph,
    working: EphemeralSet,
    report: EditReport,
}

impl EditSession {
    /// Opens a session for editing `task_id`.
    ///
    /// Copies the affected closure of the task into a working set and
    /// aggregates group spans over it. Fails with
    /// [`EditError::TaskNotFound`] for an unknown ID.
    pub fn begin(tasks: &[Task], task_id: &str, config: EditConfig) -> Result<Self> {
        let graph = DependencyGraph::build(tasks);
        if !graph.contains(task_id) {
            return Err(EditError::TaskNotFound(task_id.to_string()));
        }

        let closure = graph.affected_closure(task_id);
        let mut working = EphemeralSet::select(tasks, &closure);
        let aggregation = aggregate_groups(
            &mut working,
            &graph,
            config.limits.max_aggregation_passes,
        );
        debug!(task = %task_id, closure = closure.len(), policy = ?config.policy(), "edit session opened");

        Ok(Self {
            task_id: task_id.to_string(),
            config,
            graph,
            working,
            report: EditReport {
                aggregation,
                ..EditReport::default()
            },
        })
    }

    /// ID of the edited task.
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    /// Current working values.
    pub fn working_set(&self) -> &EphemeralSet {
        &self.working
    }

    /// Report of the latest `apply` (or of the initial aggregation).
    pub fn report(&self) -> &EditReport {
        &self.report
    }

    /// Applies one proposed instant for the dragged `edge`.
    ///
    /// For [`EdgeKind::Whole`] the instant is the new start.
    pub fn apply(&mut self, proposed_ms: i64, edge: EdgeKind) -> &EditReport {
        let before = self.working.clone();
        let instant = self.config.snap.apply(proposed_ms);
        self.move_edge(instant, edge);

        let policy = self.config.policy();
        let mut propagation = propagate(
            &mut self.working,
            &self.graph,
            &self.task_id,
            policy,
            edge.clamp_mode(),
            &self.config.limits,
        );
        let (aggregation, extended) = self.settle(policy, &mut propagation);

        let moved: BTreeSet<String> = self.working.changed_since(&before).into_iter().collect();
        propagation.shifted.retain(|id| moved.contains(id));

        debug!(
            task = %self.task_id,
            ?edge,
            proposed_ms,
            instant,
            shifted = propagation.shifted.len(),
            extended = extended.len(),
            "edit applied"
        );
        self.report = EditReport {
            propagation,
            aggregation,
            extended,
        };
        &self.report
    }

    /// Aggregates group spans and sweeps minimum durations.
    ///
    /// Under the free policy every task that a round changed (groups whose
    /// derived span moved, tasks the sweep extended) is propagated from in
    /// turn, and rounds repeat until one changes nothing.
    fn settle(
        &mut self,
        policy: Policy,
        propagation: &mut PropagationReport,
    ) -> (AggregationReport, Vec<String>) {
        let limits = self.config.limits;
        let mut extended = BTreeSet::new();
        let mut rounds = 0;
        loop {
            let before = self.working.clone();
            let mut aggregation =
                aggregate_groups(&mut self.working, &self.graph, limits.max_aggregation_passes);
            let swept = self.working.enforce_min_duration(self.config.min_duration_ms);
            extended.extend(swept.iter().cloned());

            if policy == Policy::Enforced {
                if !swept.is_empty() {
                    aggregation =
                        aggregate_groups(&mut self.working, &self.graph, limits.max_aggregation_passes);
                }
                return (aggregation, extended.into_iter().collect());
            }

            let changed = self.working.changed_since(&before);
            if changed.is_empty() {
                return (aggregation, extended.into_iter().collect());
            }
            if rounds == limits.max_settle_rounds {
                warn!(task = %self.task_id, rounds, "edit did not settle");
                propagation.converged = false;
                return (aggregation, extended.into_iter().collect());
            }
            rounds += 1;
            for id in &changed {
                let follow_up = propagate(
                    &mut self.working,
                    &self.graph,
                    id,
                    Policy::Free,
                    ClampMode::Move,
                    &limits,
                );
                propagation.absorb(follow_up);
            }
        }
    }

    /// The canonical list with this session's working values laid over it.
    pub fn merged(&self, tasks: &[Task]) -> Vec<Task> {
        self.working.merge(tasks)
    }

    /// Writes the working values into `tasks` and ends the session.
    ///
    /// Returns how many tasks were written.
    pub fn commit(self, tasks: &mut [Task]) -> usize {
        let written = self.working.commit(tasks);
        debug!(task = %self.task_id, written, "edit committed");
        written
    }

    /// Ends the session without touching anything.
    pub fn cancel(self) {
        debug!(task = %self.task_id, "edit cancelled");
    }

    fn move_edge(&mut self, instant: i64, edge: EdgeKind) {
        let min_duration = self.config.min_duration_ms;
        let Some(task) = self.working.get_mut(&self.task_id) else {
            return;
        };

        match edge {
            EdgeKind::Whole => {
                let duration = task.span().map_or(min_duration, |s| s.duration_ms());
                task.start = Some(instant);
                task.end = Some(instant.saturating_add(duration));
            }
            EdgeKind::Start => {
                task.start = Some(instant);
                if task.end.is_none() {
                    task.end = Some(instant.saturating_add(min_duration));
                }
            }
            EdgeKind::End => {
                task.end = Some(instant);
                if task.start.is_none() {
                    task.start = Some(instant.saturating_sub(min_duration));
                }
            }
        }

        if task.is_group {
            match edge {
                EdgeKind::Whole => {
                    task.start_pinned = true;
                    task.end_pinned = true;
                }
                EdgeKind::Start => task.start_pinned = true,
                EdgeKind::End => task.end_pinned = true,
            }
        } else if let Some(span) = task.span() {
            task.set_span(span.with_min_duration(min_duration));
        }
    }
}
