//! Timeline domain models.
//!
//! Plain value records: tasks reference each other only by ID (parent group,
//! dependency targets), so any relationship is derived by explicit traversal
//! in [`graph`](crate::graph) rather than by following live pointers.
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`Task`] | A bar with start/end instants, optional group membership |
//! | [`Dependency`] | FS/SS/FF/SF link from a child task to a parent task |
//! | [`Span`] | A closed `[start, end]` interval in ms |
//! | [`EditConfig`] | Snap, policy, minimum duration and iteration caps |

mod config;
mod dependency;
mod span;
mod task;

pub use config::{EditConfig, IterationLimits, Policy, SnapConfig, DAY_MS, HOUR_MS};
pub use dependency::{Dependency, DependencyType, Edge};
pub use span::{time_range, Span};
pub use task::{DerivedSides, Task};
