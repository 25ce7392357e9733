//! Constraint engine for interactive Gantt editing.
//!
//! Given one task's edited start or end, decides how every other task must
//! change (or be prevented from changing) so that declared dependencies and
//! group spans stay consistent. Edits run inside a copy-on-write session and
//! only reach the task list on commit.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Task`, `Dependency`, `Span`, `EditConfig`
//! - **`graph`**: Dependency and grouping adjacency, affected closure
//! - **`rules`**: FS/SS/FF/SF violation, push, pull and clamp
//! - **`propagation`**: Free (shift everything) and enforced (clamp the
//!   edited task) policies
//! - **`aggregation`**: Group spans from descendants
//! - **`snap`**: Rounding to a grid anchored at local midnight
//! - **`session`**: One drag gesture over an ephemeral working set
//! - **`timeline`**: Caller-facing façade with observers
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown
//!   references, cycles, bad intervals)
//!
//! # Policies
//!
//! | Policy | `enforce_constraints` | Effect of a violating edit |
//! |--------|-----------------------|----------------------------|
//! | Free | `false` | Dependents pushed later, dependencies pulled earlier |
//! | Enforced | `true` | Dragged edge clamped; nothing else moves |
//!
//! # References
//!
//! - Cormen et al. (2009), "Introduction to Algorithms", Ch. 22
//! - PMI (2021), "PMBOK Guide", Precedence Diagramming Method

pub mod aggregation;
pub mod error;
pub mod graph;
pub mod models;
pub mod propagation;
pub mod rules;
pub mod session;
pub mod snap;
pub mod timeline;
pub mod validation;

pub use aggregation::recompute_group_spans;
pub use error::{EditError, Result};
pub use models::time_range;
pub use session::{EdgeKind, EditReport, EditSession};
pub use snap::{snap, snap_in};
pub use timeline::{SessionHandle, Timeline, TimelineObserver};
pub use validation::validate_tasks;
