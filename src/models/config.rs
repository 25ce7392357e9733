//! Editing configuration.
//!
//! Owned by the caller and passed explicitly into every session. Every field
//! has a default, so a partial document deserializes cleanly:
//!
//! ```
//! use gantt_constraints::models::{EditConfig, HOUR_MS};
//!
//! let config = EditConfig::default()
//!     .with_snap_increment(8 * HOUR_MS)
//!     .with_enforce_constraints(true);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.min_duration_ms, 4 * HOUR_MS);
//! ```

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{EditError, Result};
use crate::snap;

/// One hour in milliseconds.
pub const HOUR_MS: i64 = 60 * 60 * 1000;
/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Snapping settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Whether proposed instants are snapped.
    pub enabled: bool,
    /// Snap grid size (ms), anchored at local midnight.
    pub increment_ms: i64,
    /// Fixed UTC offset (minutes) defining "local". `None` uses the
    /// system time zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            increment_ms: DAY_MS,
            utc_offset_minutes: None,
        }
    }
}

impl SnapConfig {
    /// Snaps `instant_ms` with these settings.
    pub fn apply(&self, instant_ms: i64) -> i64 {
        match self.utc_offset_minutes.and_then(|m| FixedOffset::east_opt(m.saturating_mul(60))) {
            Some(tz) => snap::snap_in(&tz, instant_ms, self.enabled, self.increment_ms),
            None => snap::snap(instant_ms, self.enabled, self.increment_ms),
        }
    }
}

/// Caps on the fixed-point loops.
///
/// Reaching a cap means the input did not converge (typically a dependency
/// or grouping cycle); the engine stops and reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IterationLimits {
    /// Queue pops allowed per free-policy propagation.
    pub max_propagation_steps: usize,
    /// Full scans allowed per enforced-policy clamp.
    pub max_clamp_passes: usize,
    /// Passes allowed per group aggregation.
    pub max_aggregation_passes: usize,
    /// Aggregate-then-propagate rounds allowed per applied edit under the
    /// free policy.
    pub max_settle_rounds: usize,
}

impl Default for IterationLimits {
    fn default() -> Self {
        Self {
            max_propagation_steps: 10_000,
            max_clamp_passes: 100,
            max_aggregation_passes: 10,
            max_settle_rounds: 100,
        }
    }
}

/// Propagation policy selected by [`EditConfig::enforce_constraints`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Shift any affected task to restore constraints.
    Free,
    /// Clamp only the edited task's edges.
    Enforced,
}

/// Editing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Snapping settings.
    pub snap: SnapConfig,
    /// Clamp the dragged task instead of shifting its neighbours.
    pub enforce_constraints: bool,
    /// Minimum duration of a non-group task after an edit (ms).
    pub min_duration_ms: i64,
    /// Iteration caps.
    pub limits: IterationLimits,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            enforce_constraints: false,
            min_duration_ms: 4 * HOUR_MS,
            limits: IterationLimits::default(),
        }
    }
}

impl EditConfig {
    /// Enables or disables snapping.
    pub fn with_snap(mut self, enabled: bool) -> Self {
        self.snap.enabled = enabled;
        self
    }

    /// Sets the snap increment (ms).
    pub fn with_snap_increment(mut self, increment_ms: i64) -> Self {
        self.snap.increment_ms = increment_ms;
        self
    }

    /// Snaps in a fixed UTC offset instead of the system time zone.
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.snap.utc_offset_minutes = Some(minutes);
        self
    }

    /// Selects the enforced (`true`) or free (`false`) policy.
    pub fn with_enforce_constraints(mut self, enforce: bool) -> Self {
        self.enforce_constraints = enforce;
        self
    }

    /// Sets the minimum duration (ms).
    pub fn with_min_duration(mut self, min_duration_ms: i64) -> Self {
        self.min_duration_ms = min_duration_ms;
        self
    }

    /// Sets the iteration caps.
    pub fn with_limits(mut self, limits: IterationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The active propagation policy.
    pub fn policy(&self) -> Policy {
        if self.enforce_constraints {
            Policy::Enforced
        } else {
            Policy::Free
        }
    }

    /// Checks that all values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.snap.increment_ms <= 0 {
            return Err(EditError::InvalidConfig(format!(
                "snap increment must be positive, got {} ms",
                self.snap.increment_ms
            )));
        }
        if let Some(minutes) = self.snap.utc_offset_minutes {
            if FixedOffset::east_opt(minutes.saturating_mul(60)).is_none() {
                return Err(EditError::InvalidConfig(format!(
                    "UTC offset out of range: {minutes} min"
                )));
            }
        }
        if self.min_duration_ms < 0 {
            return Err(EditError::InvalidConfig(format!(
                "minimum duration must not be negative, got {} ms",
                self.min_duration_ms
            )));
        }
        let limits = &self.limits;
        if limits.max_propagation_steps == 0
            || limits.max_clamp_passes == 0
            || limits.max_aggregation_passes == 0
            || limits.max_settle_rounds == 0
        {
            return Err(EditError::InvalidConfig(
                "iteration limits must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
