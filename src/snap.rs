//! Snapping instants to a grid anchored at local midnight.
//!
//! The grid for an instant starts at midnight of that instant's own calendar
//! day in the given time zone (not UTC midnight, not the epoch). The offset
//! from that midnight is rounded to the nearer multiple of the increment,
//! ties rounding up. A result that would round past the next local midnight
//! lands on that midnight instead, so snapping is idempotent for every
//! increment, including ones that do not divide the day and days shortened
//! by a DST transition.

use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone};

/// Snaps `instant_ms` in the system's local time zone.
///
/// Returns the instant unchanged when `enabled` is false or the increment is
/// not positive.
pub fn snap(instant_ms: i64, enabled: bool, increment_ms: i64) -> i64 {
    snap_in(&Local, instant_ms, enabled, increment_ms)
}

/// Snaps `instant_ms` in the time zone `tz`.
///
/// ```
/// use chrono::Utc;
/// use gantt_constraints::snap::snap_in;
/// use gantt_constraints::models::{DAY_MS, HOUR_MS};
///
/// let day_10 = 10 * DAY_MS;
/// // 11:59 rounds down, 12:00 rounds up to the next midnight.
/// assert_eq!(snap_in(&Utc, day_10 + 12 * HOUR_MS - 60_000, true, DAY_MS), day_10);
/// assert_eq!(snap_in(&Utc, day_10 + 12 * HOUR_MS, true, DAY_MS), day_10 + DAY_MS);
/// ```
pub fn snap_in<Tz: TimeZone>(tz: &Tz, instant_ms: i64, enabled: bool, increment_ms: i64) -> i64 {
    if !enabled || increment_ms <= 0 {
        return instant_ms;
    }
    let Some(utc) = DateTime::from_timestamp_millis(instant_ms) else {
        return instant_ms;
    };
    let day = utc.with_timezone(tz).date_naive();
    let Some(midnight) = local_midnight(tz, day) else {
        return instant_ms;
    };

    let offset = instant_ms - midnight;
    let remainder = offset.rem_euclid(increment_ms);
    let snapped = if remainder >= increment_ms - remainder {
        (midnight + offset - remainder).saturating_add(increment_ms)
    } else {
        midnight + offset - remainder
    };

    match day.succ_opt().and_then(|next| local_midnight(tz, next)) {
        Some(next_midnight) => snapped.min(next_midnight),
        None => snapped,
    }
}

/// First instant of `day` in `tz` (ms).
///
/// Where midnight falls into a DST gap the day starts an hour later.
fn local_midnight<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Option<i64> {
    let naive = day.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(naive + TimeDelta::hours(1)))
                .earliest()
        })
        .map(|dt| dt.timestamp_millis())
}
