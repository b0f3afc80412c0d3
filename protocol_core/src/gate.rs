//! Completion rules for exercises and days.

use crate::logbook::{ensure_open, get_log, logs_for_day};
use crate::segment::ContentParser;
use crate::{Error, Protocol, Result};
use chrono::{DateTime, Utc};

/// Flip the `completed` flag of one exercise
///
/// Requires both weight and sets; otherwise fails with `MissingInput` and the
/// protocol is left as it was. Marking done stamps `logged_at` with `now`.
pub fn toggle_completed(
    protocol: &Protocol,
    day: usize,
    index: usize,
    now: DateTime<Utc>,
) -> Result<Protocol> {
    ensure_open(protocol, day)?;

    let mut log = get_log(protocol, day, index);
    if !log.has_required_inputs() {
        tracing::info!(
            "Day {} exercise {} needs weight and sets before completion",
            day + 1,
            index + 1
        );
        return Err(Error::MissingInput { day, index });
    }

    log.completed = !log.completed;
    if log.completed {
        log.logged_at = Some(now);
    }

    tracing::debug!(
        "Day {} exercise {} completed={}",
        day + 1,
        index + 1,
        log.completed
    );

    let mut updated = protocol.clone();
    updated
        .current_day_logs
        .entry(day)
        .or_default()
        .insert(index, log);
    Ok(updated)
}

/// Number of exercises on the day that are not yet completed
pub fn pending_count(protocol: &Protocol, day: usize, parser: &dyn ContentParser) -> usize {
    let total = parser.exercises_for_day(&protocol.content, day).len();
    let logs = logs_for_day(protocol, day, parser);

    (0..total)
        .filter(|idx| !logs.get(idx).is_some_and(|log| log.completed))
        .count()
}

/// True iff the day has at least one exercise and all of them are completed
pub fn all_exercises_done(protocol: &Protocol, day: usize, parser: &dyn ContentParser) -> bool {
    let total = parser.exercises_for_day(&protocol.content, day).len();
    total > 0 && pending_count(protocol, day, parser) == 0
}

/// Gate for finalization: fails with `IncompleteDay` unless every exercise is done
pub fn ensure_ready(protocol: &Protocol, day: usize, parser: &dyn ContentParser) -> Result<()> {
    if all_exercises_done(protocol, day, parser) {
        return Ok(());
    }

    let remaining = pending_count(protocol, day, parser);
    tracing::info!(
        "Day {} cannot be finalized: {} exercise(s) pending",
        day + 1,
        remaining
    );
    Err(Error::IncompleteDay { day, remaining })
}
