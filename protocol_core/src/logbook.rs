//! Transient per-day exercise logs.
//!
//! Logs for an open day are keyed by exercise index (display order). Once a
//! day is finalized its logs live in the day's feedback, keyed by name, and
//! every write to that day is rejected.

use crate::segment::ContentParser;
use crate::{DayLogs, Error, ExerciseLog, LogField, Protocol, Result, PROGRAM_DAYS};

/// Reject day indices outside the program
pub fn check_day(day: usize) -> Result<()> {
    if day >= PROGRAM_DAYS {
        return Err(Error::DayOutOfRange(day));
    }
    Ok(())
}

/// Reject writes to a finalized day
pub(crate) fn ensure_open(protocol: &Protocol, day: usize) -> Result<()> {
    check_day(day)?;
    if protocol.is_completed(day) {
        tracing::warn!("Ignoring write to completed day {}", day + 1);
        return Err(Error::AlreadyCompleted { day });
    }
    Ok(())
}

/// Transient log for an exercise, or an empty one if nothing was entered yet
pub fn get_log(protocol: &Protocol, day: usize, index: usize) -> ExerciseLog {
    protocol
        .current_day_logs
        .get(&day)
        .and_then(|logs| logs.get(&index))
        .cloned()
        .unwrap_or_default()
}

/// Return a new protocol with one field of one log updated
///
/// Only the given field changes. Clearing weight or sets on a completed log
/// also clears `completed`, so a completed log always has both inputs.
pub fn set_log_field(
    protocol: &Protocol,
    day: usize,
    index: usize,
    field: LogField,
) -> Result<Protocol> {
    ensure_open(protocol, day)?;

    let mut updated = protocol.clone();
    let log = updated
        .current_day_logs
        .entry(day)
        .or_default()
        .entry(index)
        .or_default();

    match field {
        LogField::Weight(weight) => log.weight = weight,
        LogField::Sets(sets) => log.sets = sets,
        LogField::Duration(seconds) => log.duration_seconds = seconds,
    }

    if log.completed && !log.has_required_inputs() {
        tracing::debug!(
            "Day {} exercise {} lost a required input, reopening",
            day + 1,
            index + 1
        );
        log.completed = false;
    }

    tracing::debug!("Updated log for day {} exercise {}", day + 1, index + 1);
    Ok(updated)
}

/// Index-keyed logs to display for a day
///
/// For a completed day the name-keyed feedback logs are mapped back onto the
/// current descriptor order; names missing from the feedback are left out.
pub fn logs_for_day(protocol: &Protocol, day: usize, parser: &dyn ContentParser) -> DayLogs {
    if protocol.is_completed(day) {
        if let Some(feedback) = protocol.feedback_for(day) {
            return parser
                .exercises_for_day(&protocol.content, day)
                .iter()
                .enumerate()
                .filter_map(|(idx, d)| {
                    feedback
                        .exercise_logs
                        .get(&d.name)
                        .map(|log| (idx, log.clone()))
                })
                .collect();
        }
    }

    protocol
        .current_day_logs
        .get(&day)
        .cloned()
        .unwrap_or_default()
}
