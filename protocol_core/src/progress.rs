//! Progress derived from the protocol's completed days.

use crate::gate::all_exercises_done;
use crate::segment::ContentParser;
use crate::{DayStatus, Protocol, PROGRAM_DAYS};
use serde::Serialize;

/// Completed days within the program; stray indices from old data are ignored
pub fn completed_count(protocol: &Protocol) -> usize {
    protocol
        .completed_days
        .iter()
        .filter(|d| **d < PROGRAM_DAYS)
        .count()
}

/// Rounded share of the program that has been finalized, 0..=100
pub fn completion_percent(protocol: &Protocol) -> u8 {
    (100.0 * completed_count(protocol) as f64 / PROGRAM_DAYS as f64).round() as u8
}

/// Day to open by default: the first one not yet completed
///
/// Wraps to 0 once all days are complete.
pub fn default_selected_day(protocol: &Protocol) -> usize {
    (0..PROGRAM_DAYS)
        .find(|d| !protocol.is_completed(*d))
        .unwrap_or(0)
}

/// Lifecycle state of a day
pub fn day_status(protocol: &Protocol, day: usize, parser: &dyn ContentParser) -> DayStatus {
    if protocol.is_completed(day) {
        return DayStatus::Completed;
    }
    if all_exercises_done(protocol, day, parser) {
        return DayStatus::ReadyToFinalize;
    }
    if protocol.current_day_logs.contains_key(&day) {
        return DayStatus::InProgress;
    }
    DayStatus::NotStarted
}

/// Aggregated view of protocol progress
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub completed_days: usize,
    pub total_days: usize,
    pub percent: u8,
    pub default_day: usize,
    pub in_progress_days: Vec<usize>,
}

pub fn summarize(protocol: &Protocol) -> ProgressSummary {
    let in_progress_days = protocol
        .current_day_logs
        .iter()
        .filter(|(day, logs)| !logs.is_empty() && !protocol.is_completed(**day))
        .map(|(day, _)| *day)
        .collect();

    ProgressSummary {
        completed_days: completed_count(protocol),
        total_days: PROGRAM_DAYS,
        percent: completion_percent(protocol),
        default_day: default_selected_day(protocol),
        in_progress_days,
    }
}
