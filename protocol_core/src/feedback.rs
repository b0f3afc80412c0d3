//! Day finalization: freezing transient logs into permanent history.

use crate::gate::ensure_ready;
use crate::logbook::{check_day, get_log};
use crate::segment::ContentParser;
use crate::{DayFeedback, Error, Protocol, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

/// Collaborator told about days with training activity (streaks, calendars)
pub trait ActivitySink {
    fn mark_active(&mut self, date: NaiveDate) -> Result<()>;
}

/// Sink that discards notifications
pub struct NoActivitySink;

impl ActivitySink for NoActivitySink {
    fn mark_active(&mut self, _date: NaiveDate) -> Result<()> {
        Ok(())
    }
}

/// User's rating of a finished day
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackInput {
    pub difficulty: u8,
    pub energy: u8,
    pub notes: String,
}

impl FeedbackInput {
    pub fn new(difficulty: u8, energy: u8, notes: impl Into<String>) -> Self {
        Self {
            difficulty,
            energy,
            notes: notes.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [("difficulty", self.difficulty), ("energy", self.energy)] {
            if !(1..=5).contains(&value) {
                return Err(Error::InvalidRating { field, value });
            }
        }
        Ok(())
    }
}

/// Close a day and return the new protocol
///
/// The day's index-keyed logs are re-keyed by exercise name using the current
/// descriptors (a repeated name keeps the later log), appended as a new
/// feedback, the day joins `completed_days`, and its transient logs are
/// dropped. `sink` is then told about `now`'s calendar date; a sink failure
/// is logged and does not undo the finalization.
pub fn finalize_day(
    protocol: &Protocol,
    day: usize,
    input: &FeedbackInput,
    now: DateTime<Utc>,
    parser: &dyn ContentParser,
    sink: &mut dyn ActivitySink,
) -> Result<Protocol> {
    check_day(day)?;

    if protocol.is_completed(day) {
        tracing::warn!("Day {} is already completed, ignoring finalize", day + 1);
        return Err(Error::AlreadyCompleted { day });
    }

    input.validate()?;
    ensure_ready(protocol, day, parser)?;

    let descriptors = parser.exercises_for_day(&protocol.content, day);
    let mut exercise_logs = BTreeMap::new();
    for (idx, descriptor) in descriptors.iter().enumerate() {
        if exercise_logs
            .insert(descriptor.name.clone(), get_log(protocol, day, idx))
            .is_some()
        {
            tracing::warn!(
                "Day {} lists '{}' more than once, keeping the last log",
                day + 1,
                descriptor.name
            );
        }
    }

    let mut updated = protocol.clone();
    updated.feedbacks.push(DayFeedback {
        day,
        difficulty: input.difficulty,
        energy: input.energy,
        notes: input.notes.clone(),
        exercise_logs,
        completed_at: Some(now),
    });
    updated.completed_days.insert(day);
    updated.current_day_logs.remove(&day);

    tracing::info!(
        "Finalized day {} (difficulty {}, energy {})",
        day + 1,
        input.difficulty,
        input.energy
    );

    if let Err(e) = sink.mark_active(now.date_naive()) {
        tracing::warn!("Failed to record activity for day {}: {}", day + 1, e);
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::toggle_completed;
    use crate::logbook::set_log_field;
    use crate::logbook::tests::sample_protocol;
    use crate::segment::MarkerParser;
    use crate::LogField;

    #[derive(Default)]
    struct RecordingSink {
        dates: Vec<NaiveDate>,
    }

    impl ActivitySink for RecordingSink {
        fn mark_active(&mut self, date: NaiveDate) -> Result<()> {
            self.dates.push(date);
            Ok(())
        }
    }

    struct FailingSink;

    impl ActivitySink for FailingSink {
        fn mark_active(&mut self, _date: NaiveDate) -> Result<()> {
            Err(Error::Other("calendar unavailable".into()))
        }
    }

    fn complete(protocol: &Protocol, day: usize, index: usize) -> Protocol {
        let p = set_log_field(protocol, day, index, LogField::Weight("80".into())).unwrap();
        let p = set_log_field(&p, day, index, LogField::Sets("3".into())).unwrap();
        toggle_completed(&p, day, index, Utc::now()).unwrap()
    }

    fn ready_protocol() -> Protocol {
        let p = complete(&sample_protocol(), 0, 0);
        complete(&p, 0, 1)
    }

    #[test]
    fn test_finalize_blocked_until_all_done() {
        let protocol = complete(&sample_protocol(), 0, 0);
        let mut sink = RecordingSink::default();

        let result = finalize_day(
            &protocol,
            0,
            &FeedbackInput::new(4, 5, ""),
            Utc::now(),
            &MarkerParser,
            &mut sink,
        );

        assert!(matches!(
            result,
            Err(Error::IncompleteDay { day: 0, remaining: 1 })
        ));
        assert!(sink.dates.is_empty());
    }

    #[test]
    fn test_finalize_commits_history() {
        let protocol = ready_protocol();
        let mut sink = RecordingSink::default();
        let now = Utc::now();

        let done = finalize_day(
            &protocol,
            0,
            &FeedbackInput::new(4, 5, "Pesado"),
            now,
            &MarkerParser,
            &mut sink,
        )
        .unwrap();

        assert!(done.is_completed(0));
        assert_eq!(done.completed_days.len(), 1);
        assert!(!done.current_day_logs.contains_key(&0));
        assert_eq!(done.feedbacks.len(), 1);

        let feedback = done.feedback_for(0).unwrap();
        assert_eq!(feedback.difficulty, 4);
        assert_eq!(feedback.energy, 5);
        assert_eq!(feedback.notes, "Pesado");
        assert_eq!(feedback.completed_at, Some(now));
        assert_eq!(feedback.exercise_logs.len(), 2);
        assert!(feedback.exercise_logs["Supino Reto"].completed);
        assert_eq!(feedback.exercise_logs["Agachamento Livre"].weight, "80");

        assert_eq!(sink.dates, vec![now.date_naive()]);
    }

    #[test]
    fn test_finalize_twice_fails_without_change() {
        let mut sink = RecordingSink::default();
        let done = finalize_day(
            &ready_protocol(),
            0,
            &FeedbackInput::new(3, 3, ""),
            Utc::now(),
            &MarkerParser,
            &mut sink,
        )
        .unwrap();

        let again = finalize_day(
            &done,
            0,
            &FeedbackInput::new(3, 3, ""),
            Utc::now(),
            &MarkerParser,
            &mut sink,
        );
        assert!(matches!(again, Err(Error::AlreadyCompleted { day: 0 })));
        assert_eq!(done.feedbacks.len(), 1);
        assert_eq!(sink.dates.len(), 1);
    }

    #[test]
    fn test_invalid_ratings_rejected() {
        let protocol = ready_protocol();
        for (difficulty, energy) in [(0, 3), (6, 3), (3, 0), (3, 9)] {
            let result = finalize_day(
                &protocol,
                0,
                &FeedbackInput::new(difficulty, energy, ""),
                Utc::now(),
                &MarkerParser,
                &mut NoActivitySink,
            );
            assert!(matches!(result, Err(Error::InvalidRating { .. })));
        }
    }

    #[test]
    fn test_duplicate_names_keep_last_log() {
        crate::logging::init_test();
        let mut protocol = sample_protocol();
        protocol.content = "DIA 1\n- Supino Reto: 3x10\n- Supino Reto: 3x6".into();
        let protocol = complete(&protocol, 0, 0);
        let protocol = set_log_field(&protocol, 0, 1, LogField::Weight("100".into())).unwrap();
        let protocol = set_log_field(&protocol, 0, 1, LogField::Sets("3".into())).unwrap();
        let protocol = toggle_completed(&protocol, 0, 1, Utc::now()).unwrap();

        let done = finalize_day(
            &protocol,
            0,
            &FeedbackInput::new(3, 3, ""),
            Utc::now(),
            &MarkerParser,
            &mut NoActivitySink,
        )
        .unwrap();

        let logs = &done.feedback_for(0).unwrap().exercise_logs;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs["Supino Reto"].weight, "100");
    }

    #[test]
    fn test_sink_failure_does_not_undo_finalize() {
        crate::logging::init_test();
        let done = finalize_day(
            &ready_protocol(),
            0,
            &FeedbackInput::new(3, 3, ""),
            Utc::now(),
            &MarkerParser,
            &mut FailingSink,
        )
        .unwrap();
        assert!(done.is_completed(0));
    }
}
