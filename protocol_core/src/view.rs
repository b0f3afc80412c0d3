//! Per-day view models for front ends.

use crate::logbook::logs_for_day;
use crate::progress::day_status;
use crate::segment::ContentParser;
use crate::{
    Catalog, DayHeader, DayStatus, ExerciseCatalogEntry, ExerciseDescriptor, ExerciseLog,
    Protocol, PROGRAM_DAYS,
};

/// One exercise of a day, enriched with catalog data and its log
#[derive(Clone, Debug)]
pub struct ExerciseView<'c> {
    pub index: usize,
    pub descriptor: ExerciseDescriptor,
    pub entry: Option<&'c ExerciseCatalogEntry>,
    pub log: ExerciseLog,
}

impl ExerciseView<'_> {
    /// Catalog name when resolved, otherwise the descriptor's own name
    pub fn display_name(&self) -> &str {
        self.entry
            .map(|e| e.name.as_str())
            .unwrap_or(&self.descriptor.name)
    }
}

/// Everything needed to render one day
#[derive(Clone, Debug)]
pub struct DayView<'c> {
    pub day: usize,
    pub header: DayHeader,
    pub status: DayStatus,
    pub exercises: Vec<ExerciseView<'c>>,
}

impl DayView<'_> {
    /// No exercises were found for the day
    pub fn is_rest_day(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.exercises.iter().filter(|e| e.log.completed).count()
    }
}

pub fn day_view<'c>(
    protocol: &Protocol,
    day: usize,
    parser: &dyn ContentParser,
    catalog: &'c Catalog,
) -> DayView<'c> {
    let segment = parser.day_segment(&protocol.content, day + 1);
    let logs = logs_for_day(protocol, day, parser);

    let exercises = parser
        .exercise_lines(segment)
        .into_iter()
        .enumerate()
        .map(|(index, descriptor)| ExerciseView {
            index,
            entry: catalog.resolve(&descriptor.name),
            log: logs.get(&index).cloned().unwrap_or_default(),
            descriptor,
        })
        .collect();

    DayView {
        day,
        header: parser.day_header(segment),
        status: day_status(protocol, day, parser),
        exercises,
    }
}

/// Descriptors of the following day; empty after the last day
pub fn next_day_preview(
    protocol: &Protocol,
    day: usize,
    parser: &dyn ContentParser,
) -> Vec<ExerciseDescriptor> {
    if day + 1 >= PROGRAM_DAYS {
        return Vec::new();
    }
    parser.exercises_for_day(&protocol.content, day + 1)
}
