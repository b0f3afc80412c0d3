//! CSV export of finalized day history.

use crate::{DayFeedback, ExerciseLog, Protocol, Result};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    day: usize,
    difficulty: u8,
    energy: u8,
    notes: &'a str,
    exercise: &'a str,
    weight: String,
    sets: String,
    completed: bool,
    duration_seconds: Option<u32>,
    completed_at: Option<String>,
}

impl<'a> CsvRow<'a> {
    fn new(feedback: &'a DayFeedback, exercise: &'a str, log: Option<&'a ExerciseLog>) -> Self {
        CsvRow {
            day: feedback.day + 1,
            difficulty: feedback.difficulty,
            energy: feedback.energy,
            notes: &feedback.notes,
            exercise,
            weight: log.map(|l| l.weight_value().to_string()).unwrap_or_default(),
            sets: log.map(|l| l.sets_value().to_string()).unwrap_or_default(),
            completed: log.is_some_and(|l| l.completed),
            duration_seconds: log.and_then(|l| l.duration_seconds),
            completed_at: feedback.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Write the feedback history of `protocol` to `csv_path`
///
/// One row per logged exercise, ordered by day then exercise name. A finalized
/// day without logs still gets one row carrying its ratings. Numeric weight
/// and sets are written with a decimal point; other text is kept as typed.
/// Any existing file is replaced. Returns the number of rows written.
pub fn export_feedback_csv(protocol: &Protocol, csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut feedbacks: Vec<&DayFeedback> = protocol.feedbacks.iter().collect();
    feedbacks.sort_by_key(|f| f.day);

    let file = File::create(csv_path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    let mut rows = 0;
    for feedback in feedbacks {
        if feedback.exercise_logs.is_empty() {
            writer.serialize(CsvRow::new(feedback, "", None))?;
            rows += 1;
            continue;
        }
        for (name, log) in &feedback.exercise_logs {
            writer.serialize(CsvRow::new(feedback, name, Some(log)))?;
            rows += 1;
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} rows to {:?}", rows, csv_path);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logbook::tests::sample_protocol;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn feedback(day: usize, logs: &[(&str, &str, &str)]) -> DayFeedback {
        DayFeedback {
            day,
            difficulty: 4,
            energy: 5,
            notes: "Pesado, mas ok".into(),
            exercise_logs: logs
                .iter()
                .map(|(name, weight, sets)| {
                    (
                        name.to_string(),
                        ExerciseLog {
                            weight: weight.to_string(),
                            sets: sets.to_string(),
                            completed: true,
                            ..Default::default()
                        },
                    )
                })
                .collect::<BTreeMap<_, _>>(),
            completed_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_export_one_row_per_exercise() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("out/history.csv");

        let mut protocol = sample_protocol();
        protocol.feedbacks = vec![
            feedback(1, &[("Rosca Direta", "12", "3")]),
            feedback(0, &[("Supino Reto", "80", "3"), ("Agachamento Livre", "100", "4")]),
        ];

        let rows = export_feedback_csv(&protocol, &csv_path).unwrap();
        assert_eq!(rows, 3);

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "day");
        assert_eq!(&headers[4], "exercise");

        let records: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&records[0][0], "1");
        assert_eq!(&records[0][4], "Agachamento Livre");
        assert_eq!(&records[2][0], "2");
        assert_eq!(&records[2][5], "12");
    }

    #[test]
    fn test_export_normalizes_decimal_comma() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("history.csv");

        let mut protocol = sample_protocol();
        protocol.feedbacks = vec![feedback(0, &[("Supino Reto", "82,5", "3x10")])];
        export_feedback_csv(&protocol, &csv_path).unwrap();

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[5], "82.5");
        assert_eq!(&record[6], "3x10");
    }

    #[test]
    fn test_export_day_without_logs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("history.csv");

        let mut protocol = sample_protocol();
        protocol.feedbacks = vec![feedback(4, &[])];

        assert_eq!(export_feedback_csv(&protocol, &csv_path).unwrap(), 1);
        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 1);
    }

    #[test]
    fn test_export_empty_history_writes_nothing_but_succeeds() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("history.csv");

        assert_eq!(export_feedback_csv(&sample_protocol(), &csv_path).unwrap(), 0);
        assert!(csv_path.exists());
    }
}
