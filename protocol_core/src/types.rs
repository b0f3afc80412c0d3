//! Core domain types for the 30-day protocol tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - The protocol instance and its two-tier log state
//! - Exercise logs and finalized day feedback
//! - Parsed descriptors and day headers
//! - Catalog entries used for enrichment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Number of days in a protocol. Day indices are 0-based: `0..PROGRAM_DAYS`.
pub const PROGRAM_DAYS: usize = 30;

// ============================================================================
// Protocol State
// ============================================================================

/// Index-keyed logs for one day (exercise index → log)
pub type DayLogs = BTreeMap<usize, ExerciseLog>;

/// The active 30-day plan, including raw text and tracked progress
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub title: String,
    pub objective: String,
    pub start_date: DateTime<Utc>,
    pub content: String,
    #[serde(default)]
    pub completed_days: BTreeSet<usize>,
    #[serde(default)]
    pub feedbacks: Vec<DayFeedback>,
    #[serde(default)]
    pub current_day_logs: BTreeMap<usize, DayLogs>,
}

impl Protocol {
    /// Whether the day has been finalized
    pub fn is_completed(&self, day: usize) -> bool {
        self.completed_days.contains(&day)
    }

    /// The finalized feedback for a day, if any
    pub fn feedback_for(&self, day: usize) -> Option<&DayFeedback> {
        self.feedbacks.iter().find(|f| f.day == day)
    }

    /// True if any day still holds unfinalized logs
    pub fn has_pending_logs(&self) -> bool {
        self.current_day_logs.values().any(|logs| !logs.is_empty())
    }
}

/// Permanent record of a finalized day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayFeedback {
    pub day: usize,
    pub difficulty: u8,
    pub energy: u8,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub exercise_logs: BTreeMap<String, ExerciseLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Exercise Logs
// ============================================================================

/// User-entered performance record for one exercise on one day
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseLog {
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub sets: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_at: Option<DateTime<Utc>>,
}

impl ExerciseLog {
    /// Both required inputs are present
    ///
    /// Text that is not a number still counts as entered; see
    /// [`ExerciseLog::has_invalid_input`].
    pub fn has_required_inputs(&self) -> bool {
        !self.weight_value().is_unset() && !self.sets_value().is_unset()
    }

    /// Weight or sets holds text that does not read as a number
    pub fn has_invalid_input(&self) -> bool {
        self.weight_value().is_invalid() || self.sets_value().is_invalid()
    }

    pub fn weight_value(&self) -> Measurement {
        Measurement::parse(&self.weight)
    }

    pub fn sets_value(&self) -> Measurement {
        Measurement::parse(&self.sets)
    }
}

/// One field of an [`ExerciseLog`] that the user can edit directly.
///
/// `completed` is not editable here: it only changes through the
/// completion gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogField {
    Weight(String),
    Sets(String),
    Duration(Option<u32>),
}

/// Free-text numeric field read as a tri-state value
#[derive(Clone, Debug, PartialEq)]
pub enum Measurement {
    Unset,
    Invalid(String),
    Value(f64),
}

impl Measurement {
    /// Parse user text. Empty means unset; a decimal comma is accepted.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Measurement::Unset;
        }

        match trimmed.replace(',', ".").parse::<f64>() {
            Ok(v) if v.is_finite() => Measurement::Value(v),
            _ => Measurement::Invalid(trimmed.to_string()),
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Measurement::Unset)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Measurement::Invalid(_))
    }
}

/// Normalized text: numbers with a decimal point, invalid input verbatim
impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Measurement::Unset => Ok(()),
            Measurement::Invalid(raw) => f.write_str(raw),
            Measurement::Value(v) => write!(f, "{}", v),
        }
    }
}

// ============================================================================
// Parsed Content
// ============================================================================

/// One parsed exercise line within a day segment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseDescriptor {
    pub raw_line: String,
    pub name: String,
    pub note: Option<String>,
}

/// Training focus tag carried on a day marker line
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayCategory {
    Upper,
    Lower,
    FullBody,
    Other(String),
}

/// Title and category parsed from a day marker line
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayHeader {
    pub title: Option<String>,
    pub category: Option<DayCategory>,
}

/// Derived lifecycle state of a single day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    NotStarted,
    InProgress,
    ReadyToFinalize,
    Completed,
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Skill level of a catalog exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Reference data for a known exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseCatalogEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub animation_url: Option<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

/// Ordered list of catalog entries. Order matters: resolution is first-match.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub entries: Vec<ExerciseCatalogEntry>,
}
