//! Turning generator output into an active protocol.

use crate::Protocol;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

const PLAN_HINTS: &[&str] = &[
    "30 DIAS", "30 DAYS", "### DIA 1", "### DAY 1", "DIA 1:", "DAY 1:",
];

const NUTRITION_HEADINGS: &[&str] = &[
    "### RESUMO NUTRICIONAL",
    "### DICAS NUTRICIONAIS",
    "### NUTRITION SUMMARY",
    "RESUMO NUTRICIONAL:",
    "DICAS DE ALIMENTAÇÃO:",
];

/// Whether a generated reply looks like a 30-day plan worth activating
pub fn looks_like_protocol(text: &str) -> bool {
    let upper = text.to_uppercase();
    PLAN_HINTS.iter().any(|hint| upper.contains(hint))
}

/// Text after the first nutrition trailer heading, if the plan has one
pub fn nutrition_summary(text: &str) -> Option<&str> {
    NUTRITION_HEADINGS.iter().find_map(|heading| {
        let (_, end) = find_ignore_case(text, heading)?;
        let summary = text[end..].trim();
        (!summary.is_empty()).then_some(summary)
    })
}

/// Byte range of the first match of uppercase `needle` in `haystack`, ignoring case.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    haystack.char_indices().find_map(|(start, _)| {
        let mut wanted = needle.chars().peekable();
        for (offset, c) in haystack[start..].char_indices() {
            if wanted.peek().is_none() {
                return Some((start, start + offset));
            }
            for u in c.to_uppercase() {
                if wanted.next() != Some(u) {
                    return None;
                }
            }
        }
        wanted.peek().is_none().then_some((start, haystack.len()))
    })
}

impl Protocol {
    /// Fresh protocol over `content` with no progress
    pub fn activate(
        title: impl Into<String>,
        objective: impl Into<String>,
        content: impl Into<String>,
        start_date: DateTime<Utc>,
    ) -> Self {
        let protocol = Self {
            title: title.into(),
            objective: objective.into(),
            start_date,
            content: content.into(),
            completed_days: BTreeSet::new(),
            feedbacks: Vec::new(),
            current_day_logs: BTreeMap::new(),
        };
        tracing::info!("Activated protocol '{}'", protocol.title);
        protocol
    }

    /// Activate `content` in place of `previous`
    ///
    /// Replacement is always allowed; unfinalized logs on the old protocol are
    /// lost, which is reported as a warning.
    pub fn replace(
        previous: Option<&Protocol>,
        title: impl Into<String>,
        objective: impl Into<String>,
        content: impl Into<String>,
        start_date: DateTime<Utc>,
    ) -> Self {
        if let Some(old) = previous.filter(|p| p.has_pending_logs()) {
            tracing::warn!(
                "Replacing protocol '{}' discards in-progress logs for {} day(s)",
                old.title,
                old.current_day_logs.len()
            );
        }
        Self::activate(title, objective, content, start_date)
    }
}
