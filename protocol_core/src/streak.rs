//! Calendar of training activity and streak tracking.
//!
//! Calendar dates are independent of protocol day indices: finishing day 5
//! of the plan marks whatever today's date is.

use crate::feedback::ActivitySink;
use crate::store::{KeyValueStore, ACTIVITY_KEY};
use crate::Result;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;

/// Set of dates with at least one finalized day
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityLog {
    dates: BTreeSet<NaiveDate>,
}

impl ActivityLog {
    /// Load the log from `store`. A corrupted entry yields an empty log.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let Some(contents) = store.get(ACTIVITY_KEY)? else {
            return Ok(Self::default());
        };

        match serde_json::from_str::<BTreeSet<NaiveDate>>(&contents) {
            Ok(dates) => Ok(Self { dates }),
            Err(e) => {
                tracing::warn!("Failed to parse activity log: {}. Starting fresh.", e);
                Ok(Self::default())
            }
        }
    }

    /// Persist as a JSON array of ISO dates
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let contents = serde_json::to_string(&self.dates)?;
        store.set(ACTIVITY_KEY, &contents)
    }

    /// Record a date. Returns false if it was already present.
    pub fn mark(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Consecutive active days ending at `today`
    ///
    /// A streak that ended yesterday is still current; today isn't over yet.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        let mut cursor = if self.contains(today) {
            today
        } else {
            today - Duration::days(1)
        };

        let mut streak = 0;
        while self.contains(cursor) {
            streak += 1;
            cursor -= Duration::days(1);
        }
        streak
    }

    /// Longest run of consecutive active days
    pub fn longest_streak(&self) -> u32 {
        let mut longest = 0;
        let mut run = 0;
        let mut previous: Option<NaiveDate> = None;

        for date in &self.dates {
            run = match previous {
                Some(p) if *date - p == Duration::days(1) => run + 1,
                _ => 1,
            };
            longest = longest.max(run);
            previous = Some(*date);
        }

        longest
    }
}

impl ActivitySink for ActivityLog {
    fn mark_active(&mut self, date: NaiveDate) -> Result<()> {
        if self.mark(date) {
            tracing::debug!("Marked {} as active", date);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_mark_is_idempotent() {
        let mut log = ActivityLog::default();
        assert!(log.mark(date("2026-03-01")));
        assert!(!log.mark(date("2026-03-01")));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_current_streak() {
        let mut log = ActivityLog::default();
        for d in ["2026-03-01", "2026-03-02", "2026-03-03", "2026-03-05"] {
            log.mark(date(d));
        }

        assert_eq!(log.current_streak(date("2026-03-05")), 1);
        assert_eq!(log.current_streak(date("2026-03-04")), 3);
        assert_eq!(log.current_streak(date("2026-03-03")), 3);
        assert_eq!(log.current_streak(date("2026-03-10")), 0);
    }

    #[test]
    fn test_longest_streak() {
        let mut log = ActivityLog::default();
        assert_eq!(log.longest_streak(), 0);

        for d in ["2026-02-27", "2026-02-28", "2026-03-01", "2026-03-05"] {
            log.mark(date(d));
        }
        assert_eq!(log.longest_streak(), 3);
    }

    #[test]
    fn test_store_roundtrip_uses_iso_dates() {
        let mut store = MemoryStore::default();
        let mut log = ActivityLog::default();
        log.mark_active(date("2026-10-19")).unwrap();
        log.save(&mut store).unwrap();

        assert_eq!(
            store.get(ACTIVITY_KEY).unwrap().as_deref(),
            Some("[\"2026-10-19\"]")
        );
        assert_eq!(ActivityLog::load(&store).unwrap(), log);
    }

    #[test]
    fn test_corrupted_log_starts_fresh() {
        let mut store = MemoryStore::default();
        store.set(ACTIVITY_KEY, "not json").unwrap();
        assert!(ActivityLog::load(&store).unwrap().is_empty());
    }
}
