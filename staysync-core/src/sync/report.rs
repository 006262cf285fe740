//! Counters for one sync run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// Feeds fetched and parsed.
    pub successful: usize,
    /// Feeds that couldn't be fetched plus events that errored.
    pub failed: usize,
    pub new_reservations: usize,
    pub skipped_existing: usize,
    /// Part of `skipped_existing`: events whose UID was already claimed by
    /// another feed earlier in the same run.
    #[serde(default)]
    pub in_run_duplicates: usize,
    /// No property had a feed configured, nothing was contacted.
    #[serde(skip)]
    pub nothing_to_sync: bool,
}

impl SyncResult {
    pub fn nothing_to_sync() -> Self {
        SyncResult {
            nothing_to_sync: true,
            ..Default::default()
        }
    }

    /// Fold per-feed results into one.
    pub fn merge<I: IntoIterator<Item = SyncResult>>(results: I) -> Self {
        results.into_iter().fold(SyncResult::default(), |mut acc, r| {
            acc += r;
            acc
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl AddAssign for SyncResult {
    fn add_assign(&mut self, other: SyncResult) {
        self.successful += other.successful;
        self.failed += other.failed;
        self.new_reservations += other.new_reservations;
        self.skipped_existing += other.skipped_existing;
        self.in_run_duplicates += other.in_run_duplicates;
    }
}

impl fmt::Display for SyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nothing_to_sync {
            return write!(f, "No properties have calendar feeds configured. Nothing to sync.");
        }

        write!(
            f,
            "Sync finished: {} {} synced, {} failed, {} new {}, {} already existed",
            self.successful,
            pluralize("feed", self.successful),
            self.failed,
            self.new_reservations,
            pluralize("reservation", self.new_reservations),
            self.skipped_existing
        )?;

        if self.in_run_duplicates > 0 {
            write!(
                f,
                " ({} repeated across feeds)",
                self.in_run_duplicates
            )?;
        }

        Ok(())
    }
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_adds_counters() {
        let a = SyncResult {
            successful: 1,
            new_reservations: 2,
            ..Default::default()
        };
        let b = SyncResult {
            failed: 1,
            skipped_existing: 3,
            in_run_duplicates: 1,
            ..Default::default()
        };

        let total = SyncResult::merge([a, b]);
        assert_eq!(total.successful, 1);
        assert_eq!(total.failed, 1);
        assert_eq!(total.new_reservations, 2);
        assert_eq!(total.skipped_existing, 3);
        assert_eq!(total.in_run_duplicates, 1);
        assert!(total.has_failures());
        assert!(!total.nothing_to_sync);
    }

    #[test]
    fn summary_message() {
        let result = SyncResult {
            successful: 1,
            failed: 0,
            new_reservations: 1,
            skipped_existing: 0,
            ..Default::default()
        };
        assert_eq!(
            result.to_string(),
            "Sync finished: 1 feed synced, 0 failed, 1 new reservation, 0 already existed"
        );

        assert!(SyncResult::nothing_to_sync().to_string().contains("Nothing to sync"));
    }

    #[test]
    fn serializes_with_camel_case_counters() {
        let json = serde_json::to_value(SyncResult {
            new_reservations: 4,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json["newReservations"], 4);
        assert_eq!(json["skippedExisting"], 0);
        assert!(json.get("nothingToSync").is_none());
    }
}
