//! Daily usage ledger and per-model call pacing.
//!
//! The ledger is a flat JSON file `{ "date": "...", "counts": { model: n } }`
//! that resets itself when the stored date is not today. One increment per
//! successful API call, persisted immediately as a whole-file rewrite.
//! There is no locking: the toolkit is single-user, single-process.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ToolkitError;

/// Free-tier daily request limits, by model. Display-only: the toolkit
/// never blocks a call on the limit.
pub const DAILY_LIMITS: &[(&str, u32)] = &[
    ("gemini-2.5-flash-lite", 1000),
    ("gemini-2.5-flash", 250),
    ("gemini-2.5-pro", 50),
];

/// Fixed pause between consecutive calls to the same model, in seconds.
/// Matches the free-tier per-minute quotas.
pub const MODEL_DELAYS: &[(&str, u64)] = &[
    ("gemini-2.5-flash-lite", 4),
    ("gemini-2.5-flash", 6),
    ("gemini-2.5-pro", 30),
];

const FALLBACK_DELAY_SECS: u64 = 6;

/// Look up the daily limit for a model.
pub fn daily_limit(model: &str) -> Option<u32> {
    DAILY_LIMITS
        .iter()
        .find(|(m, _)| *m == model)
        .map(|(_, n)| *n)
}

#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    date: String,
    #[serde(default)]
    counts: BTreeMap<String, u32>,
}

/// The persisted daily call counter.
#[derive(Debug)]
pub struct UsageLedger {
    path: PathBuf,
    date: NaiveDate,
    counts: BTreeMap<String, u32>,
}

impl UsageLedger {
    /// Load the ledger, creating or repairing the file as needed.
    ///
    /// An absent or corrupt file is recreated with defaults. A stored date
    /// other than today resets every count to zero, and the reset is
    /// persisted before any increment can happen.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ToolkitError> {
        Self::load_for_date(path, Local::now().date_naive())
    }

    /// Same as [`load`](Self::load) with an explicit "today", so tests can
    /// exercise the calendar rollover.
    pub fn load_for_date(
        path: impl Into<PathBuf>,
        today: NaiveDate,
    ) -> Result<Self, ToolkitError> {
        let path = path.into();

        let stored: Option<LedgerFile> = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok());

        match stored {
            Some(file) if file.date == today.to_string() => Ok(Self {
                path,
                date: today,
                counts: file.counts,
            }),
            Some(file) => {
                tracing::info!(stored = %file.date, "usage ledger dated before today, resetting counts");
                let ledger = Self {
                    path,
                    date: today,
                    counts: BTreeMap::new(),
                };
                ledger.persist()?;
                Ok(ledger)
            }
            None => {
                tracing::debug!(path = %path.display(), "usage ledger absent or unreadable, recreating");
                let ledger = Self {
                    path,
                    date: today,
                    counts: BTreeMap::new(),
                };
                ledger.persist()?;
                Ok(ledger)
            }
        }
    }

    /// Record one successful API call and persist immediately.
    pub fn record_call(&mut self, model: &str) -> Result<u32, ToolkitError> {
        let count = self.counts.entry(model.to_string()).or_insert(0);
        *count += 1;
        let now = *count;
        self.persist()?;
        Ok(now)
    }

    /// Zero every counter and persist (the "reset all counters" action).
    pub fn reset(&mut self) -> Result<(), ToolkitError> {
        self.counts.clear();
        self.persist()
    }

    /// Calls made today for one model.
    pub fn count(&self, model: &str) -> u32 {
        self.counts.get(model).copied().unwrap_or(0)
    }

    /// All of today's counts, for the usage display.
    pub fn counts(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(m, n)| (m.as_str(), *n))
    }

    /// The calendar date the counts belong to.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    fn persist(&self) -> Result<(), ToolkitError> {
        let file = LedgerFile {
            date: self.date.to_string(),
            counts: self.counts.clone(),
        };
        let text = serde_json::to_string_pretty(&file).expect("ledger serialization is infallible");
        std::fs::write(&self.path, text).map_err(|source| ToolkitError::PersistFailed {
            path: self.path.clone(),
            source,
        })
    }
}

/// Spaces out calls to the same model without blocking unrelated work.
///
/// Instead of sleeping unconditionally after every call, the pacer stamps
/// each call and, on the next one, waits only for whatever remains of the
/// model's fixed delay. A call made after a long pause pays nothing.
#[derive(Debug, Default)]
pub struct RatePacer {
    last_call: BTreeMap<String, Instant>,
}

impl RatePacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay applied between consecutive calls to `model`.
    pub fn delay_for(model: &str) -> Duration {
        let secs = MODEL_DELAYS
            .iter()
            .find(|(m, _)| *m == model)
            .map(|(_, d)| *d)
            .unwrap_or(FALLBACK_DELAY_SECS);
        Duration::from_secs(secs)
    }

    /// Wait until `model` may be called again, then stamp the call.
    pub async fn wait_turn(&mut self, model: &str) {
        if let Some(last) = self.last_call.get(model) {
            let delay = Self::delay_for(model);
            let elapsed = last.elapsed();
            if elapsed < delay {
                let remaining = delay - elapsed;
                tracing::debug!(model, ?remaining, "pacing before next call");
                tokio::time::sleep(remaining).await;
            }
        }
        self.last_call.insert(model.to_string(), Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn absent_file_recreated_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");

        let ledger = UsageLedger::load_for_date(&path, date("2026-08-05")).unwrap();
        assert_eq!(ledger.count("gemini-2.5-flash"), 0);
        assert!(path.exists(), "defaults should be persisted on creation");
    }

    #[test]
    fn corrupt_file_recreated_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");
        std::fs::write(&path, "{not json").unwrap();

        let ledger = UsageLedger::load_for_date(&path, date("2026-08-05")).unwrap();
        assert_eq!(ledger.counts().count(), 0);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("2026-08-05"));
    }

    #[test]
    fn increment_persists_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");

        let mut ledger = UsageLedger::load_for_date(&path, date("2026-08-05")).unwrap();
        assert_eq!(ledger.record_call("gemini-2.5-pro").unwrap(), 1);
        assert_eq!(ledger.record_call("gemini-2.5-pro").unwrap(), 2);

        let reread = UsageLedger::load_for_date(&path, date("2026-08-05")).unwrap();
        assert_eq!(reread.count("gemini-2.5-pro"), 2);
    }

    #[test]
    fn stale_date_resets_and_persists_before_any_increment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");

        let mut yesterday = UsageLedger::load_for_date(&path, date("2026-08-04")).unwrap();
        yesterday.record_call("gemini-2.5-flash").unwrap();
        yesterday.record_call("gemini-2.5-flash").unwrap();

        let today = UsageLedger::load_for_date(&path, date("2026-08-05")).unwrap();
        assert_eq!(today.count("gemini-2.5-flash"), 0);

        // The reset itself must already be on disk.
        let text = std::fs::read_to_string(&path).unwrap();
        let file: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(file["date"], "2026-08-05");
        assert!(file["counts"].as_object().unwrap().is_empty());
    }

    #[test]
    fn reset_clears_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");

        let mut ledger = UsageLedger::load_for_date(&path, date("2026-08-05")).unwrap();
        ledger.record_call("gemini-2.5-flash-lite").unwrap();
        ledger.reset().unwrap();
        assert_eq!(ledger.count("gemini-2.5-flash-lite"), 0);

        let reread = UsageLedger::load_for_date(&path, date("2026-08-05")).unwrap();
        assert_eq!(reread.counts().count(), 0);
    }

    #[test]
    fn limits_table_lookup() {
        assert_eq!(daily_limit("gemini-2.5-pro"), Some(50));
        assert_eq!(daily_limit("unknown-model"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn pacer_first_call_is_free() {
        let mut pacer = RatePacer::new();
        let before = tokio::time::Instant::now();
        pacer.wait_turn("gemini-2.5-pro").await;
        assert_eq!(tokio::time::Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn pacer_spaces_consecutive_calls() {
        let mut pacer = RatePacer::new();
        pacer.wait_turn("gemini-2.5-flash").await;

        let before = tokio::time::Instant::now();
        pacer.wait_turn("gemini-2.5-flash").await;
        let waited = tokio::time::Instant::now() - before;
        assert!(
            waited >= Duration::from_millis(5900),
            "expected roughly a 6s pause, waited {waited:?}"
        );
    }
}
