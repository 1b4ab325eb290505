use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use super::observer::InsertPhase;

/// Per-run row counters. They only ever go up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    ok: u64,
    retried: u64,
    failed: u64,
}

impl RunCounters {
    /// Rows committed on the primary pass.
    pub fn ok(&self) -> u64 {
        self.ok
    }

    /// Rows committed on the retry pass.
    pub fn retried(&self) -> u64 {
        self.retried
    }

    /// Rows that were not loaded.
    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub(crate) fn record_committed(&mut self, phase: InsertPhase) {
        match phase {
            InsertPhase::Primary => self.ok += 1,
            InsertPhase::Retry => self.retried += 1,
        }
    }

    pub(crate) fn record_failed(&mut self) {
        self.failed += 1;
    }
}

/// Outcome of a load run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub source: PathBuf,
    pub database: String,
    pub table: String,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    /// Rows handed to the insert engine on the primary pass.
    pub total_rows: usize,
    pub counters: RunCounters,
    /// Rows routed to the retry pass after an encoding failure.
    pub retry_routed: u64,
    pub files_loaded: usize,
    pub files_failed: usize,
    pub files_skipped: usize,
}

impl RunReport {
    /// One-line, human readable summary.
    pub fn summarize(&self) -> String {
        let secs = self.elapsed.as_secs_f64();
        let minutes = (secs / 60.0).floor();
        let mut msg = format!(
            "{} ({}.{}) -> elapsed: {} min {:.1} sec, ok: {}, failed: {}",
            self.source.display(),
            self.database,
            self.table,
            minutes as u64,
            secs - minutes * 60.0,
            self.counters.ok(),
            self.counters.failed(),
        );
        if self.retry_routed > 0 {
            msg.push_str(&format!(
                ", retry queued: {}, retry ok: {}",
                self.retry_routed,
                self.counters.retried()
            ));
        }
        msg
    }

    /// Structured summary as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summarize())
    }
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(retry_routed: u64) -> RunReport {
        let mut counters = RunCounters::default();
        for _ in 0..3 {
            counters.record_committed(InsertPhase::Primary);
        }
        counters.record_committed(InsertPhase::Retry);
        counters.record_failed();
        RunReport {
            source: PathBuf::from("input/a.csv"),
            database: "main".to_string(),
            table: "a".to_string(),
            elapsed: Duration::from_millis(61_500),
            total_rows: 5,
            counters,
            retry_routed,
            files_loaded: 1,
            files_failed: 0,
            files_skipped: 0,
        }
    }

    #[test]
    fn summary_splits_minutes_and_seconds() {
        let msg = report(0).summarize();
        assert_eq!(msg, "input/a.csv (main.a) -> elapsed: 1 min 1.5 sec, ok: 3, failed: 1");
    }

    #[test]
    fn summary_mentions_retry_only_when_used() {
        let msg = report(2).summarize();
        assert!(msg.ends_with(", retry queued: 2, retry ok: 1"));
    }

    #[test]
    fn json_summary_has_counters() {
        let json: serde_json::Value = serde_json::from_str(&report(0).to_json().unwrap()).unwrap();
        assert_eq!(json["counters"]["ok"], 3);
        assert_eq!(json["elapsed"], 61.5);
    }
}
