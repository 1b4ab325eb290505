use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Which insert pass a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPhase {
    /// First pass over the rows read from the source.
    Primary,
    /// Second pass over rows repaired after an encoding failure.
    Retry,
}

/// Events emitted by the loader.
#[derive(Debug, Clone)]
pub enum LoadEvent {
    FileStarted { file: PathBuf, rows: usize },
    RowLoaded { done: usize, total: usize, phase: InsertPhase },
    PhaseFinished { phase: InsertPhase, elapsed: Duration },
    RunFinished { summary: String },
}

/// Observer hook for load progress.
pub trait LoadObserver: Send + Sync {
    fn on_event(&self, event: &LoadEvent);
}

/// Prints a `done / total` counter to stdout, rewriting the same line after every row.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl LoadObserver for ConsoleProgress {
    fn on_event(&self, event: &LoadEvent) {
        let mut out = std::io::stdout().lock();
        let _ = match event {
            LoadEvent::FileStarted { file, rows } => {
                writeln!(out, "start to insert '{}' ({rows} rows) ...", file.display())
            }
            LoadEvent::RowLoaded { done, total, .. } => write!(out, "\r{done} / {total} ..."),
            LoadEvent::PhaseFinished { phase, elapsed } => {
                writeln!(out, "\nfinished {phase:?} pass in {elapsed:.1?}")
            }
            LoadEvent::RunFinished { summary } => writeln!(out, "{summary}"),
        };
        let _ = out.flush();
    }
}
