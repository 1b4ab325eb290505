use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::IngestionError;

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal, e.g. a repaired row or a duplicate key).
    Warning,
    /// Error-level event (a row or a file failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

impl IngestionSeverity {
    /// Upper-case level name used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            IngestionSeverity::Info => "INFO",
            IngestionSeverity::Warning => "WARNING",
            IngestionSeverity::Error => "ERROR",
            IngestionSeverity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for IngestionSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for leveled log messages.
///
/// Implementors can write files, forward to `tracing`, or record messages in tests.
pub trait LogSink: Send + Sync {
    /// Identifier of this log (e.g. `informations`, `errors`).
    fn name(&self) -> &str;

    /// Record one message.
    fn log(&self, severity: IngestionSeverity, message: &str);

    fn info(&self, message: &str) {
        self.log(IngestionSeverity::Info, message)
    }

    fn warning(&self, message: &str) {
        self.log(IngestionSeverity::Warning, message)
    }

    fn error(&self, message: &str) {
        self.log(IngestionSeverity::Error, message)
    }

    fn critical(&self, message: &str) {
        self.log(IngestionSeverity::Critical, message)
    }
}

/// The two logs a load run writes to.
#[derive(Clone)]
pub struct RunLogs {
    /// General run information (start/finish, summaries).
    pub info: Arc<dyn LogSink>,
    /// Error and warning detail (invalid lines, duplicate keys, failed and repaired rows).
    pub errors: Arc<dyn LogSink>,
}

impl RunLogs {
    pub fn new(info: Arc<dyn LogSink>, errors: Arc<dyn LogSink>) -> Self {
        Self { info, errors }
    }

    /// `tracing` sinks, plus append-only files under `log_dir` when one is given.
    pub fn with_log_dir(log_dir: Option<&Path>) -> Self {
        let sink = |name: &str| -> Arc<dyn LogSink> {
            let tracing_sink: Arc<dyn LogSink> = Arc::new(TracingSink::new(name));
            let Some(dir) = log_dir else {
                return tracing_sink;
            };
            let file_sink: Arc<dyn LogSink> = Arc::new(FileSink::in_dir(dir, name));
            Arc::new(CompositeSink::new(name, vec![tracing_sink, file_sink]))
        };
        Self::new(sink(INFO_LOG), sink(ERROR_LOG))
    }
}

impl Default for RunLogs {
    fn default() -> Self {
        Self::with_log_dir(None)
    }
}

impl fmt::Debug for RunLogs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunLogs")
            .field("info", &self.info.name())
            .field("errors", &self.errors.name())
            .finish()
    }
}

/// Identifier of the general run log.
pub const INFO_LOG: &str = "informations";
/// Identifier of the error detail log.
pub const ERROR_LOG: &str = "errors";

/// Severity used when a whole source file could not be read.
pub fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        IngestionError::Json(err) if err.is_io() => IngestionSeverity::Critical,
        IngestionError::UnsupportedFormat { .. } => IngestionSeverity::Warning,
        IngestionError::ThreadPool(_) => IngestionSeverity::Critical,
        _ => IngestionSeverity::Error,
    }
}

/// A sink that fans out messages to a list of sinks.
pub struct CompositeSink {
    name: String,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl CompositeSink {
    /// Create a new composite sink from a list of sinks.
    pub fn new(name: impl Into<String>, sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self {
            name: name.into(),
            sinks,
        }
    }
}

impl fmt::Debug for CompositeSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeSink")
            .field("name", &self.name)
            .field("sinks_len", &self.sinks.len())
            .finish()
    }
}

impl LogSink for CompositeSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, severity: IngestionSeverity, message: &str) {
        for s in &self.sinks {
            s.log(severity, message);
        }
    }
}

/// Forwards messages to `tracing`, tagged with the log identifier.
#[derive(Debug)]
pub struct TracingSink {
    name: String,
}

impl TracingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl LogSink for TracingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, severity: IngestionSeverity, message: &str) {
        let name = self.name.as_str();
        match severity {
            IngestionSeverity::Info => tracing::info!(log = name, "{message}"),
            IngestionSeverity::Warning => tracing::warn!(log = name, "{message}"),
            IngestionSeverity::Error => tracing::error!(log = name, "{message}"),
            IngestionSeverity::Critical => {
                tracing::error!(log = name, critical = true, "{message}")
            }
        }
    }
}

/// Appends messages to a local log file.
#[derive(Debug)]
pub struct FileSink {
    name: String,
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSink {
    /// Create a file sink that appends messages to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Create a file sink writing `<dir>/<name>.log`. The directory is created if missing.
    pub fn in_dir(dir: impl AsRef<Path>, name: &str) -> Self {
        let dir = dir.as_ref();
        let _ = fs::create_dir_all(dir);
        Self::new(name, dir.join(format!("{name}.log")))
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl LogSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, severity: IngestionSeverity, message: &str) {
        self.append_line(&format!("[{}] - {} : {}", unix_ts(), severity, message));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_appends_leveled_lines() {
        let dir = std::env::temp_dir().join(format!("tabular-loader-sink-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let sink = FileSink::in_dir(&dir, ERROR_LOG);
        sink.warning("duplicate keys");
        sink.error("row failed");

        let text = fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] - WARNING : duplicate keys"));
        assert!(lines[1].ends_with("] - ERROR : row failed"));
        assert!(sink.path().ends_with("errors.log"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn io_failures_are_critical() {
        let io = IngestionError::Io(std::io::Error::other("gone"));
        assert_eq!(severity_for_error(&io), IngestionSeverity::Critical);
        let bad = IngestionError::SchemaMismatch {
            message: "x".to_string(),
        };
        assert_eq!(severity_for_error(&bad), IngestionSeverity::Error);
    }
}
