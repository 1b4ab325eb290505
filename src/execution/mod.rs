//! Load engine: creates the target table and inserts rows one at a time.
//!
//! This module sits "above" [`crate::ingestion`] and [`crate::store`] and provides:
//!
//! - Single-file and directory runs (directory reads happen in parallel, inserts never do)
//! - Row-at-a-time commits with per-row failure attribution
//! - A second pass for rows that failed only because of their text encoding
//! - Progress events + a [`RunReport`] summary

mod observer;
mod report;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::LoadOptions;
use crate::error::{IngestionError, IngestionResult, LoadResult, StoreResult};
use crate::ingestion::{read_directory, read_path, severity_for_error, ReadOutcome, RunLogs};
use crate::store::Store;
use crate::types::{IngestJob, Row, Schema};

pub use observer::{ConsoleProgress, InsertPhase, LoadEvent, LoadObserver};
pub use report::{RunCounters, RunReport};

/// Loads source files into one table of a [`Store`].
pub struct Loader<S: Store> {
    store: S,
    opts: LoadOptions,
    logs: RunLogs,
    observer: Option<Arc<dyn LoadObserver>>,
}

/// Mutable state of one run, threaded through every stage.
struct LoadSession {
    job: IngestJob,
    counters: RunCounters,
    retry_queue: Vec<Row>,
    retry_routed: u64,
    schema_created: bool,
    files_loaded: usize,
    files_failed: usize,
    files_skipped: usize,
    started: Instant,
}

impl LoadSession {
    fn new(job: IngestJob) -> Self {
        Self {
            job,
            counters: RunCounters::default(),
            retry_queue: Vec::new(),
            retry_routed: 0,
            schema_created: false,
            files_loaded: 0,
            files_failed: 0,
            files_skipped: 0,
            started: Instant::now(),
        }
    }

    fn finish(self) -> RunReport {
        RunReport {
            source: self.job.source_path,
            database: self.job.target_database,
            table: self.job.target_table,
            elapsed: self.started.elapsed(),
            total_rows: self.job.total_rows,
            counters: self.counters,
            retry_routed: self.retry_routed,
            files_loaded: self.files_loaded,
            files_failed: self.files_failed,
            files_skipped: self.files_skipped,
        }
    }
}

impl<S: Store> Loader<S> {
    /// Create a loader. Logs go to `tracing`, plus files when `opts.log_dir` is set.
    pub fn new(store: S, opts: LoadOptions) -> Self {
        let logs = RunLogs::with_log_dir(opts.log_dir.as_deref());
        Self {
            store,
            opts,
            logs,
            observer: None,
        }
    }

    /// Replace the run logs.
    pub fn with_logs(mut self, logs: RunLogs) -> Self {
        self.logs = logs;
        self
    }

    /// Attach an observer for progress events.
    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Databases reachable through the store.
    pub fn list_databases(&mut self) -> StoreResult<Vec<String>> {
        self.store.list_databases()
    }

    /// Close the store.
    pub fn close(self) -> StoreResult<()> {
        self.store.close()
    }

    /// Load a file, or every file of a directory, into the configured table.
    ///
    /// In directory mode a file that cannot be read or loaded is logged and skipped. In
    /// single-file mode the error is returned, except for an unsupported extension, which is
    /// logged as a skip. Row-level failures never end the run.
    pub fn run(&mut self, path: impl AsRef<Path>) -> LoadResult<RunReport> {
        let path = path.as_ref();
        let job = IngestJob::new(path, self.opts.database.clone(), self.opts.table_for(path));
        let mut session = LoadSession::new(job);
        self.logs.info.info(&format!(
            "load '{}' into {}.{}",
            path.display(),
            session.job.target_database,
            session.job.target_table
        ));

        if path.is_dir() {
            let results = match read_directory(path, self.opts.num_threads) {
                Ok(results) => results,
                Err(e) => {
                    self.logs.errors.log(
                        severity_for_error(&e),
                        &format!("cannot read directory '{}': {e}", path.display()),
                    );
                    return Err(e.into());
                }
            };
            for (file, result) in results {
                // Already logged and counted; the other files still load.
                let _ = self.load_file(&mut session, &file, result);
            }
        } else {
            self.load_file(&mut session, path, read_path(path))?;
        }

        if !session.retry_queue.is_empty() {
            let queue = std::mem::take(&mut session.retry_queue);
            self.logs.info.info(&format!("retrying {} repaired rows", queue.len()));
            self.insert_all(&mut session, queue, InsertPhase::Retry);
        }

        let report = session.finish();
        let summary = report.summarize();
        self.logs.info.info(&summary);
        self.emit(LoadEvent::RunFinished { summary });
        Ok(report)
    }

    fn load_file(
        &mut self,
        session: &mut LoadSession,
        file: &Path,
        result: IngestionResult<ReadOutcome>,
    ) -> LoadResult<()> {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(IngestionError::UnsupportedFormat { .. }) => {
                session.files_skipped += 1;
                self.logs.errors.warning(&format!(
                    "skip '{}': no reader for this file extension",
                    file.display()
                ));
                return Ok(());
            }
            Err(e) => {
                session.files_failed += 1;
                self.logs.errors.log(
                    severity_for_error(&e),
                    &format!("cannot read '{}': {e}", file.display()),
                );
                return Err(e.into());
            }
        };

        self.report_diagnostics(file, &outcome);

        if let Err(e) = self.ensure_table(session, &outcome.dataset.schema) {
            session.files_failed += 1;
            self.logs.errors.error(&format!(
                "cannot load '{}' into {}.{}: {e}",
                file.display(),
                session.job.target_database,
                session.job.target_table
            ));
            return Err(e);
        }

        let rows = outcome.dataset.rows;
        session.job.total_rows += rows.len();
        self.emit(LoadEvent::FileStarted {
            file: file.to_path_buf(),
            rows: rows.len(),
        });
        self.insert_all(session, rows, InsertPhase::Primary);
        session.files_loaded += 1;
        self.logs.info.info(&format!("finished '{}'", file.display()));
        Ok(())
    }

    fn report_diagnostics(&self, file: &Path, outcome: &ReadOutcome) {
        for invalid in &outcome.invalid_lines {
            self.logs.errors.error(&format!(
                "'{}' line {} is invalid (len={}): {:?}",
                file.display(),
                invalid.line,
                invalid.cells.len(),
                invalid.cells
            ));
        }
        if !outcome.duplicate_keys.is_empty() {
            self.logs.errors.warning(&format!(
                "'{}' duplicate keys dropped: {:?}",
                file.display(),
                outcome.duplicate_keys
            ));
        }
    }

    /// Create the target table on first use; later files must match its columns.
    fn ensure_table(&mut self, session: &mut LoadSession, schema: &Schema) -> LoadResult<()> {
        if session.schema_created {
            if *schema != session.job.field_list {
                return Err(IngestionError::SchemaMismatch {
                    message: format!(
                        "header {:?} differs from table columns {:?}",
                        schema.field_names().collect::<Vec<_>>(),
                        session.job.field_list.field_names().collect::<Vec<_>>()
                    ),
                }
                .into());
            }
            return Ok(());
        }

        self.store.create_table(
            &session.job.target_database,
            &session.job.target_table,
            schema,
            self.opts.text_column_width,
        )?;
        session.job.field_list = schema.clone();
        session.schema_created = true;
        self.logs.info.info(&format!(
            "table {}.{} ready with {} columns",
            session.job.target_database,
            session.job.target_table,
            schema.len()
        ));
        Ok(())
    }

    /// Insert `rows` in order, committing each one before the next starts.
    fn insert_all(&mut self, session: &mut LoadSession, rows: Vec<Row>, phase: InsertPhase) {
        let started = Instant::now();
        let total = rows.len();
        for (idx0, row) in rows.into_iter().enumerate() {
            self.insert_one(session, row, phase);
            self.emit(LoadEvent::RowLoaded {
                done: idx0 + 1,
                total,
                phase,
            });
        }
        self.emit(LoadEvent::PhaseFinished {
            phase,
            elapsed: started.elapsed(),
        });
    }

    fn insert_one(&mut self, session: &mut LoadSession, row: Row, phase: InsertPhase) {
        let job = &session.job;
        let result = self
            .store
            .insert_row(&job.target_database, &job.target_table, &job.field_list, &row)
            .and_then(|()| self.store.commit());

        match result {
            Ok(()) => session.counters.record_committed(phase),
            // Retry is single-attempt: an encoding failure on the retry pass is a plain failure.
            Err(e) if e.is_encoding() && phase == InsertPhase::Primary => {
                self.logs.errors.warning(&format!(
                    "{e} ({}.{})\n{} insert failed, will retry later",
                    job.target_database,
                    job.target_table,
                    display_row(&row)
                ));
                let repaired = self.store.text_encoding().repair_row(&row);
                session.retry_queue.push(repaired);
                session.retry_routed += 1;
            }
            Err(e) => {
                self.logs.errors.error(&format!(
                    "{e} ({}.{})\n{}",
                    job.target_database,
                    job.target_table,
                    display_row(&row)
                ));
                session.counters.record_failed();
            }
        }
    }

    fn emit(&self, event: LoadEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

/// Renders a row as `["a", NULL, "c"]` for error logs.
pub fn display_row(row: &Row) -> String {
    let values: Vec<String> = row
        .iter()
        .map(|v| match v {
            Some(s) => format!("{s:?}"),
            None => "NULL".to_string(),
        })
        .collect();
    format!("[{}]", values.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_row_marks_nulls() {
        let row: Row = vec![Some("a".to_string()), None];
        assert_eq!(display_row(&row), "[\"a\", NULL]");
    }
}
