//! Durable storage for completed trials.
//!
//! Every appended record can be recovered on its own: either it is the
//! only row of its own CSV file, or it is one self-contained line of a
//! JSON-lines log.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{debug, warn};
use stepjudge_core::TrialRecord;

use crate::error::PersistenceError;

pub trait TrialRecorder {
    /// Persists one complete record and returns where it went
    fn append(&mut self, record: TrialRecord) -> Result<PathBuf, PersistenceError>;
}

impl<R: TrialRecorder + ?Sized> TrialRecorder for Box<R> {
    fn append(&mut self, record: TrialRecord) -> Result<PathBuf, PersistenceError> {
        (**self).append(record)
    }
}

/// Writes each trial to its own `<prefix>_YYYYmmdd_HHMMSS.csv`
#[derive(Debug, Clone)]
pub struct CsvTrialRecorder {
    dir: PathBuf,
    prefix: String,
}

impl CsvTrialRecorder {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    fn stem(&self, at: DateTime<Local>) -> String {
        format!("{}_{}", self.prefix, at.format("%Y%m%d_%H%M%S"))
    }

    /// Creates a file that did not exist before, adding `_1`, `_2`, ... when
    /// several trials land in the same second
    fn create_unique(&self, stem: &str) -> Result<(PathBuf, File), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|e| PersistenceError::io(&self.dir, e))?;

        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                format!("{stem}.csv")
            } else {
                format!("{stem}_{attempt}.csv")
            };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(PersistenceError::io(path, e)),
            }
        }
    }

    /// Runs `write` against a freshly created file and removes the file again
    /// if the write fails, so a lost trial never leaves a stray CSV behind
    fn write_new<F>(&self, stem: &str, write: F) -> Result<PathBuf, PersistenceError>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        let (path, mut file) = self.create_unique(stem)?;
        if let Err(e) = write(&mut file) {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path) {
                warn!("Could not remove partial {}: {cleanup}", path.display());
            }
            return Err(PersistenceError::io(path, e));
        }
        Ok(path)
    }

    pub fn render(record: &TrialRecord) -> String {
        let header = TrialRecord::COLUMNS.join(",");
        let row = record
            .cells()
            .iter()
            .map(|cell| escape_field(cell))
            .collect::<Vec<_>>()
            .join(",");
        format!("{header}\n{row}\n")
    }
}

impl TrialRecorder for CsvTrialRecorder {
    fn append(&mut self, record: TrialRecord) -> Result<PathBuf, PersistenceError> {
        if !record.is_complete() {
            return Err(PersistenceError::Incomplete);
        }

        let body = Self::render(&record);
        let path = self.write_new(&self.stem(Local::now()), |file| {
            file.write_all(body.as_bytes())?;
            file.sync_all()
        })?;

        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

/// Quotes a field containing a comma, quote or newline
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Appends each trial as one JSON object per line to a single log file
#[derive(Debug, Clone)]
pub struct JsonLinesRecorder {
    path: PathBuf,
}

impl JsonLinesRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `write` at the end of the log; on failure the log is cut back to
    /// its previous length so no torn line is left for the next trial
    fn append_with<F>(&self, write: F) -> Result<(), PersistenceError>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
        }

        // Reopened per trial so a crash never leaves a buffered record behind
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PersistenceError::io(&self.path, e))?;
        let committed = file
            .metadata()
            .map_err(|e| PersistenceError::io(&self.path, e))?
            .len();

        if let Err(e) = write(&mut file) {
            if let Err(cleanup) = file.set_len(committed) {
                warn!("Could not truncate {}: {cleanup}", self.path.display());
            }
            return Err(PersistenceError::io(&self.path, e));
        }
        Ok(())
    }
}

impl TrialRecorder for JsonLinesRecorder {
    fn append(&mut self, record: TrialRecord) -> Result<PathBuf, PersistenceError> {
        if !record.is_complete() {
            return Err(PersistenceError::Incomplete);
        }

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        self.append_with(|file| {
            file.write_all(line.as_bytes())?;
            file.sync_data()
        })?;

        Ok(self.path.clone())
    }
}
