use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::recorder::{CsvTrialRecorder, JsonLinesRecorder, TrialRecorder};

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Pause after every motor command; input is not processed meanwhile
    pub settle_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordFormat {
    /// One single-row CSV file per trial
    #[default]
    Csv,
    /// One append-only JSON-lines log for the whole session
    JsonLines,
}

impl FromStr for RecordFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(RecordFormat::Csv),
            "jsonl" | "json-lines" | "jsonlines" => Ok(RecordFormat::JsonLines),
            other => Err(format!("unknown record format '{other}' (expected csv or jsonl)")),
        }
    }
}

impl std::fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordFormat::Csv => f.write_str("csv"),
            RecordFormat::JsonLines => f.write_str("jsonl"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecorderConfig {
    pub output_dir: PathBuf,
    pub format: RecordFormat,
    /// File name stem for per-trial files
    pub file_prefix: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: RecordFormat::Csv,
            file_prefix: "output".to_string(),
        }
    }
}

impl RecorderConfig {
    pub fn build(&self) -> Box<dyn TrialRecorder> {
        match self.format {
            RecordFormat::Csv => Box::new(CsvTrialRecorder::new(
                self.output_dir.clone(),
                self.file_prefix.clone(),
            )),
            RecordFormat::JsonLines => Box::new(JsonLinesRecorder::new(
                self.output_dir.join("trials.jsonl"),
            )),
        }
    }
}
