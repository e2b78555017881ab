pub mod config;
pub mod dispatch;
pub mod error;
pub mod recorder;
pub mod state;

pub use config::{ControllerConfig, RecorderConfig, RecordFormat};
pub use dispatch::CommandDispatcher;
pub use error::PersistenceError;
pub use recorder::{CsvTrialRecorder, JsonLinesRecorder, TrialRecorder};
pub use state::{InputOutcome, TrialController};
