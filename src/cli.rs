use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;
use stepjudge_experiment::{ControllerConfig, RecordFormat, RecorderConfig};
use stepjudge_link::LinkSettings;

use crate::app::WindowOptions;

#[derive(Parser, Debug)]
#[command(name = "stepjudge")]
#[command(about = "Stepper-motor direction judgments with confidence ratings")]
pub struct Args {
    /// Serial port of the motor controller
    #[arg(short, long, default_value_t = LinkSettings::default_port().to_string())]
    pub port: String,

    /// Serial baud rate
    #[arg(short, long, default_value_t = LinkSettings::DEFAULT_BAUD)]
    pub baud: u32,

    /// Serial open/write timeout in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub timeout_ms: u64,

    /// Wait after opening the port for the board to reset, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub reset_delay_ms: u64,

    /// Pause after each motor command, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub settle_ms: u64,

    /// Directory trial files are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// csv: one file per trial; jsonl: one append-only log
    #[arg(short, long, default_value_t = RecordFormat::Csv)]
    pub format: RecordFormat,

    /// TrueType font for screen text (defaults to a system font)
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Open a 1600×1200 window instead of going fullscreen
    #[arg(short, long)]
    pub windowed: bool,

    /// Log every command and ignored key
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            port: self.port.clone(),
            baud_rate: self.baud,
            timeout: Duration::from_millis(self.timeout_ms),
            reset_delay: Duration::from_millis(self.reset_delay_ms),
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            settle_delay: Duration::from_millis(self.settle_ms),
        }
    }

    pub fn recorder_config(&self) -> RecorderConfig {
        RecorderConfig {
            output_dir: self.output_dir.clone(),
            format: self.format,
            ..RecorderConfig::default()
        }
    }

    pub fn window_options(&self) -> WindowOptions {
        WindowOptions {
            windowed: self.windowed,
            font: self.font.clone(),
        }
    }
}
