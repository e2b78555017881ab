//! Stepper direction-judgment experiment.
//!
//! Drives the motor over serial, records which way the participant thinks
//! it moved and how sure they are, and stores every trial on disk.

mod app;
mod cli;
mod keymap;
mod renderer;

use anyhow::Result;
use clap::Parser;
use log::info;
use stepjudge_experiment::TrialController;
use stepjudge_link::open_or_offline;
use stepjudge_timing::HighPrecisionTimer;

use app::App;
use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG, when set, overrides --verbose
    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    let link_settings = args.link_settings();
    let controller_config = args.controller_config();
    let recorder_config = args.recorder_config();

    info!(
        "Saving trials as {} under {}",
        recorder_config.format,
        recorder_config.output_dir.display()
    );

    let controller = TrialController::new(
        controller_config,
        open_or_offline(&link_settings),
        HighPrecisionTimer::new(),
        recorder_config.build(),
    );

    App::new(controller, args.window_options()).run()
}
