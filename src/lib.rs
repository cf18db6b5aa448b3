mod audio;
mod classroom;
mod config;
mod console;
mod models;
mod refusal;
mod registry;
mod settings;
mod snapshot;
mod timer;
mod utils;

pub use audio::{SilentToneGenerator, ToneGenerator};
pub use classroom::{Classroom, Effects};
pub use config::AppConfig;
pub use models::{default_batches, BatchSeed, Group, GroupSeed, GroupStatus};
pub use refusal::Refusal;
pub use registry::{Direction, Selection, SessionRegistry};
pub use settings::{AssessmentSettings, SettingsStore};
pub use snapshot::{AssessmentPrompt, ClassroomSnapshot};
pub use timer::{
    phase, ClassroomEvent, Phase, PhaseTimer, TimerController, TimerSession, ToneKind,
};

use std::sync::Arc;

use anyhow::Context;

pub fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("classtimer starting up...");

    let config = AppConfig::from_env();
    let settings = match &config.settings_path {
        Some(path) => SettingsStore::new(path.clone())?,
        None => SettingsStore::in_memory(),
    };
    let tones = audio::tone_generator(&config);

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(async move {
        let controller =
            TimerController::new(&config, default_batches(), Arc::new(settings), tones);
        console::run_console(controller).await
    })
}
