pub mod animation;
pub mod audio;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod console;
pub mod models;
pub mod settings;
pub mod store;
pub mod timer;
pub mod utils;
pub mod vibe;
pub mod vibe_commands;

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use animation::FrameLoopController;
use audio::{spawn_audio_reactor, AudioEngineHandle};
use classifier::MoodClassifier;
use clock::{Clock, SystemClock};
use config::AppConfig;
use settings::SettingsStore;
use store::{JsonFileBackend, MetricsBackend, SharedStore, VibeStore};
use timer::TimerController;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Everything a running session shares between commands and background loops.
pub struct AppState {
    pub store: SharedStore,
    pub audio: Arc<AudioEngineHandle>,
    pub timer: TimerController,
    pub settings: SettingsStore,
    pub config: AppConfig,
    pub classifier: Option<Arc<dyn MoodClassifier>>,
}

impl AppState {
    /// Loads saved settings and metrics into a fresh store.
    pub fn new(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        backend: Arc<dyn MetricsBackend>,
        audio: AudioEngineHandle,
    ) -> anyhow::Result<Self> {
        let settings = SettingsStore::new(config.settings_path())?;
        let saved = settings.snapshot();

        let mut vibe_store = VibeStore::new(clock, backend);
        vibe_store.restore_preferences(saved.theme_mode, saved.feature_flags, saved.tool_hints);
        vibe_store.load_metrics();

        let store = SharedStore::new(vibe_store);
        let timer = TimerController::new(store.clone(), TICK_INTERVAL, config.debug);

        Ok(Self {
            store,
            audio: Arc::new(audio),
            timer,
            settings,
            config,
            classifier: None,
        })
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn MoodClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }
}

/// Fades the synth in or out; returns the new muted state.
pub fn toggle_mute(state: &AppState) -> Result<bool, String> {
    let muted = state.audio.toggle_mute()?;
    log::info!("audio {}", if muted { "muted" } else { "unmuted" });
    Ok(muted)
}

pub fn run() {
    let config = AppConfig::from_env();

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(if config.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    log::info!("vibeflow starting up...");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("Failed to start async runtime: {}", err);
            return;
        }
    };

    if let Err(err) = runtime.block_on(serve(config)) {
        log::error!("vibeflow stopped: {:#}", err);
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;

    let backend = Arc::new(JsonFileBackend::new(config.metrics_path()));
    let audio = if config.audio_enabled {
        AudioEngineHandle::new()
    } else {
        log::info!("audio output disabled");
        AudioEngineHandle::without_output()
    };
    let state = AppState::new(config, Arc::new(SystemClock), backend, audio)?;

    if let Err(err) = state.audio.mount() {
        log::error!("Failed to mount audio engine: {}", err);
    }

    let cancel_token = CancellationToken::new();
    let reactor = spawn_audio_reactor(
        state.store.clone(),
        state.audio.clone(),
        cancel_token.clone(),
    );
    let mut frames = FrameLoopController::new();
    frames.start(state.store.clone(), state.config.fps)?;

    let console_result = console::run_console(&state, &frames).await;

    log::info!("vibeflow shutting down...");
    state.timer.shutdown().await;
    frames.stop().await?;
    cancel_token.cancel();
    reactor.await.context("audio reactor failed to join")?;
    state.audio.shutdown();

    console_result
}
