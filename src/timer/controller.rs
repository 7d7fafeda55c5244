use std::{sync::Arc, time::Duration};

use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::{store::SharedStore, vibe::PresetId};

use super::TimerState;

// Set to true to log every tick
const ENABLE_LOGS: bool = false;

use crate::log_debug;

/// Drives the store's countdown once per `tick_interval` while a timer is
/// active. The tick that expires a session books it under the same lock, so
/// a start or stop racing in right after can never swallow the completion.
#[derive(Clone)]
pub struct TimerController {
    store: SharedStore,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    verbose: bool,
}

impl TimerController {
    pub fn new(store: SharedStore, tick_interval: Duration, verbose: bool) -> Self {
        Self {
            store,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval,
            verbose,
        }
    }

    pub fn get_state(&self) -> TimerState {
        self.store.read(|store| store.timer())
    }

    /// Replaces any running timer.
    pub async fn start_timer(&self, minutes: u32) -> TimerState {
        let state = self.store.update(|store| {
            store.start_timer(minutes);
            store.timer()
        });
        self.sync_ticker(state).await;
        state
    }

    /// Applies a preset; session presets restart the countdown, the calm
    /// protocol leaves the running one untouched.
    pub async fn apply_preset(&self, preset: PresetId) -> TimerState {
        let state = self.store.update(|store| {
            store.apply_preset(preset);
            store.timer()
        });
        if preset.session().is_some() {
            self.sync_ticker(state).await;
        }
        state
    }

    pub async fn stop_timer(&self) {
        self.store.update(|store| store.stop_timer());
        self.cancel_ticker().await;
    }

    /// Stops driving the countdown without touching the stored timer.
    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
    }

    async fn sync_ticker(&self, state: TimerState) {
        if state.active() {
            self.spawn_ticker().await;
        } else {
            self.cancel_ticker().await;
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let store = self.store.clone();
        let tick_interval = self.tick_interval;
        let verbose = self.verbose;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + tick_interval, tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

            loop {
                interval.tick().await;

                let (expired, state) = store.update(|store| {
                    let expired = store.tick();
                    if expired {
                        store.mark_session_complete();
                    }
                    (expired, store.timer())
                });

                if verbose {
                    log::info!("tick {} left", state.display());
                } else {
                    log_debug!("tick {} left", state.display());
                }

                if expired || !state.active() {
                    break;
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    /// True while a ticker task is alive.
    pub async fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
