use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::store::SharedStore;

use super::{AnimationFrame, Animator};

// Set to true to log every rendered frame
const ENABLE_LOGS: bool = false;

use crate::log_debug;

/// Runs the animation at a fixed frame cadence and publishes the latest frame
/// on a watch channel. Slow consumers only ever see the newest frame.
pub struct FrameLoopController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    frames_tx: watch::Sender<Option<AnimationFrame>>,
}

impl FrameLoopController {
    pub fn new() -> Self {
        let (frames_tx, _) = watch::channel(None);
        Self {
            handle: None,
            cancel_token: None,
            frames_tx,
        }
    }

    pub fn latest(&self) -> Option<AnimationFrame> {
        self.frames_tx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start(&mut self, store: SharedStore, fps: u32) -> Result<()> {
        if self.handle.is_some() {
            bail!("frame loop already running");
        }

        let cancel_token = CancellationToken::new();
        let frame_interval = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
        let handle = tokio::spawn(frame_loop(
            store,
            frame_interval,
            self.frames_tx.clone(),
            cancel_token.clone(),
        ));

        info!("frame loop started at {} fps", fps.max(1));
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("frame loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Default for FrameLoopController {
    fn default() -> Self {
        Self::new()
    }
}

async fn frame_loop(
    store: SharedStore,
    frame_interval: Duration,
    frames_tx: watch::Sender<Option<AnimationFrame>>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(frame_interval);
    // A late frame is dropped, never replayed in a burst
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut animator = Animator::new();
    let started = Instant::now();
    let mut last_frame = started;

    loop {
        tokio::select! {
            now = ticker.tick() => {
                let delta = now.saturating_duration_since(last_frame).as_secs_f32();
                let elapsed = now.saturating_duration_since(started).as_secs_f32();
                last_frame = now;

                let frame = store.read(|store| animator.step(store.state(), delta, elapsed));
                log_debug!("frame {:.3}s scale {:.3}", elapsed, frame.orb.scale);
                frames_tx.send_replace(Some(frame));
            }
            _ = cancel_token.cancelled() => {
                log::debug!("frame loop shutting down");
                break;
            }
        }
    }
}
