pub mod binaural;
pub mod brown_noise;
pub mod filter;
pub mod graph;
pub mod key_click;
pub mod pan;
pub mod rain;
pub mod ramp;
pub mod reactor;
pub mod white_noise;

pub use graph::{SynthCommand, VibeSynth};
pub use reactor::{spawn_audio_reactor, AudioInputs, AudioReactor};

use key_click::KeyClick;

use rodio::{OutputStream, OutputStreamHandle};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

use crate::vibe::AmbienceChannel;

// Set to true to trace every command on the audio thread
const ENABLE_LOGS: bool = false;

use crate::{log_debug, log_error, log_info, log_warn};

/// Master level when unmuted.
pub const LISTENING_LEVEL: f32 = 0.05;
pub const UNMUTE_RAMP_SECS: f32 = 2.0;
pub const MUTE_RAMP_SECS: f32 = 0.5;

enum AudioCommand {
    Mount,
    Unmount,
    Synth(SynthCommand),
    KeyClick(String),
}

/// Last value sent for every synth parameter, replayed into a freshly
/// mounted graph so a remount resumes where the old one stopped.
#[derive(Default)]
struct SynthSnapshot {
    tones: Option<SynthCommand>,
    cutoff: Option<SynthCommand>,
    pan: Option<SynthCommand>,
    ambience: [Option<SynthCommand>; 3],
    master: Option<SynthCommand>,
}

impl SynthSnapshot {
    fn record(&mut self, command: SynthCommand) {
        let slot = match command {
            SynthCommand::Tones { .. } => &mut self.tones,
            SynthCommand::FilterCutoff(_) => &mut self.cutoff,
            SynthCommand::PanDrift(_) => &mut self.pan,
            SynthCommand::Ambience { channel, .. } => {
                let index = AmbienceChannel::ALL
                    .iter()
                    .position(|c| *c == channel)
                    .unwrap_or(0);
                &mut self.ambience[index]
            }
            SynthCommand::Master { .. } => &mut self.master,
        };
        *slot = Some(command);
    }

    fn replay(&self) -> impl Iterator<Item = SynthCommand> + '_ {
        [self.tones, self.cutoff, self.pan]
            .into_iter()
            .chain(self.ambience)
            .chain([self.master])
            .flatten()
    }
}

/// Owns the output device on a dedicated thread (rodio streams are not
/// `Send`) and forwards parameter changes to the mounted [`VibeSynth`].
pub struct AudioEngineHandle {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
    is_muted: Arc<AtomicBool>,
    output_enabled: bool,
}

impl AudioEngineHandle {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            is_muted: Arc::new(AtomicBool::new(true)),
            output_enabled: true,
        }
    }

    /// A handle that tracks mute state but never opens an output device.
    pub fn without_output() -> Self {
        Self {
            output_enabled: false,
            ..Self::new()
        }
    }

    fn ensure_thread(&self) -> Result<Option<Sender<AudioCommand>>, String> {
        if !self.output_enabled {
            return Ok(None);
        }

        let mut guard = self.tx.lock().map_err(|e| e.to_string())?;
        if let Some(tx) = guard.as_ref() {
            return Ok(Some(tx.clone()));
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        // Spawn dedicated audio thread holding non-Send audio objects
        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut stream: Option<(OutputStream, OutputStreamHandle)> = None;
                let mut synth: Option<Sender<SynthCommand>> = None;
                let mut snapshot = SynthSnapshot::default();

                fn open_stream(
                    stream: &mut Option<(OutputStream, OutputStreamHandle)>,
                ) -> Result<&OutputStreamHandle, String> {
                    if stream.is_none() {
                        let opened = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                        *stream = Some(opened);
                    }
                    stream
                        .as_ref()
                        .map(|(_, handle)| handle)
                        .ok_or_else(|| "audio output stream unavailable".to_string())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Mount => {
                            if synth.is_some() {
                                continue;
                            }
                            let handle = match open_stream(&mut stream) {
                                Ok(handle) => handle,
                                Err(err) => {
                                    log_error!("{}", err);
                                    continue;
                                }
                            };
                            let (synth_tx, synth_rx) = mpsc::channel();
                            for command in snapshot.replay() {
                                if let Err(err) = synth_tx.send(command) {
                                    log_warn!("Failed to replay synth command: {}", err);
                                }
                            }
                            match handle.play_raw(VibeSynth::new(synth_rx)) {
                                Ok(()) => {
                                    synth = Some(synth_tx);
                                    log_info!("vibe synth mounted");
                                }
                                Err(err) => log_error!("Failed to start vibe synth: {}", err),
                            }
                        }
                        AudioCommand::Unmount => {
                            // Dropping the sender ends the synth source
                            synth = None;
                            stream = None;
                            log_info!("vibe synth unmounted");
                        }
                        AudioCommand::Synth(command) => {
                            log_debug!("synth command {:?}", command);
                            snapshot.record(command);
                            if let Some(tx) = synth.as_ref() {
                                if tx.send(command).is_err() {
                                    synth = None;
                                }
                            }
                        }
                        AudioCommand::KeyClick(key) => {
                            if let Some((_, handle)) = stream.as_ref() {
                                if let Err(err) = handle.play_raw(KeyClick::for_key(&key)) {
                                    log_error!("Failed to play key click: {}", err);
                                }
                            }
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        *guard = Some(tx.clone());
        Ok(Some(tx))
    }

    fn send(&self, command: AudioCommand) -> Result<(), String> {
        match self.ensure_thread()? {
            Some(tx) => tx.send(command).map_err(|e| e.to_string()),
            None => Ok(()),
        }
    }

    /// Builds the graph and starts every generator. Starts muted.
    pub fn mount(&self) -> Result<(), String> {
        self.send(AudioCommand::Mount)
    }

    /// Stops every generator and releases the output device.
    pub fn unmount(&self) -> Result<(), String> {
        if let Ok(Some(tx)) = self.tx.lock().map(|g| g.clone()) {
            tx.send(AudioCommand::Unmount)
                .map_err(|e| format!("audio engine thread is gone: {}", e))?;
        }
        Ok(())
    }

    /// Unmounts and lets the audio thread exit.
    pub fn shutdown(&self) {
        if let Err(err) = self.unmount() {
            log::warn!("Failed to unmount audio engine: {}", err);
        }
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }
    }

    pub fn apply(&self, command: SynthCommand) -> Result<(), String> {
        self.send(AudioCommand::Synth(command))
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted.load(Ordering::SeqCst)
    }

    /// Fades the master in (2 s) or out (0.5 s) and returns the new muted state.
    pub fn toggle_mute(&self) -> Result<bool, String> {
        let muted = !self.is_muted.fetch_xor(true, Ordering::SeqCst);
        self.apply(master_ramp(muted))?;
        Ok(muted)
    }

    pub fn key_click(&self, key: &str) -> Result<(), String> {
        self.send(AudioCommand::KeyClick(key.to_string()))
    }
}

impl Default for AudioEngineHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Master fade for a mute state.
pub fn master_ramp(muted: bool) -> SynthCommand {
    if muted {
        SynthCommand::Master {
            level: 0.0,
            ramp_secs: MUTE_RAMP_SECS,
        }
    } else {
        SynthCommand::Master {
            level: LISTENING_LEVEL,
            ramp_secs: UNMUTE_RAMP_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vibe::WaveType;

    #[test]
    fn starts_muted_and_toggles() {
        let audio = AudioEngineHandle::without_output();
        assert!(audio.is_muted());
        assert_eq!(audio.toggle_mute(), Ok(false));
        assert!(!audio.is_muted());
        assert_eq!(audio.toggle_mute(), Ok(true));
        assert!(audio.is_muted());
    }

    #[test]
    fn unmount_reports_a_dead_engine_thread() {
        let audio = AudioEngineHandle::new();
        assert_eq!(audio.unmount(), Ok(()));

        let (tx, rx) = mpsc::channel();
        drop(rx);
        *audio.tx.lock().unwrap() = Some(tx);
        assert!(audio.unmount().is_err());

        audio.shutdown();
        assert!(audio.tx.lock().unwrap().is_none());
    }

    #[test]
    fn fade_out_is_faster_than_fade_in() {
        assert_eq!(
            master_ramp(false),
            SynthCommand::Master {
                level: 0.05,
                ramp_secs: 2.0
            }
        );
        assert_eq!(
            master_ramp(true),
            SynthCommand::Master {
                level: 0.0,
                ramp_secs: 0.5
            }
        );
    }

    #[test]
    fn snapshot_replays_latest_value_per_parameter() {
        let mut snapshot = SynthSnapshot::default();
        snapshot.record(SynthCommand::FilterCutoff(200.0));
        snapshot.record(SynthCommand::FilterCutoff(600.0));
        snapshot.record(SynthCommand::Ambience {
            channel: AmbienceChannel::Cafe,
            level: 0.3,
        });
        snapshot.record(SynthCommand::Tones {
            left_hz: 90.0,
            right_hz: 130.0,
            wave: WaveType::Sine,
        });

        let replayed: Vec<SynthCommand> = snapshot.replay().collect();
        assert_eq!(
            replayed,
            vec![
                SynthCommand::Tones {
                    left_hz: 90.0,
                    right_hz: 130.0,
                    wave: WaveType::Sine,
                },
                SynthCommand::FilterCutoff(600.0),
                SynthCommand::Ambience {
                    channel: AmbienceChannel::Cafe,
                    level: 0.3,
                },
            ]
        );
    }
}
