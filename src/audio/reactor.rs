use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    store::{SharedStore, StoreState},
    vibe::{Ambience, AmbienceChannel, BinauralMode, WaveType},
};

use super::{binaural::tone_targets, AudioEngineHandle, SynthCommand};

/// The store fields the synth depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputs {
    pub vibe_name: String,
    pub frequency: f32,
    pub wave: WaveType,
    pub binaural_mode: BinauralMode,
    pub binaural_enabled: bool,
    pub pan_drift_speed: f32,
    pub ambience: Ambience,
}

impl AudioInputs {
    pub fn from_state(state: &StoreState) -> Self {
        let sound = &state.current_vibe.sound_params;
        Self {
            vibe_name: state.current_vibe.name.clone(),
            frequency: sound.frequency,
            wave: sound.wave_type,
            binaural_mode: sound.binaural_mode,
            binaural_enabled: state.is_binaural_enabled,
            pan_drift_speed: sound.pan_drift_speed,
            ambience: state.ambience,
        }
    }

    fn tones_differ(&self, other: &Self) -> bool {
        self.frequency != other.frequency
            || self.wave != other.wave
            || self.binaural_mode != other.binaural_mode
            || self.binaural_enabled != other.binaural_enabled
    }

    fn pan_differs(&self, other: &Self) -> bool {
        self.vibe_name != other.vibe_name || self.pan_drift_speed != other.pan_drift_speed
    }
}

/// Turns store snapshots into synth commands, emitting only what changed
/// since the last snapshot it saw.
#[derive(Debug, Default)]
pub struct AudioReactor {
    last: Option<AudioInputs>,
}

impl AudioReactor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn react(&mut self, inputs: AudioInputs) -> Vec<SynthCommand> {
        let mut commands = Vec::new();
        let last = self.last.as_ref();

        if last.map_or(true, |last| inputs.tones_differ(last)) {
            let (left_hz, right_hz) =
                tone_targets(inputs.frequency, inputs.binaural_mode, inputs.binaural_enabled);
            commands.extend(SynthCommand::retune(left_hz, right_hz, inputs.wave));
        }

        if last.map_or(true, |last| inputs.pan_differs(last)) {
            commands.push(SynthCommand::PanDrift(inputs.pan_drift_speed));
        }

        for channel in AmbienceChannel::ALL {
            let level = inputs.ambience.level(channel);
            if last.map_or(true, |last| last.ambience.level(channel) != level) {
                commands.push(SynthCommand::Ambience { channel, level });
            }
        }

        self.last = Some(inputs);
        commands
    }
}

/// Pushes synth commands whenever the watched store fields change. Runs until
/// cancelled or the store goes away.
pub fn spawn_audio_reactor(
    store: SharedStore,
    audio: Arc<AudioEngineHandle>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let mut revisions = store.subscribe();

    tokio::spawn(async move {
        let mut reactor = AudioReactor::new();

        loop {
            let inputs = store.read(|store| AudioInputs::from_state(store.state()));
            for command in reactor.react(inputs) {
                if let Err(err) = audio.apply(command) {
                    log::warn!("audio command dropped: {}", err);
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = revisions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock,
        store::{MemoryBackend, VibeStore},
        vibe::{AmbiencePatch, PresetId},
    };

    fn store() -> VibeStore {
        VibeStore::new(
            Arc::new(FixedClock::at_utc(2024, 3, 10, 9, 0)),
            Arc::new(MemoryBackend::default()),
        )
    }

    #[test]
    fn first_snapshot_sets_everything() {
        let store = store();
        let mut reactor = AudioReactor::new();
        let commands = reactor.react(AudioInputs::from_state(store.state()));
        assert_eq!(
            commands,
            vec![
                SynthCommand::Tones {
                    left_hz: 60.0,
                    right_hz: 60.0,
                    wave: WaveType::Sine,
                },
                SynthCommand::FilterCutoff(600.0),
                SynthCommand::PanDrift(0.1),
                SynthCommand::Ambience {
                    channel: AmbienceChannel::Rain,
                    level: 0.0,
                },
                SynthCommand::Ambience {
                    channel: AmbienceChannel::Cafe,
                    level: 0.0,
                },
                SynthCommand::Ambience {
                    channel: AmbienceChannel::White,
                    level: 0.0,
                },
            ]
        );
    }

    #[test]
    fn unrelated_changes_emit_nothing() {
        let mut store = store();
        let mut reactor = AudioReactor::new();
        reactor.react(AudioInputs::from_state(store.state()));

        store.toggle_immersive();
        store.toggle_key_sounds();
        store.start_timer(5);
        assert!(reactor.react(AudioInputs::from_state(store.state())).is_empty());
    }

    #[test]
    fn ambience_change_touches_only_its_channel() {
        let mut store = store();
        let mut reactor = AudioReactor::new();
        reactor.react(AudioInputs::from_state(store.state()));

        store.set_ambience(AmbiencePatch::channel(AmbienceChannel::Cafe, 0.3));
        assert_eq!(
            reactor.react(AudioInputs::from_state(store.state())),
            vec![SynthCommand::Ambience {
                channel: AmbienceChannel::Cafe,
                level: 0.3,
            }]
        );
    }

    #[test]
    fn binaural_toggle_retunes_without_moving_the_pan() {
        let mut store = store();
        store.apply_preset(PresetId::DeepWork);
        let mut reactor = AudioReactor::new();
        reactor.react(AudioInputs::from_state(store.state()));

        store.toggle_binaural();
        let commands = reactor.react(AudioInputs::from_state(store.state()));
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], SynthCommand::Tones { left_hz, right_hz, .. } if left_hz == right_hz));
        assert!(matches!(commands[1], SynthCommand::FilterCutoff(_)));
    }

    #[tokio::test]
    async fn reactor_task_follows_the_store() {
        let shared = SharedStore::new(store());
        let audio = Arc::new(AudioEngineHandle::without_output());
        let cancel = CancellationToken::new();
        let handle = spawn_audio_reactor(shared.clone(), audio, cancel.clone());

        shared.update(|store| store.apply_preset(PresetId::Learning));
        tokio::task::yield_now().await;
        cancel.cancel();
        handle.await.unwrap();
    }
}
