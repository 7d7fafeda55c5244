use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use rodio::Source;

use crate::vibe::{AmbienceChannel, WaveType};

use super::binaural::BinauralPair;
use super::brown_noise::BrownNoise;
use super::filter::{filter_cutoff, ToneFilter};
use super::pan::{drift_position, pan_stereo};
use super::rain::RainSound;
use super::ramp::{RampShape, RampedParam};
use super::white_noise::WhiteNoise;

pub const SAMPLE_RATE: u32 = 44_100;
pub const TONE_GLIDE_SECS: f32 = 2.0;
pub const FILTER_GLIDE_SECS: f32 = 2.0;
pub const AMBIENCE_RAMP_SECS: f32 = 1.0;

/// Commands are drained and pan/filter are refreshed once per block of frames.
const CONTROL_BLOCK: usize = 64;
const INITIAL_TONE_HZ: f32 = 60.0;
const INITIAL_CUTOFF_HZ: f32 = 200.0;
const INITIAL_PAN_DRIFT: f32 = 0.1;

/// Parameter changes for a mounted synth. Every one of them ramps; none of
/// them rebuilds a generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SynthCommand {
    Tones {
        left_hz: f32,
        right_hz: f32,
        wave: WaveType,
    },
    FilterCutoff(f32),
    /// Restarts the pan clock at the new drift speed.
    PanDrift(f32),
    Ambience {
        channel: AmbienceChannel,
        level: f32,
    },
    Master {
        level: f32,
        ramp_secs: f32,
    },
}

impl SynthCommand {
    /// Tone and filter settings for a base frequency and waveform.
    pub fn retune(left_hz: f32, right_hz: f32, wave: WaveType) -> [SynthCommand; 2] {
        [
            SynthCommand::Tones {
                left_hz,
                right_hz,
                wave,
            },
            SynthCommand::FilterCutoff(filter_cutoff(wave)),
        ]
    }
}

struct NoiseBed {
    source: Box<dyn Iterator<Item = f32> + Send>,
    gain: RampedParam,
}

impl NoiseBed {
    fn new(source: impl Iterator<Item = f32> + Send + 'static) -> Self {
        Self {
            source: Box::new(source),
            gain: RampedParam::new(0.0),
        }
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        let gain = self.gain.next_value();
        self.source.next().unwrap_or(0.0) * gain
    }
}

/// The whole vibe signal graph as one interleaved stereo rodio source:
///
/// tones (L/R) -> pan -> lowpass -> master
/// rain, cafe, white (each with its own gain) ----^
///
/// The source lives until its command sender is dropped.
pub struct VibeSynth {
    commands: Receiver<SynthCommand>,
    tones: BinauralPair,
    filter: ToneFilter,
    pan_drift: f32,
    pan_frames: u64,
    pan: f32,
    beds: [NoiseBed; 3],
    master: RampedParam,
    frames_until_control: usize,
    pending_right: Option<f32>,
    finished: bool,
}

impl VibeSynth {
    pub fn new(commands: Receiver<SynthCommand>) -> Self {
        Self::with_beds(
            commands,
            [
                NoiseBed::new(RainSound::new(SAMPLE_RATE)),
                NoiseBed::new(BrownNoise::new(SAMPLE_RATE)),
                NoiseBed::new(WhiteNoise::new()),
            ],
        )
    }

    /// Deterministic noise beds, for tests.
    pub fn seeded(commands: Receiver<SynthCommand>, seed: u64) -> Self {
        Self::with_beds(
            commands,
            [
                NoiseBed::new(RainSound::seeded(SAMPLE_RATE, seed)),
                NoiseBed::new(BrownNoise::seeded(SAMPLE_RATE, seed.wrapping_add(1))),
                NoiseBed::new(WhiteNoise::seeded(seed.wrapping_add(2))),
            ],
        )
    }

    fn with_beds(commands: Receiver<SynthCommand>, beds: [NoiseBed; 3]) -> Self {
        Self {
            commands,
            tones: BinauralPair::new(INITIAL_TONE_HZ, SAMPLE_RATE),
            filter: ToneFilter::new(INITIAL_CUTOFF_HZ, SAMPLE_RATE),
            pan_drift: INITIAL_PAN_DRIFT,
            pan_frames: 0,
            pan: 0.0,
            beds,
            master: RampedParam::new(0.0),
            frames_until_control: 0,
            pending_right: None,
            finished: false,
        }
    }

    fn bed_index(channel: AmbienceChannel) -> usize {
        match channel {
            AmbienceChannel::Rain => 0,
            AmbienceChannel::Cafe => 1,
            AmbienceChannel::White => 2,
        }
    }

    pub fn apply(&mut self, command: SynthCommand) {
        match command {
            SynthCommand::Tones {
                left_hz,
                right_hz,
                wave,
            } => self.tones.retune(left_hz, right_hz, wave, TONE_GLIDE_SECS),
            SynthCommand::FilterCutoff(cutoff) => self.filter.glide_to(cutoff, FILTER_GLIDE_SECS),
            SynthCommand::PanDrift(speed) => {
                self.pan_drift = speed;
                self.pan_frames = 0;
            }
            SynthCommand::Ambience { channel, level } => {
                self.beds[Self::bed_index(channel)].gain.ramp_to(
                    level,
                    AMBIENCE_RAMP_SECS,
                    SAMPLE_RATE,
                    RampShape::Linear,
                );
            }
            SynthCommand::Master { level, ramp_secs } => {
                self.master
                    .ramp_to(level, ramp_secs, SAMPLE_RATE, RampShape::Linear);
            }
        }
    }

    fn control_block(&mut self) {
        loop {
            match self.commands.try_recv() {
                Ok(command) => self.apply(command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    break;
                }
            }
        }

        let elapsed = self.pan_frames as f32 / SAMPLE_RATE as f32;
        self.pan = drift_position(elapsed, self.pan_drift);
        self.filter.advance_control(CONTROL_BLOCK);
        self.frames_until_control = CONTROL_BLOCK;
    }

    /// Renders one stereo frame.
    pub fn next_frame(&mut self) -> (f32, f32) {
        if self.frames_until_control == 0 {
            self.control_block();
        }
        self.frames_until_control -= 1;
        self.pan_frames = self.pan_frames.wrapping_add(1);

        let tones = pan_stereo(self.tones.next_frame(), self.pan);
        let (left, right) = self.filter.process(tones);

        let beds: f32 = self.beds.iter_mut().map(NoiseBed::next_sample).sum();

        let master = self.master.next_value();
        ((left + beds) * master, (right + beds) * master)
    }

    pub fn tone_frequencies(&self) -> (f32, f32) {
        self.tones.frequencies()
    }

    pub fn filter_cutoff(&self) -> f32 {
        self.filter.cutoff()
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    pub fn bed_level(&self, channel: AmbienceChannel) -> f32 {
        self.beds[Self::bed_index(channel)].gain.value()
    }

    pub fn master_level(&self) -> f32 {
        self.master.value()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Iterator for VibeSynth {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(right) = self.pending_right.take() {
            return Some(right);
        }
        if self.finished {
            return None;
        }
        let (left, right) = self.next_frame();
        self.pending_right = Some(right);
        Some(left)
    }
}

impl Source for VibeSynth {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        2
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn synth() -> (mpsc::Sender<SynthCommand>, VibeSynth) {
        let (tx, rx) = mpsc::channel();
        (tx, VibeSynth::seeded(rx, 42))
    }

    fn render_secs(synth: &mut VibeSynth, secs: f32) -> Vec<(f32, f32)> {
        let frames = (secs * SAMPLE_RATE as f32) as usize;
        (0..frames).map(|_| synth.next_frame()).collect()
    }

    #[test]
    fn starts_silent() {
        let (_tx, mut synth) = synth();
        let frames = render_secs(&mut synth, 0.1);
        assert!(frames.iter().all(|&(l, r)| l == 0.0 && r == 0.0));
    }

    #[test]
    fn tones_glide_over_two_seconds() {
        let (tx, mut synth) = synth();
        for command in SynthCommand::retune(90.0, 130.0, WaveType::Sine) {
            tx.send(command).unwrap();
        }
        render_secs(&mut synth, 1.0);
        let (left, right) = synth.tone_frequencies();
        assert!(left > 60.0 && left < 90.0);
        assert!(right > 60.0 && right < 130.0);

        render_secs(&mut synth, 1.01);
        let (left, right) = synth.tone_frequencies();
        assert!((left - 90.0).abs() < 0.01);
        assert!((right - 130.0).abs() < 0.01);
        assert!((synth.filter_cutoff() - 600.0).abs() < 0.1);
    }

    #[test]
    fn ambience_ramps_linearly_in_one_second() {
        let (tx, mut synth) = synth();
        tx.send(SynthCommand::Ambience {
            channel: AmbienceChannel::Rain,
            level: 0.4,
        })
        .unwrap();
        render_secs(&mut synth, 0.5);
        // the command lands at the first control block
        assert!((synth.bed_level(AmbienceChannel::Rain) - 0.2).abs() < 0.01);
        render_secs(&mut synth, 0.51);
        assert!((synth.bed_level(AmbienceChannel::Rain) - 0.4).abs() < 1e-4);
        assert_eq!(synth.bed_level(AmbienceChannel::Cafe), 0.0);
    }

    #[test]
    fn unmuted_output_is_audible_and_bounded() {
        let (tx, mut synth) = synth();
        tx.send(SynthCommand::Master {
            level: 0.05,
            ramp_secs: 0.0,
        })
        .unwrap();
        tx.send(SynthCommand::Ambience {
            channel: AmbienceChannel::White,
            level: 1.0,
        })
        .unwrap();
        let frames = render_secs(&mut synth, 1.5);
        assert!(frames.iter().any(|&(l, _)| l.abs() > 1e-3));
        assert!(frames.iter().all(|&(l, r)| l.abs() <= 1.0 && r.abs() <= 1.0));
    }

    #[test]
    fn pan_restarts_on_drift_change() {
        let (tx, mut synth) = synth();
        tx.send(SynthCommand::PanDrift(1.0)).unwrap();
        render_secs(&mut synth, 1.0);
        assert!(synth.pan() > 0.5);
        tx.send(SynthCommand::PanDrift(1.0)).unwrap();
        render_secs(&mut synth, 0.003);
        assert!(synth.pan().abs() < 0.01);
    }

    #[test]
    fn ends_when_the_sender_is_dropped() {
        let (tx, mut synth) = synth();
        drop(tx);
        let samples: Vec<f32> = synth.by_ref().take(10_000).collect();
        assert_eq!(samples.len(), 2);
        assert!(synth.is_finished());
    }
}
