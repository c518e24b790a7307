use fundsp::prelude::*;
use rodio::{OutputStream, OutputStreamBuilder, Sink, buffer::SamplesBuffer};
use tracing::{debug, warn};

use crate::bird::BirdKind;
use crate::engine::GameEvent;

const SAMPLE_RATE: u32 = 44100;

/// Pulls `secs` worth of mono samples out of a fundsp graph.
macro_rules! synth {
    ($sound:expr, $secs:expr) => {{
        let mut sound = $sound;
        let n = (SAMPLE_RATE as f64 * $secs) as usize;
        (0..n).map(|_| sound.get_mono() as f32).collect::<Vec<f32>>()
    }};
}

// ── Sounds ──────────────────────────────────────────────────────────────────

fn hit_clip() -> Vec<f32> {
    // Rising blip: 660Hz to 1560Hz over 80ms
    let freq = lfo(|t: f64| 660.0 + 900.0 * (t / 0.08).min(1.0));
    let gain = lfo(|t: f64| 0.2 * (1.0 - t / 0.12).max(0.0));
    synth!((freq >> sine::<f64>()) * gain, 0.12)
}

fn decoy_clip() -> Vec<f32> {
    // Low buzz for hitting the wrong bird
    let freq = lfo(|t: f64| 140.0 - 60.0 * (t / 0.2).min(1.0));
    let gain = lfo(|t: f64| 0.12 * (1.0 - t / 0.2).max(0.0));
    synth!((freq >> square()) * gain, 0.2)
}

fn clear_clip() -> Vec<f32> {
    // C5 E5 G5 arpeggio, 120ms per note
    let freq = lfo(|t: f64| {
        let step = (t / 0.12).floor().min(2.0);
        let semitones = step * 4.0 - (step - 1.0).max(0.0);
        523.25 * (semitones / 12.0).exp2()
    });
    let gain = lfo(|t: f64| 0.15 * (1.0 - t / 0.6).max(0.0));
    synth!((freq >> sine::<f64>()) * gain, 0.6)
}

fn fail_clip() -> Vec<f32> {
    // 400Hz down to 80Hz over 0.4s, fading out over 0.5s
    let freq = lfo(|t: f64| 400.0 + (80.0 - 400.0) * (t / 0.4).min(1.0));
    let gain = lfo(|t: f64| 0.15 * (1.0 - t / 0.5).max(0.0));
    synth!((freq >> saw()) * gain, 0.5)
}

/// Pre-rendered effects played through the default output device.
pub struct Audio {
    stream: OutputStream,
    hit: Vec<f32>,
    decoy: Vec<f32>,
    clear: Vec<f32>,
    fail: Vec<f32>,
}

impl Audio {
    /// `None` when muted or when no output device is available.
    pub fn open(mute: bool) -> Option<Self> {
        if mute {
            return None;
        }
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "no audio output, playing silently");
                return None;
            }
        };
        debug!("audio output opened");
        Some(Self {
            stream,
            hit: hit_clip(),
            decoy: decoy_clip(),
            clear: clear_clip(),
            fail: fail_clip(),
        })
    }

    pub fn play_event(&self, event: &GameEvent) {
        let clip = match event {
            GameEvent::Hit {
                kind: BirdKind::Sparrow,
                ..
            } => &self.hit,
            GameEvent::Hit { .. } => &self.decoy,
            GameEvent::StageCleared | GameEvent::FinalVictory => &self.clear,
            GameEvent::StageFailed => &self.fail,
            _ => return,
        };
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(SamplesBuffer::new(1, SAMPLE_RATE, clip.clone()));
        sink.detach(); // Play in background
    }
}
