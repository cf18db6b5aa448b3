use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

use crate::timer::ToneKind;

const SAMPLE_RATE: u32 = 44100;

#[derive(Debug, Clone, Copy)]
enum Waveform {
    Sine,
    Square,
    Triangle,
}

/// Short synthesized cue, one per `ToneKind`.
pub struct Chime {
    kind: ToneKind,
    waveform: Waveform,
    duration_secs: f32,
    num_sample: usize,
    phase: f32,
}

impl Chime {
    pub fn new(kind: ToneKind) -> Self {
        let (waveform, duration_secs) = match kind {
            ToneKind::SingleWarning => (Waveform::Sine, 0.5),
            ToneKind::DoubleWarning => (Waveform::Square, 0.4),
            ToneKind::PhaseBoundary => (Waveform::Triangle, 0.6),
            ToneKind::Completion => (Waveform::Triangle, 0.8),
        };
        Self {
            kind,
            waveform,
            duration_secs,
            num_sample: 0,
            phase: 0.0,
        }
    }

    fn frequency(&self, t: f32) -> f32 {
        match self.kind {
            // 440 -> 880 Hz exponential sweep over the first 100ms
            ToneKind::SingleWarning => 440.0 * 2f32.powf((t / 0.1).min(1.0)),
            ToneKind::DoubleWarning => 800.0,
            ToneKind::PhaseBoundary => {
                if t < 0.2 {
                    600.0
                } else {
                    800.0
                }
            }
            // C5 -> C6 linear sweep
            ToneKind::Completion => 523.25 + 523.25 * (t / 0.1).min(1.0),
        }
    }

    fn gain(&self, t: f32) -> f32 {
        match self.kind {
            ToneKind::SingleWarning => exponential_decay(t, self.duration_secs),
            ToneKind::DoubleWarning => {
                if t < 0.1 || (0.2..0.3).contains(&t) {
                    0.1
                } else {
                    0.0
                }
            }
            ToneKind::PhaseBoundary => 0.1 * (1.0 - t / self.duration_secs).max(0.0),
            ToneKind::Completion => exponential_decay(t, self.duration_secs),
        }
    }

    fn total_samples(&self) -> usize {
        (self.duration_secs * SAMPLE_RATE as f32) as usize
    }
}

/// 0.1 -> 0.001 over `length` seconds.
fn exponential_decay(t: f32, length: f32) -> f32 {
    0.1 * 0.01f32.powf((t / length).min(1.0))
}

fn oscillate(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => phase.sin(),
        Waveform::Square => {
            if phase.sin() >= 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => {
            let x = phase / (2.0 * PI);
            4.0 * (x - (x + 0.5).floor()).abs() - 1.0
        }
    }
}

impl Iterator for Chime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples() {
            return None;
        }

        let t = self.num_sample as f32 / SAMPLE_RATE as f32;
        self.num_sample += 1;

        // Accumulate phase so frequency sweeps stay continuous
        self.phase = (self.phase + 2.0 * PI * self.frequency(t) / SAMPLE_RATE as f32) % (2.0 * PI);

        Some(oscillate(self.waveform, self.phase) * self.gain(t))
    }
}

impl Source for Chime {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples().saturating_sub(self.num_sample))
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(self.duration_secs))
    }
}
