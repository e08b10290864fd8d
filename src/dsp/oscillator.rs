use std::{f32::consts::TAU, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SynthError;

/// Waveform of a plain oscillator.
///
/// Names follow the strings the keyboard UI sends (`"sine"`, `"square"`,
/// `"sawtooth"`, `"triangle"`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OscillatorWaveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl OscillatorWaveform {
    pub const ALL: [OscillatorWaveform; 4] = [
        OscillatorWaveform::Sine,
        OscillatorWaveform::Square,
        OscillatorWaveform::Sawtooth,
        OscillatorWaveform::Triangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OscillatorWaveform::Sine => "sine",
            OscillatorWaveform::Square => "square",
            OscillatorWaveform::Sawtooth => "sawtooth",
            OscillatorWaveform::Triangle => "triangle",
        }
    }

    /// Evaluate the waveform at a normalized phase in `[0, 1)`.
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            OscillatorWaveform::Sine => (TAU * phase).sin(),
            OscillatorWaveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            OscillatorWaveform::Sawtooth => 2.0 * phase - 1.0,
            // Starts at zero and rises, like the sine
            OscillatorWaveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
        }
    }
}

impl FromStr for OscillatorWaveform {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(OscillatorWaveform::Sine),
            "square" => Ok(OscillatorWaveform::Square),
            "sawtooth" | "saw" => Ok(OscillatorWaveform::Sawtooth),
            "triangle" => Ok(OscillatorWaveform::Triangle),
            _ => Err(SynthError::UnknownWaveform(s.to_string())),
        }
    }
}

/// Phase-accumulating oscillator.
///
/// Naive (non band-limited) shapes: the keyboard range tops out below 1 kHz,
/// so aliasing of the square and saw stays well under the fundamental.
#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Produce one sample at `frequency` and advance the phase.
    ///
    /// Negative frequencies (possible under deep FM) run the phase backwards.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let out = self.waveform.sample(self.phase);
        self.phase = (self.phase + frequency / sample_rate).rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negative inputs
        if self.phase >= 1.0 {
            self.phase = 0.0;
        }
        out
    }

    /// Fill `out` with a constant-frequency waveform.
    pub fn render(&mut self, out: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_matches_reference() {
        let sample_rate = 48_000.0;
        let mut osc = OscillatorBlock::sine();
        let mut buffer = vec![0.0f32; 64];
        osc.render(&mut buffer, 440.0, sample_rate);

        let n = 12;
        let expected = (TAU * 440.0 * n as f32 / sample_rate).sin();
        assert!((buffer[n] - expected).abs() < 1e-4);
    }

    #[test]
    fn shapes_stay_in_range() {
        for waveform in OscillatorWaveform::ALL {
            let mut osc = OscillatorBlock::new(waveform);
            let mut buffer = vec![0.0f32; 2048];
            osc.render(&mut buffer, 261.63, 48_000.0);
            assert!(
                buffer.iter().all(|s| (-1.0..=1.0).contains(s)),
                "{waveform:?} left [-1, 1]"
            );
        }
    }

    #[test]
    fn triangle_is_continuous() {
        let wf = OscillatorWaveform::Triangle;
        assert!(wf.sample(0.0).abs() < 1e-6);
        assert!((wf.sample(0.25) - 1.0).abs() < 1e-6);
        assert!((wf.sample(0.75) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn negative_frequency_keeps_phase_wrapped() {
        let mut osc = OscillatorBlock::sine();
        for _ in 0..1000 {
            let s = osc.next_sample(-300.0, 48_000.0);
            assert!(s.is_finite());
        }
        assert!((0.0..1.0).contains(&osc.phase));
    }

    #[test]
    fn parses_ui_names() {
        assert_eq!(
            "sawtooth".parse::<OscillatorWaveform>().unwrap(),
            OscillatorWaveform::Sawtooth
        );
        assert_eq!(
            "Square".parse::<OscillatorWaveform>().unwrap(),
            OscillatorWaveform::Square
        );
        assert!("pulse".parse::<OscillatorWaveform>().is_err());
    }
}
