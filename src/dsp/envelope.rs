use crate::dsp::automation::ParamTimeline;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR Envelope Implementation
============================

This module implements an exponential ADSR envelope anchored to the audio
clock. The envelope is a ParamTimeline (see automation.rs) holding the gain
curve; nothing steps per sample, so the gain at any instant is a pure
function of time.

Vocabulary
----------

  peak        Linear gain reached at the end of the attack (default 0.2).

  sustain     Fraction of peak held after the decay (default 0.5, so the
              held gain is 0.1).

  floor       Smallest gain the envelope ever uses (default 0.001). Silence
              for practical purposes, but non-zero because exponential ramps
              cannot start from or land on zero.


The Shape: Exponential Ramps
----------------------------

  Gain
   PEAK ┐    ╭╮
        │   ╱  ╲_______________
   P·S  │  ╱                   ╲
        │ ╱                     ╲
  FLOOR └╯───────────────────────╲__→ Time
        │ A │  D  │   Sustain   │ R │

Exponential ramps sound even to the ear (equal ratios in equal times) which
linear ramps do not: a linear release seems to hang, then vanish.


Scheduling
----------

attack(t0) schedules everything at once:

    set(FLOOR, t0)
    exp_ramp(PEAK, t0 + A)
    exp_ramp(PEAK·S, t0 + A + D)        held from then on

release(t) is asynchronous with respect to that schedule:

    current = max(gain(t), FLOOR)       read BEFORE cancelling
    cancel(t)                           drop pending attack/decay points
    set(current, t)                     anchor the ramp where we are
    exp_ramp(FLOOR, t + R)

Anchoring at the instantaneous gain is what keeps a release from mid-attack
click-free: the curve continues from wherever it was instead of jumping to
PEAK or to the sustain level.


The State Machine
-----------------

    Idle ──attack──→ Attack ──(t0+A)──→ Decay ──(t0+A+D)──→ Sustain
                        │                  │                   │
                        └──────release─────┴───────────────────┘
                                           ↓
                                        Release ──(t+R)──→ Idle

Stages are derived from the clock. There is no Release → Attack edge: a new
key press always gets a new envelope.
*/

/// Shape of every envelope in the engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    /// Seconds from FLOOR to PEAK
    pub attack: f32,
    /// Seconds from PEAK to PEAK×SUSTAIN
    pub decay: f32,
    /// Held level as a fraction of peak
    pub sustain: f32,
    /// Seconds from the release instant down to FLOOR
    pub release: f32,
    /// Linear gain at the top of the attack
    pub peak: f32,
    /// Resting gain; must be > 0
    pub floor: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.02,
            decay: 0.1,
            sustain: 0.5,
            release: 0.25,
            peak: 0.2,
            floor: 0.001,
        }
    }
}

impl EnvelopeConfig {
    pub fn sustain_level(&self) -> f32 {
        self.peak * self.sustain
    }
}

/// Stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Snapshot of an envelope at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeState {
    pub stage: EnvelopeStage,
    pub start_time: Option<f64>,
    pub peak_level: f32,
    pub sustain_level: f32,
    pub floor_level: f32,
}

#[derive(Debug, Clone)]
pub struct Envelope {
    config: EnvelopeConfig,
    gain: ParamTimeline,
    start_time: Option<f64>,
    // (release instant, time the ramp lands on FLOOR)
    release: Option<(f64, f64)>,
}

impl Envelope {
    pub fn new(config: EnvelopeConfig) -> Self {
        Self {
            config,
            gain: ParamTimeline::new(config.floor),
            start_time: None,
            release: None,
        }
    }

    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }

    /// Schedule the attack and chained decay starting at `start`.
    ///
    /// An envelope is triggered once; later calls are ignored.
    pub fn attack(&mut self, start: f64) {
        if self.start_time.is_some() {
            return;
        }
        let EnvelopeConfig {
            attack,
            decay,
            peak,
            floor,
            ..
        } = self.config;

        self.start_time = Some(start);
        self.gain.set_value_at_time(floor, start);
        self.gain
            .exponential_ramp_to_value_at_time(peak, start + attack as f64);
        self.gain.exponential_ramp_to_value_at_time(
            self.config.sustain_level(),
            start + (attack + decay) as f64,
        );
    }

    /// Begin the release at `now`. Returns the time the gain reaches FLOOR.
    ///
    /// Repeated calls return the first release's end time unchanged.
    pub fn release(&mut self, now: f64) -> f64 {
        if let Some((_, end)) = self.release {
            return end;
        }
        let floor = self.config.floor;
        let current = self.gain.value_at(now).max(floor);
        let end = now + self.config.release as f64;

        self.gain.cancel_scheduled_values(now);
        self.gain.set_value_at_time(current, now);
        self.gain.exponential_ramp_to_value_at_time(floor, end);

        self.release = Some((now, end));
        end
    }

    #[inline]
    pub fn gain_at(&self, time: f64) -> f32 {
        self.gain.value_at(time)
    }

    pub fn stage_at(&self, time: f64) -> EnvelopeStage {
        let Some(start) = self.start_time else {
            return EnvelopeStage::Idle;
        };
        if let Some((released_at, end)) = self.release {
            if time >= end {
                return EnvelopeStage::Idle;
            }
            if time >= released_at {
                return EnvelopeStage::Release;
            }
        }
        let attack_end = start + self.config.attack as f64;
        let decay_end = attack_end + self.config.decay as f64;
        if time < start {
            EnvelopeStage::Idle
        } else if time < attack_end {
            EnvelopeStage::Attack
        } else if time < decay_end {
            EnvelopeStage::Decay
        } else {
            EnvelopeStage::Sustain
        }
    }

    pub fn state_at(&self, time: f64) -> EnvelopeState {
        EnvelopeState {
            stage: self.stage_at(time),
            start_time: self.start_time,
            peak_level: self.config.peak,
            sustain_level: self.config.sustain_level(),
            floor_level: self.config.floor,
        }
    }

    /// Fill `buffer` with gain values, sample `i` at `start + i / sample_rate`.
    pub fn render(&self, buffer: &mut [f32], start: f64, sample_rate: f32) {
        let dt = 1.0 / sample_rate as f64;
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample = self.gain_at(start + i as f64 * dt);
        }
    }

    pub fn release_end(&self) -> Option<f64> {
        self.release.map(|(_, end)| end)
    }

    pub fn is_released(&self) -> bool {
        self.release.is_some()
    }

    /// True once the release ramp has fully landed.
    pub fn is_finished(&self, time: f64) -> bool {
        self.release_end().is_some_and(|end| time >= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn triggered_at(start: f64) -> Envelope {
        let mut env = Envelope::new(EnvelopeConfig::default());
        env.attack(start);
        env
    }

    #[test]
    fn attack_and_decay_hit_their_targets() {
        let env = triggered_at(1.0);

        assert!((env.gain_at(1.0) - 0.001).abs() < EPS);
        assert!((env.gain_at(1.02) - 0.2).abs() < EPS);
        assert!((env.gain_at(1.12) - 0.1).abs() < EPS);
        assert!((env.gain_at(30.0) - 0.1).abs() < EPS);
    }

    #[test]
    fn stages_follow_the_clock() {
        let env = triggered_at(0.0);

        assert_eq!(env.stage_at(0.01), EnvelopeStage::Attack);
        assert_eq!(env.stage_at(0.05), EnvelopeStage::Decay);
        assert_eq!(env.stage_at(0.5), EnvelopeStage::Sustain);
    }

    #[test]
    fn untriggered_envelope_is_idle_at_floor() {
        let env = Envelope::new(EnvelopeConfig::default());
        assert_eq!(env.stage_at(1.0), EnvelopeStage::Idle);
        assert!((env.gain_at(1.0) - 0.001).abs() < EPS);
    }

    #[test]
    fn release_from_sustain_ramps_to_floor() {
        let mut env = triggered_at(0.0);
        let end = env.release(0.5);

        assert!((end - 0.75).abs() < 1e-12);
        assert!((env.gain_at(0.5) - 0.1).abs() < EPS);
        // Geometric midpoint of 0.1 → 0.001
        assert!((env.gain_at(0.625) - 0.01).abs() < EPS);
        assert!((env.gain_at(0.75) - 0.001).abs() < EPS);
        assert_eq!(env.stage_at(0.6), EnvelopeStage::Release);
        assert_eq!(env.stage_at(0.75), EnvelopeStage::Idle);
        assert!(env.is_finished(0.75));
    }

    #[test]
    fn release_mid_attack_starts_from_current_gain() {
        let mut env = triggered_at(0.0);
        let before = env.gain_at(0.005);
        env.release(0.005);

        // Started from the instantaneous gain, far below PEAK
        assert!((env.gain_at(0.005) - before).abs() < EPS);
        assert!(before < 0.2);
        // Stale attack/decay points are gone: gain only falls
        assert!(env.gain_at(0.02) < before);
        assert!(env.gain_at(0.1) < env.gain_at(0.02));
    }

    #[test]
    fn second_release_keeps_first_schedule() {
        let mut env = triggered_at(0.0);
        let first = env.release(0.3);
        let second = env.release(0.4);
        assert_eq!(first, second);
    }

    #[test]
    fn render_samples_the_curve() {
        let env = triggered_at(0.0);
        let mut buffer = vec![0.0f32; 960];
        env.render(&mut buffer, 0.0, 48_000.0);

        assert!((buffer[0] - 0.001).abs() < EPS);
        assert!((buffer[960 - 1] - env.gain_at(959.0 / 48_000.0)).abs() < EPS);
        assert!(buffer.windows(2).all(|w| w[1] >= w[0]));
    }
}
