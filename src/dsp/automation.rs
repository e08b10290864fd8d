/*
Parameter Automation
====================

A ParamTimeline holds a parameter's future as a list of timestamped events on
the audio clock, instead of a value that is stepped sample by sample. Any
point in time can be evaluated directly, which makes envelopes time-driven:
the stage a voice is in follows from "what time is it", not from how many
samples somebody remembered to render.

Events
------

  SetValue(v, t)          From time t on, the value is v.

  ExponentialRamp(v, t)   Ramp exponentially from the PREVIOUS event's
                          (time, value) to v, arriving exactly at t.

                              v(t) = v0 * (v1 / v0) ^ ((t - t0) / (t1 - t0))

Exponential ramps are undefined through zero, so both end points must share
a sign and be non-zero. That is why envelopes idle at a small FLOOR
(e.g. 0.001) rather than at 0.0.

Cancellation
------------

cancel_scheduled_values(t) drops every event at or after t. An envelope
release needs this: without it, a decay ramp still pending when the key goes
up would override the release curve.

    value
      │    ╱╲
      │   ╱  ╲______ ← decay/sustain events still queued
      │  ╱     ╲
      │ ╱       ╲___  ← release ramp scheduled after cancel
      └───────────────→ time

Storage
-------

Events live in a fixed array, so scheduling never allocates. An envelope
needs five slots at most (attack anchor, attack and decay ramps, then the
release anchor and ramp once the rest is cancelled). When the array is full
the earliest event is dropped to make room.
*/

/// Events a timeline holds at once.
pub const MAX_AUTOMATION_EVENTS: usize = 8;

/// One scheduled automation point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    SetValue { time: f64, value: f32 },
    ExponentialRamp { time: f64, value: f32 },
}

impl AutomationEvent {
    #[inline]
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. } | AutomationEvent::ExponentialRamp { time, .. } => {
                time
            }
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        match *self {
            AutomationEvent::SetValue { value, .. }
            | AutomationEvent::ExponentialRamp { value, .. } => value,
        }
    }
}

/// Time-ordered automation for a single parameter.
#[derive(Debug, Clone)]
pub struct ParamTimeline {
    default_value: f32,
    events: [AutomationEvent; MAX_AUTOMATION_EVENTS],
    len: usize,
}

impl ParamTimeline {
    pub fn new(default_value: f32) -> Self {
        Self {
            default_value,
            events: [AutomationEvent::SetValue {
                time: 0.0,
                value: default_value,
            }; MAX_AUTOMATION_EVENTS],
            len: 0,
        }
    }

    /// Insert keeping time order; equal times keep insertion order.
    fn insert(&mut self, event: AutomationEvent) {
        if self.len == MAX_AUTOMATION_EVENTS {
            self.events.copy_within(1.., 0);
            self.len -= 1;
        }
        let idx = self.events().partition_point(|e| e.time() <= event.time());
        self.events.copy_within(idx..self.len, idx + 1);
        self.events[idx] = event;
        self.len += 1;
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationEvent::SetValue { time, value });
    }

    pub fn exponential_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        debug_assert!(value != 0.0, "exponential ramp target must be non-zero");
        let value = if value == 0.0 { f32::MIN_POSITIVE } else { value };
        self.insert(AutomationEvent::ExponentialRamp { time, value });
    }

    /// Drop every event scheduled at or after `time`.
    pub fn cancel_scheduled_values(&mut self, time: f64) {
        self.len = self.events().partition_point(|e| e.time() < time);
    }

    /// Evaluate the parameter at `time`.
    pub fn value_at(&self, time: f64) -> f32 {
        // First event strictly in the future
        let events = self.events();
        let idx = events.partition_point(|e| e.time() <= time);

        let Some(prev) = idx.checked_sub(1).map(|i| events[i]) else {
            return self.default_value;
        };

        match events.get(idx) {
            Some(&AutomationEvent::ExponentialRamp {
                time: end_time,
                value: end_value,
            }) => {
                let (start_time, start_value) = (prev.time(), prev.value());
                // Mixed signs or zero: hold, as the ramp is undefined
                if start_value == 0.0 || start_value.signum() != end_value.signum() {
                    return start_value;
                }
                let progress = (time - start_time) / (end_time - start_time);
                let ratio = end_value as f64 / start_value as f64;
                (start_value as f64 * ratio.powf(progress)) as f32
            }
            _ => prev.value(),
        }
    }

    /// Time of the last scheduled event, if any.
    pub fn last_event_time(&self) -> Option<f64> {
        self.events().last().map(AutomationEvent::time)
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events[..self.len]
    }
}
