/// Fixed-rate task on the audio clock, counted in frames.
///
/// Exists only while its owner wants ticks: created when the guard condition
/// becomes true, dropped (cancelled) when it becomes false. The first tick is
/// due one period after start, like an interval timer. Due frames are whole
/// numbers, so every tick lands on an exact frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTask {
    period: u64,
    next_due: u64,
}

impl PeriodicTask {
    /// `period` is in frames and must be at least one.
    pub fn start(now: u64, period: u64) -> Self {
        debug_assert!(period > 0);
        let period = period.max(1);
        Self {
            period,
            next_due: now + period,
        }
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    /// Frame the pending tick falls on.
    pub fn next_due(&self) -> u64 {
        self.next_due
    }

    /// Mark the pending tick as fired and schedule the next one.
    pub fn fire(&mut self) {
        self.next_due += self.period;
    }
}

/// Length of `seconds` in whole frames at `sample_rate`, never less than one.
pub fn period_frames(seconds: f64, sample_rate: f32) -> u64 {
    (seconds * sample_rate as f64).round().max(1.0) as u64
}
