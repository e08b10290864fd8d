//! Terminal key events → synth key codes and key releases

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use crossterm::event::KeyCode;
use keysynth::synth::KeyId;

/// Without release reporting a key counts as up once it has not repeated
/// for this long. Longer than the usual initial auto-repeat delay.
pub const HOLD_TIMEOUT: Duration = Duration::from_millis(600);

/// Key code as the engine knows it: uppercase ASCII of letters and digits.
pub fn key_code(code: KeyCode) -> Option<KeyId> {
    match code {
        KeyCode::Char(c) if c.is_ascii_alphanumeric() => Some(c.to_ascii_uppercase() as KeyId),
        _ => None,
    }
}

/// Which note keys are down.
///
/// Terminals that support the kitty keyboard protocol report releases and
/// `release()` is called for them. Everywhere else `expire()` treats a key
/// as released once its auto-repeat stops.
pub struct KeyTracker {
    release_events: bool,
    down: HashMap<KeyId, Instant>,
}

impl KeyTracker {
    pub fn new(release_events: bool) -> Self {
        Self {
            release_events,
            down: HashMap::new(),
        }
    }

    pub fn reports_releases(&self) -> bool {
        self.release_events
    }

    /// Press or auto-repeat. Returns `true` when the key just went down.
    pub fn press(&mut self, key: KeyId, now: Instant) -> bool {
        self.down.insert(key, now).is_none()
    }

    /// Returns `true` when the key was down.
    pub fn release(&mut self, key: KeyId) -> bool {
        self.down.remove(&key).is_some()
    }

    /// Keys whose hold timed out, removed from the tracker.
    pub fn expire(&mut self, now: Instant) -> Vec<KeyId> {
        if self.release_events {
            return Vec::new();
        }
        let expired: Vec<KeyId> = self
            .down
            .iter()
            .filter(|(_, &last)| now.duration_since(last) >= HOLD_TIMEOUT)
            .map(|(&key, _)| key)
            .collect();
        for key in &expired {
            self.down.remove(key);
        }
        expired
    }

    pub fn clear(&mut self) {
        self.down.clear();
    }
}
