use crate::synth::keymap::KeyId;

/// Keys currently physically down, in the order they went down.
///
/// Membership is what matters for note handling; the order only exists so
/// the arpeggiator can enumerate keys deterministically.
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    keys: Vec<KeyId>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Room for `capacity` keys before the set reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
        }
    }

    /// Returns `false` if the key was already held.
    pub fn insert(&mut self, key: KeyId) -> bool {
        if self.contains(key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    /// Returns `false` if the key was not held.
    pub fn remove(&mut self, key: KeyId) -> bool {
        match self.keys.iter().position(|&k| k == key) {
            Some(idx) => {
                self.keys.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: KeyId) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Held keys in press order.
    pub fn as_slice(&self) -> &[KeyId] {
        &self.keys
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_press_order_across_removals() {
        let mut held = HeldKeys::new();
        assert!(held.insert(90));
        assert!(held.insert(83));
        assert!(held.insert(88));
        assert!(!held.insert(83));

        assert!(held.remove(83));
        assert!(!held.remove(83));
        held.insert(83);

        assert_eq!(held.as_slice(), &[90, 88, 83]);
        assert_eq!(held.len(), 3);
    }
}
