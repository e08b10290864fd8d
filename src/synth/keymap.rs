//! Key code → fundamental frequency lookup.
//!
//! Key codes are the stable integer codes of physical keys (uppercase ASCII
//! for letters and digits). The default layout spreads two chromatic octaves
//! over two rows of a computer keyboard, C4 on `Z`:
//!
//! ```text
//!   S D   G H J       2 3   5 6 7
//!  Z X C V B N M     Q W E R T Y U
//!  C4 ............B4 C5 ...........B5
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a physical key.
pub type KeyId = u32;

/// Middle C in Hz.
pub const C4_HZ: f32 = 261.625_57;

/// Key codes of the default layout, ascending by semitone from C4.
pub const DEFAULT_KEY_CODES: [KeyId; 24] = [
    90, 83, 88, 68, 67, 86, 71, 66, 72, 78, 74, 77, // Z S X D C V G B H N J M
    81, 50, 87, 51, 69, 82, 53, 84, 54, 89, 55, 85, // Q 2 W 3 E R 5 T 6 Y 7 U
];

/// One key table row as it appears in configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEntry {
    pub code: KeyId,
    pub frequency: f32,
}

/// Static, read-only mapping from key code to frequency.
///
/// Rows are kept as given, so a table built from configuration can still
/// report a code listed twice ([`FrequencyTable::duplicate_key`]); lookups
/// take the first row for a code. Tables are a couple of dozen rows, small
/// enough that a linear scan beats hashing.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(from = "Vec<KeyEntry>", into = "Vec<KeyEntry>")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    entries: Vec<KeyEntry>,
}

impl FrequencyTable {
    /// Equal-tempered table: `codes[n]` gets `base_hz · 2^(n/12)`.
    pub fn equal_tempered(codes: &[KeyId], base_hz: f32) -> Self {
        let entries = codes
            .iter()
            .enumerate()
            .map(|(semitone, &code)| {
                let freq = base_hz as f64 * 2f64.powf(semitone as f64 / 12.0);
                KeyEntry {
                    code,
                    frequency: freq as f32,
                }
            })
            .collect();
        Self { entries }
    }

    /// `None` for keys outside the table; callers ignore those silently.
    #[inline]
    pub fn lookup(&self, key: KeyId) -> Option<f32> {
        self.entries
            .iter()
            .find(|e| e.code == key)
            .map(|e| e.frequency)
    }

    pub fn contains(&self, key: KeyId) -> bool {
        self.entries.iter().any(|e| e.code == key)
    }

    /// First code that appears on more than one row.
    pub fn duplicate_key(&self) -> Option<KeyId> {
        self.entries
            .iter()
            .enumerate()
            .find(|(i, e)| self.entries[..*i].iter().any(|prev| prev.code == e.code))
            .map(|(_, e)| e.code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by ascending frequency.
    pub fn entries(&self) -> Vec<KeyEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        entries
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::equal_tempered(&DEFAULT_KEY_CODES, C4_HZ)
    }
}

impl From<Vec<KeyEntry>> for FrequencyTable {
    fn from(rows: Vec<KeyEntry>) -> Self {
        Self { entries: rows }
    }
}

impl From<FrequencyTable> for Vec<KeyEntry> {
    fn from(table: FrequencyTable) -> Self {
        table.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_spans_two_octaves() {
        let table = FrequencyTable::default();
        assert_eq!(table.len(), 24);

        let c4 = table.lookup(90).unwrap();
        let a4 = table.lookup(78).unwrap();
        let c5 = table.lookup(81).unwrap();
        let b5 = table.lookup(85).unwrap();

        assert!((c4 - 261.63).abs() < 0.01);
        assert!((a4 - 440.0).abs() < 1e-3);
        assert!((c5 - 2.0 * c4).abs() < 1e-3);
        assert!((b5 - 987.767).abs() < 1e-2);
    }

    #[test]
    fn unknown_key_is_none() {
        let table = FrequencyTable::default();
        assert_eq!(table.lookup(65), None); // 'A' is not mapped
        assert!(!table.contains(0));
    }

    #[test]
    fn repeated_code_is_reported() {
        assert_eq!(FrequencyTable::default().duplicate_key(), None);

        let table = FrequencyTable::from(vec![
            KeyEntry {
                code: 65,
                frequency: 440.0,
            },
            KeyEntry {
                code: 65,
                frequency: 220.0,
            },
        ]);
        assert_eq!(table.duplicate_key(), Some(65));
        assert_eq!(table.lookup(65), Some(440.0));
    }

    #[test]
    fn entries_ascend_by_pitch() {
        let entries = FrequencyTable::default().entries();
        assert_eq!(entries.first().map(|e| e.code), Some(90));
        assert_eq!(entries.last().map(|e| e.code), Some(85));
        assert!(entries.windows(2).all(|w| w[0].frequency < w[1].frequency));
    }
}
