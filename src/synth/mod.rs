// Purpose: keys, voices and everything that decides which voices sound.
// This layer sits above graph nodes and below the engine.

pub mod arpeggiator;
pub mod held_keys;
pub mod keymap;
pub mod message;
pub mod modulation;
pub mod registry;
pub mod voice;

pub use keymap::{FrequencyTable, KeyId};
pub use message::{MessageReceiver, MessageSender, SynthMessage};
pub use modulation::{ModParam, ModulationParams};
pub use voice::{Patch, SynthMode, Voice, VoiceId};
