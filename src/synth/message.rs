use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer};

use crate::{
    dsp::oscillator::OscillatorWaveform,
    synth::{keymap::KeyId, modulation::ModParam, voice::SynthMode},
};

/// Control event delivered to the engine, in arrival order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    KeyDown(KeyId),
    KeyUp(KeyId),
    SetWaveform(OscillatorWaveform),
    SetSynthMode(SynthMode),
    SetArpeggiator(bool),
    SetParameter { param: ModParam, value: f32 },
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

/// Producer side of the control queue.
pub trait MessageSender {
    /// Returns the message back when the queue is full.
    fn push(&mut self, msg: SynthMessage) -> Result<(), SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

#[cfg(feature = "rtrb")]
impl MessageSender for Producer<SynthMessage> {
    fn push(&mut self, msg: SynthMessage) -> Result<(), SynthMessage> {
        Producer::push(self, msg).map_err(|rtrb::PushError::Full(msg)| msg)
    }
}

// Unbounded in-process queue, for tests and offline rendering
impl MessageReceiver for VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}

impl MessageSender for VecDeque<SynthMessage> {
    fn push(&mut self, msg: SynthMessage) -> Result<(), SynthMessage> {
        self.push_back(msg);
        Ok(())
    }
}
