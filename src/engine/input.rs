use crate::{
    io::sink::{OutputSink, SinkState},
    synth::{
        keymap::KeyId,
        message::{MessageSender, SynthMessage},
    },
};

/// UI-facing end of the control queue.
///
/// Each `on_*` call turns one UI notification into one [`SynthMessage`].
/// Before anything is queued a suspended sink is asked to resume, since a
/// host may refuse to start audio until the user interacts. A failed resume
/// is logged and the event is queued anyway.
///
/// String values come straight from UI controls; ones that do not parse
/// are logged and dropped. Every method returns whether a message was
/// queued.
pub struct InputPort<T, S> {
    tx: T,
    sink: S,
}

impl<T: MessageSender, S: OutputSink> InputPort<T, S> {
    pub fn new(tx: T, sink: S) -> Self {
        Self { tx, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sender(&self) -> &T {
        &self.tx
    }

    pub fn into_parts(self) -> (T, S) {
        (self.tx, self.sink)
    }

    pub fn on_key_down(&mut self, code: KeyId) -> bool {
        self.send(SynthMessage::KeyDown(code))
    }

    pub fn on_key_up(&mut self, code: KeyId) -> bool {
        self.send(SynthMessage::KeyUp(code))
    }

    pub fn on_waveform_change(&mut self, value: &str) -> bool {
        self.wake_sink();
        match value.parse() {
            Ok(waveform) => self.push(SynthMessage::SetWaveform(waveform)),
            Err(err) => {
                tracing::warn!(%err, "ignoring waveform change");
                false
            }
        }
    }

    pub fn on_synth_mode_change(&mut self, value: &str) -> bool {
        self.wake_sink();
        match value.parse() {
            Ok(mode) => self.push(SynthMessage::SetSynthMode(mode)),
            Err(err) => {
                tracing::warn!(%err, "ignoring synth mode change");
                false
            }
        }
    }

    pub fn on_arp_toggle(&mut self, enabled: bool) -> bool {
        self.send(SynthMessage::SetArpeggiator(enabled))
    }

    pub fn on_parameter_change(&mut self, name: &str, value: f32) -> bool {
        self.wake_sink();
        match name.parse() {
            Ok(param) => self.push(SynthMessage::SetParameter { param, value }),
            Err(err) => {
                tracing::warn!(%err, value, "ignoring parameter change");
                false
            }
        }
    }

    pub fn all_notes_off(&mut self) -> bool {
        self.send(SynthMessage::AllNotesOff)
    }

    fn send(&mut self, msg: SynthMessage) -> bool {
        self.wake_sink();
        self.push(msg)
    }

    fn push(&mut self, msg: SynthMessage) -> bool {
        match self.tx.push(msg) {
            Ok(()) => true,
            Err(msg) => {
                tracing::warn!(?msg, "control queue full, dropping message");
                false
            }
        }
    }

    fn wake_sink(&mut self) {
        if self.sink.state() != SinkState::Suspended {
            return;
        }
        match self.sink.resume() {
            Ok(()) => tracing::info!("output sink resumed"),
            Err(err) => tracing::warn!(%err, "output sink did not resume"),
        }
    }
}
