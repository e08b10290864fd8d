use crate::error::SinkError;

/// Whether the device is pulling audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    Running,
    /// Created but not yet started, or paused by the host
    Suspended,
}

/// The audio device as seen from the control side.
///
/// The engine never reads from the sink. The only thing control code may
/// ask of it is to resume when it was found suspended.
pub trait OutputSink {
    fn state(&self) -> SinkState;

    /// Ask a suspended sink to start pulling audio.
    fn resume(&mut self) -> Result<(), SinkError>;
}

/// Sink that only records state transitions, for tests and offline runs.
#[derive(Debug)]
pub struct MemorySink {
    state: SinkState,
    resume_calls: usize,
    refuse: bool,
}

impl MemorySink {
    pub fn suspended() -> Self {
        Self {
            state: SinkState::Suspended,
            resume_calls: 0,
            refuse: false,
        }
    }

    pub fn running() -> Self {
        Self {
            state: SinkState::Running,
            ..Self::suspended()
        }
    }

    /// Make every resume request fail, like a device that went away.
    pub fn refusing(mut self) -> Self {
        self.refuse = true;
        self
    }

    pub fn resume_calls(&self) -> usize {
        self.resume_calls
    }
}

impl OutputSink for MemorySink {
    fn state(&self) -> SinkState {
        self.state
    }

    fn resume(&mut self) -> Result<(), SinkError> {
        self.resume_calls += 1;
        if self.refuse {
            return Err(SinkError::Resume("device unavailable".to_string()));
        }
        self.state = SinkState::Running;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_wakes_suspended_sink() {
        let mut sink = MemorySink::suspended();
        sink.resume().unwrap();
        assert_eq!(sink.state(), SinkState::Running);
        assert_eq!(sink.resume_calls(), 1);
    }

    #[test]
    fn refusing_sink_stays_suspended() {
        let mut sink = MemorySink::suspended().refusing();
        assert!(sink.resume().is_err());
        assert_eq!(sink.state(), SinkState::Suspended);
    }
}
