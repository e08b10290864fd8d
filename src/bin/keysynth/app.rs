//! Audio device setup and the bridge between the UI and audio threads

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use keysynth::{
    io::{OutputSink, SinkState},
    synth::SynthMessage,
    EngineConfig, InputPort, SinkError, SynthEngine, MAX_BLOCK_SIZE,
};

use crate::ui::{EngineStatus, UiApp};

/// Control messages in flight between two audio callbacks
const CONTROL_QUEUE_SIZE: usize = 1024;
/// Samples buffered for the oscilloscope
const SCOPE_QUEUE_SIZE: usize = 8192;
const STATUS_QUEUE_SIZE: usize = 64;

/// cpal output stream as an [`OutputSink`].
///
/// Built paused; the first key press resumes it.
pub struct CpalSink {
    stream: cpal::Stream,
    state: SinkState,
}

impl OutputSink for CpalSink {
    fn state(&self) -> SinkState {
        self.state
    }

    fn resume(&mut self) -> Result<(), SinkError> {
        self.stream
            .play()
            .map_err(|err| SinkError::Resume(err.to_string()))?;
        self.state = SinkState::Running;
        Ok(())
    }
}

pub fn run(mut config: EngineConfig, arp: bool) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let stream_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    config.sample_rate = stream_config.sample_rate().0 as f32;
    let channels = stream_config.channels() as usize;

    let mut engine = SynthEngine::new(config).wrap_err("engine configuration rejected")?;
    engine.set_arpeggiator(arp);
    let initial = engine.patch();

    let (control_tx, mut control_rx) = RingBuffer::<SynthMessage>::new(CONTROL_QUEUE_SIZE);
    let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_QUEUE_SIZE);
    let (mut status_tx, status_rx) = RingBuffer::<EngineStatus>::new(STATUS_QUEUE_SIZE);

    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &stream_config.into(),
        move |data: &mut [f32], _| {
            engine.process_messages(&mut control_rx);

            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let block = &mut render_buf[..frames];
                engine.render_block(block);

                // Mono to all channels
                let out_off = frames_written * channels;
                for (i, &s) in block.iter().enumerate() {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = s;
                    }
                    // Scope lags behind when the UI is slow; dropping is fine
                    let _ = scope_tx.push(s);
                }

                frames_written += frames;
            }

            let _ = status_tx.push(EngineStatus::capture(&engine));
        },
        |err| tracing::error!(%err, "audio stream error"),
        None,
    )?;
    // Some hosts start streams immediately; hold off until the first key
    stream.pause().wrap_err("failed to pause output stream")?;

    tracing::info!(channels, "output stream ready (suspended)");

    let sink = CpalSink {
        stream,
        state: SinkState::Suspended,
    };
    let input = InputPort::new(control_tx, sink);

    let mut terminal = ratatui::init();
    let result = UiApp::new(input, scope_rx, status_rx, initial, arp).run(&mut terminal);
    ratatui::restore();
    result
}
