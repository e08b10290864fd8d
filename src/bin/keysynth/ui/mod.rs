//! TUI for keysynth
//!
//! Turns terminal key events into engine input and shows the patch, the
//! voice counts and an oscilloscope of the output.

mod state;
mod status;
mod waveform;

use std::{
    io::stdout,
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use keysynth::{
    synth::{Patch, SynthMessage},
    InputPort,
};

use crate::{
    app::CpalSink,
    keys::{key_code, KeyTracker},
};

pub use state::EngineStatus;

use state::Controls;
use status::render_status;
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

type Input = InputPort<Producer<SynthMessage>, CpalSink>;

pub struct UiApp {
    input: Input,
    /// Output samples for the oscilloscope
    audio_rx: Consumer<f32>,
    status_rx: Consumer<EngineStatus>,
    status: EngineStatus,
    controls: Controls,
    keys: KeyTracker,
    audio_buffer: Vec<f32>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        input: Input,
        audio_rx: Consumer<f32>,
        status_rx: Consumer<EngineStatus>,
        patch: Patch,
        arpeggiator: bool,
    ) -> Self {
        Self {
            input,
            audio_rx,
            status_rx,
            status: EngineStatus::default(),
            controls: Controls::new(patch, arpeggiator),
            keys: KeyTracker::new(false),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        let release_events = supports_keyboard_enhancement().unwrap_or(false);
        if release_events {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        self.keys = KeyTracker::new(release_events);
        tracing::info!(release_events, "terminal input ready");

        let result = self.event_loop(terminal);

        if release_events {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_status();

            terminal.draw(|frame| self.render(frame))?;

            // Drain everything pending, then wait up to one frame (~60fps)
            let mut timeout = Duration::from_millis(16);
            while event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
                timeout = Duration::ZERO;
            }

            for code in self.keys.expire(Instant::now()) {
                self.input.on_key_up(code);
            }
        }

        self.input.all_notes_off();
        Ok(())
    }

    /// Keep the last VIS_BUFFER_SIZE output samples
    fn poll_audio(&mut self) {
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn poll_status(&mut self) {
        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(code) = key_code(key.code) {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                if code == 'C' as u32 {
                    self.should_quit = true;
                }
                return;
            }
            match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    if self.keys.press(code, Instant::now()) {
                        self.input.on_key_down(code);
                    }
                }
                KeyEventKind::Release => {
                    if self.keys.release(code) {
                        self.input.on_key_up(code);
                    }
                }
            }
            return;
        }

        if key.kind == KeyEventKind::Release {
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::F(1) => {
                let waveform = self.controls.next_waveform();
                self.input.on_waveform_change(waveform.name());
            }
            KeyCode::F(2) => {
                let mode = self.controls.next_mode();
                self.input.on_synth_mode_change(mode.name());
            }
            KeyCode::F(3) => {
                self.controls.arpeggiator = !self.controls.arpeggiator;
                self.input.on_arp_toggle(self.controls.arpeggiator);
            }
            KeyCode::Tab => self.controls.select_next(true),
            KeyCode::BackTab => self.controls.select_next(false),
            KeyCode::Up | KeyCode::Down => {
                let (param, value) = self.controls.step_selected(key.code == KeyCode::Up);
                self.input.on_parameter_change(param.name(), value);
            }
            KeyCode::Char(' ') => {
                self.keys.clear();
                self.input.all_notes_off();
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Status
                Constraint::Min(8),    // Oscilloscope
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_status(
            frame,
            chunks[0],
            &self.controls,
            &self.status,
            self.keys.reports_releases(),
        );
        render_waveform(frame, chunks[1], &self.audio_buffer);

        let help = Paragraph::new(
            " Z..M / Q..U play  [F1] Wave  [F2] Mode  [F3] Arp  [Tab] Param  [↑↓] Adjust  [Space] Panic  [Esc] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }
}
