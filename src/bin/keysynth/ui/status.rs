//! Status panel: patch, parameters, voices

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keysynth::synth::ModParam;

use super::state::{Controls, EngineStatus};

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    controls: &Controls,
    status: &EngineStatus,
    release_events: bool,
) {
    let block = Block::default().title(" keysynth ").borders(Borders::ALL);

    let arp = if controls.arpeggiator {
        match status.arp_current.and_then(char::from_u32) {
            Some(key) => format!("on [{key}]"),
            None => "on".to_string(),
        }
    } else {
        "off".to_string()
    };

    let patch_line = Line::from(vec![
        Span::styled(
            format!(" Mode: {:<9}", controls.mode.name()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Wave: {:<9}", controls.waveform.name()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("Arp: {arp:<8}"), Style::default().fg(Color::Green)),
        Span::styled(
            format!(
                "Voices: {} keyed / {} live  Held: {}",
                status.active_voices, status.live_voices, status.held_keys
            ),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let selected = controls.selected_param();
    let param_spans: Vec<Span> = ModParam::ALL
        .iter()
        .map(|&param| {
            let text = format!(" {}={:.2} ", param.name(), controls.params.get(param));
            if param == selected {
                Span::styled(
                    text,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::REVERSED),
                )
            } else {
                Span::styled(text, Style::default().fg(Color::White))
            }
        })
        .collect();

    let envelope = match status.envelope {
        Some(env) => format!(
            "{:?} (peak {:.2}, sustain {:.2})",
            env.stage, env.peak_level, env.sustain_level
        ),
        None => "-".to_string(),
    };
    let clock_line = Line::from(Span::styled(
        format!(
            " Clock {:.2}s  Env: {envelope}  Key release: {}",
            status.time,
            if release_events { "reported" } else { "hold timeout" }
        ),
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(vec![patch_line, Line::from(param_spans), clock_line]).block(block);
    frame.render_widget(paragraph, area);
}
