//! Output oscilloscope

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Vertical range never shrinks below this, so silence stays flat
const MIN_SCALE: f64 = 0.05;

/// Render the most recent output samples, scaled to their peak.
pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32]) {
    let peak = audio_buffer
        .iter()
        .fold(0.0f32, |acc, &x| acc.max(x.abs())) as f64;
    let scale = peak.max(MIN_SCALE);

    let block = Block::default()
        .title(format!(" Output  peak {peak:.3} "))
        .borders(Borders::ALL);

    let data: Vec<(f64, f64)> = audio_buffer
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / audio_buffer.len() as f64, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-scale, scale])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
