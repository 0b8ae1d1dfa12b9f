use ratatui::{prelude::*, widgets::*};

pub const DATA_PANE_HEADER: &str = "Polling slave... (Ctrl-C to stop)";

/// Inner line of the data pane holding the first sample.
pub const FIRST_SAMPLE_LINE: usize = 2;

pub fn format_sample_line(reference: u32, value: u16) -> String {
    format!("[{reference}]: {value}")
}

pub fn render_data_pane(frame: &mut Frame, area: Rect, samples: &[String]) {
    let mut lines = Vec::with_capacity(FIRST_SAMPLE_LINE + samples.len());
    lines.push(Line::from(DATA_PANE_HEADER));
    lines.push(Line::default());
    lines.extend(samples.iter().map(|s| Line::from(s.as_str())));

    let block = Block::default()
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
