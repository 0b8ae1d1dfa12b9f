use ratatui::{prelude::*, widgets::*};

use crate::protocol::types::PollConfig;

/// Width of the label column in the status pane.
const LABEL_WIDTH: usize = 16;

/// The four static fields shown above the samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFields {
    pub connection: String,
    pub slave: String,
    pub communication: String,
    pub data_type: String,
}

impl StatusFields {
    pub fn from_config(config: &PollConfig) -> Self {
        let target = &config.target;
        let request = &config.request;
        Self {
            connection: target.backend.to_string(),
            slave: format!(
                "address = {}, start reference = {}, count = {}",
                target.unit_id, request.reference, request.count
            ),
            communication: format!(
                "{}, port {}, poll rate {} milliseconds",
                target.host,
                target.port,
                config.poll_interval.as_millis()
            ),
            data_type: request.space.to_string(),
        }
    }

    pub fn rows(&self) -> [(&'static str, &str); 4] {
        [
            ("Connection:", self.connection.as_str()),
            ("Slave:", self.slave.as_str()),
            ("Communication:", self.communication.as_str()),
            ("Data Type:", self.data_type.as_str()),
        ]
    }
}

pub fn render_status_pane(frame: &mut Frame, area: Rect, fields: &StatusFields) {
    let lines = fields
        .rows()
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(
                    format!("{label:<LABEL_WIDTH$}"),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(value.to_string()),
            ])
        })
        .collect::<Vec<_>>();

    let block = Block::default()
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
