pub mod data_pane;
pub mod status_pane;

use ratatui::layout::*;

/// Status pane rows: four fields plus the top and bottom border.
pub const STATUS_PANE_HEIGHT: u16 = 4 + 2;

/// Where each pane sits for the current terminal size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaneGeometry {
    pub status: Rect,
    pub data: Rect,
}

impl PaneGeometry {
    pub fn compute(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(0)
            .constraints([
                Constraint::Length(STATUS_PANE_HEIGHT), // status
                Constraint::Min(0),                     // data
            ])
            .split(area);
        Self {
            status: chunks[0],
            data: chunks[1],
        }
    }

    /// Screen row of the sample at `index`, if the data pane is tall enough.
    pub fn sample_row(&self, index: usize) -> Option<u16> {
        let row = self.data.y as usize + 1 + data_pane::FIRST_SAMPLE_LINE + index;
        let bottom_border = (self.data.y + self.data.height).saturating_sub(1) as usize;
        (row < bottom_border).then_some(row as u16)
    }
}
