use ratatui::Terminal;

use super::{
    screen::ScreenMode,
    ui::{
        data_pane::{format_sample_line, render_data_pane},
        status_pane::{render_status_pane, StatusFields},
        PaneGeometry,
    },
};
use crate::{
    core::error::PollError,
    protocol::{
        buffer::SampleBuffer,
        types::{PollConfig, ReadRequest},
    },
};

/// Live two-pane view of the poll results.
///
/// The status pane content is fixed for the whole session; only the sample
/// lines change between cycles, and ratatui's buffer diff keeps the status
/// cells from being rewritten.
pub struct Dashboard<B: ScreenMode> {
    terminal: Terminal<B>,
    status: StatusFields,
    request: ReadRequest,
    geometry: PaneGeometry,
    samples: Vec<String>,
    managed: bool,
}

impl<B: ScreenMode> Dashboard<B> {
    pub fn new(backend: B, config: &PollConfig) -> Result<Self, PollError> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            status: StatusFields::from_config(config),
            request: config.request,
            geometry: PaneGeometry::default(),
            samples: Vec::with_capacity(config.request.count as usize),
            managed: false,
        })
    }

    /// Enter managed mode, lay out both panes and draw the static content.
    pub fn init(&mut self) -> Result<(), PollError> {
        if !self.managed {
            if let Err(err) = self.terminal.backend_mut().enter_managed() {
                if let Err(undo) = self.terminal.backend_mut().leave_managed() {
                    log::warn!("Failed to undo partial terminal setup: {undo}");
                }
                return Err(err.into());
            }
            self.managed = true;
        }
        self.terminal.autoresize()?;
        self.terminal.clear()?;
        self.draw()
    }

    /// Replace the sample lines with the first `count` values of `buffer`.
    pub fn refresh(&mut self, buffer: &SampleBuffer, count: usize) -> Result<(), PollError> {
        let request = self.request;
        self.samples.clear();
        self.samples.extend(
            buffer
                .values()
                .take(count)
                .enumerate()
                .map(|(i, value)| format_sample_line(request.reference_at(i), value)),
        );
        self.draw()
    }

    /// Full screen reinitialization after the terminal changed size.
    ///
    /// Does nothing once the dashboard has been shut down.
    pub fn reinit(&mut self) -> Result<(), PollError> {
        if !self.managed {
            return Ok(());
        }
        log::debug!("Reinitializing dashboard");
        self.terminal.backend_mut().leave_managed()?;
        self.managed = false;
        self.init()
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn shutdown(&mut self) -> Result<(), PollError> {
        if !self.managed {
            return Ok(());
        }
        self.managed = false;
        // Leaving managed mode also shows the cursor.
        self.terminal.backend_mut().leave_managed()?;
        log::debug!("Terminal restored");
        Ok(())
    }

    pub fn is_managed(&self) -> bool {
        self.managed
    }

    pub fn geometry(&self) -> PaneGeometry {
        self.geometry
    }

    pub fn status(&self) -> &StatusFields {
        &self.status
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.terminal.backend_mut()
    }

    fn draw(&mut self) -> Result<(), PollError> {
        let status = &self.status;
        let samples = &self.samples;
        let mut geometry = self.geometry;
        self.terminal.draw(|frame| {
            geometry = PaneGeometry::compute(frame.area());
            render_status_pane(frame, geometry.status, status);
            render_data_pane(frame, geometry.data, samples);
        })?;
        self.geometry = geometry;
        Ok(())
    }
}

impl<B: ScreenMode> Drop for Dashboard<B> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            log::warn!("Failed to restore terminal: {err}");
        }
    }
}
