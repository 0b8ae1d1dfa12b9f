use crate::{
    core::error::PollError,
    protocol::{buffer::SampleBuffer, dispatch::read_samples, session::Session, types::PollConfig},
    tui::{Dashboard, ScreenMode},
};

/// Where the poll session is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Connected,
    Polling,
    Terminated,
}

/// Everything one poll session owns: the device session, the sample buffer
/// and the dashboard.
///
/// Resources are released by [`PollContext::teardown`], which runs at most
/// once no matter how many exit paths reach it.
pub struct PollContext<B: ScreenMode> {
    config: PollConfig,
    state: PollState,
    session: Option<Session>,
    buffer: Option<SampleBuffer>,
    dashboard: Option<Dashboard<B>>,
}

impl<B: ScreenMode> PollContext<B> {
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            state: PollState::Idle,
            session: None,
            buffer: None,
            dashboard: None,
        }
    }

    /// Open the device session and allocate the sample buffer.
    pub fn connect(&mut self) -> Result<(), PollError> {
        let session = Session::open(&self.config.target)?;
        self.session = Some(session);

        let request = self.config.request;
        match SampleBuffer::allocate(request.space, request.count) {
            Ok(buffer) => self.buffer = Some(buffer),
            Err(err) => {
                self.teardown();
                return Err(err);
            }
        }

        self.state = PollState::Connected;
        Ok(())
    }

    /// Take over the terminal and draw the static dashboard content.
    pub fn start_display(&mut self, backend: B) -> Result<(), PollError> {
        let mut dashboard = Dashboard::new(backend, &self.config)?;
        let initialized = dashboard.init();
        self.dashboard = Some(dashboard);
        initialized?;
        self.state = PollState::Polling;
        Ok(())
    }

    /// One poll cycle: read from the device, then show the values.
    pub fn poll_once(&mut self) -> Result<usize, PollError> {
        let (Some(session), Some(buffer)) = (self.session.as_mut(), self.buffer.as_mut()) else {
            return Err(PollError::read("Poll session is not connected"));
        };
        let received = read_samples(session, &self.config.request, buffer)?;
        log::trace!("Read {received} values");

        if let Some(dashboard) = self.dashboard.as_mut() {
            dashboard.refresh(buffer, received)?;
        }
        Ok(received)
    }

    pub fn handle_resize(&mut self) -> Result<(), PollError> {
        match self.dashboard.as_mut() {
            Some(dashboard) => dashboard.reinit(),
            None => Ok(()),
        }
    }

    /// Release the buffer, close the session and restore the terminal.
    ///
    /// Every step is skipped when its resource is already gone, so calling
    /// this again is a no-op.
    pub fn teardown(&mut self) {
        if self.buffer.take().is_some() {
            log::debug!("Sample buffer released");
        }
        if let Some(mut session) = self.session.take() {
            session.close();
        }
        if let Some(mut dashboard) = self.dashboard.take() {
            if let Err(err) = dashboard.shutdown() {
                log::warn!("Failed to restore terminal: {err}");
            }
        }
        if self.state != PollState::Terminated {
            log::debug!("Poll session terminated");
            self.state = PollState::Terminated;
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn buffer(&self) -> Option<&SampleBuffer> {
        self.buffer.as_ref()
    }

    pub fn dashboard(&self) -> Option<&Dashboard<B>> {
        self.dashboard.as_ref()
    }
}

impl<B: ScreenMode> Drop for PollContext<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::*;
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn config(backend: Backend, port: u16) -> PollConfig {
        PollConfig {
            target: DeviceTarget {
                backend,
                host: "127.0.0.1".to_string(),
                port,
                unit_id: 1,
            },
            request: ReadRequest {
                space: DataSpace::InputRegisters,
                reference: 1,
                count: 4,
            },
            poll_interval: Duration::from_millis(100),
        }
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut ctx = PollContext::<TestBackend>::new(config(Backend::Tcp, 502));
        ctx.teardown();
        ctx.teardown();
        assert_eq!(ctx.state(), PollState::Terminated);
        assert!(ctx.session().is_none());
        assert!(ctx.buffer().is_none());
        assert!(ctx.dashboard().is_none());
    }

    #[test]
    fn test_unsupported_backend_leaves_context_idle() {
        let mut ctx = PollContext::<TestBackend>::new(config(Backend::Rtu, 502));
        let err = ctx.connect().unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(ctx.state(), PollState::Idle);
        assert!(ctx.buffer().is_none());
    }

    #[test]
    fn test_poll_without_connection_is_read_error() {
        let mut ctx = PollContext::<TestBackend>::new(config(Backend::Tcp, 502));
        assert!(matches!(ctx.poll_once(), Err(PollError::Read { .. })));
    }

    #[test]
    fn test_display_restored_by_teardown() {
        let mut ctx = PollContext::new(config(Backend::Tcp, 502));
        ctx.start_display(TestBackend::new(60, 16)).unwrap();
        assert_eq!(ctx.state(), PollState::Polling);
        assert!(ctx.dashboard().is_some_and(|d| d.is_managed()));
        ctx.teardown();
        assert!(ctx.dashboard().is_none());
        assert_eq!(ctx.state(), PollState::Terminated);
    }
}
