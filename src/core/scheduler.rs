use std::time::{Duration, Instant};

use crate::{
    core::{
        context::PollContext,
        error::PollError,
        lifecycle::{EventSource, LifecycleEvent, ShutdownCause},
    },
    protocol::types::PollConfig,
    tui::ScreenMode,
};

/// How a poll session ended when no error stopped it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Shutdown(ShutdownCause),
}

/// Drives the read, refresh and wait cycle at a fixed interval.
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    cycles: u64,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            cycles: 0,
        }
    }

    /// Completed read cycles so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Poll until a shutdown event or a failed read. The context is torn down
    /// before this returns, whatever the result.
    pub fn run<B: ScreenMode>(
        &mut self,
        ctx: &mut PollContext<B>,
        events: &mut impl EventSource,
    ) -> Result<Outcome, PollError> {
        let result = self.poll_loop(ctx, events);
        ctx.teardown();
        match &result {
            Ok(Outcome::Shutdown(cause)) => {
                log::info!("Stopped after {} cycles: {cause}", self.cycles)
            }
            Err(err) => log::error!("Stopped after {} cycles: {err}", self.cycles),
        }
        result
    }

    fn poll_loop<B: ScreenMode>(
        &mut self,
        ctx: &mut PollContext<B>,
        events: &mut impl EventSource,
    ) -> Result<Outcome, PollError> {
        loop {
            ctx.poll_once()?;
            self.cycles += 1;

            // Resizes are handled inside the wait; only a shutdown ends it early.
            let deadline = Instant::now() + self.interval;
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                match events.wait(remaining)? {
                    Some(LifecycleEvent::Shutdown(cause)) => return Ok(Outcome::Shutdown(cause)),
                    Some(LifecycleEvent::Resize { width, height }) => {
                        log::debug!("Terminal resized to {width}x{height}");
                        ctx.handle_resize()?;
                    }
                    None => {}
                }
            }
        }
    }
}

/// Set up a complete poll session on `backend` and run it to the end.
pub fn run_poll_session<B: ScreenMode>(
    config: PollConfig,
    backend: B,
    events: &mut impl EventSource,
) -> Result<Outcome, PollError> {
    let mut scheduler = Scheduler::new(config.poll_interval);
    let mut ctx = PollContext::new(config);
    ctx.connect()?;
    if let Err(err) = ctx.start_display(backend) {
        ctx.teardown();
        return Err(err);
    }
    scheduler.run(&mut ctx, events)
}
