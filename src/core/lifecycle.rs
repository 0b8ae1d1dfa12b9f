use derive_more::Display;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use flume::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::core::error::PollError;

/// Slice used when waiting on terminal input so the signal channel is
/// still checked promptly.
const INPUT_POLL_SLICE: Duration = Duration::from_millis(50);

/// What asked the poll session to stop.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// Hangup, interrupt or termination signal, by number.
    #[display("signal {_0}")]
    Signal(i32),
    /// Ctrl-C or `q` typed into the dashboard.
    #[display("keyboard interrupt")]
    Keyboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Shutdown(ShutdownCause),
    Resize { width: u16, height: u16 },
}

/// Source of asynchronous lifecycle events seen by the scheduler.
pub trait EventSource {
    /// Block for at most `timeout` and return the next event, if any.
    fn wait(&mut self, timeout: Duration) -> Result<Option<LifecycleEvent>, PollError>;
}

/// Events of a real terminal session: process signals plus the keyboard and
/// resize events crossterm reads from the tty.
pub struct TerminalEvents {
    signals: Receiver<ShutdownCause>,
    #[cfg(unix)]
    forwarder: signal_hook::iterator::Handle,
}

impl TerminalEvents {
    /// Route hangup, interrupt and termination signals into a single-slot
    /// channel read by [`EventSource::wait`].
    #[cfg(unix)]
    pub fn install() -> Result<Self, PollError> {
        use signal_hook::{
            consts::{SIGHUP, SIGINT, SIGTERM},
            iterator::Signals,
        };

        let (tx, rx) = flume::bounded::<ShutdownCause>(1);
        let mut signals = Signals::new([SIGHUP, SIGINT, SIGTERM])?;
        let forwarder = signals.handle();
        std::thread::Builder::new()
            .name("signal-forwarder".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    log::debug!("Received signal {signal}");
                    // A pending request is enough; repeated signals are dropped.
                    let _ = tx.try_send(ShutdownCause::Signal(signal));
                }
            })?;
        Ok(Self {
            signals: rx,
            forwarder,
        })
    }

    /// Console control events only carry Ctrl-C/Ctrl-Break here; both are
    /// reported as an interrupt.
    #[cfg(not(unix))]
    pub fn install() -> Result<Self, PollError> {
        const SIGINT: i32 = 2;

        let (tx, rx) = flume::bounded::<ShutdownCause>(1);
        ctrlc::set_handler(move || {
            let _ = tx.try_send(ShutdownCause::Signal(SIGINT));
        })
        .map_err(PollError::terminal)?;
        Ok(Self { signals: rx })
    }

    fn pending_signal(&self) -> Option<LifecycleEvent> {
        match self.signals.try_recv() {
            Ok(cause) => Some(LifecycleEvent::Shutdown(cause)),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

impl EventSource for TerminalEvents {
    fn wait(&mut self, timeout: Duration) -> Result<Option<LifecycleEvent>, PollError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(event) = self.pending_signal() {
                return Ok(Some(event));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if crossterm::event::poll(remaining.min(INPUT_POLL_SLICE))? {
                if let Some(event) = translate_event(crossterm::event::read()?) {
                    return Ok(Some(event));
                }
            }

            if Instant::now() >= deadline {
                return Ok(self.pending_signal());
            }
        }
    }
}

#[cfg(unix)]
impl Drop for TerminalEvents {
    fn drop(&mut self) {
        self.forwarder.close();
    }
}

fn translate_event(event: Event) -> Option<LifecycleEvent> {
    match event {
        Event::Resize(width, height) => Some(LifecycleEvent::Resize { width, height }),
        Event::Key(key) if is_interrupt_key(&key) => {
            Some(LifecycleEvent::Shutdown(ShutdownCause::Keyboard))
        }
        _ => None,
    }
}

/// Ctrl-C or a plain `q`, on the initial press only.
pub fn is_interrupt_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') => key.modifiers.is_empty(),
        _ => false,
    }
}

/// Event source fed through a channel, for driving the scheduler without a
/// terminal.
pub struct ChannelEvents {
    rx: Receiver<LifecycleEvent>,
}

impl ChannelEvents {
    pub fn new() -> (Sender<LifecycleEvent>, Self) {
        let (tx, rx) = flume::unbounded();
        (tx, Self { rx })
    }
}

impl EventSource for ChannelEvents {
    fn wait(&mut self, timeout: Duration) -> Result<Option<LifecycleEvent>, PollError> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                // Nobody can post events any more; still honour the wait.
                std::thread::sleep(timeout);
                Ok(None)
            }
        }
    }
}
