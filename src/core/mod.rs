//! Poll session plumbing that sits between the command line and the
//! device: typed errors, lifecycle events, the owning context and the
//! scheduler loop.

pub mod context;
pub mod error;
pub mod lifecycle;
pub mod scheduler;

pub use context::{PollContext, PollState};
pub use error::PollError;
pub use lifecycle::{ChannelEvents, EventSource, LifecycleEvent, ShutdownCause, TerminalEvents};
pub use scheduler::{run_poll_session, Outcome, Scheduler};
