//! modpoll: live terminal dashboard for polling a Modbus device
//!
//! The binary reads one block of coils, discrete inputs, input registers or
//! holding registers from a single device at a fixed interval and shows the
//! values under a static summary of the connection settings. A small device
//! simulator (`devsim`) is shipped alongside for rehearsal and tests.
//!
//! Modules follow the flow of a session: `cli` validates arguments into a
//! [`protocol::PollConfig`], `protocol` talks to the device, `tui` draws the
//! dashboard and `core` ties them together in the poll loop.

#[doc(hidden)]
pub mod boot;
pub mod cli;
pub mod core;
pub mod protocol;
pub mod tui;
