//! Everything that talks to the device: typed configuration, the session,
//! sample storage and the read dispatch built on the Modbus helpers.

pub mod buffer;
pub mod dispatch;
pub mod modbus;
pub mod session;
pub mod simulator;
pub mod types;

pub use buffer::SampleBuffer;
pub use dispatch::read_samples;
pub use session::Session;
pub use types::{Backend, DataSpace, DeviceTarget, PollConfig, ReadRequest};
