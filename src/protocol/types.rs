use derive_more::Display;
use strum::{EnumIter, EnumString, FromRepr};

use std::time::Duration;

/// Highest unit identifier a Modbus master may address on a shared link.
pub const MAX_SLAVE_ID: u8 = 247;
pub const MIN_SLAVE_ID: u8 = 1;

/// Largest point count accepted for a single poll.
pub const MAX_POINT_COUNT: u16 = 125;

/// References are 1-based, so the whole 16-bit address space ends here.
pub const MAX_REFERENCE: u32 = 65536;

pub const MODBUS_TCP_DEFAULT_PORT: u16 = 502;

/// Communication backend selected with `-m`.
#[derive(EnumString, EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Backend {
    #[display("Modbus TCP/IP")]
    Tcp,
    #[display("Modbus UDP/IP")]
    Udp,
    #[display("Modbus RTU")]
    Rtu,
    #[display("Modbus ASCII")]
    Ascii,
}

/// One of the four independently addressed value tables of a Modbus device.
///
/// The discriminants are the zero-based form of the `-t` flag.
#[derive(FromRepr, EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataSpace {
    #[display("Coils")]
    Coils = 0,
    #[display("Discrete input")]
    DiscreteInputs = 1,
    #[display("16-bit input register")]
    InputRegisters = 2,
    #[display("16-bit holding register")]
    HoldingRegisters = 3,
}

impl DataSpace {
    /// Map the 1-based `-t` value, rejecting anything outside `1..=4`.
    pub fn from_type_flag(flag: i64) -> Option<Self> {
        let index = u8::try_from(flag.checked_sub(1)?).ok()?;
        Self::from_repr(index)
    }

    pub fn is_bit_space(self) -> bool {
        matches!(self, DataSpace::Coils | DataSpace::DiscreteInputs)
    }

    /// Modbus function code used to read this table.
    pub fn function_code(self) -> u8 {
        match self {
            DataSpace::Coils => 0x01,
            DataSpace::DiscreteInputs => 0x02,
            DataSpace::HoldingRegisters => 0x03,
            DataSpace::InputRegisters => 0x04,
        }
    }
}

/// The device being polled. Fixed once polling starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    pub backend: Backend,
    pub host: String,
    pub port: u16,
    pub unit_id: u8,
}

/// What is read on every poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    pub space: DataSpace,
    /// 1-based reference shown to the user.
    pub reference: u32,
    pub count: u16,
}

impl ReadRequest {
    /// Zero-based wire address of the first point.
    pub fn address(&self) -> u16 {
        // `reference` is validated to 1..=65536 when the request is built.
        (self.reference.saturating_sub(1)).min(u16::MAX as u32) as u16
    }

    /// Reference displayed for the sample at `index`.
    pub fn reference_at(&self, index: usize) -> u32 {
        self.reference + index as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub target: DeviceTarget,
    pub request: ReadRequest,
    pub poll_interval: Duration,
}
