use anyhow::{ensure, Result};

/// Size of the MBAP header that prefixes every Modbus TCP frame.
pub const MBAP_HEADER_LEN: usize = 6;

/// Largest PDU plus unit identifier allowed behind an MBAP header.
const MAX_MBAP_BODY_LEN: usize = 254;

/// Return how many bytes follow the MBAP header (unit id + PDU).
pub fn parse_modbus_header(buf: [u8; MBAP_HEADER_LEN]) -> Result<usize> {
    let protocol_id = u16::from_be_bytes([buf[2], buf[3]]);
    ensure!(protocol_id == 0, "Invalid protocol identifier {protocol_id}");

    let len = u16::from_be_bytes([buf[4], buf[5]]) as usize;
    ensure!(
        (2..=MAX_MBAP_BODY_LEN).contains(&len),
        "Invalid MBAP length field {len}"
    );
    Ok(len)
}
