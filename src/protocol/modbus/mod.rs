mod frame;
mod header;
mod pull_get_coils;
mod pull_get_discrete_inputs;
mod pull_get_holdings;
mod pull_get_inputs;
mod slave;

use anyhow::{ensure, Result};

pub use frame::read_modbus_frame;
pub use header::{parse_modbus_header, MBAP_HEADER_LEN};
pub use pull_get_coils::{generate_pull_get_coils_request, parse_pull_get_coils};
pub use pull_get_discrete_inputs::{
    generate_pull_get_discrete_inputs_request, parse_pull_get_discrete_inputs,
};
pub use pull_get_holdings::{generate_pull_get_holdings_request, parse_pull_get_holdings};
pub use pull_get_inputs::{generate_pull_get_inputs_request, parse_pull_get_inputs};
pub use slave::build_slave_response;

/// MBAP header, unit identifier and function code precede the byte count.
const BYTE_COUNT_OFFSET: usize = MBAP_HEADER_LEN + 2;

/// Data bytes of a read response, after checking them against the byte count.
fn read_payload<'a>(response: &'a [u8], what: &str) -> Result<&'a [u8]> {
    ensure!(
        response.len() > BYTE_COUNT_OFFSET,
        "Response for {what} too short ({} bytes)",
        response.len()
    );
    let byte_count = response[BYTE_COUNT_OFFSET] as usize;
    let payload = &response[BYTE_COUNT_OFFSET + 1..];
    ensure!(
        payload.len() == byte_count,
        "Invalid byte count in {what} response: announced {byte_count}, got {}",
        payload.len()
    );
    Ok(payload)
}

fn unpack_bits(response: &[u8], count: u16, what: &str) -> Result<Vec<bool>> {
    let payload = read_payload(response, what)?;

    // Modbus pack: first point corresponds to LSB (bit0) of first data byte.
    let mut values = payload
        .iter()
        .flat_map(|byte| (0..8).map(move |i| (byte & (1 << i)) != 0))
        .collect::<Vec<bool>>();
    if values.len() > count as usize {
        values.truncate(count as usize);
    }
    ensure!(
        values.len() == count as usize,
        "Invalid number of {what} in response"
    );
    Ok(values)
}

fn unpack_registers(response: &[u8], count: u16, what: &str) -> Result<Vec<u16>> {
    let payload = read_payload(response, what)?;
    ensure!(
        payload.len() % 2 == 0,
        "Odd byte count in {what} response"
    );

    let values = payload
        .chunks_exact(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect::<Vec<_>>();
    ensure!(
        values.len() == count as usize,
        "Invalid number of {what} in response: expected {count}, got {}",
        values.len()
    );
    Ok(values)
}
