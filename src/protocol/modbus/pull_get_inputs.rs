use anyhow::Result;

use rmodbus::{client::ModbusRequest, ModbusProto};

use super::unpack_registers;

/// Generate a Modbus TCP request to read input registers (function 0x04).
pub fn generate_pull_get_inputs_request(
    id: u8,
    start_address: u16,
    count: u16,
) -> Result<(ModbusRequest, Vec<u8>)> {
    let mut request = ModbusRequest::new(id, ModbusProto::TcpUdp);
    let mut raw = Vec::with_capacity(12);
    request.generate_get_inputs(start_address, count, &mut raw)?;
    Ok((request, raw))
}

/// Parse a read-input-registers response (big-endian words).
pub fn parse_pull_get_inputs(
    request: &mut ModbusRequest,
    response: &[u8],
    count: u16,
) -> Result<Vec<u16>> {
    request.parse_ok(response)?;
    let values = unpack_registers(response, count, "input registers")?;
    log::debug!("Received input registers: {values:?}");
    Ok(values)
}
