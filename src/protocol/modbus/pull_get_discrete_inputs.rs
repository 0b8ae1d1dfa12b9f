use anyhow::Result;

use rmodbus::{client::ModbusRequest, ModbusProto};

use super::unpack_bits;

/// Generate a Modbus TCP request to read discrete inputs (function 0x02).
pub fn generate_pull_get_discrete_inputs_request(
    id: u8,
    start_address: u16,
    count: u16,
) -> Result<(ModbusRequest, Vec<u8>)> {
    let mut request = ModbusRequest::new(id, ModbusProto::TcpUdp);
    let mut raw = Vec::with_capacity(12);
    request.generate_get_discretes(start_address, count, &mut raw)?;
    Ok((request, raw))
}

/// Parse a read-discrete-inputs response into `count` states.
pub fn parse_pull_get_discrete_inputs(
    request: &mut ModbusRequest,
    response: &[u8],
    count: u16,
) -> Result<Vec<bool>> {
    request.parse_ok(response)?;
    let values = unpack_bits(response, count, "discrete inputs")?;
    log::debug!("Received discrete inputs: {values:?}");
    Ok(values)
}
