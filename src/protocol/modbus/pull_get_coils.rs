use anyhow::Result;

use rmodbus::{client::ModbusRequest, ModbusProto};

use super::unpack_bits;

/// Generate a Modbus TCP request to read coils (function 0x01).
pub fn generate_pull_get_coils_request(
    id: u8,
    start_address: u16,
    count: u16,
) -> Result<(ModbusRequest, Vec<u8>)> {
    let mut request = ModbusRequest::new(id, ModbusProto::TcpUdp);
    let mut raw = Vec::with_capacity(12);
    request.generate_get_coils(start_address, count, &mut raw)?;
    Ok((request, raw))
}

/// Parse a read-coils response into `count` states.
pub fn parse_pull_get_coils(
    request: &mut ModbusRequest,
    response: &[u8],
    count: u16,
) -> Result<Vec<bool>> {
    request.parse_ok(response)?;
    let values = unpack_bits(response, count, "coils")?;
    log::debug!("Received coils: {values:?}");
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_layout() {
        let (_, raw) = generate_pull_get_coils_request(7, 0, 3).unwrap();
        // MBAP (6) + unit + function + address (2) + quantity (2)
        assert_eq!(raw.len(), 12);
        assert_eq!(&raw[2..6], &[0, 0, 0, 6]);
        assert_eq!(&raw[6..], &[7, 0x01, 0, 0, 0, 3]);
    }

    #[test]
    fn test_parse_lsb_first() {
        let (mut request, raw) = generate_pull_get_coils_request(1, 0, 3).unwrap();
        // 0b101: first and third coil set
        let response = [raw[0], raw[1], 0, 0, 0, 4, 1, 0x01, 1, 0b0000_0101];
        let values = parse_pull_get_coils(&mut request, &response, 3).unwrap();
        assert_eq!(values, vec![true, false, true]);
    }

    #[test]
    fn test_parse_exception_response() {
        let (mut request, raw) = generate_pull_get_coils_request(1, 0, 3).unwrap();
        let response = [raw[0], raw[1], 0, 0, 0, 3, 1, 0x81, 0x02];
        assert!(parse_pull_get_coils(&mut request, &response, 3).is_err());
    }
}
