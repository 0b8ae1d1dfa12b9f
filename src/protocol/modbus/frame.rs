use anyhow::Result;
use std::io::{ErrorKind, Read};

use super::{parse_modbus_header, MBAP_HEADER_LEN};

/// Read one complete Modbus TCP frame (MBAP header included).
///
/// Returns `Ok(None)` when the peer closed the stream before a new frame
/// started.
pub fn read_modbus_frame(stream: &mut impl Read) -> Result<Option<Vec<u8>>> {
    let mut header_buf = [0u8; MBAP_HEADER_LEN];
    match stream.read_exact(&mut header_buf) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err.into()),
    }

    let len = parse_modbus_header(header_buf)?;
    let mut full_buf = Vec::with_capacity(MBAP_HEADER_LEN + len);
    full_buf.extend_from_slice(&header_buf);
    full_buf.resize(MBAP_HEADER_LEN + len, 0);
    stream.read_exact(&mut full_buf[MBAP_HEADER_LEN..])?;

    log::trace!(
        "Received Modbus frame: {}",
        full_buf
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" "),
    );

    Ok(Some(full_buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_complete_frame() {
        let raw = [0u8, 1, 0, 0, 0, 5, 1, 4, 2, 0x12, 0x34, 0xFF];
        let mut cursor = Cursor::new(raw.to_vec());
        let frame = read_modbus_frame(&mut cursor).unwrap().unwrap();
        assert_eq!(frame, raw[..11].to_vec());
    }

    #[test]
    fn test_clean_eof_is_none() {
        let mut cursor = Cursor::new(Vec::new());
        assert!(read_modbus_frame(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_truncated_body_is_error() {
        let mut cursor = Cursor::new(vec![0u8, 1, 0, 0, 0, 5, 1, 4]);
        assert!(read_modbus_frame(&mut cursor).is_err());
    }
}
