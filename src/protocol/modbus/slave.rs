use anyhow::{anyhow, Result};
use rmodbus::server::{context::ModbusContext, ModbusFrame};

/// Process a parsed request frame against `context` and return the response
/// bytes, if the frame expects one.
pub fn build_slave_response<C: ModbusContext>(
    request: &mut ModbusFrame<Vec<u8>>,
    context: &mut C,
) -> Result<Option<Vec<u8>>> {
    if request.processing_required {
        let result = if request.readonly {
            request.process_read(&*context)
        } else {
            request.process_write(context)
        };
        if let Err(err) = result {
            return Err(anyhow!("Frame processing error: {err:?}"));
        }
    }
    if request.response_required {
        request.finalize_response()?;
        log::debug!("Send Modbus {:?} response: {:02x?}", request.func, request.response);
        return Ok(Some(request.response.clone()));
    }
    Ok(None)
}
