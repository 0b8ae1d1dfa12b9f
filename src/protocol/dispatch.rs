use anyhow::Result;
use rmodbus::client::ModbusRequest;

use crate::{
    core::error::PollError,
    protocol::{
        buffer::SampleBuffer,
        modbus::*,
        session::Session,
        types::{DataSpace, ReadRequest},
    },
};

/// Run one read of `request` against the device and store the result.
///
/// Index 0 of `buffer` receives the starting reference. Returns how many
/// points the device delivered. Every failure is reported as
/// [`PollError::Read`] and is meant to end the poll session.
pub fn read_samples(
    session: &mut Session,
    request: &ReadRequest,
    buffer: &mut SampleBuffer,
) -> Result<usize, PollError> {
    if !buffer.matches(request.space) {
        return Err(PollError::read(format!(
            "Sample buffer does not hold {} values",
            request.space
        )));
    }

    let unit_id = session.unit_id();
    let address = request.address();
    let count = request.count;
    log::trace!(
        "Reading {count} x {} at address {address} from unit {unit_id}",
        request.space
    );

    let stored = match request.space {
        DataSpace::Coils => {
            let values = exchange(
                session,
                generate_pull_get_coils_request(unit_id, address, count),
                |req, resp| parse_pull_get_coils(req, resp, count),
            )?;
            buffer.store_bits(&values)
        }
        DataSpace::DiscreteInputs => {
            let values = exchange(
                session,
                generate_pull_get_discrete_inputs_request(unit_id, address, count),
                |req, resp| parse_pull_get_discrete_inputs(req, resp, count),
            )?;
            buffer.store_bits(&values)
        }
        DataSpace::InputRegisters => {
            let values = exchange(
                session,
                generate_pull_get_inputs_request(unit_id, address, count),
                |req, resp| parse_pull_get_inputs(req, resp, count),
            )?;
            buffer.store_registers(&values)
        }
        DataSpace::HoldingRegisters => {
            let values = exchange(
                session,
                generate_pull_get_holdings_request(unit_id, address, count),
                |req, resp| parse_pull_get_holdings(req, resp, count),
            )?;
            buffer.store_registers(&values)
        }
    };

    stored.ok_or_else(|| PollError::read("Sample buffer shape changed during read"))
}

fn exchange<T>(
    session: &mut Session,
    generated: Result<(ModbusRequest, Vec<u8>)>,
    parse: impl FnOnce(&mut ModbusRequest, &[u8]) -> Result<Vec<T>>,
) -> Result<Vec<T>, PollError> {
    let (mut request, raw) = generated.map_err(read_error)?;
    let response = session.transact(&raw).map_err(read_error)?;
    parse(&mut request, &response).map_err(read_error)
}

fn read_error(err: anyhow::Error) -> PollError {
    PollError::read(format!("{err:#}"))
}
