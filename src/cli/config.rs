use clap::ArgMatches;
use std::{str::FromStr, time::Duration};

use crate::{
    core::error::PollError,
    protocol::types::{
        Backend, DataSpace, DeviceTarget, PollConfig, ReadRequest, MAX_POINT_COUNT,
        MAX_REFERENCE, MAX_SLAVE_ID, MIN_SLAVE_ID,
    },
};

/// Turn parsed arguments into a validated [`PollConfig`].
///
/// Nothing is opened here; every rejection is an argument error.
pub fn build_poll_config(matches: &ArgMatches) -> Result<PollConfig, PollError> {
    let mode = matches
        .get_one::<String>("mode")
        .map(String::as_str)
        .unwrap_or("tcp");
    let backend = Backend::from_str(mode)
        .map_err(|_| PollError::argument(format!("Invalid communication mode {mode}")))?;

    let space = parse_data_space(integer(matches, "type", 3))?;

    let host = matches
        .get_one::<String>("host")
        .cloned()
        .ok_or_else(|| PollError::argument("HOST argument is required."))?;

    let unit_id = validate_slave_id(integer(matches, "slave", 1))?;
    let request = validate_request(
        space,
        integer(matches, "reference", 100),
        integer(matches, "count", 1),
    )?;

    let port = integer(matches, "port", 502);
    let port = u16::try_from(port)
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| PollError::argument(format!("Invalid port {port}.")))?;

    let rate = integer(matches, "rate", 1000);
    let rate = u64::try_from(rate)
        .ok()
        .filter(|r| *r != 0)
        .ok_or_else(|| PollError::argument(format!("Invalid poll rate {rate}.")))?;

    if backend == Backend::Tcp && !is_valid_host(&host) {
        return Err(PollError::argument("Invalid IPv4 HOST address"));
    }

    Ok(PollConfig {
        target: DeviceTarget {
            backend,
            host,
            port,
            unit_id,
        },
        request,
        poll_interval: Duration::from_millis(rate),
    })
}

fn integer(matches: &ArgMatches, id: &str, default: i64) -> i64 {
    matches.get_one::<i64>(id).copied().unwrap_or(default)
}

pub fn validate_slave_id(id: i64) -> Result<u8, PollError> {
    u8::try_from(id)
        .ok()
        .filter(|id| (MIN_SLAVE_ID..=MAX_SLAVE_ID).contains(id))
        .ok_or_else(|| PollError::argument(format!("Invalid slave address {id}.")))
}

pub fn parse_data_space(flag: i64) -> Result<DataSpace, PollError> {
    DataSpace::from_type_flag(flag)
        .ok_or_else(|| PollError::argument(format!("Invalid data type {flag}.")))
}

pub fn validate_request(
    space: DataSpace,
    reference: i64,
    count: i64,
) -> Result<ReadRequest, PollError> {
    let reference = u32::try_from(reference)
        .ok()
        .filter(|r| (1..=MAX_REFERENCE).contains(r))
        .ok_or_else(|| PollError::argument(format!("Invalid start reference {reference}.")))?;
    let count = u16::try_from(count)
        .ok()
        .filter(|c| (1..=MAX_POINT_COUNT).contains(c))
        .ok_or_else(|| PollError::argument(format!("Invalid number of values {count}.")))?;

    if reference - 1 + count as u32 > MAX_REFERENCE {
        return Err(PollError::argument(format!(
            "Reading {count} values from reference {reference} runs past reference {MAX_REFERENCE}."
        )));
    }

    Ok(ReadRequest {
        space,
        reference,
        count,
    })
}

/// Host check for the TCP backend.
///
/// Any non-empty name is accepted; resolution problems surface when the
/// session connects.
fn is_valid_host(host: &str) -> bool {
    !host.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::command;

    fn config_from(args: &[&str]) -> Result<PollConfig, PollError> {
        let mut argv = vec!["modpoll"];
        argv.extend_from_slice(args);
        let matches = command().try_get_matches_from(argv).unwrap();
        build_poll_config(&matches)
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&["10.0.0.5"]).unwrap();
        assert_eq!(config.target.backend, Backend::Tcp);
        assert_eq!(config.target.host, "10.0.0.5");
        assert_eq!(config.target.port, 502);
        assert_eq!(config.target.unit_id, 1);
        assert_eq!(config.request.space, DataSpace::InputRegisters);
        assert_eq!(config.request.reference, 100);
        assert_eq!(config.request.address(), 99);
        assert_eq!(config.request.count, 1);
        assert_eq!(config.poll_interval, Duration::from_millis(1000));
    }

    #[test]
    fn test_coils_scenario() {
        let config = config_from(&["-t", "1", "-c", "3", "-r", "1", "10.0.0.5"]).unwrap();
        assert_eq!(config.request.space, DataSpace::Coils);
        assert_eq!(config.request.address(), 0);
        assert_eq!(config.request.count, 3);
    }

    #[test]
    fn test_all_flags() {
        let config = config_from(&[
            "-m", "tcp", "-a", "17", "-r", "40001", "-c", "125", "-t", "4", "-p", "5020", "-R",
            "250", "plc.local",
        ])
        .unwrap();
        assert_eq!(config.target.unit_id, 17);
        assert_eq!(config.target.port, 5020);
        assert_eq!(config.target.host, "plc.local");
        assert_eq!(config.request.space, DataSpace::HoldingRegisters);
        assert_eq!(config.request.address(), 40000);
        assert_eq!(config.request.count, 125);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_slave_id_range() {
        for id in -3i64..=300 {
            let result = validate_slave_id(id);
            if (1..=247).contains(&id) {
                assert_eq!(result.unwrap() as i64, id);
            } else {
                assert!(matches!(result, Err(PollError::Argument { .. })), "id {id}");
            }
        }
    }

    #[test]
    fn test_out_of_range_slave_rejected() {
        let err = config_from(&["-a", "300", "10.0.0.5"]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid slave address 300.");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_data_type_rejected() {
        for flag in ["0", "5", "-1"] {
            let err = config_from(&["-t", flag, "10.0.0.5"]).unwrap_err();
            assert_eq!(err.to_string(), format!("Invalid data type {flag}."));
        }
    }

    #[test]
    fn test_missing_host() {
        let err = config_from(&["-a", "2"]).unwrap_err();
        assert_eq!(err.to_string(), "HOST argument is required.");
    }

    #[test]
    fn test_invalid_mode() {
        let err = config_from(&["-m", "serial", "10.0.0.5"]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid communication mode serial");
    }

    #[test]
    fn test_non_tcp_modes_are_accepted_by_config() {
        for (flag, backend) in [
            ("udp", Backend::Udp),
            ("rtu", Backend::Rtu),
            ("ascii", Backend::Ascii),
        ] {
            let config = config_from(&["-m", flag, "/dev/ttyUSB0"]).unwrap();
            assert_eq!(config.target.backend, backend);
        }
    }

    #[test]
    fn test_request_bounds() {
        let space = DataSpace::HoldingRegisters;
        assert!(validate_request(space, 0, 1).is_err());
        assert!(validate_request(space, 65537, 1).is_err());
        assert!(validate_request(space, 1, 0).is_err());
        assert!(validate_request(space, 1, 126).is_err());
        assert!(validate_request(space, 65536, 1).is_ok());
        assert!(validate_request(space, 65536, 2).is_err());
        assert!(validate_request(space, 65412, 125).is_ok());
        assert!(validate_request(space, 65413, 125).is_err());
    }

    #[test]
    fn test_port_and_rate_bounds() {
        assert!(config_from(&["-p", "0", "h"]).is_err());
        assert!(config_from(&["-p", "65536", "h"]).is_err());
        assert!(config_from(&["-R", "0", "h"]).is_err());
        assert!(config_from(&["-R", "-5", "h"]).is_err());
    }
}
