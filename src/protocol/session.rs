use anyhow::{anyhow, Result};
use std::{
    io::{self, Write},
    net::{Shutdown, TcpStream, ToSocketAddrs},
    time::Duration,
};

use crate::{
    core::error::PollError,
    protocol::{
        modbus::read_modbus_frame,
        types::{Backend, DeviceTarget, MAX_SLAVE_ID},
    },
};

/// Connect, read and write timeout applied by the transport.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_millis(500);

/// Unit identifier Modbus TCP gateways use to address themselves.
const TCP_GATEWAY_UNIT_ID: u8 = 0xFF;

/// The single connection to the polled device.
///
/// A session is bound to one [`DeviceTarget`] for its whole life. Closing is
/// idempotent and also happens on drop.
#[derive(Debug)]
pub struct Session {
    target: DeviceTarget,
    unit_id: u8,
    debug: bool,
    stream: Option<TcpStream>,
}

impl Session {
    /// Open a session the way the dashboard needs it: tracing off, unit id
    /// bound, connection established.
    pub fn open(target: &DeviceTarget) -> Result<Self, PollError> {
        if target.backend != Backend::Tcp {
            return Err(PollError::UnsupportedMode {
                backend: target.backend,
            });
        }

        let mut session = Session::new_tcp(target);
        session.set_debug(false);
        session.set_slave(target.unit_id)?;
        session.connect()?;
        Ok(session)
    }

    fn new_tcp(target: &DeviceTarget) -> Self {
        Self {
            target: target.clone(),
            unit_id: 1,
            debug: false,
            stream: None,
        }
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    /// Bind the unit identifier used for every request.
    pub fn set_slave(&mut self, unit_id: u8) -> Result<(), PollError> {
        if unit_id > MAX_SLAVE_ID && unit_id != TCP_GATEWAY_UNIT_ID {
            return Err(PollError::InvalidSlaveId { unit_id });
        }
        self.unit_id = unit_id;
        Ok(())
    }

    pub fn connect(&mut self) -> Result<(), PollError> {
        let host = self.target.host.as_str();
        let port = self.target.port;
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|err| PollError::ConnectionFailed {
                reason: err.to_string(),
            })?;

        let mut last_error = None;
        for addr in addrs {
            log::debug!("Connecting to {addr}");
            match TcpStream::connect_timeout(&addr, RESPONSE_TIMEOUT) {
                Ok(stream) => {
                    configure_stream(&stream).map_err(|err| PollError::ConnectionFailed {
                        reason: err.to_string(),
                    })?;
                    log::info!("Connected to {addr} (unit id {})", self.unit_id);
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(err) => {
                    log::warn!("Failed to connect to {addr}: {err}");
                    last_error = Some(err);
                }
            }
        }

        Err(PollError::ConnectionFailed {
            reason: last_error
                .map(|err| err.to_string())
                .unwrap_or_else(|| format!("no address found for {host}")),
        })
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn unit_id(&self) -> u8 {
        self.unit_id
    }

    pub fn target(&self) -> &DeviceTarget {
        &self.target
    }

    /// Close the connection. Does nothing when it was never opened or is
    /// already closed.
    pub fn close(&mut self) {
        let Some(stream) = self.stream.take() else {
            return;
        };
        if let Err(err) = stream.shutdown(Shutdown::Both) {
            log::debug!("Ignoring shutdown error: {err}");
        }
        log::info!(
            "Closed session to {}:{}",
            self.target.host,
            self.target.port
        );
    }

    /// Send one request frame and wait for its response frame.
    pub fn transact(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| anyhow!("Session is not connected"))?;

        if self.debug {
            log::debug!("[{:02x?}]", request);
        }
        stream.write_all(request).map_err(describe_io_error)?;

        let response = read_modbus_frame(stream)
            .map_err(|err| match err.downcast::<io::Error>() {
                Ok(io_err) => describe_io_error(io_err),
                Err(err) => err,
            })?
            .ok_or_else(|| anyhow!("Connection closed by peer"))?;

        if self.debug {
            log::debug!("<{:02x?}>", response);
        }
        Ok(response)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

fn configure_stream(stream: &TcpStream) -> io::Result<()> {
    stream.set_nodelay(true)?;
    stream.set_read_timeout(Some(RESPONSE_TIMEOUT))?;
    stream.set_write_timeout(Some(RESPONSE_TIMEOUT))?;
    Ok(())
}

fn describe_io_error(err: io::Error) -> anyhow::Error {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => anyhow!("Connection timed out"),
        io::ErrorKind::UnexpectedEof => anyhow!("Connection closed by peer"),
        _ => err.into(),
    }
}
