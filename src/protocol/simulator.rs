//! A small Modbus TCP device used to rehearse a commissioning session
//! without hardware, and by the test-suite.
//!
//! All configured units share one data block, like a gateway fronting
//! identical devices.

use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use rand::Rng;
use std::{
    io::Write,
    net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs},
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use rmodbus::{
    server::{context::ModbusContext, storage::ModbusStorageSmall, ModbusFrame},
    ModbusProto,
};

use crate::protocol::modbus::{build_slave_response, read_modbus_frame};

pub type SharedStorage = Arc<Mutex<ModbusStorageSmall>>;

pub struct DeviceSimulator {
    listener: TcpListener,
    storage: SharedStorage,
    units: Vec<u8>,
    request_limit: Option<usize>,
}

impl DeviceSimulator {
    pub fn bind(addr: impl ToSocketAddrs, units: Vec<u8>) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self {
            listener,
            storage: Arc::new(Mutex::new(ModbusStorageSmall::new())),
            units,
            request_limit: None,
        })
    }

    /// Drop each connection after it has been answered `limit` times.
    pub fn with_request_limit(mut self, limit: usize) -> Self {
        self.request_limit = Some(limit);
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn storage(&self) -> SharedStorage {
        self.storage.clone()
    }

    /// Accept connections forever, one thread per client.
    pub fn serve(self) -> Result<()> {
        log::info!("Device simulator listening on {}", self.listener.local_addr()?);
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    log::warn!("Failed to accept connection: {err}");
                    continue;
                }
            };
            let storage = self.storage.clone();
            let units = self.units.clone();
            let limit = self.request_limit;
            thread::spawn(move || {
                let peer = stream
                    .peer_addr()
                    .map(|addr| addr.to_string())
                    .unwrap_or_else(|_| "unknown peer".to_string());
                log::info!("Client connected: {peer}");
                match serve_connection(stream, &storage, &units, limit) {
                    Ok(()) => log::info!("Client disconnected: {peer}"),
                    Err(err) => log::warn!("Client {peer} dropped: {err:#}"),
                }
            });
        }
        Ok(())
    }

    /// Serve from a background thread and return the bound address.
    pub fn spawn(self) -> Result<(SocketAddr, JoinHandle<()>)> {
        let addr = self.local_addr()?;
        let handle = thread::Builder::new()
            .name("device-simulator".to_string())
            .spawn(move || {
                if let Err(err) = self.serve() {
                    log::error!("Device simulator stopped: {err:#}");
                }
            })?;
        Ok((addr, handle))
    }
}

fn serve_connection(
    mut stream: TcpStream,
    storage: &SharedStorage,
    units: &[u8],
    request_limit: Option<usize>,
) -> Result<()> {
    let mut answered = 0usize;
    while let Some(request) = read_modbus_frame(&mut stream)? {
        if request_limit.is_some_and(|limit| answered >= limit) {
            log::info!("Request limit reached, closing connection");
            return Ok(());
        }

        let unit_id = *request
            .get(6)
            .ok_or_else(|| anyhow!("Frame without unit identifier"))?;
        if !units.contains(&unit_id) {
            log::warn!("Ignoring request for unknown unit {unit_id}");
            continue;
        }

        let mut response = Vec::new();
        let mut frame = ModbusFrame::new(unit_id, &request, ModbusProto::TcpUdp, &mut response);
        frame.parse()?;

        let reply = {
            let mut context = storage.lock();
            build_slave_response(&mut frame, &mut *context)
        };
        match reply {
            Ok(Some(bytes)) => {
                stream.write_all(&bytes)?;
                answered += 1;
            }
            Ok(None) => {}
            Err(err) => log::warn!("Failed to answer request: {err:#}"),
        }
    }
    Ok(())
}

/// Refresh the first `registers` points with random values in `0..=1000`
/// every `period`.
///
/// All four tables show the same block: registers get the value, coils and
/// discrete inputs are set when it is non-zero.
pub fn spawn_value_generator(
    storage: SharedStorage,
    registers: u16,
    period: Duration,
) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("value-generator".to_string())
        .spawn(move || {
            let mut rng = rand::rng();
            loop {
                {
                    let mut context = storage.lock();
                    for reg in 0..registers {
                        let value: u16 = rng.random_range(0..=1000);
                        if let Err(err) = store_point(&mut *context, reg, value) {
                            log::error!("Failed to update point {reg}: {err:?}");
                            return;
                        }
                    }
                }
                thread::sleep(period);
            }
        })?;
    Ok(handle)
}

fn store_point<C: ModbusContext>(
    context: &mut C,
    reg: u16,
    value: u16,
) -> Result<(), rmodbus::ErrorKind> {
    context.set_input(reg, value)?;
    context.set_holding(reg, value)?;
    context.set_coil(reg, value != 0)?;
    context.set_discrete(reg, value != 0)
}
