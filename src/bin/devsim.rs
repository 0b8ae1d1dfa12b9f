use anyhow::Result;
use clap::{Arg, Command};
use std::time::Duration;

use modpoll::protocol::simulator::{spawn_value_generator, DeviceSimulator};

fn main() -> Result<()> {
    modpoll::boot::init_simulator_logger();

    let matches = Command::new("devsim")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Modbus TCP device simulator with randomly changing input registers")
        .arg(
            Arg::new("listen")
                .long("listen")
                .value_name("ADDR")
                .help("Address to accept connections on")
                .default_value("127.0.0.1:5020"),
        )
        .arg(
            Arg::new("units")
                .long("units")
                .value_name("LIST")
                .help("Comma separated unit identifiers to answer for")
                .value_delimiter(',')
                .value_parser(clap::value_parser!(u8))
                .default_value("1,2,3"),
        )
        .arg(
            Arg::new("period")
                .long("period")
                .value_name("MS")
                .help("Milliseconds between input register updates")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("100"),
        )
        .arg(
            Arg::new("registers")
                .long("registers")
                .value_name("COUNT")
                .help("Number of points kept changing in every table")
                .value_parser(clap::value_parser!(u16))
                .default_value("10"),
        )
        .get_matches();

    let listen = matches
        .get_one::<String>("listen")
        .cloned()
        .unwrap_or_else(|| "127.0.0.1:5020".to_string());
    let units: Vec<u8> = matches
        .get_many::<u8>("units")
        .map(|units| units.copied().collect())
        .unwrap_or_else(|| vec![1, 2, 3]);
    let period = Duration::from_millis(matches.get_one::<u64>("period").copied().unwrap_or(100));
    let registers = matches.get_one::<u16>("registers").copied().unwrap_or(10);

    let simulator = DeviceSimulator::bind(listen.as_str(), units.clone())?;
    log::info!("Answering for units {units:?}, {registers} points every {period:?}");
    spawn_value_generator(simulator.storage(), registers, period)?;
    simulator.serve()
}
