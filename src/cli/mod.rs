pub mod config;

use clap::{Arg, ArgAction, ArgMatches, Command};

pub use config::build_poll_config;

/// Command definition for the `modpoll` binary.
///
/// Numeric flags are parsed as `i64` so that out-of-range values reach
/// [`build_poll_config`] and get the same diagnostics as other bad values.
pub fn command() -> Command {
    Command::new("modpoll")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Poll a Modbus device and show the values in a live dashboard")
        .override_usage("modpoll [options] HOST")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("mode")
                .short('m')
                .value_name("MODE")
                .help("Communication mode: tcp (default), udp, rtu or ascii")
                .default_value("tcp"),
        )
        .arg(
            Arg::new("slave")
                .short('a')
                .value_name("ID")
                .help("Slave address (1-247, 1 is default)")
                .default_value("1")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("reference")
                .short('r')
                .value_name("REF")
                .help("Start data reference (1-65536, 100 is default)")
                .default_value("100")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("count")
                .short('c')
                .value_name("COUNT")
                .help("Number of data values to read (1-125, 1 is default)")
                .default_value("1")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("type")
                .short('t')
                .value_name("TYPE")
                .help(
                    "Data type: 1 coils, 2 discrete inputs, \
                     3 16-bit input registers (default), 4 16-bit holding registers",
                )
                .default_value("3")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .value_name("PORT")
                .help("TCP port number (502 is default)")
                .default_value("502")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("rate")
                .short('R')
                .value_name("MS")
                .help("Poll rate in milliseconds (1000 is default)")
                .default_value("1000")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("host")
                .value_name("HOST")
                .help("Address of the device to poll"),
        )
        .arg(
            Arg::new("help")
                .long("help")
                .help("Display this help and exit")
                .action(ArgAction::Help),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Output version information and exit")
                .action(ArgAction::Version),
        )
}

/// Parse command line arguments and return ArgMatches.
///
/// Usage errors, `--help` and `--version` terminate the process here.
pub fn parse_args() -> ArgMatches {
    command().get_matches()
}
