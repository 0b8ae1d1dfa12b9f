use std::process::ExitCode;

fn main() -> ExitCode {
    modpoll::boot::init_common();
    let matches = modpoll::cli::parse_args();
    modpoll::boot::run(&matches)
}
