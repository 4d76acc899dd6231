//! Daemon bootstrap: parse the command line, initialise logging, load
//! the configuration, and install it as the process-wide snapshot.
//!
//! The network listener, command dispatch, and filesystem layers attach
//! on top of the installed snapshot; `--config-check` stops after the
//! load so the binary doubles as an offline config validator.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgAction, Command};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cfg::Config;

fn cli() -> Command {
    Command::new("ebftpd")
        .about("Pure-Rust FTP daemon with glftpd-compatible configuration")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Config file path (default: search for ebftpd.conf)"),
        )
        .arg(
            Arg::new("config-check")
                .long("config-check")
                .action(ArgAction::SetTrue)
                .help("Validate the config and exit"),
        )
        .arg(
            Arg::new("tool")
                .long("tool")
                .action(ArgAction::SetTrue)
                .help("Relax command ACL validation for offline tooling"),
        )
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let explicit = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let Some(path) = Config::locate(explicit) else {
        error!("unable to find {} on the search path", cfg::CONFIG_FILE);
        return ExitCode::FAILURE;
    };

    let tool = matches.get_flag("tool");
    let config = if tool {
        Config::load_tool(&path)
    } else {
        Config::load(&path)
    };

    let config = match config {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = config.version(),
        path = %path.display(),
        site = config.sitename_long(),
        port = config.port(),
        speed_limits = config.speed_limit().len(),
        site_cmds = config.site_cmd().len(),
        "configuration loaded"
    );

    if matches.get_flag("config-check") {
        return ExitCode::SUCCESS;
    }

    cfg::install(config);
    ExitCode::SUCCESS
}
