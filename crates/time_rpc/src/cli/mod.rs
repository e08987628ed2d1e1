use clap::{ArgAction, CommandFactory, Parser};

use crate::config::{ClientConfig, DEFAULT_TARGET, ServerConfig};

/// Time RPC client
///
/// Asks a time RPC server for the current time in one of three zones and
/// logs the answer.
///
/// ## Environment Variables
/// - `RUST_LOG`: Controls logging verbosity (trace, debug, info, warn, error)
#[derive(Parser, Debug, Clone)]
#[command(name = "time-rpc-client")]
#[command(about = "Request the current time in a timezone from a time RPC server")]
#[command(version)]
#[command(disable_help_flag = true)]
#[command(override_usage = "time-rpc-client [timezone [target]]")]
pub struct ClientCli {
    /// Id of the requested timezone: 1 = UTC, 2 = GMT, 3 = ECT
    #[arg(value_name = "timezone", default_value_t = 1, allow_negative_numbers = true)]
    pub selector: i32,

    /// The server to connect to
    #[arg(value_name = "target", default_value = DEFAULT_TARGET)]
    pub target: String,

    /// Print usage to stderr and exit with status 1
    #[arg(long, action = ArgAction::SetTrue)]
    pub help: bool,
}

/// What the client binary should do
#[derive(Debug, Clone)]
pub struct ClientInvocation {
    pub selector: i32,
    pub config: ClientConfig,
}

impl ClientCli {
    /// Parse CLI arguments and convert to configuration
    ///
    /// `--help` writes the usage to stderr and terminates the process with
    /// status 1; malformed arguments terminate it with clap's usage error.
    pub fn parse_config() -> ClientInvocation {
        let cli = Self::parse();
        if cli.help {
            eprintln!("{}", Self::command().render_help());
            std::process::exit(1);
        }
        cli.into_invocation()
    }

    pub fn into_invocation(self) -> ClientInvocation {
        ClientInvocation {
            selector: self.selector,
            config: ClientConfig::new(self.target),
        }
    }
}

/// Time RPC server
///
/// Answers `RequestTime` calls on port 50051 until SIGINT or SIGTERM, then
/// drains in-flight calls for up to 30 seconds.
///
/// ## Environment Variables
/// - `RUST_LOG`: Controls logging verbosity (trace, debug, info, warn, error)
#[derive(Parser, Debug, Clone)]
#[command(name = "time-rpc-server")]
#[command(about = "Serve the current time in any timezone over RPC on port 50051")]
#[command(version)]
pub struct ServerCli {}

impl ServerCli {
    pub fn parse_config() -> ServerConfig {
        let _ = Self::parse();
        ServerConfig::default()
    }
}
