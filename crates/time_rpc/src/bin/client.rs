use std::process::ExitCode;

use time_rpc::{TimeClient, cli::ClientCli, utils::logging};

/// Time RPC Client
///
/// Usage: cargo run --bin time-rpc-client -- [timezone [target]]
#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let invocation = ClientCli::parse_config();

    logging::init_logging()?;

    let client = match TimeClient::connect(invocation.config).await {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("RPC failed: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    // The outcome is logged by the client itself
    let outcome = client.request(invocation.selector).await;

    if let Err(e) = client.shutdown().await {
        tracing::debug!("Channel release failed: {}", e);
    }

    Ok(match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    })
}
