use time_rpc::{cli::ServerCli, server, utils::logging};

/// Time RPC Server
///
/// Serves `RequestTime` on port 50051 until SIGINT or SIGTERM.
///
/// Usage: RUST_LOG=debug cargo run --bin time-rpc-server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerCli::parse_config();

    logging::init_logging()?;

    if let Err(e) = server::run(config).await {
        tracing::error!("Error running time RPC server: {}", e);
        return Err(e.into());
    }

    Ok(())
}
