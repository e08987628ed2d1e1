use rmcp::{
    RoleClient, ServiceExt,
    model::{CallToolRequestParam, CallToolResult},
    service::{RunningService, ServiceError},
};
use tokio::net::TcpStream;

use crate::config::ClientConfig;
use crate::core::{
    error::{TimeRpcError, TimeRpcResult},
    models::{TimeRequest, TimeResponse},
    selector::zone_for_selector,
    utils::parse_zoned,
};

const REQUEST_TIME: &str = "RequestTime";

/// Client side of the time exchange
///
/// Holds one channel to the server for its whole life. Release it with
/// [`TimeClient::shutdown`].
pub struct TimeClient {
    channel: RunningService<RoleClient, ()>,
    config: ClientConfig,
}

impl TimeClient {
    /// Open the channel: TCP connect plus the RPC handshake, both bounded by
    /// the connect timeout.
    pub async fn connect(config: ClientConfig) -> TimeRpcResult<Self> {
        let target = config.target.clone();
        let open = async {
            let stream = TcpStream::connect(target.as_str())
                .await
                .map_err(|e| TimeRpcError::transport(format!("connect to {target}: {e}")))?;
            ().serve(stream)
                .await
                .map_err(|e| TimeRpcError::transport(format!("handshake with {target}: {e}")))
        };

        let channel = tokio::time::timeout(config.connect_timeout, open)
            .await
            .map_err(|_| {
                TimeRpcError::transport(format!(
                    "connect to {} timed out after {:?}",
                    config.target, config.connect_timeout
                ))
            })??;

        tracing::debug!(server = %config.target, "Channel open");
        Ok(Self { channel, config })
    }

    pub fn target(&self) -> &str {
        &self.config.target
    }

    /// Ask for the current time in `request.time_zone`. One call, no retries.
    pub async fn request_time(&self, request: &TimeRequest) -> TimeRpcResult<TimeResponse> {
        let arguments = match serde_json::to_value(request) {
            Ok(serde_json::Value::Object(arguments)) => arguments,
            _ => {
                return Err(TimeRpcError::InvalidArgument {
                    message: "request does not serialize to an object".to_string(),
                });
            }
        };

        let call = self.channel.peer().call_tool(CallToolRequestParam {
            name: REQUEST_TIME.into(),
            arguments: Some(arguments),
        });

        let result = tokio::time::timeout(self.config.call_timeout, call)
            .await
            .map_err(|_| {
                TimeRpcError::transport(format!(
                    "deadline exceeded after {:?}",
                    self.config.call_timeout
                ))
            })?
            .map_err(from_service_error)?;

        decode_response(result)
    }

    /// Map `id` to a zone, make the call, and log the outcome.
    pub async fn request(&self, id: i32) -> TimeRpcResult<TimeResponse> {
        let time_zone = zone_for_selector(id);
        tracing::info!("Will try to get current time of {}...", time_zone);

        match self.request_time(&TimeRequest::new(time_zone)).await {
            Ok(response) => {
                tracing::info!("The current time is: {}", response.time);
                Ok(response)
            }
            Err(e) => {
                tracing::warn!("RPC failed: {}", e);
                Err(e)
            }
        }
    }

    /// Release the channel, waiting at most the configured grace period.
    pub async fn shutdown(self) -> TimeRpcResult<()> {
        let grace = self.config.shutdown_grace;
        match tokio::time::timeout(grace, self.channel.cancel()).await {
            Ok(Ok(reason)) => {
                tracing::debug!(?reason, "Channel closed");
                Ok(())
            }
            Ok(Err(e)) => Err(TimeRpcError::transport(e)),
            Err(_) => Err(TimeRpcError::transport(format!(
                "channel did not close within {grace:?}"
            ))),
        }
    }
}

fn from_service_error(err: ServiceError) -> TimeRpcError {
    match err {
        ServiceError::McpError(error) => error.into(),
        other => TimeRpcError::transport(other),
    }
}

fn decode_response(result: CallToolResult) -> TimeRpcResult<TimeResponse> {
    let malformed = |reason: String| TimeRpcError::MalformedResponse { reason };

    if result.is_error == Some(true) {
        return Err(malformed("server flagged the result as an error".to_string()));
    }

    let text = result
        .content
        .iter()
        .find_map(|content| content.as_text())
        .map(|content| content.text.as_str())
        .ok_or_else(|| malformed("no text content".to_string()))?;

    let response: TimeResponse =
        serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
    parse_zoned(&response.time)?;

    Ok(response)
}
