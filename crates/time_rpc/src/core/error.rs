use rmcp::ErrorData as McpError;
use rmcp::model::ErrorCode;
use rmcp::serde_json::json;

// Error codes carried in the RPC error message
pub(crate) const ERROR_INVALID_TIMEZONE: &str = "invalid_timezone";
pub(crate) const ERROR_SHUTTING_DOWN: &str = "shutting_down";
pub(crate) const ERROR_INTERNAL: &str = "internal_error";

/// Errors produced on either side of the time RPC
#[derive(Debug, thiserror::Error)]
pub enum TimeRpcError {
    /// The zone name is not in the timezone database or the legacy alias table
    #[error("Invalid timezone: {timezone}")]
    InvalidTimezone { timezone: String },
    /// Connection refused, deadline exceeded, channel closed, ...
    #[error("Transport failure: {message}")]
    Transport { message: String },
    /// Any other error status returned by the server
    #[error("RPC failed with status {code}: {message}")]
    Rpc { code: i32, message: String },
    #[error("Server is shutting down")]
    ShuttingDown,
    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String },
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Logging initialization failed: {0}")]
    LoggingInitialization(String),
}

impl TimeRpcError {
    pub(crate) fn transport(message: impl ToString) -> Self {
        TimeRpcError::Transport {
            message: message.to_string(),
        }
    }
}

impl From<TimeRpcError> for McpError {
    fn from(err: TimeRpcError) -> Self {
        match err {
            TimeRpcError::InvalidTimezone { timezone } => McpError::invalid_params(
                ERROR_INVALID_TIMEZONE,
                Some(json!({"timezone": timezone})),
            ),
            TimeRpcError::ShuttingDown => McpError::invalid_request(ERROR_SHUTTING_DOWN, None),
            TimeRpcError::InvalidArgument { message } => {
                McpError::invalid_params(message, None)
            }
            other => McpError::internal_error(
                ERROR_INTERNAL,
                Some(json!({"reason": other.to_string()})),
            ),
        }
    }
}

impl From<McpError> for TimeRpcError {
    /// Restores the structured variants the server encodes, falling back to a
    /// plain status for everything else.
    fn from(err: McpError) -> Self {
        if err.code == ErrorCode::INVALID_PARAMS && err.message == ERROR_INVALID_TIMEZONE {
            let timezone = err
                .data
                .as_ref()
                .and_then(|data| data.get("timezone"))
                .and_then(|tz| tz.as_str())
                .unwrap_or_default()
                .to_string();
            return TimeRpcError::InvalidTimezone { timezone };
        }
        if err.message == ERROR_SHUTTING_DOWN {
            return TimeRpcError::ShuttingDown;
        }
        TimeRpcError::Rpc {
            code: err.code.0,
            message: err.message.to_string(),
        }
    }
}

pub type TimeRpcResult<T> = Result<T, TimeRpcError>;
pub type McpResult<T> = Result<T, McpError>;
