use rmcp::schemars;
use serde::{Deserialize, Deserializer, Serialize};

/// Helper function to deserialize and trim strings
fn deserialize_trimmed_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

/// Request for the current time in a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TimeRequest {
    /// Zone name, e.g. 'UTC', 'GMT', 'ECT' or an IANA name such as 'Europe/Paris'
    #[serde(rename = "timeZone", deserialize_with = "deserialize_trimmed_string")]
    pub time_zone: String,
}

impl TimeRequest {
    pub fn new(time_zone: impl Into<String>) -> Self {
        Self {
            time_zone: time_zone.into(),
        }
    }
}

/// Current time in the requested zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TimeResponse {
    /// Zoned date-time, e.g. `2024-05-01T10:15:30.123+02:00[Europe/Paris]`
    pub time: String,
}
