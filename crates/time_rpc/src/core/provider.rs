use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::core::{
    clock::{Clock, SystemClock},
    error::TimeRpcResult,
    models::{TimeRequest, TimeResponse},
    utils,
};

/// Answers "what time is it in zone Z"
#[derive(Clone)]
pub struct TimeProvider {
    clock: Arc<dyn Clock>,
}

impl TimeProvider {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    pub(crate) fn parse_timezone(&self, timezone_name: &str) -> TimeRpcResult<Tz> {
        utils::resolve_zone(timezone_name)
    }

    pub fn zoned_now(&self, timezone_name: &str) -> TimeRpcResult<DateTime<Tz>> {
        let timezone = self.parse_timezone(timezone_name)?;
        Ok(self.clock.now().with_timezone(&timezone))
    }

    pub fn request_time(&self, request: &TimeRequest) -> TimeRpcResult<TimeResponse> {
        let current_time = self.zoned_now(&request.time_zone)?;

        Ok(TimeResponse {
            time: utils::format_zoned(&current_time),
        })
    }
}

impl Default for TimeProvider {
    fn default() -> Self {
        Self::new()
    }
}
