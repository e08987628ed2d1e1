use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;

use crate::core::error::{TimeRpcError, TimeRpcResult};

// Date-time part of the wire string; the zone designator follows in brackets
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// Legacy three-letter zone ids and the regions they stand for.
///
/// Ids that the IANA database already knows (`EST`, `MST`, `HST`, `UTC`,
/// `GMT`, ...) never reach this table.
pub const LEGACY_ZONE_ALIASES: &[(&str, &str)] = &[
    ("ACT", "Australia/Darwin"),
    ("AET", "Australia/Sydney"),
    ("AGT", "America/Argentina/Buenos_Aires"),
    ("ART", "Africa/Cairo"),
    ("AST", "America/Anchorage"),
    ("BET", "America/Sao_Paulo"),
    ("BST", "Asia/Dhaka"),
    ("CAT", "Africa/Harare"),
    ("CNT", "America/St_Johns"),
    ("CST", "America/Chicago"),
    ("CTT", "Asia/Shanghai"),
    ("EAT", "Africa/Addis_Ababa"),
    ("ECT", "Europe/Paris"),
    ("IET", "America/Indiana/Indianapolis"),
    ("IST", "Asia/Kolkata"),
    ("JST", "Asia/Tokyo"),
    ("MIT", "Pacific/Apia"),
    ("NET", "Asia/Yerevan"),
    ("NST", "Pacific/Auckland"),
    ("PLT", "Asia/Karachi"),
    ("PNT", "America/Phoenix"),
    ("PRT", "America/Puerto_Rico"),
    ("PST", "America/Los_Angeles"),
    ("SST", "Pacific/Guadalcanal"),
    ("VST", "Asia/Ho_Chi_Minh"),
];

/// Resolve a zone name against the IANA database, then the legacy alias table.
pub fn resolve_zone(timezone_name: &str) -> TimeRpcResult<Tz> {
    if let Ok(tz) = Tz::from_str(timezone_name) {
        return Ok(tz);
    }

    LEGACY_ZONE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == timezone_name)
        .and_then(|(_, region)| Tz::from_str(region).ok())
        .ok_or_else(|| TimeRpcError::InvalidTimezone {
            timezone: timezone_name.to_string(),
        })
}

/// Format a zoned date-time as `<rfc3339>[<zone>]`.
///
/// Fractional seconds use 3, 6 or 9 digits and disappear when zero.
pub fn format_zoned(datetime: &DateTime<Tz>) -> String {
    format!(
        "{}[{}]",
        datetime.format(DATETIME_FORMAT),
        datetime.timezone().name()
    )
}

/// A zoned date-time read back from its wire form
#[derive(Debug, Clone, PartialEq)]
pub struct ZonedTime {
    pub datetime: DateTime<FixedOffset>,
    pub zone: Tz,
}

/// Parse the output of [`format_zoned`].
///
/// The offset must agree with what the zone prescribes at that instant.
pub fn parse_zoned(value: &str) -> TimeRpcResult<ZonedTime> {
    let malformed = |reason: &str| TimeRpcError::MalformedResponse {
        reason: format!("{reason}: '{value}'"),
    };

    let (datetime_part, zone_part) = value
        .strip_suffix(']')
        .and_then(|rest| rest.split_once('['))
        .ok_or_else(|| malformed("missing zone designator"))?;

    let datetime = DateTime::parse_from_rfc3339(datetime_part)
        .map_err(|_| malformed("invalid date-time"))?;
    let zone = Tz::from_str(zone_part).map_err(|_| malformed("unknown zone designator"))?;

    let expected = datetime.with_timezone(&zone).fixed_offset();
    if expected.offset() != datetime.offset() {
        return Err(malformed("offset does not match zone"));
    }

    Ok(ZonedTime { datetime, zone })
}
