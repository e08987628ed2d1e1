/// Zone requested by the client for a numeric selector.
///
/// `2` is GMT, `3` is ECT, everything else falls back to UTC.
pub fn zone_for_selector(id: i32) -> &'static str {
    match id {
        2 => "GMT",
        3 => "ECT",
        _ => "UTC",
    }
}
