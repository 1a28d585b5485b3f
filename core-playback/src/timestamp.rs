//! `mm:ss` formatting for transport displays.

/// Format `millis` as `mm:ss`.
///
/// Both fields are floored and zero-padded to two digits. There is no hours
/// field, so an hour and five seconds renders as `60:05`.
///
/// ```rust
/// use core_playback::timestamp::format_timestamp;
///
/// assert_eq!(format_timestamp(65_000), "01:05");
/// assert_eq!(format_timestamp(3_605_000), "60:05");
/// ```
pub fn format_timestamp(millis: u64) -> String {
    let total_seconds = millis / 1000;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// `"position / duration"`, or an empty string until both are known.
pub fn timestamp_label(position_millis: Option<u64>, duration_millis: Option<u64>) -> String {
    match (position_millis, duration_millis) {
        (Some(position), Some(duration)) => format!(
            "{} / {}",
            format_timestamp(position),
            format_timestamp(duration)
        ),
        _ => String::new(),
    }
}

/// Seek slider position in `0.0..=1.0`; `0.0` while either value is unknown.
pub fn seek_fraction(position_millis: Option<u64>, duration_millis: Option<u64>) -> f64 {
    match (position_millis, duration_millis) {
        (Some(position), Some(duration)) if duration > 0 => {
            (position as f64 / duration as f64).min(1.0)
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_timestamp(0), "00:00");
        assert_eq!(format_timestamp(999), "00:00");
        assert_eq!(format_timestamp(65_000), "01:05");
        assert_eq!(format_timestamp(599_999), "09:59");
    }

    #[test]
    fn hours_are_not_carried() {
        assert_eq!(format_timestamp(3_605_000), "60:05");
        assert_eq!(format_timestamp(6_000_000), "100:00");
    }

    #[test]
    fn label_needs_both_values() {
        assert_eq!(timestamp_label(Some(65_000), Some(3_605_000)), "01:05 / 60:05");
        assert_eq!(timestamp_label(None, Some(1_000)), "");
        assert_eq!(timestamp_label(Some(1_000), None), "");
    }

    #[test]
    fn seek_fraction_handles_unknowns() {
        assert_eq!(seek_fraction(Some(50_000), Some(200_000)), 0.25);
        assert_eq!(seek_fraction(None, Some(200_000)), 0.0);
        assert_eq!(seek_fraction(Some(1), Some(0)), 0.0);
    }
}
