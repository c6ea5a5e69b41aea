use chrono::{Duration, NaiveDateTime, NaiveTime};

/// "HH:MM:SS" with total hours, so a wrapped countdown can read "26:10:00".
/// Negative durations render as zero.
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Format a NaiveTime to "HH:MM"
pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_uses_total_hours() {
        assert_eq!(format_countdown(Duration::minutes(105)), "01:45:00");
        assert_eq!(format_countdown(Duration::seconds(26 * 3600 + 61)), "26:01:01");
        assert_eq!(format_countdown(Duration::milliseconds(999)), "00:00:00");
        assert_eq!(format_countdown(Duration::seconds(-5)), "00:00:00");
    }

    #[test]
    fn clock_formats() {
        let t = NaiveTime::from_hms_opt(5, 7, 59).unwrap();
        assert_eq!(format_time(t), "05:07");
    }
}
