//! Display formatting for listings and poll status.

use std::time::Duration;

const BYTE_UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];

/// Human-readable size with at most two decimals: 1536 -> "1.5 KB"
pub fn format_bytes(bytes: i64) -> String {
    if bytes <= 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    while exponent + 1 < BYTE_UNITS.len() && bytes >= 1024_i64.pow(exponent as u32 + 1) {
        exponent += 1;
    }
    let value = (bytes as f64 / 1024f64.powi(exponent as i32) * 100.0).round() / 100.0;

    format!("{} {}", value, BYTE_UNITS[exponent])
}

/// Poll interval in the largest whole unit: "1 hour", "5 minutes"
pub fn format_interval(interval: Duration) -> String {
    let seconds = interval.as_secs_f64();
    let minutes = seconds / 60.0;
    let hours = minutes / 60.0;

    if hours >= 1.0 {
        if hours == 1.0 {
            "1 hour".to_string()
        } else {
            format!("{} hours", hours)
        }
    } else if minutes >= 1.0 {
        if minutes == 1.0 {
            "1 minute".to_string()
        } else {
            format!("{} minutes", minutes.round())
        }
    } else if seconds == 1.0 {
        "1 second".to_string()
    } else {
        format!("{} seconds", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(512), "512 Bytes");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1024 * 1024), "1 MB");
        assert_eq!(format_bytes(1_288_490_189), "1.2 GB");
    }

    #[test]
    fn very_large_sizes_stay_in_gigabytes() {
        assert_eq!(format_bytes(2 * 1024_i64.pow(4)), "2048 GB");
    }

    #[test]
    fn intervals() {
        assert_eq!(format_interval(Duration::from_secs(3600)), "1 hour");
        assert_eq!(format_interval(Duration::from_secs(7200)), "2 hours");
        assert_eq!(format_interval(Duration::from_secs(60)), "1 minute");
        assert_eq!(format_interval(Duration::from_secs(300)), "5 minutes");
        assert_eq!(format_interval(Duration::from_secs(1)), "1 second");
        assert_eq!(format_interval(Duration::from_secs(30)), "30 seconds");
    }
}
