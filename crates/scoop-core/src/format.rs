//! Formatting utilities for byte counts and file sizes.

use crate::models::FileSize;

const UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a byte count with 1024-based units (e.g. "1.5 KB", "0 Bytes").
///
/// Trailing zeros after the decimal point are dropped.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{:.*}", decimals, value);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    format!("{} {}", trimmed, UNITS[unit])
}

/// Format a lazily resolved file size for the size column.
pub fn format_file_size(size: FileSize) -> String {
    match size {
        FileSize::Known(bytes) => format_bytes(bytes, 2),
        FileSize::Unknown => "Unknown".to_string(),
        FileSize::Unresolved => "-".to_string(),
    }
}

/// "<used> of <quota>" usage line for an account card.
pub fn format_usage(used: u64, quota: u64) -> String {
    format!("{} of {}", format_bytes(used, 2), format_bytes(quota, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0, 2), "0 Bytes");
        assert_eq!(format_bytes(500, 2), "500 B");
        assert_eq!(format_bytes(1536, 2), "1.5 KB");
        assert_eq!(format_bytes(1024, 2), "1 KB");
        assert_eq!(format_bytes(500 * 1024 * 1024, 2), "500 MB");
        assert_eq!(format_bytes(1_234_567, 2), "1.18 MB");
        assert_eq!(format_bytes(1_234_567, 0), "1 MB");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(FileSize::Known(2048)), "2 KB");
        assert_eq!(format_file_size(FileSize::Unknown), "Unknown");
        assert_eq!(format_file_size(FileSize::Unresolved), "-");
    }

    #[test]
    fn test_format_usage() {
        assert_eq!(format_usage(0, 10 * 1024 * 1024), "0 Bytes of 10 MB");
    }
}
