use chrono::{DateTime, Utc};
use std::net::IpAddr;

/// Check whether a string is a syntactically valid IPv4 or IPv6 address
pub fn is_valid_ip(ip: &str) -> bool {
    ip.parse::<IpAddr>().is_ok()
}

/// Parse a port number, accepting exactly the 0..=65535 range
pub fn parse_port(text: &str) -> Option<u16> {
    text.trim().parse::<u16>().ok()
}

/// Render a last-checked timestamp for chat output
pub fn format_last_checked(last_checked: Option<DateTime<Utc>>) -> String {
    match last_checked {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "Never checked".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_valid_ips_accepted() {
        assert!(is_valid_ip("10.0.0.5"));
        assert!(is_valid_ip("192.168.1.1"));
        assert!(is_valid_ip("0.0.0.0"));
        assert!(is_valid_ip("255.255.255.255"));
        assert!(is_valid_ip("::1"));
        assert!(is_valid_ip("fe80::1"));
        assert!(is_valid_ip("2001:db8::8a2e:370:7334"));
    }

    #[test]
    fn test_malformed_ips_rejected() {
        assert!(!is_valid_ip(""));
        assert!(!is_valid_ip("256.0.0.1"));
        assert!(!is_valid_ip("10.0.0"));
        assert!(!is_valid_ip("10.0.0.5 "));
        assert!(!is_valid_ip("10.0.0.5x"));
        assert!(!is_valid_ip("host.example.com"));
        assert!(!is_valid_ip("10.0.0.5:8080"));
    }

    #[test]
    fn test_port_range() {
        assert_eq!(parse_port("0"), Some(0));
        assert_eq!(parse_port("8080"), Some(8080));
        assert_eq!(parse_port("65535"), Some(65535));
        assert_eq!(parse_port("70000"), None);
        assert_eq!(parse_port("-1"), None);
        assert_eq!(parse_port("abc"), None);
        assert_eq!(parse_port(""), None);
    }

    #[test]
    fn test_format_last_checked() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(format_last_checked(Some(dt)), "2025-03-14 09:26:53");
        assert_eq!(format_last_checked(None), "Never checked");
    }
}
