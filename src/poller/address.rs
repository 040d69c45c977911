//! Dotted-quad extraction from free-text event bodies.

use regex::Regex;
use std::sync::LazyLock;

// Four dot-separated digit runs. Octet ranges are not checked; Packet only
// ever reports real addresses here.
static DOTTED_QUAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]+(?:\.[0-9]+){3}").expect("dotted-quad pattern is valid")
});

/// First dotted-quad substring of `body`, if any.
pub fn extract_ipv4(body: &str) -> Option<&str> {
    DOTTED_QUAD.find(body).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_sentence() {
        assert_eq!(
            extract_ipv4("Deployment complete, IP 10.0.0.5 assigned"),
            Some("10.0.0.5")
        );
    }

    #[test]
    fn test_extract_first_of_many() {
        assert_eq!(
            extract_ipv4("public 147.75.200.1, private 10.99.0.3"),
            Some("147.75.200.1")
        );
    }

    #[test]
    fn test_extract_adjacent_punctuation() {
        assert_eq!(extract_ipv4("(192.168.1.20)."), Some("192.168.1.20"));
        assert_eq!(extract_ipv4("ip=1.2.3.4:22"), Some("1.2.3.4"));
    }

    #[test]
    fn test_extract_none() {
        assert_eq!(extract_ipv4("Provisioning"), None);
        assert_eq!(extract_ipv4("version 1.2.3"), None);
        assert_eq!(extract_ipv4(""), None);
    }
}
