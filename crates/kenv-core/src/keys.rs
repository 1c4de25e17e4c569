//! ConfigMap / Secret key validation
//!
//! Kubernetes >= 1.4 accepts ConfigMap keys made of alphanumerics, `-`, `_`
//! and `.`. Older API servers required DNS-1123 subdomains; convert mode
//! lowercases keys and swaps `_` for `-` so they pass that grammar.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CoreError, Result};

/// Maximum length shared by both grammars
pub const MAX_KEY_LENGTH: usize = 253;

const CONFIG_MAP_KEY_FMT: &str = "[-._a-zA-Z0-9]+";
const DNS1123_SUBDOMAIN_FMT: &str =
    r"[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*";

static CONFIG_MAP_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{}$", CONFIG_MAP_KEY_FMT)).expect("valid regex"));

static DNS1123_SUBDOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{}$", DNS1123_SUBDOMAIN_FMT)).expect("valid regex"));

/// Validate a key, optionally converting it first
///
/// Returns the key to store in the generated resource. Every violated rule
/// is reported, not just the first one.
pub fn validate_key(key: &str, convert: bool) -> Result<String> {
    let (normalized, reasons) = if convert {
        let converted = convert_key(key);
        let reasons = dns1123_subdomain_violations(&converted);
        (converted, reasons)
    } else {
        (key.to_string(), config_map_key_violations(key))
    };

    if reasons.is_empty() {
        Ok(normalized)
    } else {
        Err(CoreError::InvalidKey {
            key: key.to_string(),
            reasons,
        })
    }
}

/// Lowercase and replace `_` with `-`
pub fn convert_key(key: &str) -> String {
    key.to_lowercase().replace('_', "-")
}

fn config_map_key_violations(key: &str) -> Vec<String> {
    let mut reasons = Vec::new();

    if key.len() > MAX_KEY_LENGTH {
        reasons.push(max_len_message());
    }
    if !CONFIG_MAP_KEY_RE.is_match(key) {
        reasons.push(format!(
            "a valid config key must consist of alphanumeric characters, '-', '_' or '.' \
             (e.g. 'key.name', or 'KEY_NAME', or 'key-name', regex used for validation is '{}')",
            CONFIG_MAP_KEY_FMT
        ));
    }
    if key.starts_with('.') {
        reasons.push("must not start with '.'".to_string());
    }

    reasons
}

fn dns1123_subdomain_violations(key: &str) -> Vec<String> {
    let mut reasons = Vec::new();

    if key.len() > MAX_KEY_LENGTH {
        reasons.push(max_len_message());
    }
    if !DNS1123_SUBDOMAIN_RE.is_match(key) {
        reasons.push(format!(
            "a lowercase RFC 1123 subdomain must consist of lower case alphanumeric characters, \
             '-' or '.', and must start and end with an alphanumeric character \
             (e.g. 'example.com', regex used for validation is '{}')",
            DNS1123_SUBDOMAIN_FMT
        ));
    }

    reasons
}

fn max_len_message() -> String {
    format!("must be no more than {} characters", MAX_KEY_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_key_unchanged() {
        assert_eq!(validate_key("foo", false).unwrap(), "foo");
        assert_eq!(validate_key("FOO_BAR", false).unwrap(), "FOO_BAR");
        assert_eq!(validate_key("FOO.BAR_BANANA", false).unwrap(), "FOO.BAR_BANANA");
    }

    #[test]
    fn test_convert_mode() {
        assert_eq!(validate_key("FOO_BAR", true).unwrap(), "foo-bar");
        assert_eq!(validate_key("FOO.BAR_BANANA", true).unwrap(), "foo.bar-banana");
    }

    #[test]
    fn test_invalid_characters() {
        assert!(validate_key("@@@@", false).is_err());
        assert!(validate_key("@@@@", true).is_err());
        assert!(validate_key("", false).is_err());
        assert!(validate_key("with space", false).is_err());
    }

    #[test]
    fn test_leading_dot_rejected() {
        let err = validate_key(".hidden", false).unwrap_err();
        match err {
            CoreError::InvalidKey { key, reasons } => {
                assert_eq!(key, ".hidden");
                assert_eq!(reasons, vec!["must not start with '.'".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_convert_rejects_edge_dashes() {
        // `_FOO` converts to `-foo`, which must start with an alphanumeric
        assert!(validate_key("_FOO", true).is_err());
        assert!(validate_key("FOO_", true).is_err());
        assert!(validate_key("_FOO", false).is_ok());
    }

    #[test]
    fn test_every_violation_reported() {
        let key = format!(".{}@", "a".repeat(MAX_KEY_LENGTH));
        let err = validate_key(&key, false).unwrap_err();
        let CoreError::InvalidKey { reasons, .. } = err else {
            panic!("expected InvalidKey");
        };
        assert_eq!(reasons.len(), 3);
        assert_eq!(reasons[0], "must be no more than 253 characters");
        assert_eq!(reasons[2], "must not start with '.'");
    }

    #[test]
    fn test_length_boundary() {
        let ok = "a".repeat(MAX_KEY_LENGTH);
        assert!(validate_key(&ok, false).is_ok());
        assert!(validate_key(&ok, true).is_ok());

        let too_long = "a".repeat(MAX_KEY_LENGTH + 1);
        assert!(validate_key(&too_long, false).is_err());
        assert!(validate_key(&too_long, true).is_err());
    }

    #[test]
    fn test_error_message() {
        let err = validate_key(".x", false).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @".x is not a valid ConfigMap key: must not start with '.'");
    }
}
