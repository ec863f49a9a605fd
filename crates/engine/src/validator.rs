//! Intake form validation.
//!
//! Turns raw form fields into a typed [`Submission`], or the first reason the
//! submission was rejected. Nothing reaches the config or env writers without
//! passing through here.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use beacon_common::error::{UrlField, ValidationError};
use beacon_common::types::{MonitorRecord, NetworkRegistry, RawSubmission, Submission};

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("address pattern is a valid regex")
});

/// Stateless validator for intake submissions.
pub struct Validator;

impl Validator {
    /// Validate all five form fields, short-circuiting on the first failure.
    pub fn validate(
        networks: &NetworkRegistry,
        raw: &RawSubmission,
    ) -> Result<Submission, ValidationError> {
        Self::check_url(&raw.webhook_url, UrlField::Webhook)?;
        Self::check_network(networks, &raw.network)?;
        Self::check_url(&raw.rpc_url, UrlField::Rpc)?;
        Self::check_address(&raw.address)?;
        let alert_balance = Self::parse_alert_balance(&raw.alert_balance)?;

        Ok(Submission {
            record: MonitorRecord {
                address: raw.address.clone(),
                rpc_url: raw.rpc_url.clone(),
                chain: raw.network.clone(),
                alert_balance,
            },
            webhook_url: raw.webhook_url.clone(),
        })
    }

    /// Absolute URL with a host. Whitespace and control characters are
    /// refused outright since the value is written verbatim into line-based files.
    pub fn check_url(raw: &str, field: UrlField) -> Result<(), ValidationError> {
        if raw.is_empty() || raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::InvalidUrl(field));
        }

        match Url::parse(raw) {
            Ok(url) if url.has_host() => Ok(()),
            _ => Err(ValidationError::InvalidUrl(field)),
        }
    }

    pub fn check_network(networks: &NetworkRegistry, name: &str) -> Result<(), ValidationError> {
        if networks.contains(name) {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedNetwork(name.to_string()))
        }
    }

    pub fn check_address(address: &str) -> Result<(), ValidationError> {
        if ADDRESS_RE.is_match(address) {
            Ok(())
        } else {
            Err(ValidationError::MalformedAddress)
        }
    }

    /// Base-10 integer strictly greater than zero.
    pub fn parse_alert_balance(raw: &str) -> Result<u64, ValidationError> {
        match raw.parse::<i64>() {
            Ok(value) if value > 0 => Ok(value as u64),
            _ => Err(ValidationError::InvalidThreshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0x00000000000000000000000000000000000000AA";

    fn valid_raw() -> RawSubmission {
        RawSubmission {
            webhook_url: "https://hooks.example.com/abc".to_string(),
            network: "Sepolia".to_string(),
            rpc_url: "https://sepolia.infura.io/v3/test".to_string(),
            address: ADDRESS.to_string(),
            alert_balance: "100".to_string(),
        }
    }

    fn validate(raw: &RawSubmission) -> Result<Submission, ValidationError> {
        Validator::validate(&NetworkRegistry::builtin(), raw)
    }

    #[test]
    fn test_valid_submission() {
        let submission = validate(&valid_raw()).unwrap();
        assert_eq!(submission.webhook_url, "https://hooks.example.com/abc");
        assert_eq!(submission.record.address, ADDRESS);
        assert_eq!(submission.record.rpc_url, "https://sepolia.infura.io/v3/test");
        assert_eq!(submission.record.chain, "Sepolia");
        assert_eq!(submission.record.alert_balance, 100);
    }

    #[test]
    fn test_invalid_webhook_url() {
        for webhook in ["", "not a url", "hooks.example.com/abc", "/relative/path", "mailto:ops@example.com"] {
            let raw = RawSubmission {
                webhook_url: webhook.to_string(),
                ..valid_raw()
            };
            assert_eq!(
                validate(&raw),
                Err(ValidationError::InvalidUrl(UrlField::Webhook)),
                "webhook {:?} should be rejected",
                webhook
            );
        }
    }

    #[test]
    fn test_url_with_line_break_rejected() {
        let raw = RawSubmission {
            webhook_url: "https://hooks.example.com/abc\nEXTRA=1".to_string(),
            ..valid_raw()
        };
        assert_eq!(
            validate(&raw),
            Err(ValidationError::InvalidUrl(UrlField::Webhook))
        );
    }

    #[test]
    fn test_unsupported_network() {
        for network in ["", "Dogecoin", "sepolia", "SEPOLIA"] {
            let raw = RawSubmission {
                network: network.to_string(),
                ..valid_raw()
            };
            assert_eq!(
                validate(&raw),
                Err(ValidationError::UnsupportedNetwork(network.to_string()))
            );
        }
    }

    #[test]
    fn test_invalid_rpc_url() {
        let raw = RawSubmission {
            rpc_url: "sepolia.infura.io".to_string(),
            ..valid_raw()
        };
        assert_eq!(validate(&raw), Err(ValidationError::InvalidUrl(UrlField::Rpc)));
    }

    #[test]
    fn test_malformed_address() {
        let cases = [
            "0xZZZ",
            "",
            // 38 hex digits
            "0x000000000000000000000000000000000000AA",
            // 42 hex digits
            "0x0000000000000000000000000000000000000000AA",
            // missing prefix
            "0000000000000000000000000000000000000000AA",
            "0X00000000000000000000000000000000000000AA",
            "0x00000000000000000000000000000000000000AG",
            " 0x00000000000000000000000000000000000000AA",
        ];
        for address in cases {
            let raw = RawSubmission {
                address: address.to_string(),
                ..valid_raw()
            };
            assert_eq!(
                validate(&raw),
                Err(ValidationError::MalformedAddress),
                "address {:?} should be rejected",
                address
            );
        }
    }

    #[test]
    fn test_mixed_case_address_accepted() {
        assert!(Validator::check_address("0xaD67FE66660Fb8dFE9d6b1b4240d8650e30F6019").is_ok());
    }

    #[test]
    fn test_invalid_alert_balance() {
        for balance in ["", "-5", "0", "abc", "1.5", "1e3", " 10", "99999999999999999999"] {
            let raw = RawSubmission {
                alert_balance: balance.to_string(),
                ..valid_raw()
            };
            assert_eq!(
                validate(&raw),
                Err(ValidationError::InvalidThreshold),
                "alert balance {:?} should be rejected",
                balance
            );
        }
    }

    #[test]
    fn test_alert_balance_bounds() {
        assert_eq!(Validator::parse_alert_balance("1"), Ok(1));
        assert_eq!(Validator::parse_alert_balance("+7"), Ok(7));
        assert_eq!(
            Validator::parse_alert_balance(&i64::MAX.to_string()),
            Ok(i64::MAX as u64)
        );
    }

    #[test]
    fn test_first_failure_wins() {
        let raw = RawSubmission {
            webhook_url: "nope".to_string(),
            network: "Dogecoin".to_string(),
            address: "0xZZZ".to_string(),
            ..valid_raw()
        };
        assert_eq!(
            validate(&raw),
            Err(ValidationError::InvalidUrl(UrlField::Webhook))
        );
    }
}
