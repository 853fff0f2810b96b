//! Per-service referral URL shape rules.
//!
//! Each service accepts only links of its own fixed shape; a well-formed URL
//! pointing anywhere else is rejected. The empty string always passes and
//! means "not participating".

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::services::{SERVICE_COUNT, ServiceId};

/// A submitted link failed its service's shape rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} URL invalid", .service.label())]
pub struct ValidationError {
    pub service: ServiceId,
}

/// Anchored pattern for a service's referral link.
const fn pattern(service: ServiceId) -> &'static str {
    match service {
        ServiceId::SofiMoney => r"^(https://www\.)?sofi\.com/invite/money/\?gcp=[0-9a-z-]+/?$",
        ServiceId::SofiInvest => r"^(https://www\.)?sofi\.com/share/invest/[0-9]+/?$",
        ServiceId::Robinhood => r"^(https://)?join\.robinhood\.com/[a-z0-9-]+/?$",
        ServiceId::Amazon => r"^(https://)?amzn\.to/[A-Za-z0-9]+/?$",
        ServiceId::Airbnb => r"^(https://www\.)?airbnb\.com/c/[A-Za-z0-9]+/?$",
        ServiceId::Grubhub => r"^(https://www\.)?grubhub\.com/referral/[A-Za-z0-9-]+/?$",
        ServiceId::Doordash => r"^(https://)?drd\.sh/[A-Za-z0-9]+/?$",
        ServiceId::Uber => r"^(https://www\.)?uber\.com/invite/[A-Za-z0-9-]+/?$",
    }
}

static RULES: LazyLock<[Regex; SERVICE_COUNT]> = LazyLock::new(|| {
    ServiceId::ALL.map(|service| Regex::new(pattern(service)).expect("static pattern compiles"))
});

/// Check a single link against its service's rule.
pub fn is_valid_link(service: ServiceId, url: &str) -> bool {
    url.is_empty() || RULES[service.index()].is_match(url)
}

/// Raw per-service links as submitted by a user; nothing is checked yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSubmission {
    urls: [String; SERVICE_COUNT],
}

impl ProfileSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, service: ServiceId, url: impl Into<String>) -> Self {
        self.set(service, url);
        self
    }

    pub fn set(&mut self, service: ServiceId, url: impl Into<String>) {
        self.urls[service.index()] = url.into();
    }

    pub fn get(&self, service: ServiceId) -> &str {
        &self.urls[service.index()]
    }

    /// Validate every link, in catalogue order, stopping at the first violation.
    pub fn validate(self) -> Result<ValidatedLinks, ValidationError> {
        for service in ServiceId::ALL {
            if !is_valid_link(service, self.get(service)) {
                return Err(ValidationError { service });
            }
        }
        Ok(ValidatedLinks { urls: self.urls })
    }
}

/// A full set of links that passed validation.
///
/// Only [`ProfileSubmission::validate`] produces this type, and the user
/// store's update accepts nothing else, so unchecked links cannot be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLinks {
    urls: [String; SERVICE_COUNT],
}

impl ValidatedLinks {
    pub fn url(&self, service: ServiceId) -> &str {
        &self.urls[service.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(service: ServiceId) -> &'static [&'static str] {
        match service {
            ServiceId::SofiMoney => &[
                "sofi.com/invite/money/?gcp=abc123",
                "https://www.sofi.com/invite/money/?gcp=0f3c-9a2b/",
            ],
            ServiceId::SofiInvest => &[
                "sofi.com/share/invest/123456",
                "https://www.sofi.com/share/invest/42/",
            ],
            ServiceId::Robinhood => &["join.robinhood.com/janed12", "https://join.robinhood.com/jane-d/"],
            ServiceId::Amazon => &["amzn.to/3xYz9Q", "https://amzn.to/AbC123/"],
            ServiceId::Airbnb => &["airbnb.com/c/janed42", "https://www.airbnb.com/c/JaneD/"],
            ServiceId::Grubhub => &["grubhub.com/referral/abc-123", "https://www.grubhub.com/referral/XyZ"],
            ServiceId::Doordash => &["drd.sh/aB3dE", "https://drd.sh/Zz9/"],
            ServiceId::Uber => &["uber.com/invite/jane-d1", "https://www.uber.com/invite/JD42/"],
        }
    }

    fn rejected(service: ServiceId) -> &'static [&'static str] {
        match service {
            ServiceId::SofiMoney => &[
                "sofi.com/invite/money/?gcp=ABC",
                "https://evil.com/sofi.com/invite/money/?gcp=abc",
                "sofi.com/share/invest/123",
            ],
            ServiceId::SofiInvest => &[
                "sofi.com/share/invest/notanumber",
                "http://www.sofi.com/share/invest/1",
                "sofi.com/share/invest/",
            ],
            ServiceId::Robinhood => &["robinhood.com/janed", "join.robinhood.com/Jane"],
            ServiceId::Amazon => &["https://www.amazon.com/", "amzn.to/"],
            ServiceId::Airbnb => &["airbnb.com/rooms/123", "https://airbnb.com.evil.io/c/x"],
            ServiceId::Grubhub => &["grubhub.com/referral/", "www.grubhub.com/referral/abc"],
            ServiceId::Doordash => &["doordash.com/invite", "drd.sh/ab-c"],
            ServiceId::Uber => &["uber.com/invite/", "https://uber.com/invite/x?y=1"],
        }
    }

    #[test]
    fn empty_link_is_always_valid() {
        for service in ServiceId::ALL {
            assert!(is_valid_link(service, ""), "{service}");
        }
    }

    #[test]
    fn matching_links_are_accepted() {
        for service in ServiceId::ALL {
            for url in accepted(service) {
                assert!(is_valid_link(service, url), "{service} should accept {url}");
            }
        }
    }

    #[test]
    fn non_matching_links_are_rejected() {
        for service in ServiceId::ALL {
            for url in rejected(service) {
                assert!(!is_valid_link(service, url), "{service} should reject {url}");
            }
        }
    }

    #[test]
    fn link_for_another_service_is_rejected() {
        assert!(!is_valid_link(ServiceId::Robinhood, "sofi.com/share/invest/123"));
        assert!(!is_valid_link(ServiceId::Uber, "drd.sh/aB3dE"));
    }

    #[test]
    fn validate_reports_first_offending_service() {
        let err = ProfileSubmission::new()
            .with(ServiceId::SofiMoney, "sofi.com/invite/money/?gcp=abc123")
            .with(ServiceId::Airbnb, "nope")
            .with(ServiceId::Uber, "nope")
            .validate()
            .unwrap_err();
        assert_eq!(err.service, ServiceId::Airbnb);
        assert_eq!(err.to_string(), "Airbnb URL invalid");
    }

    #[test]
    fn validate_keeps_all_links() {
        let links = ProfileSubmission::new()
            .with(ServiceId::SofiInvest, "sofi.com/share/invest/77")
            .validate()
            .unwrap();
        assert_eq!(links.url(ServiceId::SofiInvest), "sofi.com/share/invest/77");
        assert_eq!(links.url(ServiceId::SofiMoney), "");
    }
}
