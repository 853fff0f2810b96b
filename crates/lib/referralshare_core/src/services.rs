//! Partner-service catalogue.
//!
//! The set of services is closed: every per-service column, URL rule and
//! registry slot is keyed by [`ServiceId`], so adding a service is a
//! compile-time change rather than a runtime lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of partner services.
pub const SERVICE_COUNT: usize = 8;

/// A partner service that accepts referral links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceId {
    SofiMoney,
    SofiInvest,
    Robinhood,
    Amazon,
    Airbnb,
    Grubhub,
    Doordash,
    Uber,
}

/// Raised when a path segment does not name a known service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown service: {0}")]
pub struct UnknownService(pub String);

impl ServiceId {
    /// All services, in catalogue order.
    pub const ALL: [ServiceId; SERVICE_COUNT] = [
        ServiceId::SofiMoney,
        ServiceId::SofiInvest,
        ServiceId::Robinhood,
        ServiceId::Amazon,
        ServiceId::Airbnb,
        ServiceId::Grubhub,
        ServiceId::Doordash,
        ServiceId::Uber,
    ];

    /// Stable snake_case identifier, used in routes and as the URL column name.
    pub const fn as_str(self) -> &'static str {
        match self {
            ServiceId::SofiMoney => "sofi_money",
            ServiceId::SofiInvest => "sofi_invest",
            ServiceId::Robinhood => "robinhood",
            ServiceId::Amazon => "amazon",
            ServiceId::Airbnb => "airbnb",
            ServiceId::Grubhub => "grubhub",
            ServiceId::Doordash => "doordash",
            ServiceId::Uber => "uber",
        }
    }

    /// Human-readable name for user-facing messages.
    pub const fn label(self) -> &'static str {
        match self {
            ServiceId::SofiMoney => "SoFi Money",
            ServiceId::SofiInvest => "SoFi Invest",
            ServiceId::Robinhood => "Robinhood",
            ServiceId::Amazon => "Amazon",
            ServiceId::Airbnb => "Airbnb",
            ServiceId::Grubhub => "Grubhub",
            ServiceId::Doordash => "DoorDash",
            ServiceId::Uber => "Uber",
        }
    }

    /// Position in [`ServiceId::ALL`]; used to index fixed-size per-service arrays.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceId {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceId::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| UnknownService(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_identifier() {
        for service in ServiceId::ALL {
            assert_eq!(service.as_str().parse::<ServiceId>(), Ok(service));
        }
    }

    #[test]
    fn rejects_unknown_identifier() {
        let err = "paypal".parse::<ServiceId>().unwrap_err();
        assert_eq!(err, UnknownService("paypal".into()));
        // Identifiers are matched exactly, not case-folded.
        assert!("Sofi_money".parse::<ServiceId>().is_err());
    }

    #[test]
    fn index_matches_catalogue_order() {
        for (i, service) in ServiceId::ALL.iter().enumerate() {
            assert_eq!(service.index(), i);
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ServiceId::SofiInvest).unwrap();
        assert_eq!(json, "\"sofi_invest\"");
    }
}
