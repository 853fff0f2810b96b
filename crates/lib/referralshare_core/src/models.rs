//! Domain models for user records and registry participants.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::services::{SERVICE_COUNT, ServiceId};

/// One service's slot in a user record.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ServiceLink {
    /// Referral URL; empty when the user is not participating.
    pub url: String,
    /// Number of dispatches that selected this link.
    pub clicks: i64,
}

/// Per-service links, one slot for every entry of [`ServiceId::ALL`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceLinks([ServiceLink; SERVICE_COUNT]);

impl ServiceLinks {
    pub fn get(&self, service: ServiceId) -> &ServiceLink {
        &self.0[service.index()]
    }

    pub fn get_mut(&mut self, service: ServiceId) -> &mut ServiceLink {
        &mut self.0[service.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ServiceId, &ServiceLink)> {
        ServiceId::ALL.into_iter().zip(self.0.iter())
    }
}

impl Serialize for ServiceLinks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SERVICE_COUNT))?;
        for (service, link) in self.iter() {
            map.serialize_entry(service.as_str(), link)?;
        }
        map.end()
    }
}

/// Persistent record for one identity.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UserRecord {
    pub email: String,
    pub services: ServiceLinks,
}

impl UserRecord {
    /// A freshly provisioned record: every link empty, every count zero.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            services: ServiceLinks::default(),
        }
    }
}

/// A user taking part in a service's rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub email: String,
    pub url: String,
}
