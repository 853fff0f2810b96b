//! In-memory user store for development and tests.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{StoreError, UserStore};
use crate::models::{Participant, UserRecord};
use crate::services::ServiceId;
use crate::validation::ValidatedLinks;

/// User store held in a concurrent map. Each operation locks a single entry.
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<String, UserRecord>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(email).map(|entry| entry.value().clone()))
    }

    async fn insert_if_absent(&self, email: &str) -> Result<(), StoreError> {
        self.users
            .entry(email.to_string())
            .or_insert_with(|| UserRecord::new(email));
        Ok(())
    }

    async fn update_links(&self, email: &str, links: &ValidatedLinks) -> Result<(), StoreError> {
        let mut record = self
            .users
            .get_mut(email)
            .ok_or_else(|| StoreError::UnknownUser(email.to_string()))?;
        for service in ServiceId::ALL {
            record.services.get_mut(service).url = links.url(service).to_string();
        }
        Ok(())
    }

    async fn list_participants(&self, service: ServiceId) -> Result<Vec<Participant>, StoreError> {
        let mut participants: Vec<Participant> = self
            .users
            .iter()
            .filter_map(|entry| {
                let url = &entry.services.get(service).url;
                (!url.is_empty()).then(|| Participant {
                    email: entry.email.clone(),
                    url: url.clone(),
                })
            })
            .collect();
        participants.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(participants)
    }

    async fn record_click(&self, email: &str, service: ServiceId) -> Result<(), StoreError> {
        let mut record = self
            .users
            .get_mut(email)
            .ok_or_else(|| StoreError::UnknownUser(email.to_string()))?;
        record.services.get_mut(service).clicks += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::validation::ProfileSubmission;

    const SOFI_MONEY: &str = "sofi.com/invite/money/?gcp=abc123";

    #[tokio::test]
    async fn insert_if_absent_is_idempotent() {
        let store = MemoryUserStore::new();
        store.insert_if_absent("a@x.com").await.unwrap();
        let links = ProfileSubmission::new()
            .with(ServiceId::SofiMoney, SOFI_MONEY)
            .validate()
            .unwrap();
        store.update_links("a@x.com", &links).await.unwrap();
        store.record_click("a@x.com", ServiceId::SofiMoney).await.unwrap();
        let before = store.get("a@x.com").await.unwrap().unwrap();

        store.insert_if_absent("a@x.com").await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a@x.com").await.unwrap().unwrap(), before);
    }

    #[tokio::test]
    async fn get_unknown_is_none() {
        let store = MemoryUserStore::new();
        assert!(store.get("nobody@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_replaces_links_and_keeps_clicks() {
        let store = MemoryUserStore::new();
        store.insert_if_absent("a@x.com").await.unwrap();
        store.record_click("a@x.com", ServiceId::Uber).await.unwrap();

        let links = ProfileSubmission::new()
            .with(ServiceId::Uber, "uber.com/invite/abc")
            .validate()
            .unwrap();
        store.update_links("a@x.com", &links).await.unwrap();

        let record = store.get("a@x.com").await.unwrap().unwrap();
        let uber = record.services.get(ServiceId::Uber);
        assert_eq!(uber.url, "uber.com/invite/abc");
        assert_eq!(uber.clicks, 1);
    }

    #[tokio::test]
    async fn update_unknown_user_fails() {
        let store = MemoryUserStore::new();
        let links = ProfileSubmission::new().validate().unwrap();
        let err = store.update_links("ghost@x.com", &links).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownUser(e) if e == "ghost@x.com"));
    }

    #[tokio::test]
    async fn participants_exclude_empty_links() {
        let store = MemoryUserStore::new();
        for email in ["b@x.com", "a@x.com", "c@x.com"] {
            store.insert_if_absent(email).await.unwrap();
        }
        for email in ["a@x.com", "b@x.com"] {
            let links = ProfileSubmission::new()
                .with(ServiceId::Doordash, "drd.sh/abc")
                .validate()
                .unwrap();
            store.update_links(email, &links).await.unwrap();
        }

        let participants = store.list_participants(ServiceId::Doordash).await.unwrap();
        let emails: Vec<_> = participants.iter().map(|p| p.email.as_str()).collect();
        assert_eq!(emails, ["a@x.com", "b@x.com"]);
        assert!(store.list_participants(ServiceId::Uber).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_clicks_are_not_lost() {
        let store = Arc::new(MemoryUserStore::new());
        store.insert_if_absent("a@x.com").await.unwrap();

        let tasks: Vec<_> = (0..200)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.record_click("a@x.com", ServiceId::Amazon).await.unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let record = store.get("a@x.com").await.unwrap().unwrap();
        assert_eq!(record.services.get(ServiceId::Amazon).clicks, 200);
    }
}
