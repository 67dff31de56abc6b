use async_trait::async_trait;
use common::{Credential, Job, NewJob, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use super::{CredentialStore, JobStore};

#[derive(Default)]
struct JobRows {
    last_id: u64,
    rows: BTreeMap<u64, Job>,
}

#[derive(Default)]
pub struct MemoryJobStore {
    inner: RwLock<JobRows>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, job: NewJob) -> Result<u64> {
        let mut inner = self.inner.write();
        inner.last_id += 1;
        let id = inner.last_id;
        inner.rows.insert(id, Job::from_new(id, job));
        Ok(id)
    }

    async fn most_recent(&self) -> Result<Option<Job>> {
        let inner = self.inner.read();
        Ok(inner
            .rows
            .values()
            .max_by_key(|job| (job.start, job.id))
            .cloned())
    }

    async fn lookup(&self, id: u64) -> Result<Option<Job>> {
        Ok(self.inner.read().rows.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Job>> {
        Ok(self.inner.read().rows.values().cloned().collect())
    }

    async fn reset(&self) -> Result<()> {
        *self.inner.write() = JobRows::default();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<String, Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, credential: Credential) -> Result<bool> {
        let mut users = self.users.write();
        if users.contains_key(&credential.username) {
            return Ok(false);
        }
        users.insert(credential.username.clone(), credential);
        Ok(true)
    }

    async fn get(&self, username: &str) -> Result<Option<Credential>> {
        Ok(self.users.read().get(username).cloned())
    }

    async fn reset(&self) -> Result<()> {
        self.users.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::PasswordVerifier;

    fn new_job(interface: &str, start: i64) -> NewJob {
        NewJob {
            interface: interface.to_string(),
            bssid: "AA:BB:CC:DD:EE:FF".to_string(),
            start,
            packets: 200,
            delay: 200,
        }
    }

    fn credential(username: &str) -> Credential {
        Credential {
            username: username.to_string(),
            verifier: PasswordVerifier { salt: vec![1; 16], hash: vec![2; 32], iterations: 1 },
            admin: false,
        }
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() -> Result<()> {
        let store = MemoryJobStore::new();
        let first = store.insert(new_job("wlan0mon", 100)).await?;
        let second = store.insert(new_job("wlan0mon", 100)).await?;
        let third = store.insert(new_job("wlan1mon", 50)).await?;

        assert!(first < second && second < third);
        Ok(())
    }

    #[tokio::test]
    async fn test_lookup_and_list() -> Result<()> {
        let store = MemoryJobStore::new();
        let id = store.insert(new_job("wlan0mon", 100)).await?;

        let job = store.lookup(id).await?.unwrap();
        assert_eq!(job.interface, "wlan0mon");
        assert!(!job.complete);
        assert!(store.lookup(id + 1).await?.is_none());

        store.insert(new_job("wlan1mon", 101)).await?;
        let ids: Vec<u64> = store.list_all().await?.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![1, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn test_most_recent_orders_by_start_then_id() -> Result<()> {
        let store = MemoryJobStore::new();
        assert!(store.most_recent().await?.is_none());

        store.insert(new_job("late", 200)).await?;
        store.insert(new_job("early", 100)).await?;
        assert_eq!(store.most_recent().await?.unwrap().interface, "late");

        let tie = store.insert(new_job("tie", 200)).await?;
        assert_eq!(store.most_recent().await?.unwrap().id, tie);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_clears_jobs() -> Result<()> {
        let store = MemoryJobStore::new();
        store.insert(new_job("wlan0mon", 1)).await?;
        store.reset().await?;

        assert!(store.list_all().await?.is_empty());
        assert_eq!(store.insert(new_job("wlan0mon", 2)).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_usernames_are_unique() -> Result<()> {
        let store = MemoryCredentialStore::new();
        assert!(store.insert(credential("bob")).await?);
        assert!(!store.insert(credential("bob")).await?);
        assert!(store.get("bob").await?.is_some());
        assert!(store.get("alice").await?.is_none());
        Ok(())
    }
}
