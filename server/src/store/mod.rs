//! Durable job and credential records.
//!
//! Handlers only see the [`JobStore`] and [`CredentialStore`] traits. The Redis
//! implementation is used in production; the in-memory one backs
//! `STORE_BACKEND=memory` and the test suites.

mod memory;
mod redis_store;

use async_trait::async_trait;
use common::{Config, Credential, Job, NewJob, Result, StoreBackend};
use log::info;
use std::sync::Arc;

pub use self::memory::{MemoryCredentialStore, MemoryJobStore};
pub use self::redis_store::{RedisCredentialStore, RedisJobStore};

/// Append-only job log.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Appends a row and returns the id the store assigned to it.
    async fn insert(&self, job: NewJob) -> Result<u64>;

    /// The job with the latest start time, ties broken by the highest id.
    ///
    /// Only a reliable "the job I just wrote" under a single writer; callers
    /// that just inserted should use [`JobStore::lookup`] with the returned id.
    async fn most_recent(&self) -> Result<Option<Job>>;

    async fn lookup(&self, id: u64) -> Result<Option<Job>>;

    /// All jobs in ascending id order.
    async fn list_all(&self) -> Result<Vec<Job>>;

    async fn reset(&self) -> Result<()>;
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns `false` without writing if the username is taken.
    async fn insert(&self, credential: Credential) -> Result<bool>;

    async fn get(&self, username: &str) -> Result<Option<Credential>>;

    async fn reset(&self) -> Result<()>;
}

/// Store handles shared by every request for the lifetime of the process.
#[derive(Clone)]
pub struct Stores {
    pub jobs: Arc<dyn JobStore>,
    pub credentials: Arc<dyn CredentialStore>,
}

impl Stores {
    pub fn memory() -> Self {
        Self {
            jobs: Arc::new(MemoryJobStore::new()),
            credentials: Arc::new(MemoryCredentialStore::new()),
        }
    }

    pub fn open(config: &Config) -> Result<Self> {
        match config.store_backend {
            StoreBackend::Memory => {
                info!("Using in-memory store, records are lost on exit");
                Ok(Self::memory())
            }
            StoreBackend::Redis => {
                info!("Creating Redis pool for {}", config.redis_url);
                let pool = redis_store::create_pool(&config.redis_url)?;
                Ok(Self {
                    jobs: Arc::new(RedisJobStore::new(pool.clone())),
                    credentials: Arc::new(RedisCredentialStore::new(pool)),
                })
            }
        }
    }
}
