use async_trait::async_trait;
use common::{Credential, Job, NewJob, Result, WipiError};
use deadpool_redis::{Config as PoolConfig, Connection, Pool, Runtime};
use log::{debug, info};

use super::{CredentialStore, JobStore};

const JOB_SEQUENCE_KEY: &str = "wipi:jobs:next_id";
const JOB_INDEX_KEY: &str = "wipi:jobs:by_start";
const USER_INDEX_KEY: &str = "wipi:users";

fn job_key(id: u64) -> String {
    format!("wipi:job:{}", id)
}

/// Zero-padded so equal start scores order members by id.
fn job_member(id: u64) -> String {
    format!("{:020}", id)
}

fn user_key(username: &str) -> String {
    format!("wipi:user:{}", username)
}

pub(super) fn create_pool(url: &str) -> Result<Pool> {
    PoolConfig::from_url(url)
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| WipiError::StorageError(e.to_string()))
}

async fn connection(pool: &Pool) -> Result<Connection> {
    pool.get()
        .await
        .map_err(|e| WipiError::StorageError(e.to_string()))
}

pub struct RedisJobStore {
    pool: Pool,
}

impl RedisJobStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn job_ids(&self, conn: &mut Connection) -> Result<Vec<u64>> {
        let members: Vec<String> = redis::cmd("ZRANGE")
            .arg(JOB_INDEX_KEY)
            .arg(0)
            .arg(-1)
            .query_async(conn)
            .await?;

        members
            .iter()
            .map(|m| {
                m.parse::<u64>()
                    .map_err(|_| WipiError::StorageError(format!("corrupt job index entry '{}'", m)))
            })
            .collect()
    }
}

#[async_trait]
impl JobStore for RedisJobStore {
    async fn insert(&self, job: NewJob) -> Result<u64> {
        let mut conn = connection(&self.pool).await?;

        let id: u64 = redis::cmd("INCR")
            .arg(JOB_SEQUENCE_KEY)
            .query_async(&mut conn)
            .await?;

        let start = job.start;
        let row = serde_json::to_string(&Job::from_new(id, job))?;

        redis::pipe()
            .atomic()
            .cmd("SET").arg(job_key(id)).arg(row).ignore()
            .cmd("ZADD").arg(JOB_INDEX_KEY).arg(start).arg(job_member(id)).ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        debug!("Stored job {} in Redis", id);
        Ok(id)
    }

    async fn most_recent(&self) -> Result<Option<Job>> {
        let mut conn = connection(&self.pool).await?;

        let newest: Vec<String> = redis::cmd("ZREVRANGE")
            .arg(JOB_INDEX_KEY)
            .arg(0)
            .arg(0)
            .query_async(&mut conn)
            .await?;

        match newest.first() {
            Some(member) => {
                let id = member
                    .parse::<u64>()
                    .map_err(|_| WipiError::StorageError(format!("corrupt job index entry '{}'", member)))?;
                drop(conn);
                self.lookup(id).await
            }
            None => Ok(None),
        }
    }

    async fn lookup(&self, id: u64) -> Result<Option<Job>> {
        let mut conn = connection(&self.pool).await?;

        let data: Option<String> = redis::cmd("GET")
            .arg(job_key(id))
            .query_async(&mut conn)
            .await?;

        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<Job>> {
        let mut conn = connection(&self.pool).await?;

        let mut ids = self.job_ids(&mut conn).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        ids.sort_unstable();

        let keys: Vec<String> = ids.iter().map(|id| job_key(*id)).collect();
        let rows: Vec<Option<String>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await?;

        let mut jobs = Vec::with_capacity(rows.len());
        for row in rows.into_iter().flatten() {
            jobs.push(serde_json::from_str(&row)?);
        }
        Ok(jobs)
    }

    async fn reset(&self) -> Result<()> {
        let mut conn = connection(&self.pool).await?;

        let ids = self.job_ids(&mut conn).await?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        for id in &ids {
            pipe.cmd("DEL").arg(job_key(*id)).ignore();
        }
        pipe.cmd("DEL").arg(JOB_INDEX_KEY).ignore();
        pipe.cmd("DEL").arg(JOB_SEQUENCE_KEY).ignore();
        pipe.query_async::<_, ()>(&mut conn).await?;

        info!("Removed {} job records", ids.len());
        Ok(())
    }
}

pub struct RedisCredentialStore {
    pool: Pool,
}

impl RedisCredentialStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for RedisCredentialStore {
    async fn insert(&self, credential: Credential) -> Result<bool> {
        let mut conn = connection(&self.pool).await?;
        let data = serde_json::to_string(&credential)?;

        let created: Option<String> = redis::cmd("SET")
            .arg(user_key(&credential.username))
            .arg(data)
            .arg("NX")
            .query_async(&mut conn)
            .await?;

        if created.is_none() {
            return Ok(false);
        }

        redis::cmd("SADD")
            .arg(USER_INDEX_KEY)
            .arg(&credential.username)
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(true)
    }

    async fn get(&self, username: &str) -> Result<Option<Credential>> {
        let mut conn = connection(&self.pool).await?;

        let data: Option<String> = redis::cmd("GET")
            .arg(user_key(username))
            .query_async(&mut conn)
            .await?;

        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn reset(&self) -> Result<()> {
        let mut conn = connection(&self.pool).await?;

        let usernames: Vec<String> = redis::cmd("SMEMBERS")
            .arg(USER_INDEX_KEY)
            .query_async(&mut conn)
            .await?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for username in &usernames {
            pipe.cmd("DEL").arg(user_key(username)).ignore();
        }
        pipe.cmd("DEL").arg(USER_INDEX_KEY).ignore();
        pipe.query_async::<_, ()>(&mut conn).await?;

        info!("Removed {} credentials", usernames.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::PasswordVerifier;

    // These need a live server: REDIS_URL or redis://127.0.0.1:6379.
    fn test_pool() -> Pool {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        create_pool(&url).unwrap()
    }

    fn new_job(start: i64) -> NewJob {
        NewJob {
            interface: "wlan0mon".to_string(),
            bssid: "AA:BB:CC:DD:EE:FF".to_string(),
            start,
            packets: 100,
            delay: 50,
        }
    }

    #[test]
    fn test_members_sort_like_ids() {
        assert!(job_member(9) < job_member(10));
        assert_eq!(job_member(42).len(), 20);
    }

    #[tokio::test]
    #[ignore]
    async fn test_insert_lookup_and_recency() -> Result<()> {
        let store = RedisJobStore::new(test_pool());
        store.reset().await?;

        let first = store.insert(new_job(1_000)).await?;
        let second = store.insert(new_job(1_000)).await?;
        assert!(second > first);

        let job = store.lookup(first).await?.unwrap();
        assert_eq!(job.packets, 100);
        assert_eq!(store.most_recent().await?.unwrap().id, second);
        assert_eq!(store.list_all().await?.len(), 2);

        store.reset().await?;
        assert!(store.list_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn test_credentials_unique() -> Result<()> {
        let store = RedisCredentialStore::new(test_pool());
        store.reset().await?;

        let credential = Credential {
            username: "bob".to_string(),
            verifier: PasswordVerifier { salt: vec![0; 16], hash: vec![1; 32], iterations: 1 },
            admin: true,
        };
        assert!(store.insert(credential.clone()).await?);
        assert!(!store.insert(credential).await?);
        assert!(store.get("bob").await?.unwrap().admin);

        store.reset().await?;
        assert!(store.get("bob").await?.is_none());
        Ok(())
    }
}
