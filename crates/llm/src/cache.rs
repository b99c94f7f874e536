//! Content-addressed summary cache
//!
//! The cache is advisory: every backend failure is logged and degrades to a
//! miss (or a dropped write). Nothing here returns an error to the caller.

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use summarist_common::{AppConfig, CacheBackendKind, Result, SummaristError};
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, warn};

use crate::types::{CachedSummary, Style};

/// Namespace for summary entries in a shared key space
pub const KEY_PREFIX: &str = "summary:";

/// Upper bound for a single Redis round trip
const REDIS_OP_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound for establishing the Redis connection
const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// How long Redis is skipped after a failure
const REDIS_FAULT_COOLDOWN: Duration = Duration::from_secs(30);

/// Minimal key-value engine the cache is built on
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, expiring after `ttl`
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

/// Redis-backed key-value engine
///
/// Connects lazily on first use; the connection manager reconnects on its own
/// after a dropped connection. After any failure the backend is skipped for
/// [`REDIS_FAULT_COOLDOWN`], so an unreachable server costs one failed
/// attempt per cool-down rather than a timeout per request.
pub struct RedisKv {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    last_fault: Mutex<Option<Instant>>,
}

impl RedisKv {
    pub fn from_url(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| SummaristError::config(format!("Invalid Redis URL '{}': {}", url, e)))?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            last_fault: Mutex::new(None),
        })
    }

    fn in_cooldown(&self) -> bool {
        match self.last_fault.lock() {
            Ok(last_fault) => last_fault.is_some_and(|at| at.elapsed() < REDIS_FAULT_COOLDOWN),
            Err(_) => false,
        }
    }

    /// Record the outcome of a Redis call, passing it through
    fn track<T>(&self, result: Result<T>) -> Result<T> {
        if let Ok(mut last_fault) = self.last_fault.lock() {
            *last_fault = match result {
                Ok(_) => None,
                Err(_) => Some(Instant::now()),
            };
        }
        result
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        if self.in_cooldown() {
            return Err(SummaristError::cache("Redis unavailable, skipping until cool-down ends"));
        }

        let manager = self
            .connection
            .get_or_try_init(|| async {
                let config = ConnectionManagerConfig::new()
                    .set_number_of_retries(0)
                    .set_connection_timeout(REDIS_CONNECT_TIMEOUT)
                    .set_response_timeout(REDIS_OP_TIMEOUT);

                let connect = ConnectionManager::new_with_config(self.client.clone(), config);
                let result = tokio::time::timeout(REDIS_CONNECT_TIMEOUT, connect)
                    .await
                    .map_err(|_| SummaristError::cache("Redis connect timed out"))
                    .and_then(|r| {
                        r.map_err(|e| SummaristError::cache(format!("Redis connect error: {}", e)))
                    });
                self.track(result)
            })
            .await?;

        Ok(manager.clone())
    }
}

#[async_trait]
impl KvBackend for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut con = self.connection().await?;

        let result = tokio::time::timeout(REDIS_OP_TIMEOUT, con.get::<_, Option<String>>(key))
            .await
            .map_err(|_| SummaristError::cache("Redis GET timed out"))
            .and_then(|r| r.map_err(|e| SummaristError::cache(format!("Redis GET error: {}", e))));
        self.track(result)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut con = self.connection().await?;

        let result = tokio::time::timeout(
            REDIS_OP_TIMEOUT,
            con.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1)),
        )
        .await
        .map_err(|_| SummaristError::cache("Redis SET timed out"))
        .and_then(|r| r.map_err(|e| SummaristError::cache(format!("Redis SET error: {}", e))));
        self.track(result)
    }
}

/// In-process key-value engine with per-entry expiry
///
/// A TTL too large to represent as an [`Instant`] never expires.
#[derive(Default)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, (String, Option<Instant>)>>,
}

fn is_live(expires_at: &Option<Instant>, now: Instant) -> bool {
    expires_at.map_or(true, |at| at > now)
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| is_live(expires_at, Instant::now()))
            .map(|(value, _)| value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, expires_at)| is_live(expires_at, now));
        entries.insert(key.to_string(), (value.to_string(), now.checked_add(ttl)));
        Ok(())
    }
}

/// Hash fields with a length prefix each, so no two field tuples share an encoding
fn fingerprint(fields: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field);
    }
    hex::encode(hasher.finalize())
}

/// Deterministic cache key for a (text, style, max_length) triple
pub fn cache_key(text: &str, style: Style, max_length: u32) -> String {
    let max_length = max_length.to_string();
    format!(
        "{}{}",
        KEY_PREFIX,
        fingerprint(&[
            text.as_bytes(),
            style.as_str().as_bytes(),
            max_length.as_bytes(),
        ])
    )
}

/// Summary cache over a pluggable key-value engine
#[derive(Clone)]
pub struct CacheStore {
    backend: Option<Arc<dyn KvBackend>>,
    ttl: Duration,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn KvBackend>, ttl: Duration) -> Self {
        Self {
            backend: Some(backend),
            ttl,
        }
    }

    /// A cache that never hits and never stores
    pub fn disabled() -> Self {
        Self {
            backend: None,
            ttl: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Look up a previously stored summary
    pub async fn lookup(&self, text: &str, style: Style, max_length: u32) -> Option<CachedSummary> {
        let backend = self.backend.as_ref()?;
        let key = cache_key(text, style, max_length);

        let raw = match backend.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache lookup failed, treating as miss: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Store a summary; failures are logged and dropped
    pub async fn store(&self, text: &str, style: Style, max_length: u32, entry: &CachedSummary) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        let key = cache_key(text, style, max_length);

        let raw = match serde_json::to_string(entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize cache entry: {}", e);
                return;
            }
        };

        match backend.set_ex(&key, &raw, self.ttl).await {
            Ok(()) => debug!("Cached summary under {} (ttl {:?})", key, self.ttl),
            Err(e) => warn!("Cache store failed: {}", e),
        }
    }
}

/// Build the configured cache
pub fn build_cache_store(config: &AppConfig) -> Result<CacheStore> {
    let ttl = Duration::from_secs(config.cache_ttl_secs);

    let store = match config.cache_backend_kind()? {
        CacheBackendKind::Redis => CacheStore::new(Arc::new(RedisKv::from_url(&config.redis_url)?), ttl),
        CacheBackendKind::Memory => CacheStore::new(Arc::new(MemoryKv::new()), ttl),
        CacheBackendKind::None => CacheStore::disabled(),
    };

    info!(
        "Summary cache: backend={}, ttl={}s",
        config.cache_backend, config.cache_ttl_secs
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend standing in for an unreachable Redis
    struct FailingKv;

    #[async_trait]
    impl KvBackend for FailingKv {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(SummaristError::cache("connection refused"))
        }

        async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
            Err(SummaristError::cache("connection refused"))
        }
    }

    fn entry() -> CachedSummary {
        CachedSummary {
            summary: "A short summary.".to_string(),
            style: Style::Bullet,
            model: "test-model".to_string(),
            prompt_word_count: 42,
            summary_word_count: 3,
        }
    }

    #[test]
    fn test_cache_key_is_deterministic() {
        let a = cache_key("some text", Style::Paragraph, 200);
        let b = cache_key("some text", Style::Paragraph, 200);
        assert_eq!(a, b);
        assert!(a.starts_with(KEY_PREFIX));
        assert_eq!(a.len(), KEY_PREFIX.len() + 64);

        assert_ne!(a, cache_key("some text", Style::Tldr, 200));
        assert_ne!(a, cache_key("some text", Style::Paragraph, 201));
        assert_ne!(a, cache_key("some text!", Style::Paragraph, 200));
    }

    #[test]
    fn test_fingerprint_has_no_boundary_collisions() {
        assert_ne!(
            fingerprint(&[b"a:b", b"c"]),
            fingerprint(&[b"a", b"b:c"])
        );
        assert_ne!(fingerprint(&[b"ab", b""]), fingerprint(&[b"a", b"b"]));
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = CacheStore::new(Arc::new(MemoryKv::new()), Duration::from_secs(60));
        assert!(store.lookup("text", Style::Bullet, 200).await.is_none());

        store.store("text", Style::Bullet, 200, &entry()).await;
        assert_eq!(store.lookup("text", Style::Bullet, 200).await, Some(entry()));
        assert!(store.lookup("text", Style::Bullet, 300).await.is_none());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = CacheStore::new(Arc::new(MemoryKv::new()), Duration::from_millis(30));
        store.store("text", Style::Bullet, 200, &entry()).await;
        assert!(store.lookup("text", Style::Bullet, 200).await.is_some());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(store.lookup("text", Style::Bullet, 200).await.is_none());
    }

    #[tokio::test]
    async fn test_huge_ttl_never_expires() {
        let store = CacheStore::new(Arc::new(MemoryKv::new()), Duration::from_secs(u64::MAX));
        store.store("text", Style::Bullet, 200, &entry()).await;
        assert_eq!(store.lookup("text", Style::Bullet, 200).await, Some(entry()));
    }

    #[tokio::test]
    async fn test_unreachable_redis_fails_fast() {
        // Nothing listens on port 1
        let kv = Arc::new(RedisKv::from_url("redis://127.0.0.1:1/0").unwrap());
        let store = CacheStore::new(kv.clone(), Duration::from_secs(60));

        for _ in 0..3 {
            let started = Instant::now();
            assert!(store.lookup("text", Style::Bullet, 200).await.is_none());
            store.store("text", Style::Bullet, 200, &entry()).await;
            assert!(
                started.elapsed() < Duration::from_millis(900),
                "cache round took {:?}",
                started.elapsed()
            );
        }
        assert!(kv.in_cooldown());
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_to_miss() {
        let store = CacheStore::new(Arc::new(FailingKv), Duration::from_secs(60));
        store.store("text", Style::Bullet, 200, &entry()).await;
        assert!(store.lookup("text", Style::Bullet, 200).await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let kv = Arc::new(MemoryKv::new());
        kv.set_ex(
            &cache_key("text", Style::Tldr, 100),
            "{not json",
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        let store = CacheStore::new(kv, Duration::from_secs(60));
        assert!(store.lookup("text", Style::Tldr, 100).await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_store_always_misses() {
        let store = CacheStore::disabled();
        assert!(!store.is_enabled());
        store.store("text", Style::Bullet, 200, &entry()).await;
        assert!(store.lookup("text", Style::Bullet, 200).await.is_none());
    }

    #[test]
    fn test_build_cache_store() {
        let mut config = AppConfig::default();
        config.cache_backend = "memory".to_string();
        assert!(build_cache_store(&config).unwrap().is_enabled());

        config.cache_backend = "none".to_string();
        assert!(!build_cache_store(&config).unwrap().is_enabled());

        // Opening a client does not connect, so an unreachable host is fine here
        config.cache_backend = "redis".to_string();
        assert!(build_cache_store(&config).unwrap().is_enabled());

        config.redis_url = "not a url".to_string();
        assert!(build_cache_store(&config).is_err());
    }
}
