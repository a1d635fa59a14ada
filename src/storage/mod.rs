//! Dual-backend key-value persistence.
//!
//! Values live in three places: an in-memory map owned by the store (what
//! callers read back within a session), an asynchronous primary backend,
//! and a synchronous fallback backend. Reads prefer memory, then primary,
//! then fallback. Writes go to all of them best-effort; backend failures
//! are logged and absorbed so the caller always gets a usable value.

mod json_backend;
mod sqlite_backend;

pub use json_backend::JsonFileBackend;
pub use sqlite_backend::SqliteBackend;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinSet;

use crate::error::{Result, VaultError};

/// Store key holding the category collection
pub const CATEGORIES_KEY: &str = "pv_categories";
/// Store key holding the prompt collection
pub const PROMPTS_KEY: &str = "pv_prompts";

/// Asynchronous, larger-capacity backend consulted first on read.
#[async_trait]
pub trait PrimaryBackend: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn put(&self, key: &str, value: &Value) -> Result<()>;
}

/// Synchronous backend always written as a durability backstop.
pub trait FallbackBackend: Send + 'static {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: &Value) -> Result<()>;
}

/// How a save orders its two backend writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    /// Fallback written before `save` returns, racing the primary write.
    #[default]
    Concurrent,
    /// Fallback written after the primary write settles, in the background.
    Sequential,
}

pub struct DualStore<P, F> {
    primary: Arc<P>,
    fallback: Arc<Mutex<F>>,
    memory: Mutex<HashMap<String, Value>>,
    pending: Mutex<JoinSet<()>>,
    policy: WritePolicy,
    runtime: Handle,
}

impl<P: PrimaryBackend, F: FallbackBackend> DualStore<P, F> {
    /// Build a store bound to the current tokio runtime.
    pub fn new(primary: P, fallback: F, policy: WritePolicy) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| VaultError::Storage(format!("no async runtime available: {}", e)))?;

        Ok(Self {
            primary: Arc::new(primary),
            fallback: Arc::new(Mutex::new(fallback)),
            memory: Mutex::new(HashMap::new()),
            pending: Mutex::new(JoinSet::new()),
            policy,
            runtime,
        })
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Load the value for `key`, or `default` when no backend has one.
    ///
    /// Never fails: backend errors and undecodable values are logged and
    /// treated as "no value".
    pub async fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let cached = lock(&self.memory).get(key).cloned();
        if let Some(value) = cached {
            if let Some(decoded) = decode(key, "memory", value) {
                return decoded;
            }
        }

        match self.primary.get(key).await {
            Ok(Some(value)) => {
                if let Some(decoded) = decode(key, "primary", value.clone()) {
                    tracing::debug!(key, "loaded from primary backend");
                    lock(&self.memory).insert(key.to_string(), value);
                    return decoded;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(key, error = %e, "primary backend read failed"),
        }

        let fallback_value = lock(&*self.fallback).get(key);
        match fallback_value {
            Ok(Some(value)) => {
                if let Some(decoded) = decode(key, "fallback", value.clone()) {
                    tracing::debug!(key, "loaded from fallback backend");
                    lock(&self.memory).insert(key.to_string(), value);
                    return decoded;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(key, error = %e, "fallback backend read failed"),
        }

        tracing::debug!(key, "no stored value, using default");
        default
    }

    /// Record `value` for `key` and persist it in the background.
    ///
    /// Returns as soon as the in-memory value is updated (and, under
    /// [`WritePolicy::Concurrent`], the fallback written). Use [`flush`]
    /// to wait for the primary write.
    ///
    /// [`flush`]: DualStore::flush
    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "could not serialize value, nothing saved");
                return;
            }
        };

        lock(&self.memory).insert(key.to_string(), value.clone());

        let primary = Arc::clone(&self.primary);
        let owned_key = key.to_string();

        match self.policy {
            WritePolicy::Concurrent => {
                let primary_value = value.clone();
                self.spawn_write(async move {
                    if let Err(e) = primary.put(&owned_key, &primary_value).await {
                        tracing::warn!(key = %owned_key, error = %e, "primary backend write failed");
                    }
                });
                write_fallback(&*self.fallback, key, &value);
            }
            WritePolicy::Sequential => {
                let fallback = Arc::clone(&self.fallback);
                self.spawn_write(async move {
                    if let Err(e) = primary.put(&owned_key, &value).await {
                        tracing::warn!(key = %owned_key, error = %e, "primary backend write failed");
                    }
                    write_fallback(&*fallback, &owned_key, &value);
                });
            }
        }
    }

    /// Number of background writes not yet collected by [`flush`] or a later save.
    ///
    /// [`flush`]: DualStore::flush
    pub fn pending_writes(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Collect finished writes, then queue `write` on the store's runtime.
    fn spawn_write<W>(&self, write: W)
    where
        W: Future<Output = ()> + Send + 'static,
    {
        let mut pending = lock(&self.pending);
        while let Some(joined) = pending.try_join_next() {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "background write task failed");
            }
        }
        pending.spawn_on(write, &self.runtime);
    }

    /// Wait for every background write issued so far.
    pub async fn flush(&self) {
        let mut pending = std::mem::take(&mut *lock(&self.pending));
        while let Some(joined) = pending.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "background write task failed");
            }
        }
    }
}

impl<P, F> Drop for DualStore<P, F> {
    /// Unflushed writes keep running after the store goes away.
    fn drop(&mut self) {
        lock(&self.pending).detach_all();
    }
}

fn write_fallback<F: FallbackBackend>(fallback: &Mutex<F>, key: &str, value: &Value) {
    if let Err(e) = lock(fallback).set(key, value) {
        tracing::warn!(key, error = %e, "fallback backend write failed");
    }
}

fn decode<T: DeserializeOwned>(key: &str, source: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!(key, source, error = %e, "stored value has unexpected shape");
            None
        }
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
