//! Settings Store: the host's key-value option storage.
//!
//! The published document lives under [`SCHEMA_KEY`]. Structured options
//! (currently only the competing-renderer switch) are stored as JSON text.
//!
//! `RedisSettingsStore` is the production backend; tests use the in-memory
//! `MemorySettingsStore`.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

/// Settings group the admin form is bound to.
pub const SETTINGS_GROUP: &str = "localbusiness_schema_options";

/// Key holding the published JSON-LD document.
pub const SCHEMA_KEY: &str = "local_business_schema";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Malformed stored option '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize option '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Reads a structured option stored as JSON text.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn SettingsStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Malformed {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Writes a structured option as JSON text.
pub async fn set_json<T: Serialize>(
    store: &dyn SettingsStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw).await
}

// ────────────────────────────────────────────────────────────────────────────
// Competing renderer negotiation
// ────────────────────────────────────────────────────────────────────────────

fn renderer_option_key(name: &str) -> String {
    format!("{name}_options_sitemap")
}

/// Turns off the schema module of another structured-data renderer by
/// writing its module option, so only one JSON-LD block reaches the page head.
pub async fn disable_competing_renderer(
    store: &dyn SettingsStore,
    name: &str,
) -> Result<(), StoreError> {
    let key = renderer_option_key(name);
    set_json(store, &key, &json!({ "modules": { "schema": 0 } })).await?;
    info!("Disabled schema module of competing renderer '{name}'");
    Ok(())
}

/// True when the competing renderer's schema module flag is stored as off.
pub async fn is_renderer_disabled(
    store: &dyn SettingsStore,
    name: &str,
) -> Result<bool, StoreError> {
    let option: Option<Value> = get_json(store, &renderer_option_key(name)).await?;
    Ok(option
        .as_ref()
        .and_then(|option| option.pointer("/modules/schema"))
        .and_then(Value::as_i64)
        .is_some_and(|flag| flag == 0))
}

// ────────────────────────────────────────────────────────────────────────────
// Backends
// ────────────────────────────────────────────────────────────────────────────

/// Redis-backed option storage. Keys are namespaced under `settings:`.
pub struct RedisSettingsStore {
    client: redis::Client,
}

impl RedisSettingsStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn namespaced(key: &str) -> String {
        format!("settings:{key}")
    }
}

#[async_trait]
impl SettingsStore for RedisSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(Self::namespaced(key)).await?;
        debug!("settings get {key}: hit={}", value.is_some());
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(Self::namespaced(key), value).await?;
        debug!("settings set {key} ({} bytes)", value.len());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(Self::namespaced(key)).await?;
        debug!("settings delete {key}");
        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemorySettingsStore;
