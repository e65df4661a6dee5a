//! Best-effort persistence of the idea list and the last profile.
//!
//! Values are versioned JSON envelopes. Every failure is logged and swallowed:
//! a broken store must never block generating or rating ideas.

pub mod kv;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::models::idea::IdeaWithFeedback;
use crate::models::profile::UserProfile;
use kv::KeyValueStore;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The two keys the adapter writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub ideas_key: String,
    pub profile_key: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            ideas_key: "binko_ideas".to_string(),
            profile_key: "binko_profile".to_string(),
        }
    }
}

#[derive(Serialize)]
struct IdeasEnvelopeRef<'a> {
    version: u32,
    ideas: &'a [IdeaWithFeedback],
}

#[derive(Serialize)]
struct ProfileEnvelopeRef<'a> {
    version: u32,
    profile: &'a UserProfile,
}

#[derive(Deserialize)]
struct IdeasEnvelope {
    ideas: Vec<IdeaWithFeedback>,
}

#[derive(Deserialize)]
struct ProfileEnvelope {
    profile: UserProfile,
}

#[derive(Clone)]
pub struct PersistenceAdapter {
    store: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl PersistenceAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    pub async fn save_ideas(&self, ideas: &[IdeaWithFeedback]) {
        let envelope = IdeasEnvelopeRef {
            version: SNAPSHOT_VERSION,
            ideas,
        };
        self.write(&self.keys.ideas_key, &envelope).await;
    }

    /// Returns `None` when nothing is stored or the stored value is unreadable.
    pub async fn load_ideas(&self) -> Option<Vec<IdeaWithFeedback>> {
        let value = self.read(&self.keys.ideas_key).await?;
        decode_snapshot(value, |v| {
            serde_json::from_value::<IdeasEnvelope>(v).map(|e| e.ideas)
        })
    }

    pub async fn save_profile(&self, profile: &UserProfile) {
        let envelope = ProfileEnvelopeRef {
            version: SNAPSHOT_VERSION,
            profile,
        };
        self.write(&self.keys.profile_key, &envelope).await;
    }

    pub async fn load_profile(&self) -> Option<UserProfile> {
        let value = self.read(&self.keys.profile_key).await?;
        decode_snapshot(value, |v| {
            serde_json::from_value::<ProfileEnvelope>(v).map(|e| e.profile)
        })
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize '{key}' snapshot: {e}");
                return;
            }
        };

        match self.store.set(key, &json).await {
            Ok(()) => debug!("Saved '{key}' snapshot ({} bytes)", json.len()),
            Err(e) => error!("Failed to save '{key}' snapshot: {e}"),
        }
    }

    async fn read(&self, key: &str) -> Option<Value> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!("Failed to read '{key}' snapshot: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding unreadable '{key}' snapshot: {e}");
                None
            }
        }
    }
}

/// Decodes a versioned envelope, or a bare legacy payload written before
/// snapshots carried a version.
fn decode_snapshot<T: DeserializeOwned>(
    value: Value,
    decode_envelope: impl FnOnce(Value) -> Result<T, serde_json::Error>,
) -> Option<T> {
    let version = value.get("version").and_then(Value::as_u64);

    let decoded = match version {
        Some(v) if v == SNAPSHOT_VERSION as u64 => decode_envelope(value),
        Some(v) => {
            warn!("Ignoring snapshot with unsupported version {v}");
            return None;
        }
        None => serde_json::from_value::<T>(value),
    };

    match decoded {
        Ok(data) => Some(data),
        Err(e) => {
            warn!("Discarding snapshot that failed to decode: {e}");
            None
        }
    }
}
