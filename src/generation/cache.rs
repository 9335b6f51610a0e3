//! Response cache: bounded FIFO of validated provider payloads.

use crate::generation::payload::{GenerationPayload, RequestKind};
use crate::types::{ContextEntry, Seed};
use blake3::Hasher;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// `[cache]` configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_capacity() -> usize {
    256
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            capacity: default_capacity(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && self.capacity == 0 {
            return Err("capacity must be positive when the cache is enabled".to_string());
        }
        Ok(())
    }
}

/// `(kind, seed, blake3(inputs))`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: RequestKind,
    pub seed: Seed,
    pub digest: String,
}

impl CacheKey {
    /// Key for an arbitrary ordered list of input strings.
    pub fn new(kind: RequestKind, seed: Seed, inputs: &[&str]) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(kind.as_str().as_bytes());
        for input in inputs {
            // Length prefix keeps ("ab", "c") and ("a", "bc") apart.
            hasher.update(&(input.len() as u64).to_be_bytes());
            hasher.update(input.as_bytes());
        }
        Self {
            kind,
            seed,
            digest: hex::encode(hasher.finalize().as_bytes()),
        }
    }

    pub fn initial(seed: Seed, player_name: &str, difficulty: &str) -> Self {
        Self::new(RequestKind::Initial, seed, &[player_name, difficulty])
    }

    pub fn continuation(seed: Seed, context: &[ContextEntry], action: &str) -> Self {
        let mut inputs: Vec<&str> = Vec::with_capacity(context.len() * 2 + 1);
        for entry in context {
            inputs.push(entry.role.as_str());
            inputs.push(&entry.content);
        }
        inputs.push(action);
        Self::new(RequestKind::Continuation, seed, &inputs)
    }
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<CacheKey, GenerationPayload>,
    order: VecDeque<CacheKey>,
}

pub struct ResponseCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

impl ResponseCache {
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(if config.enabled { config.capacity } else { 0 })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, key: &CacheKey) -> Option<GenerationPayload> {
        self.inner.lock().entries.get(key).cloned()
    }

    /// Insert, evicting the oldest entry when full. Re-inserting a key keeps its position.
    pub fn insert(&self, key: CacheKey, payload: GenerationPayload) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.lock();
        if inner.entries.insert(key.clone(), payload).is_some() {
            return;
        }
        inner.order.push_back(key);
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}
