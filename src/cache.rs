//! C5 — Assessment Cache: LRU with TTL, keyed by a stable fingerprint of
//! (model, prompt, params). Built on `moka::sync::Cache`, already in the
//! teacher's dependency table though unused there.

use moka::sync::Cache;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

pub struct AssessmentCache<T: Clone + Send + Sync + 'static> {
    inner: Cache<String, T>,
}

impl<T: Clone + Send + Sync + 'static> AssessmentCache<T> {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.inner.get(key)
    }

    pub fn put(&self, key: String, value: T) {
        self.inner.insert(key, value);
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

/// `sha256(model + "\x00" + canonical_json(prompt) + "\x00" + canonical_json(params))`.
/// `serde_json::to_string` on an already-deserialized, field-ordered struct
/// gives us the canonical form without a separate normalization pass.
pub fn cache_key<P: Serialize, Q: Serialize>(model: &str, prompt: &P, params: &Q) -> String {
    let prompt_json = serde_json::to_string(prompt).unwrap_or_default();
    let params_json = serde_json::to_string(params).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update([0u8]);
    hasher.update(prompt_json.as_bytes());
    hasher.update([0u8]);
    hasher.update(params_json.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn put_then_get_returns_value_until_ttl() {
        let cache: AssessmentCache<String> = AssessmentCache::new(10, Duration::from_millis(50));
        cache.put("k".to_string(), "v".to_string());
        assert_eq!(cache.get("k"), Some("v".to_string()));
        thread::sleep(Duration::from_millis(80));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn cache_key_is_stable_for_identical_inputs() {
        let k1 = cache_key("gpt-4o-mini", &"prompt text", &serde_json::json!({"temperature": 0.3}));
        let k2 = cache_key("gpt-4o-mini", &"prompt text", &serde_json::json!({"temperature": 0.3}));
        assert_eq!(k1, k2);
        let k3 = cache_key("gpt-4o-mini", &"different prompt", &serde_json::json!({"temperature": 0.3}));
        assert_ne!(k1, k3);
    }
}
