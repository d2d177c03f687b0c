use crate::ast::Node;
use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::sync::Arc;

/// Compiled-template cache keyed by a deterministic 64-bit content hash of
/// the raw template bytes. Entries never expire; owned by the engine
/// instance rather than living in a process-wide global.
pub(crate) struct AstCache {
    map: DashMap<u64, Arc<Vec<Node>>>,
}

impl AstCache {
    pub(crate) fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    pub(crate) fn get(&self, key: u64) -> Option<Arc<Vec<Node>>> {
        self.map.get(&key).map(|entry| entry.value().clone())
    }

    pub(crate) fn insert(&self, key: u64, ast: Arc<Vec<Node>>) {
        self.map.insert(key, ast);
    }

    pub(crate) fn clear(&self) {
        self.map.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}

/// Stable content fingerprint: SipHash with fixed keys, so byte-identical
/// templates map to the same entry across runs.
pub(crate) fn content_hash(template: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(template.as_bytes());
    hasher.finish()
}
