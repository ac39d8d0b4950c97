//! Per-client memoization of portal reads
//!
//! Every read is cached for the lifetime of the client, keyed by its
//! arguments. Tables are unbounded and nothing expires when the session
//! goes stale; only writes evict the entries they change.
//! Each key owns a [`OnceCell`], so concurrent first calls for the same key
//! share one request instead of racing. Failed calls leave the cell empty
//! and the next call retries.

use crate::Result;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Memo table from call arguments to a shared result
#[derive(Debug)]
pub struct Memo<K, V> {
    /// Label used in log lines
    name: &'static str,
    cells: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value for `key`, computing it with `init` on first use
    pub async fn get_or_try_init<F, Fut>(&self, key: K, init: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let cell = {
            let mut cells = self.cells.lock().await;
            cells.entry(key).or_default().clone()
        };

        if let Some(value) = cell.get() {
            tracing::trace!("{} served from cache", self.name);
            return Ok(value.clone());
        }

        cell.get_or_try_init(init).await.cloned()
    }

    /// Drop the cached value of one key
    pub async fn evict(&self, key: &K) -> bool {
        self.cells.lock().await.remove(key).is_some()
    }

    /// Drop every cached value
    pub async fn clear(&self) {
        let mut cells = self.cells.lock().await;
        tracing::debug!("Clearing {} cached {} entries", cells.len(), self.name);
        cells.clear();
    }

    pub async fn len(&self) -> usize {
        self.cells
            .lock()
            .await
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }
}
