//! In-memory store of generated batches, so documents can be downloaded after
//! the generation request returns. Bounded: the oldest batch is evicted first.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::generation::generator::GeneratedBatch;

#[derive(Debug)]
pub struct StoredBatch {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub batch: GeneratedBatch,
}

#[derive(Default)]
struct Inner {
    batches: HashMap<Uuid, Arc<StoredBatch>>,
    order: VecDeque<Uuid>,
}

#[derive(Clone)]
pub struct PaperStore {
    inner: Arc<RwLock<Inner>>,
    capacity: usize,
}

impl PaperStore {
    /// `capacity` is clamped to at least one batch.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            capacity: capacity.max(1),
        }
    }

    pub async fn insert(&self, batch: GeneratedBatch) -> Arc<StoredBatch> {
        let stored = Arc::new(StoredBatch {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            batch,
        });

        let mut inner = self.inner.write().await;
        while inner.order.len() >= self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.batches.remove(&oldest);
                    debug!(batch_id = %oldest, "Evicted oldest batch");
                }
                None => break,
            }
        }
        inner.order.push_back(stored.id);
        inner.batches.insert(stored.id, Arc::clone(&stored));
        stored
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<StoredBatch>> {
        self.inner.read().await.batches.get(&id).cloned()
    }
}

#[cfg(test)]
impl PaperStore {
    pub async fn len(&self) -> usize {
        self.inner.read().await.batches.len()
    }
}
