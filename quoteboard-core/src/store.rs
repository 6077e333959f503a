//! In-memory quote history.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::QuoteRecord;
use crate::ports::{PortError, QuoteStore};

/// Thread-safe, process-local implementation of [`QuoteStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuoteStore {
    records: Arc<RwLock<Vec<QuoteRecord>>>,
}

impl InMemoryQuoteStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl QuoteStore for InMemoryQuoteStore {
    async fn save(&self, record: &QuoteRecord) -> Result<(), PortError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<QuoteRecord>, PortError> {
        let records = self.records.read().await;

        let mut newest_first: Vec<&QuoteRecord> = records.iter().collect();
        newest_first.sort_by_key(|record| Reverse((record.created_at, record.id)));
        let take = if limit == 0 { newest_first.len() } else { limit };

        Ok(newest_first.into_iter().take(take).cloned().collect())
    }
}
