use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::error::LibraryError;
use crate::gateway::SwingGateway;
use crate::models::{Comparison, ComparisonInput};
use crate::query::QueryCache;

use super::state::MIN_COMPARE;

/// Saved comparisons, cached as one list.
#[derive(Clone)]
pub struct ComparisonsController {
    gateway: Arc<dyn SwingGateway>,
    list: Arc<Mutex<QueryCache<(), Vec<Comparison>>>>,
}

impl ComparisonsController {
    pub fn new(config: &AppConfig, gateway: Arc<dyn SwingGateway>) -> Self {
        Self {
            gateway,
            list: Arc::new(Mutex::new(QueryCache::new(config.library_stale_time))),
        }
    }

    pub async fn list(&self) -> Result<Vec<Comparison>, LibraryError> {
        if let Some(cached) = self.list.lock().await.get_fresh(&()).cloned() {
            return Ok(cached);
        }
        let comparisons = self.gateway.list_comparisons().await?;
        self.list.lock().await.insert((), comparisons.clone());
        Ok(comparisons)
    }

    pub async fn get(&self, id: &str) -> Result<Comparison, LibraryError> {
        Ok(self.gateway.get_comparison(id).await?)
    }

    pub async fn create(&self, input: ComparisonInput) -> Result<Comparison, LibraryError> {
        let swing_count = input.swings.as_ref().map(Vec::len).unwrap_or(0);
        if swing_count < MIN_COMPARE {
            return Err(LibraryError::TooFewSwings { min: MIN_COMPARE });
        }
        let created = self.gateway.create_comparison(&input).await?;
        self.list.lock().await.invalidate(&());
        Ok(created)
    }

    pub async fn update(&self, id: &str, input: ComparisonInput) -> Result<Comparison, LibraryError> {
        let updated = self.gateway.update_comparison(id, &input).await?;
        self.list.lock().await.invalidate(&());
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), LibraryError> {
        self.gateway.delete_comparison(id).await?;
        self.list.lock().await.invalidate(&());
        Ok(())
    }
}
