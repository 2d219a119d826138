use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::error::LibraryError;
use crate::events::{self, EventSink};
use crate::gateway::{SwingGateway, SwingPage};
use crate::models::{Swing, SwingPatch};
use crate::query::QueryCache;

use super::{LibrarySnapshot, LibraryStore, SelectionChange};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PageKey {
    page: u32,
    limit: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionUpdate {
    pub change: SelectionChange,
    pub library: LibrarySnapshot,
}

/// Owns the swing collection, its query cache and the comparison selection.
#[derive(Clone)]
pub struct LibraryController {
    gateway: Arc<dyn SwingGateway>,
    store: Arc<Mutex<LibraryStore>>,
    pages: Arc<Mutex<QueryCache<PageKey, SwingPage>>>,
    swings: Arc<Mutex<QueryCache<String, Swing>>>,
    events: Arc<dyn EventSink>,
    page_size: u32,
}

impl LibraryController {
    pub fn new(config: &AppConfig, gateway: Arc<dyn SwingGateway>, events: Arc<dyn EventSink>) -> Self {
        Self {
            gateway,
            store: Arc::new(Mutex::new(LibraryStore::new())),
            pages: Arc::new(Mutex::new(QueryCache::new(config.library_stale_time))),
            swings: Arc::new(Mutex::new(QueryCache::new(config.library_stale_time))),
            events,
            page_size: config.page_size.max(1),
        }
    }

    pub async fn snapshot(&self) -> LibrarySnapshot {
        self.store.lock().await.snapshot()
    }

    /// Loads a page of swings, reusing a fresh cached page when there is one.
    ///
    /// An unreachable API degrades to an empty library; any other failure is
    /// reported.
    pub async fn load(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<LibrarySnapshot, LibraryError> {
        let key = PageKey {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(self.page_size).max(1),
        };

        let cached = self.pages.lock().await.get_fresh(&key).cloned();
        let fetched = match cached {
            Some(page) => page,
            None => match self.gateway.list_swings(key.page, key.limit).await {
                Ok(page) => {
                    log_info!("loaded {} swings (page {})", page.swings.len(), key.page);
                    self.pages.lock().await.insert(key, page.clone());
                    page
                }
                Err(err) if err.is_network() => {
                    log_warn!("swing API unreachable, showing an empty library: {err}");
                    SwingPage {
                        swings: Vec::new(),
                        pagination: None,
                    }
                }
                Err(err) => {
                    log_error!("failed to load swings: {err}");
                    return Err(LibraryError::Load(err));
                }
            },
        };

        let snapshot = {
            let mut store = self.store.lock().await;
            store.set_swings(fetched.swings);
            store.set_pagination(fetched.pagination);
            store.snapshot()
        };
        self.publish(&snapshot);
        Ok(snapshot)
    }

    /// Drops every cached page and loads the first one again.
    pub async fn refresh(&self) -> Result<LibrarySnapshot, LibraryError> {
        self.invalidate_pages().await;
        self.load(None, None).await
    }

    pub async fn get_swing(&self, id: &str) -> Result<Swing, LibraryError> {
        if let Some(swing) = self.swings.lock().await.get_fresh(&id.to_string()).cloned() {
            return Ok(swing);
        }

        let swing = self.gateway.get_swing(id).await?;
        self.swings.lock().await.insert(id.to_string(), swing.clone());
        Ok(swing)
    }

    pub async fn update_swing(&self, id: &str, patch: SwingPatch) -> Result<Swing, LibraryError> {
        if patch.is_empty() {
            return Err(LibraryError::EmptyPatch(id.to_string()));
        }

        let updated = self.gateway.update_swing(id, &patch).await?;
        self.swings.lock().await.insert(id.to_string(), updated.clone());
        self.invalidate_pages().await;

        let snapshot = {
            let mut store = self.store.lock().await;
            store.replace(updated.clone());
            store.snapshot()
        };
        self.publish(&snapshot);
        Ok(updated)
    }

    /// Deletes remotely, then purges the swing from the collection and the
    /// selection in one step.
    pub async fn delete_swing(&self, id: &str) -> Result<LibrarySnapshot, LibraryError> {
        self.gateway.delete_swing(id).await?;
        log_info!("deleted swing {id}");

        self.swings.lock().await.remove(&id.to_string());
        self.invalidate_pages().await;

        let snapshot = {
            let mut store = self.store.lock().await;
            store.remove(id);
            store.snapshot()
        };
        self.publish(&snapshot);
        Ok(snapshot)
    }

    /// Records a swing the upload pipeline just created.
    pub async fn insert_created(&self, swing: Swing) -> LibrarySnapshot {
        self.swings.lock().await.insert(swing.id.clone(), swing.clone());
        self.invalidate_pages().await;

        let snapshot = {
            let mut store = self.store.lock().await;
            store.prepend(swing);
            store.snapshot()
        };
        self.publish(&snapshot);
        snapshot
    }

    pub async fn toggle_selection(&self, id: &str) -> SelectionUpdate {
        let (change, library) = {
            let mut store = self.store.lock().await;
            let change = store.toggle_selection(id);
            (change, store.snapshot())
        };
        if change != SelectionChange::Ignored {
            self.publish(&library);
        }
        SelectionUpdate { change, library }
    }

    pub async fn clear_selection(&self) -> LibrarySnapshot {
        let snapshot = {
            let mut store = self.store.lock().await;
            store.clear_selection();
            store.snapshot()
        };
        self.publish(&snapshot);
        snapshot
    }

    pub async fn selected_swings(&self) -> Vec<Swing> {
        self.store.lock().await.selected_swings()
    }

    async fn invalidate_pages(&self) {
        self.pages.lock().await.invalidate_where(|_| true);
    }

    fn publish(&self, snapshot: &LibrarySnapshot) {
        events::emit(self.events.as_ref(), events::LIBRARY_CHANGED, snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use crate::events::RecordingSink;
    use crate::testing::{http_error, network_error, swing, FakeGateway};

    fn controller(fake: Arc<FakeGateway>) -> (LibraryController, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let controller = LibraryController::new(&AppConfig::default(), fake, sink.clone());
        (controller, sink)
    }

    #[tokio::test]
    async fn unreachable_api_yields_empty_library() {
        let fake = Arc::new(FakeGateway::with_swings(&["a"]));
        *fake.list_error.lock().unwrap() = Some(network_error());
        let (library, _) = controller(fake);

        let snapshot = library.load(None, None).await.expect("empty library");
        assert!(snapshot.swings.is_empty());
    }

    #[tokio::test]
    async fn http_failure_is_reported() {
        let fake = Arc::new(FakeGateway::default());
        *fake.list_error.lock().unwrap() = Some(http_error(500, "boom"));
        let (library, _) = controller(fake);

        let err = library.load(None, None).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to load swings"));
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_pages_are_served_from_cache() {
        let fake = Arc::new(FakeGateway::with_swings(&["a", "b"]));
        let (library, _) = controller(fake.clone());

        library.load(None, None).await.unwrap();
        library.load(None, None).await.unwrap();
        assert_eq!(fake.list_calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(121)).await;
        library.load(None, None).await.unwrap();
        assert_eq!(fake.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn delete_purges_selection_and_refetches() {
        let fake = Arc::new(FakeGateway::with_swings(&["a", "b"]));
        let (library, sink) = controller(fake.clone());
        library.load(None, None).await.unwrap();
        library.toggle_selection("a").await;
        library.toggle_selection("b").await;

        let snapshot = library.delete_swing("a").await.unwrap();
        assert_eq!(snapshot.selection, vec!["b".to_string()]);
        assert!(snapshot.swings.iter().all(|s| s.id != "a"));
        assert!(!snapshot.can_compare);
        assert_eq!(fake.deleted.lock().unwrap().as_slice(), &["a".to_string()]);

        library.load(None, None).await.unwrap();
        assert_eq!(fake.list_calls.load(Ordering::SeqCst), 2);
        assert!(sink.count(events::LIBRARY_CHANGED) >= 4);
    }

    #[tokio::test]
    async fn third_selection_does_not_emit() {
        let fake = Arc::new(FakeGateway::with_swings(&["a", "b", "c"]));
        let (library, sink) = controller(fake);
        library.load(None, None).await.unwrap();
        library.toggle_selection("a").await;
        library.toggle_selection("b").await;
        let before = sink.count(events::LIBRARY_CHANGED);

        let update = library.toggle_selection("c").await;
        assert_eq!(update.change, SelectionChange::Ignored);
        assert_eq!(update.library.selection.len(), 2);
        assert_eq!(sink.count(events::LIBRARY_CHANGED), before);
    }

    #[tokio::test]
    async fn update_replaces_in_place() {
        let fake = Arc::new(FakeGateway::with_swings(&["a", "b"]));
        let (library, _) = controller(fake);
        library.load(None, None).await.unwrap();

        let patch = SwingPatch {
            title: Some("Driver, windy".into()),
            ..SwingPatch::default()
        };
        let updated = library.update_swing("b", patch).await.unwrap();
        assert_eq!(updated.title.as_deref(), Some("Driver, windy"));

        let snapshot = library.snapshot().await;
        assert_eq!(snapshot.swings[1].title.as_deref(), Some("Driver, windy"));
    }

    #[tokio::test]
    async fn empty_patch_is_rejected_locally() {
        let fake = Arc::new(FakeGateway::with_swings(&["a"]));
        let (library, _) = controller(fake);
        let err = library.update_swing("a", SwingPatch::default()).await.unwrap_err();
        assert_eq!(err, LibraryError::EmptyPatch("a".into()));
    }

    #[tokio::test]
    async fn created_swings_go_first() {
        let fake = Arc::new(FakeGateway::with_swings(&["a"]));
        let (library, _) = controller(fake);
        library.load(None, None).await.unwrap();

        let snapshot = library.insert_created(swing("fresh")).await;
        assert_eq!(snapshot.swings[0].id, "fresh");
        assert_eq!(library.get_swing("fresh").await.unwrap().id, "fresh");
    }
}
