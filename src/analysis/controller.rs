use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::config::AppConfig;
use crate::error::AnalysisError;
use crate::events::{self, EventSink};
use crate::gateway::{GatewayError, SwingGateway};
use crate::models::{AnalysisStatus, PoseAnalysis};
use crate::query::{PollStep, Poller, QueryCache};

use super::state::{needs_auto_generate, AnalysisView, GenerateBook, GenerateOutcome};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisUpdatedEvent<'a> {
    swing_id: &'a str,
    analysis: &'a PoseAnalysis,
}

/// Pose-analysis status per swing: fetch, generate, and poll while the
/// backend is processing.
#[derive(Clone)]
pub struct AnalysisController {
    gateway: Arc<dyn SwingGateway>,
    cache: Arc<Mutex<QueryCache<String, PoseAnalysis>>>,
    book: Arc<Mutex<GenerateBook>>,
    poller: Arc<Mutex<Poller<String>>>,
    events: Arc<dyn EventSink>,
    poll_interval: Duration,
}

impl AnalysisController {
    pub fn new(config: &AppConfig, gateway: Arc<dyn SwingGateway>, events: Arc<dyn EventSink>) -> Self {
        Self {
            gateway,
            cache: Arc::new(Mutex::new(QueryCache::new(config.poll_interval))),
            book: Arc::new(Mutex::new(GenerateBook::new())),
            poller: Arc::new(Mutex::new(Poller::new())),
            events,
            poll_interval: config.poll_interval,
        }
    }

    /// Last known analysis and generate state, without touching the network.
    pub async fn view(&self, swing_id: &str) -> AnalysisView {
        let analysis = self.cache.lock().await.get(&swing_id.to_string()).cloned();
        let book = self.book.lock().await;
        AnalysisView {
            swing_id: swing_id.to_string(),
            analysis,
            generating: book.is_in_flight(swing_id),
            start_error: book.start_error(swing_id).map(str::to_string),
        }
    }

    /// Reads the current status from the backend and caches it.
    ///
    /// A processing status starts the poll loop for the swing; any other
    /// status stops it. A read that a generate overtook while it was in
    /// flight is dropped and the cached status is returned instead.
    pub async fn fetch_status(&self, swing_id: &str) -> Result<PoseAnalysis, AnalysisError> {
        let epoch = self.book.lock().await.epoch(swing_id);
        let analysis = self
            .read_remote(swing_id)
            .await
            .map_err(|source| AnalysisError::Fetch {
                swing_id: swing_id.to_string(),
                source,
            })?;

        let book = self.book.lock().await;
        if book.epoch(swing_id) != epoch {
            drop(book);
            log_info!("dropping status read for {swing_id} that predates the latest generate");
            let current = self.cache.lock().await.get(&swing_id.to_string()).cloned();
            return Ok(current.unwrap_or(analysis));
        }
        self.store(&analysis).await;
        if analysis.is_processing() {
            self.ensure_polling(swing_id).await;
        } else {
            self.poller.lock().await.stop(&swing_id.to_string());
        }
        drop(book);

        self.announce(&analysis);
        Ok(analysis)
    }

    /// Cached status if it is still fresh, otherwise a fetch.
    pub async fn status(&self, swing_id: &str) -> Result<PoseAnalysis, AnalysisError> {
        if let Some(fresh) = self.cache.lock().await.get_fresh(&swing_id.to_string()).cloned() {
            return Ok(fresh);
        }
        self.fetch_status(swing_id).await
    }

    /// Asks the backend to compute snapshots for the swing.
    ///
    /// A second call for the same swing while the first is in flight is a
    /// no-op. Calls for other swings proceed independently.
    pub async fn generate(&self, swing_id: &str) -> Result<GenerateOutcome, AnalysisError> {
        let Some(token) = self.book.lock().await.try_begin(swing_id) else {
            log_info!("generate for {swing_id} already in flight");
            return Ok(GenerateOutcome::AlreadyInFlight);
        };

        let result = self.gateway.generate_analysis(swing_id).await;

        let ticket = match result {
            Ok(ticket) => {
                let mut book = self.book.lock().await;
                book.finish(swing_id, token, None);
                book.advance_epoch(swing_id);
                ticket
            }
            Err(source) => {
                log_error!("failed to start analysis for {swing_id}: {source}");
                self.book
                    .lock()
                    .await
                    .finish(swing_id, token, Some(source.to_string()));
                return Err(AnalysisError::GenerateFailed {
                    swing_id: swing_id.to_string(),
                    source,
                });
            }
        };

        log_info!(
            "analysis requested for {swing_id} (task {})",
            ticket.task_id.as_deref().unwrap_or("-")
        );

        let analysis = match ticket.status {
            AnalysisStatus::Available | AnalysisStatus::Failed => self.fetch_status(swing_id).await?,
            AnalysisStatus::Processing | AnalysisStatus::NotGenerated => {
                let processing = PoseAnalysis::processing(swing_id);
                self.record(&processing).await;
                self.ensure_polling(swing_id).await;
                processing
            }
        };

        Ok(GenerateOutcome::Started { analysis })
    }

    /// Comparison-view policy: resolve each selected swing's status and
    /// generate for those that have never been analyzed.
    ///
    /// Safe to call on every selection or status change. Returns the ids a
    /// generate was started for.
    pub async fn auto_trigger(&self, swing_ids: &[String]) -> Vec<String> {
        let mut pending = JoinSet::new();

        for swing_id in swing_ids {
            let status = match self.status(swing_id).await {
                Ok(analysis) => analysis.status,
                Err(err) => {
                    log_warn!("skipping auto-generate for {swing_id}: {err}");
                    continue;
                }
            };
            let in_flight = self.book.lock().await.is_in_flight(swing_id);
            if !needs_auto_generate(status, in_flight) {
                continue;
            }

            let controller = self.clone();
            let swing_id = swing_id.clone();
            pending.spawn(async move {
                let started = matches!(
                    controller.generate(&swing_id).await,
                    Ok(GenerateOutcome::Started { .. })
                );
                (swing_id, started)
            });
        }

        let mut started = Vec::new();
        while let Some(joined) = pending.join_next().await {
            match joined {
                Ok((swing_id, true)) => started.push(swing_id),
                Ok((_, false)) => {}
                Err(err) => log_error!("auto-generate task failed: {err}"),
            }
        }
        started
    }

    pub async fn is_polling(&self, swing_id: &str) -> bool {
        self.poller.lock().await.is_polling(&swing_id.to_string())
    }

    /// Stops polling for swings whose view went away. Cached values stay.
    pub async fn release(&self, swing_ids: &[String]) {
        let mut poller = self.poller.lock().await;
        for swing_id in swing_ids {
            poller.stop(swing_id);
        }
    }

    /// Drops everything known about a deleted swing.
    pub async fn forget(&self, swing_id: &str) {
        let key = swing_id.to_string();
        self.poller.lock().await.stop(&key);
        self.cache.lock().await.remove(&key);
        self.book.lock().await.forget(swing_id);
    }

    pub async fn shutdown(&self) {
        self.poller.lock().await.stop_all();
    }

    /// Primary endpoint first; the metadata endpoint only when it errors.
    async fn read_remote(&self, swing_id: &str) -> Result<PoseAnalysis, GatewayError> {
        match self.gateway.snapshot_urls(swing_id).await {
            Ok(analysis) => Ok(analysis),
            Err(primary) => {
                log_warn!("presigned snapshot read failed for {swing_id}, trying metadata: {primary}");
                self.gateway.snapshot_metadata(swing_id).await
            }
        }
    }

    async fn record(&self, analysis: &PoseAnalysis) {
        self.store(analysis).await;
        self.announce(analysis);
    }

    async fn store(&self, analysis: &PoseAnalysis) {
        self.cache
            .lock()
            .await
            .insert(analysis.swing_id.clone(), analysis.clone());
    }

    fn announce(&self, analysis: &PoseAnalysis) {
        events::emit(
            self.events.as_ref(),
            events::ANALYSIS_UPDATED,
            &AnalysisUpdatedEvent {
                swing_id: &analysis.swing_id,
                analysis,
            },
        );
    }

    async fn ensure_polling(&self, swing_id: &str) {
        let controller = self.clone();
        let key = swing_id.to_string();

        let mut poller = self.poller.lock().await;
        poller.prune();
        let started = poller.start(key.clone(), self.poll_interval, move || {
            let controller = controller.clone();
            let swing_id = key.clone();
            async move { controller.poll_once(&swing_id).await }
        });
        if started {
            log_info!("polling {swing_id} ({} active)", poller.active_count());
        }
    }

    async fn poll_once(&self, swing_id: &str) -> PollStep {
        let epoch = self.book.lock().await.epoch(swing_id);
        match self.read_remote(swing_id).await {
            Ok(analysis) => {
                let book = self.book.lock().await;
                if book.epoch(swing_id) != epoch {
                    // A generate landed mid-read; the next tick reads again.
                    return PollStep::Continue;
                }
                self.store(&analysis).await;
                drop(book);
                self.announce(&analysis);

                if analysis.is_processing() {
                    PollStep::Continue
                } else {
                    log_info!("analysis for {swing_id} settled as {}", analysis.status.as_str());
                    PollStep::Stop
                }
            }
            Err(err) => {
                log_warn!("poll for {swing_id} failed: {err}");
                PollStep::Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use crate::testing::{http_error, network_error, snapshot_set, FakeGateway};

    fn controller(fake: Arc<FakeGateway>) -> (AnalysisController, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let controller = AnalysisController::new(&AppConfig::default(), fake, sink.clone());
        (controller, sink)
    }

    async fn wait(secs: f64) {
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn falls_back_to_metadata_endpoint() {
        let fake = Arc::new(FakeGateway::default());
        *fake.urls_error.lock().unwrap() = Some(http_error(404, "no presigned urls"));
        fake.script_analysis("a", vec![PoseAnalysis::available("a", snapshot_set("a"))]);
        let (analysis, _) = controller(fake.clone());

        let result = analysis.fetch_status("a").await.unwrap();
        assert_eq!(result.status, AnalysisStatus::Available);
        assert_eq!(fake.metadata_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_surfaces_when_both_endpoints_fail() {
        let fake = Arc::new(FakeGateway::default());
        *fake.urls_error.lock().unwrap() = Some(network_error());
        *fake.metadata_error.lock().unwrap() = Some(network_error());
        let (analysis, _) = controller(fake);

        let err = analysis.fetch_status("a").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Fetch { ref source, .. } if source.is_network()));
        assert_eq!(err.swing_id(), "a");
    }

    #[tokio::test(start_paused = true)]
    async fn polling_stops_once_status_settles() {
        let fake = Arc::new(FakeGateway::default());
        fake.script_analysis(
            "a",
            vec![
                PoseAnalysis::processing("a"),
                PoseAnalysis::processing("a"),
                PoseAnalysis::available("a", snapshot_set("a")),
            ],
        );
        let (analysis, sink) = controller(fake.clone());

        let outcome = analysis.generate("a").await.unwrap();
        assert!(matches!(outcome, GenerateOutcome::Started { ref analysis } if analysis.is_processing()));
        assert!(analysis.is_polling("a").await);
        assert_eq!(fake.analysis_reads(), 0);

        wait(3.5).await;
        assert_eq!(fake.analysis_reads(), 1);

        wait(6.0).await;
        assert_eq!(fake.analysis_reads(), 3);
        assert!(!analysis.is_polling("a").await);
        assert_eq!(analysis.view("a").await.status(), AnalysisStatus::Available);

        wait(30.0).await;
        assert_eq!(fake.analysis_reads(), 3);

        let last = sink.last(events::ANALYSIS_UPDATED).unwrap();
        assert_eq!(last["analysis"]["status"], "available");
        assert_eq!(last["swingId"], "a");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_status_also_ends_polling_until_regenerate() {
        let fake = Arc::new(FakeGateway::default());
        fake.script_analysis("a", vec![PoseAnalysis::failed("a", Some("no golfer found".into()))]);
        let (analysis, _) = controller(fake.clone());

        analysis.generate("a").await.unwrap();
        wait(10.0).await;
        assert_eq!(fake.analysis_reads(), 1);
        assert!(!analysis.is_polling("a").await);

        fake.script_analysis(
            "a",
            vec![
                PoseAnalysis::processing("a"),
                PoseAnalysis::available("a", snapshot_set("a")),
            ],
        );
        analysis.generate("a").await.unwrap();
        assert!(analysis.is_polling("a").await);
        wait(7.0).await;
        assert_eq!(fake.analysis_reads(), 3);
        assert!(!analysis.is_polling("a").await);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_generate_is_suppressed_per_swing() {
        let fake = Arc::new(FakeGateway::default());
        *fake.generate_delay.lock().unwrap() = Some(Duration::from_millis(500));
        let (analysis, _) = controller(fake.clone());

        let (first, second, other) = tokio::join!(
            analysis.generate("a"),
            analysis.generate("a"),
            analysis.generate("b"),
        );
        assert!(matches!(first.unwrap(), GenerateOutcome::Started { .. }));
        assert_eq!(second.unwrap(), GenerateOutcome::AlreadyInFlight);
        assert!(matches!(other.unwrap(), GenerateOutcome::Started { .. }));
        assert_eq!(fake.generate_count("a"), 1);
        assert_eq!(fake.generate_count("b"), 1);
        analysis.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn generate_failure_is_distinct_from_failed_status() {
        let fake = Arc::new(FakeGateway::default());
        *fake.generate_error.lock().unwrap() = Some(http_error(503, "queue full"));
        let (analysis, _) = controller(fake.clone());

        let err = analysis.generate("a").await.unwrap_err();
        assert!(matches!(err, AnalysisError::GenerateFailed { .. }));

        let view = analysis.view("a").await;
        assert!(!view.generating);
        assert!(view.start_error.unwrap().contains("queue full"));
        assert!(view.analysis.is_none());
        assert!(!analysis.is_polling("a").await);

        *fake.generate_error.lock().unwrap() = None;
        assert!(analysis.generate("a").await.is_ok());
        analysis.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn auto_trigger_generates_only_missing_analyses() {
        let fake = Arc::new(FakeGateway::default());
        fake.script_analysis("b", vec![PoseAnalysis::available("b", snapshot_set("b"))]);
        let (analysis, _) = controller(fake.clone());
        let selection = vec!["a".to_string(), "b".to_string()];

        let started = analysis.auto_trigger(&selection).await;
        assert_eq!(started, vec!["a".to_string()]);

        let again = analysis.auto_trigger(&selection).await;
        assert!(again.is_empty());
        assert_eq!(fake.generate_count("a"), 1);
        assert_eq!(fake.generate_count("b"), 0);
        analysis.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn fetching_processing_status_starts_polling() {
        let fake = Arc::new(FakeGateway::default());
        fake.script_analysis(
            "a",
            vec![
                PoseAnalysis::processing("a"),
                PoseAnalysis::available("a", snapshot_set("a")),
            ],
        );
        let (analysis, _) = controller(fake.clone());

        analysis.fetch_status("a").await.unwrap();
        assert!(analysis.is_polling("a").await);
        wait(3.5).await;
        assert!(!analysis.is_polling("a").await);
        assert_eq!(fake.analysis_reads(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_read_started_before_generate_is_dropped() {
        let fake = Arc::new(FakeGateway::default());
        *fake.read_delay.lock().unwrap() = Some(Duration::from_secs(1));
        fake.script_analysis(
            "a",
            vec![PoseAnalysis::not_generated("a"), PoseAnalysis::processing("a")],
        );
        let (analysis, _) = controller(fake.clone());

        let reader = analysis.clone();
        let slow = tokio::spawn(async move { reader.fetch_status("a").await });
        wait(0.1).await;

        analysis.generate("a").await.unwrap();
        assert_eq!(analysis.view("a").await.status(), AnalysisStatus::Processing);
        assert!(analysis.is_polling("a").await);

        let read = slow.await.unwrap().unwrap();
        assert_eq!(read.status, AnalysisStatus::Processing);
        assert_eq!(analysis.view("a").await.status(), AnalysisStatus::Processing);
        assert!(analysis.is_polling("a").await);
        analysis.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn transient_poll_error_keeps_polling() {
        let fake = Arc::new(FakeGateway::default());
        fake.script_analysis(
            "a",
            vec![
                PoseAnalysis::processing("a"),
                PoseAnalysis::available("a", snapshot_set("a")),
            ],
        );
        let (analysis, _) = controller(fake.clone());

        analysis.fetch_status("a").await.unwrap();
        *fake.urls_error.lock().unwrap() = Some(network_error());
        *fake.metadata_error.lock().unwrap() = Some(network_error());

        wait(3.5).await;
        assert_eq!(fake.metadata_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(analysis.is_polling("a").await);
        assert_eq!(analysis.view("a").await.status(), AnalysisStatus::Processing);

        *fake.urls_error.lock().unwrap() = None;
        *fake.metadata_error.lock().unwrap() = None;
        wait(3.0).await;
        assert!(!analysis.is_polling("a").await);
        assert_eq!(analysis.view("a").await.status(), AnalysisStatus::Available);
    }

    #[tokio::test(start_paused = true)]
    async fn release_tears_down_poll_loop() {
        let fake = Arc::new(FakeGateway::default());
        fake.script_analysis("a", vec![PoseAnalysis::processing("a")]);
        let (analysis, _) = controller(fake.clone());

        analysis.fetch_status("a").await.unwrap();
        analysis.release(&["a".to_string()]).await;
        wait(12.0).await;
        assert_eq!(fake.analysis_reads(), 1);
        assert_eq!(analysis.view("a").await.status(), AnalysisStatus::Processing);
    }

    #[tokio::test(start_paused = true)]
    async fn forget_clears_cached_state() {
        let fake = Arc::new(FakeGateway::default());
        fake.script_analysis("a", vec![PoseAnalysis::processing("a")]);
        let (analysis, _) = controller(fake.clone());

        analysis.fetch_status("a").await.unwrap();
        analysis.forget("a").await;
        assert!(analysis.view("a").await.analysis.is_none());
        assert!(!analysis.is_polling("a").await);
    }
}
