//! In-memory `SwingGateway` for controller tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::gateway::{
    GatewayError, GenerateTicket, PresignedTicket, StoragePart, SwingGateway, SwingPage,
};
use crate::models::{
    AnalysisStatus, Comparison, ComparisonInput, NewSwing, PoseAnalysis, SnapshotSet, Swing,
    SwingPatch, SwingTag,
};

pub fn swing(id: &str) -> Swing {
    Swing {
        id: id.to_string(),
        user_id: Some("user-1".into()),
        title: Some(format!("Swing {id}")),
        description: None,
        video_url: Some(format!("https://cdn.example.com/{id}.mp4")),
        thumbnail_url: None,
        tags: vec![SwingTag::from_value("practice_swing")],
        created_at: None,
        updated_at: None,
        duration_secs: Some(10.0),
        file_size: None,
    }
}

pub fn snapshot_set(prefix: &str) -> SnapshotSet {
    SnapshotSet {
        setup: format!("https://img.example.com/{prefix}/setup.jpg"),
        top_backswing: format!("https://img.example.com/{prefix}/top.jpg"),
        impact: format!("https://img.example.com/{prefix}/impact.jpg"),
        follow_through: format!("https://img.example.com/{prefix}/follow.jpg"),
    }
}

pub fn network_error() -> GatewayError {
    GatewayError::Network {
        url: "http://localhost:8000".into(),
        detail: "connection refused".into(),
    }
}

pub fn http_error(status: u16, body: &str) -> GatewayError {
    GatewayError::Http {
        status,
        body: body.to_string(),
    }
}

pub fn full_ticket() -> PresignedTicket {
    PresignedTicket {
        upload_url: Some("https://bucket.example.com/".into()),
        file_url: Some("https://bucket.example.com/videos/abc.mp4".into()),
        upload_fields: Some(vec![
            ("key".into(), "videos/abc.mp4".into()),
            ("AWSAccessKeyId".into(), "AKIA".into()),
            ("policy".into(), "cG9saWN5".into()),
            ("signature".into(), "c2ln".into()),
        ]),
        content_type: None,
        content_disposition: None,
    }
}

#[derive(Debug, Clone)]
pub struct StoragePost {
    pub url: String,
    pub fields: Vec<(String, String)>,
    pub file_name: String,
    pub size: usize,
}

pub struct FakeGateway {
    pub swings: Mutex<Vec<Swing>>,
    pub list_error: Mutex<Option<GatewayError>>,
    pub create_error: Mutex<Option<GatewayError>>,
    pub created: Mutex<Vec<NewSwing>>,
    pub deleted: Mutex<Vec<String>>,
    pub presigned: Mutex<Result<PresignedTicket, GatewayError>>,
    pub storage_error: Mutex<Option<GatewayError>>,
    pub storage_posts: Mutex<Vec<StoragePost>>,
    /// Scripted analysis reads per swing. The last entry repeats.
    pub analyses: Mutex<HashMap<String, VecDeque<PoseAnalysis>>>,
    pub urls_error: Mutex<Option<GatewayError>>,
    pub metadata_error: Mutex<Option<GatewayError>>,
    /// Delay before the presigned snapshot read answers.
    pub read_delay: Mutex<Option<Duration>>,
    pub generate_error: Mutex<Option<GatewayError>>,
    pub generate_delay: Mutex<Option<Duration>>,
    pub generate_calls: Mutex<Vec<String>>,
    pub comparisons: Mutex<Vec<Comparison>>,
    pub list_calls: AtomicUsize,
    pub url_calls: AtomicUsize,
    pub metadata_calls: AtomicUsize,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            swings: Mutex::new(Vec::new()),
            list_error: Mutex::new(None),
            create_error: Mutex::new(None),
            created: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            presigned: Mutex::new(Ok(full_ticket())),
            storage_error: Mutex::new(None),
            storage_posts: Mutex::new(Vec::new()),
            analyses: Mutex::new(HashMap::new()),
            urls_error: Mutex::new(None),
            metadata_error: Mutex::new(None),
            read_delay: Mutex::new(None),
            generate_error: Mutex::new(None),
            generate_delay: Mutex::new(None),
            generate_calls: Mutex::new(Vec::new()),
            comparisons: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            url_calls: AtomicUsize::new(0),
            metadata_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeGateway {
    pub fn with_swings(ids: &[&str]) -> Self {
        let fake = Self::default();
        *fake.swings.lock().unwrap() = ids.iter().map(|id| swing(id)).collect();
        fake
    }

    pub fn script_analysis(&self, swing_id: &str, reads: Vec<PoseAnalysis>) {
        self.analyses
            .lock()
            .unwrap()
            .insert(swing_id.to_string(), reads.into());
    }

    pub fn generate_count(&self, swing_id: &str) -> usize {
        self.generate_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|id| id.as_str() == swing_id)
            .count()
    }

    pub fn analysis_reads(&self) -> usize {
        self.url_calls.load(Ordering::SeqCst) + self.metadata_calls.load(Ordering::SeqCst)
    }

    fn next_analysis(&self, swing_id: &str) -> PoseAnalysis {
        let mut analyses = self.analyses.lock().unwrap();
        match analyses.get_mut(swing_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| PoseAnalysis::not_generated(swing_id)),
            None => PoseAnalysis::not_generated(swing_id),
        }
    }
}

#[async_trait]
impl SwingGateway for FakeGateway {
    async fn list_swings(&self, _page: u32, _limit: u32) -> Result<SwingPage, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.list_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(SwingPage {
            swings: self.swings.lock().unwrap().clone(),
            pagination: None,
        })
    }

    async fn get_swing(&self, id: &str) -> Result<Swing, GatewayError> {
        self.swings
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| http_error(404, "Swing not found"))
    }

    async fn create_swing(&self, new_swing: &NewSwing) -> Result<Swing, GatewayError> {
        self.created.lock().unwrap().push(new_swing.clone());
        if let Some(err) = self.create_error.lock().unwrap().clone() {
            return Err(err);
        }
        let mut created = swing(&format!("new-{}", self.created.lock().unwrap().len()));
        created.title = Some(new_swing.title.clone());
        created.video_url = Some(new_swing.file_url.clone());
        self.swings.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }

    async fn update_swing(&self, id: &str, patch: &SwingPatch) -> Result<Swing, GatewayError> {
        let mut swings = self.swings.lock().unwrap();
        let existing = swings
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| http_error(404, "Swing not found"))?;
        if let Some(title) = &patch.title {
            existing.title = Some(title.clone());
        }
        if let Some(description) = &patch.description {
            existing.description = Some(description.clone());
        }
        Ok(existing.clone())
    }

    async fn delete_swing(&self, id: &str) -> Result<(), GatewayError> {
        self.deleted.lock().unwrap().push(id.to_string());
        self.swings.lock().unwrap().retain(|s| s.id != id);
        Ok(())
    }

    async fn request_upload_url(
        &self,
        _file_name: &str,
        _content_type: &str,
    ) -> Result<PresignedTicket, GatewayError> {
        self.presigned.lock().unwrap().clone()
    }

    async fn post_to_storage(
        &self,
        upload_url: &str,
        fields: &[(String, String)],
        file: StoragePart,
    ) -> Result<(), GatewayError> {
        self.storage_posts.lock().unwrap().push(StoragePost {
            url: upload_url.to_string(),
            fields: fields.to_vec(),
            file_name: file.file_name,
            size: file.bytes.len(),
        });
        match self.storage_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn generate_analysis(&self, swing_id: &str) -> Result<GenerateTicket, GatewayError> {
        self.generate_calls.lock().unwrap().push(swing_id.to_string());
        let delay = *self.generate_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.generate_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(GenerateTicket {
            task_id: Some(format!("task-{swing_id}")),
            status: AnalysisStatus::Processing,
        })
    }

    async fn snapshot_urls(&self, swing_id: &str) -> Result<PoseAnalysis, GatewayError> {
        self.url_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.urls_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.next_analysis(swing_id))
    }

    async fn snapshot_metadata(&self, swing_id: &str) -> Result<PoseAnalysis, GatewayError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.metadata_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.next_analysis(swing_id))
    }

    async fn list_comparisons(&self) -> Result<Vec<Comparison>, GatewayError> {
        Ok(self.comparisons.lock().unwrap().clone())
    }

    async fn get_comparison(&self, id: &str) -> Result<Comparison, GatewayError> {
        self.comparisons
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| http_error(404, "Comparison not found"))
    }

    async fn create_comparison(&self, input: &ComparisonInput) -> Result<Comparison, GatewayError> {
        let mut comparisons = self.comparisons.lock().unwrap();
        let comparison = Comparison {
            id: format!("cmp-{}", comparisons.len() + 1),
            user_id: None,
            swings: input.swings.clone().unwrap_or_default(),
            alignment_type: input
                .alignment_type
                .unwrap_or(crate::models::AlignmentType::Timestamp),
            view_mode: input.view_mode.unwrap_or(crate::models::ViewMode::SideBySide),
            overlay_settings: input.overlay_settings.unwrap_or_default(),
            created_at: None,
        };
        comparisons.push(comparison.clone());
        Ok(comparison)
    }

    async fn update_comparison(
        &self,
        id: &str,
        input: &ComparisonInput,
    ) -> Result<Comparison, GatewayError> {
        let mut comparisons = self.comparisons.lock().unwrap();
        let existing = comparisons
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| http_error(404, "Comparison not found"))?;
        if let Some(view_mode) = input.view_mode {
            existing.view_mode = view_mode;
        }
        if let Some(settings) = input.overlay_settings {
            existing.overlay_settings = settings;
        }
        Ok(existing.clone())
    }

    async fn delete_comparison(&self, id: &str) -> Result<(), GatewayError> {
        self.comparisons.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }
}
