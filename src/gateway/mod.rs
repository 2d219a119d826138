//! Remote data gateway: every call the app makes to the swing API and to
//! object storage goes through the `SwingGateway` seam.

pub mod client;
pub mod error;
pub mod wire;

use async_trait::async_trait;

use crate::models::{Comparison, ComparisonInput, NewSwing, PoseAnalysis, Swing, SwingPatch};

pub use client::GatewayClient;
pub use error::GatewayError;
pub use wire::{GenerateTicket, Pagination, PresignedTicket, SwingPage};

/// A file body handed to a presigned storage POST.
#[derive(Debug, Clone)]
pub struct StoragePart {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait SwingGateway: Send + Sync {
    async fn list_swings(&self, page: u32, limit: u32) -> Result<SwingPage, GatewayError>;

    async fn get_swing(&self, id: &str) -> Result<Swing, GatewayError>;

    async fn create_swing(&self, swing: &NewSwing) -> Result<Swing, GatewayError>;

    async fn update_swing(&self, id: &str, patch: &SwingPatch) -> Result<Swing, GatewayError>;

    async fn delete_swing(&self, id: &str) -> Result<(), GatewayError>;

    async fn request_upload_url(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<PresignedTicket, GatewayError>;

    /// Multipart POST straight to storage: `fields` in order, then the file.
    async fn post_to_storage(
        &self,
        upload_url: &str,
        fields: &[(String, String)],
        file: StoragePart,
    ) -> Result<(), GatewayError>;

    async fn generate_analysis(&self, swing_id: &str) -> Result<GenerateTicket, GatewayError>;

    /// Status plus presigned snapshot URLs in one call.
    async fn snapshot_urls(&self, swing_id: &str) -> Result<PoseAnalysis, GatewayError>;

    /// Older metadata endpoint, only used when `snapshot_urls` fails.
    async fn snapshot_metadata(&self, swing_id: &str) -> Result<PoseAnalysis, GatewayError>;

    async fn list_comparisons(&self) -> Result<Vec<Comparison>, GatewayError>;

    async fn get_comparison(&self, id: &str) -> Result<Comparison, GatewayError>;

    async fn create_comparison(&self, input: &ComparisonInput) -> Result<Comparison, GatewayError>;

    async fn update_comparison(
        &self,
        id: &str,
        input: &ComparisonInput,
    ) -> Result<Comparison, GatewayError>;

    async fn delete_comparison(&self, id: &str) -> Result<(), GatewayError>;
}
