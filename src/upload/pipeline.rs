use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::UploadLimits;
use crate::error::UploadError;
use crate::gateway::{GatewayError, StoragePart, SwingGateway};
use crate::library::LibraryController;
use crate::models::{NewSwing, Swing};

use super::file::VideoFile;
use super::presigned::resolve_target;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Optional metadata the uploader typed in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingMetadata {
    pub tag: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub file_url: String,
    pub swing: Swing,
}

/// Validate, presign, store, then create the swing record.
///
/// Storing always finishes before the record is created. A record failure
/// after a successful store is reported as `SwingCreationFailed` with the
/// stored location, and nothing is rolled back.
#[derive(Clone)]
pub struct UploadPipeline {
    gateway: Arc<dyn SwingGateway>,
    library: LibraryController,
    limits: UploadLimits,
}

impl UploadPipeline {
    pub fn new(gateway: Arc<dyn SwingGateway>, library: LibraryController, limits: UploadLimits) -> Self {
        Self {
            gateway,
            library,
            limits,
        }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub async fn upload(
        &self,
        file: VideoFile,
        metadata: SwingMetadata,
    ) -> Result<UploadOutcome, UploadError> {
        file.validate(&self.limits)?;

        let file_name = file.file_name.clone();
        let content_type = file.content_type.clone();
        let bytes = file.into_bytes().await?;

        log_info!("requesting upload URL for {file_name} ({content_type})");
        let ticket = self
            .gateway
            .request_upload_url(&file_name, &content_type)
            .await
            .map_err(|err| {
                log_error!("presigned URL request failed: {err}");
                UploadError::Gateway(err)
            })?;

        let target = resolve_target(ticket, &self.limits)?;

        self.gateway
            .post_to_storage(
                &target.upload_url,
                &target.fields,
                StoragePart {
                    file_name,
                    content_type,
                    bytes,
                },
            )
            .await
            .map_err(storage_error)?;
        log_info!("stored video at {}", target.file_url);

        self.create(target.file_url, metadata).await
    }

    /// Creates the record for a file that is already stored, without
    /// uploading it again.
    pub async fn retry_create(
        &self,
        file_url: String,
        metadata: SwingMetadata,
    ) -> Result<UploadOutcome, UploadError> {
        self.create(file_url, metadata).await
    }

    async fn create(
        &self,
        file_url: String,
        metadata: SwingMetadata,
    ) -> Result<UploadOutcome, UploadError> {
        let new_swing = NewSwing::with_defaults(
            file_url.clone(),
            metadata.tag,
            metadata.title,
            metadata.description,
        );

        match self.gateway.create_swing(&new_swing).await {
            Ok(swing) => {
                self.library.insert_created(swing.clone()).await;
                Ok(UploadOutcome { file_url, swing })
            }
            Err(source) => {
                log_warn!("video stored at {file_url} but swing creation failed: {source}");
                Err(UploadError::SwingCreationFailed { file_url, source })
            }
        }
    }
}

fn storage_error(err: GatewayError) -> UploadError {
    match err {
        GatewayError::Http { status, body } => UploadError::StorageRejected { status, body },
        other => UploadError::StorageUnreachable(other.to_string()),
    }
}
