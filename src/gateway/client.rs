use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::models::{Comparison, ComparisonInput, NewSwing, PoseAnalysis, Swing, SwingPatch};

use super::wire::{self, GenerateTicket, PresignedTicket, SwingPage};
use super::{GatewayError, StoragePart, SwingGateway};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const LOG_URL_MAX_CHARS: usize = 100;

/// Characters left as-is inside one path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// HTTP client for the swing API. Cheap to clone; clones share the token.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    http: Client,
    auth_token: Arc<RwLock<Option<String>>>,
    verbose: bool,
}

impl GatewayClient {
    pub fn new(config: &AppConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| GatewayError::from_transport(&config.api_base_url, err))?;

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            http,
            auth_token: Arc::new(RwLock::new(None)),
            verbose: config.debug,
        })
    }

    /// Installs the bearer token obtained from the identity provider.
    /// `None` signs the client out.
    pub async fn set_auth_token(&self, token: Option<String>) {
        let token = token.filter(|t| !t.trim().is_empty());
        *self.auth_token.write().await = token;
    }

    pub async fn has_auth_token(&self) -> bool {
        self.auth_token.read().await.is_some()
    }

    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth_token.read().await.as_deref() {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    async fn get(&self, endpoint: &str) -> Result<Value, GatewayError> {
        self.call::<()>(Method::GET, endpoint, None).await
    }

    async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Value, GatewayError> {
        let url = self.url(endpoint);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let request = self.authorized(request).await;

        if self.verbose {
            debug!("{method} {url}");
        }

        let response = request.send().await.map_err(|err| {
            log_warn!("API server may not be available at {url}: {err}");
            GatewayError::from_transport(&url, err)
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| GatewayError::from_transport(&url, err))?;

        if !status.is_success() {
            log_warn!("{method} {endpoint} failed with {status}");
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        if self.verbose {
            debug!("{method} {endpoint} -> {status} ({} bytes)", text.len());
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|err| GatewayError::decode(endpoint, format!("invalid JSON: {err}")))
    }

    fn decode<T: serde::de::DeserializeOwned>(endpoint: &str, value: Value) -> Result<T, GatewayError> {
        serde_json::from_value(wire::unwrap_envelope(value))
            .map_err(|err| GatewayError::decode(endpoint, err.to_string()))
    }
}

#[async_trait]
impl SwingGateway for GatewayClient {
    async fn list_swings(&self, page: u32, limit: u32) -> Result<SwingPage, GatewayError> {
        let endpoint = format!("/swings?page={page}&limit={limit}");
        let value = self.get(&endpoint).await?;
        wire::parse_swing_page(&endpoint, value)
    }

    async fn get_swing(&self, id: &str) -> Result<Swing, GatewayError> {
        let endpoint = format!("/swings/{}", segment(id));
        let value = self.get(&endpoint).await?;
        wire::parse_swing(&endpoint, value)
    }

    async fn create_swing(&self, swing: &NewSwing) -> Result<Swing, GatewayError> {
        let value = self.call(Method::POST, "/swings", Some(swing)).await?;
        wire::parse_swing("/swings", value)
    }

    async fn update_swing(&self, id: &str, patch: &SwingPatch) -> Result<Swing, GatewayError> {
        let endpoint = format!("/swings/{}", segment(id));
        let value = self.call(Method::PUT, &endpoint, Some(patch)).await?;
        wire::parse_swing(&endpoint, value)
    }

    async fn delete_swing(&self, id: &str) -> Result<(), GatewayError> {
        let endpoint = format!("/swings/{}", segment(id));
        self.call::<()>(Method::DELETE, &endpoint, None).await?;
        Ok(())
    }

    async fn request_upload_url(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<PresignedTicket, GatewayError> {
        let body = json!({ "filename": file_name, "contentType": content_type });
        let value = self.call(Method::POST, "/upload-url", Some(&body)).await?;
        wire::parse_presigned_ticket("/upload-url", value)
    }

    async fn post_to_storage(
        &self,
        upload_url: &str,
        fields: &[(String, String)],
        file: StoragePart,
    ) -> Result<(), GatewayError> {
        log_info!(
            "uploading {} ({} bytes, {}) to {}",
            file.file_name,
            file.bytes.len(),
            file.content_type,
            truncate_for_log(upload_url)
        );

        let mut form = multipart::Form::new();
        for (key, value) in fields {
            form = form.text(key.clone(), value.clone());
        }

        let part = multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|err| GatewayError::from_transport(upload_url, err))?;
        form = form.part("file", part);

        // Presigned destinations carry their own credentials; no bearer token.
        let response = self
            .http
            .post(upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| GatewayError::from_transport(upload_url, err))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        log_warn!("storage rejected upload with {status}: {body}");
        Err(GatewayError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn generate_analysis(&self, swing_id: &str) -> Result<GenerateTicket, GatewayError> {
        let endpoint = format!("/swings/{}/snapshots/generate", segment(swing_id));
        let value = self.call::<()>(Method::POST, &endpoint, None).await?;
        Ok(wire::parse_generate_ticket(value))
    }

    async fn snapshot_urls(&self, swing_id: &str) -> Result<PoseAnalysis, GatewayError> {
        let endpoint = format!("/swings/{}/snapshots/presigned-urls", segment(swing_id));
        let value = self.get(&endpoint).await?;
        wire::parse_analysis(&endpoint, swing_id, value)
    }

    async fn snapshot_metadata(&self, swing_id: &str) -> Result<PoseAnalysis, GatewayError> {
        let endpoint = format!("/swings/{}/snapshots", segment(swing_id));
        let value = self.get(&endpoint).await?;
        wire::parse_analysis(&endpoint, swing_id, value)
    }

    async fn list_comparisons(&self) -> Result<Vec<Comparison>, GatewayError> {
        let value = self.get("/comparisons").await?;
        Self::decode("/comparisons", value)
    }

    async fn get_comparison(&self, id: &str) -> Result<Comparison, GatewayError> {
        let endpoint = format!("/comparisons/{}", segment(id));
        let value = self.get(&endpoint).await?;
        Self::decode(&endpoint, value)
    }

    async fn create_comparison(&self, input: &ComparisonInput) -> Result<Comparison, GatewayError> {
        let value = self.call(Method::POST, "/comparisons", Some(input)).await?;
        Self::decode("/comparisons", value)
    }

    async fn update_comparison(
        &self,
        id: &str,
        input: &ComparisonInput,
    ) -> Result<Comparison, GatewayError> {
        let endpoint = format!("/comparisons/{}", segment(id));
        let value = self.call(Method::PUT, &endpoint, Some(input)).await?;
        Self::decode(&endpoint, value)
    }

    async fn delete_comparison(&self, id: &str) -> Result<(), GatewayError> {
        let endpoint = format!("/comparisons/{}", segment(id));
        self.call::<()>(Method::DELETE, &endpoint, None).await?;
        Ok(())
    }
}

fn segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT).to_string()
}

fn truncate_for_log(url: &str) -> String {
    if url.chars().count() <= LOG_URL_MAX_CHARS {
        return url.to_string();
    }
    let head: String = url.chars().take(LOG_URL_MAX_CHARS).collect();
    format!("{head}...")
}
