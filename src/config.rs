use std::time::Duration;

pub const API_URL_ENV: &str = "SWINGVIEW_API_URL";
pub const DEBUG_ENV: &str = "SWINGVIEW_DEBUG";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const MIB: u64 = 1024 * 1024;

/// Gates applied to a file before any network I/O.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_size_bytes: u64,
    /// Advisory accept-filter shown by the file picker.
    pub accepted_types: Vec<String>,
    /// Form fields the storage POST policy needs before we attempt a POST.
    pub required_fields: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_size_bytes: 100 * MIB,
            accepted_types: vec![
                "video/mp4".into(),
                "video/quicktime".into(),
                "video/x-msvideo".into(),
            ],
            required_fields: vec![
                "key".into(),
                "AWSAccessKeyId".into(),
                "policy".into(),
                "signature".into(),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub debug: bool,
    pub request_timeout: Duration,
    /// Cadence for re-reading an analysis that is still processing.
    pub poll_interval: Duration,
    pub library_stale_time: Duration,
    pub page_size: u32,
    pub upload: UploadLimits,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            debug: false,
            request_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(3),
            library_stale_time: Duration::from_secs(2 * 60),
            page_size: 20,
            upload: UploadLimits::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: normalize_base_url(&base_url.into()),
            ..Self::default()
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base_url = lookup(API_URL_ENV)
            .map(|value| normalize_base_url(&value))
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let debug = lookup(DEBUG_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            api_base_url,
            debug,
            ..Self::default()
        }
    }
}

fn normalize_base_url(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}
