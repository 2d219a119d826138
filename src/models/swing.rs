//! Swing records as held by the library.
//!
//! The backend speaks a mix of camelCase and snake_case; everything here is
//! the canonical in-memory shape produced by `gateway::wire`.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TAG: &str = "practice_swing";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TagKind {
    Outcome,
    Club,
    Custom,
}

impl Default for TagKind {
    fn default() -> Self {
        TagKind::Custom
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwingTag {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: TagKind,
    pub value: String,
    pub label: String,
}

impl SwingTag {
    /// Builds a custom tag from the bare string the backend stores on create.
    pub fn from_value(value: &str) -> Self {
        let label = value
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            id: value.to_string(),
            kind: TagKind::Custom,
            value: value.to_string(),
            label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Swing {
    pub id: String,
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Absolute http(s) location of the video, or `None` when the backend
    /// returned nothing usable. Renderers show a placeholder for `None`.
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub tags: Vec<SwingTag>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<f64>,
    pub file_size: Option<u64>,
}

impl Swing {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or("Untitled Swing")
    }

    pub fn has_playable_video(&self) -> bool {
        self.video_url.is_some()
    }
}

/// True when `url` can be handed to a media element as-is.
pub fn is_playable_url(url: &str) -> bool {
    let trimmed = url.trim();
    (trimmed.starts_with("http://") || trimmed.starts_with("https://"))
        && trimmed.len() > "https://".len()
}

/// Body of `POST /swings`. Field names follow the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSwing {
    pub file_url: String,
    pub tag: String,
    pub title: String,
    pub description: String,
}

impl NewSwing {
    /// Fills in the defaults the backend expects when the uploader left
    /// metadata blank.
    pub fn with_defaults(
        file_url: impl Into<String>,
        tag: Option<String>,
        title: Option<String>,
        description: Option<String>,
    ) -> Self {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        Self {
            file_url: file_url.into(),
            tag: non_blank(tag).unwrap_or_else(|| DEFAULT_TAG.to_string()),
            title: non_blank(title).unwrap_or_else(|| {
                format!("Golf Swing - {}", Local::now().format("%-m/%-d/%Y"))
            }),
            description: description.unwrap_or_default(),
        }
    }
}

/// Partial update for `PUT /swings/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SwingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl SwingPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.tag.is_none()
    }
}
