use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::playback::OverlaySettings;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentType {
    Timestamp,
    Impact,
    BackswingTop,
    FollowThrough,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    SideBySide,
    Overlay,
}

/// A saved pairing of swings with the view it was last looked at in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub swings: Vec<String>,
    pub alignment_type: AlignmentType,
    pub view_mode: ViewMode,
    pub overlay_settings: OverlaySettings,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating a comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_type: Option<AlignmentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<ViewMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_settings: Option<OverlaySettings>,
}
