use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    NotGenerated,
    Processing,
    Available,
    Failed,
}

impl Default for AnalysisStatus {
    fn default() -> Self {
        AnalysisStatus::NotGenerated
    }
}

impl AnalysisStatus {
    /// Parses the status strings the two snapshot endpoints return.
    /// The metadata endpoint reports `completed` where the presigned one
    /// reports `available`.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "not_generated" | "not-generated" | "notgenerated" => Some(AnalysisStatus::NotGenerated),
            "processing" | "pending" | "queued" => Some(AnalysisStatus::Processing),
            "available" | "completed" => Some(AnalysisStatus::Available),
            "failed" | "error" => Some(AnalysisStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::NotGenerated => "not_generated",
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Available => "available",
            AnalysisStatus::Failed => "failed",
        }
    }

    /// `available` and `failed` stay put until an explicit re-generate.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisStatus::Available | AnalysisStatus::Failed)
    }
}

/// Canonical swing events the backend captures a still frame for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SwingEvent {
    Setup,
    TopBackswing,
    Impact,
    FollowThrough,
}

impl SwingEvent {
    pub const ALL: [SwingEvent; 4] = [
        SwingEvent::Setup,
        SwingEvent::TopBackswing,
        SwingEvent::Impact,
        SwingEvent::FollowThrough,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SwingEvent::Setup => "setup",
            SwingEvent::TopBackswing => "top_backswing",
            SwingEvent::Impact => "impact",
            SwingEvent::FollowThrough => "follow_through",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SwingEvent::Setup => "Setup",
            SwingEvent::TopBackswing => "Top of Backswing",
            SwingEvent::Impact => "Impact",
            SwingEvent::FollowThrough => "Follow Through",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SwingEvent::Setup => "Initial stance and grip position",
            SwingEvent::TopBackswing => "Maximum backswing position",
            SwingEvent::Impact => "Club-ball contact moment",
            SwingEvent::FollowThrough => "Post-impact swing completion",
        }
    }
}

/// Still-frame URLs for every swing event. Partial sets are never built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSet {
    pub setup: String,
    pub top_backswing: String,
    pub impact: String,
    pub follow_through: String,
}

impl SnapshotSet {
    pub fn get(&self, event: SwingEvent) -> &str {
        match event {
            SwingEvent::Setup => &self.setup,
            SwingEvent::TopBackswing => &self.top_backswing,
            SwingEvent::Impact => &self.impact,
            SwingEvent::FollowThrough => &self.follow_through,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoseAnalysis {
    pub swing_id: String,
    pub status: AnalysisStatus,
    /// Present exactly when `status` is `Available`.
    pub snapshots: Option<SnapshotSet>,
    pub error: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PoseAnalysis {
    pub fn not_generated(swing_id: impl Into<String>) -> Self {
        Self::with_status(swing_id, AnalysisStatus::NotGenerated)
    }

    pub fn processing(swing_id: impl Into<String>) -> Self {
        Self::with_status(swing_id, AnalysisStatus::Processing)
    }

    pub fn available(swing_id: impl Into<String>, snapshots: SnapshotSet) -> Self {
        Self {
            snapshots: Some(snapshots),
            ..Self::with_status(swing_id, AnalysisStatus::Available)
        }
    }

    pub fn failed(swing_id: impl Into<String>, error: Option<String>) -> Self {
        Self {
            error,
            ..Self::with_status(swing_id, AnalysisStatus::Failed)
        }
    }

    fn with_status(swing_id: impl Into<String>, status: AnalysisStatus) -> Self {
        Self {
            swing_id: swing_id.into(),
            status,
            snapshots: None,
            error: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.status == AnalysisStatus::Processing
    }

    pub fn snapshot(&self, event: SwingEvent) -> Option<&str> {
        self.snapshots.as_ref().map(|set| set.get(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_reads_as_available() {
        assert_eq!(AnalysisStatus::from_wire("completed"), Some(AnalysisStatus::Available));
        assert_eq!(AnalysisStatus::from_wire("Processing"), Some(AnalysisStatus::Processing));
        assert_eq!(AnalysisStatus::from_wire("not_generated"), Some(AnalysisStatus::NotGenerated));
        assert_eq!(AnalysisStatus::from_wire("bogus"), None);
    }

    #[test]
    fn only_available_and_failed_are_terminal() {
        assert!(AnalysisStatus::Available.is_terminal());
        assert!(AnalysisStatus::Failed.is_terminal());
        assert!(!AnalysisStatus::Processing.is_terminal());
        assert!(!AnalysisStatus::NotGenerated.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&AnalysisStatus::NotGenerated).expect("serialize");
        assert_eq!(json, "\"not_generated\"");
    }
}
