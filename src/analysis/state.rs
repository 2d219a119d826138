use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{AnalysisStatus, PoseAnalysis};

/// Per-swing bookkeeping around generate requests.
///
/// At most one generate request is in flight per swing id; requests for
/// different swings never block each other.
///
/// Each swing also carries an epoch that moves whenever a generate is
/// accepted or the swing is forgotten. A status read that began under an
/// older epoch must not be recorded.
#[derive(Debug, Default)]
pub struct GenerateBook {
    in_flight: HashMap<String, Uuid>,
    start_errors: HashMap<String, String>,
    epochs: HashMap<String, u64>,
    next_epoch: u64,
}

impl GenerateBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the swing for a generate request. `None` if one is already
    /// running for it.
    pub fn try_begin(&mut self, swing_id: &str) -> Option<Uuid> {
        if self.in_flight.contains_key(swing_id) {
            return None;
        }
        let token = Uuid::new_v4();
        self.in_flight.insert(swing_id.to_string(), token);
        self.start_errors.remove(swing_id);
        Some(token)
    }

    /// Releases the claim, but only for the request that made it.
    pub fn finish(&mut self, swing_id: &str, token: Uuid, error: Option<String>) -> bool {
        if self.in_flight.get(swing_id) != Some(&token) {
            return false;
        }
        self.in_flight.remove(swing_id);
        if let Some(error) = error {
            self.start_errors.insert(swing_id.to_string(), error);
        }
        true
    }

    pub fn is_in_flight(&self, swing_id: &str) -> bool {
        self.in_flight.contains_key(swing_id)
    }

    pub fn start_error(&self, swing_id: &str) -> Option<&str> {
        self.start_errors.get(swing_id).map(String::as_str)
    }

    pub fn epoch(&self, swing_id: &str) -> u64 {
        self.epochs.get(swing_id).copied().unwrap_or(0)
    }

    /// Moves the swing to a new epoch. Reads started before this call are
    /// stale.
    pub fn advance_epoch(&mut self, swing_id: &str) -> u64 {
        self.next_epoch += 1;
        self.epochs.insert(swing_id.to_string(), self.next_epoch);
        self.next_epoch
    }

    pub fn forget(&mut self, swing_id: &str) {
        self.in_flight.remove(swing_id);
        self.start_errors.remove(swing_id);
        self.advance_epoch(swing_id);
    }
}

/// What a view renders for one swing's analysis.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisView {
    pub swing_id: String,
    pub analysis: Option<PoseAnalysis>,
    pub generating: bool,
    /// The last generate request failed to start.
    pub start_error: Option<String>,
}

impl AnalysisView {
    pub fn status(&self) -> AnalysisStatus {
        self.analysis
            .as_ref()
            .map(|analysis| analysis.status)
            .unwrap_or(AnalysisStatus::NotGenerated)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum GenerateOutcome {
    Started { analysis: PoseAnalysis },
    AlreadyInFlight,
}

/// Whether the comparison view should fire a generate for this swing.
pub fn needs_auto_generate(status: AnalysisStatus, in_flight: bool) -> bool {
    status == AnalysisStatus::NotGenerated && !in_flight
}
