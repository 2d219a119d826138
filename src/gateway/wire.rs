//! Normalization of backend payloads into the canonical models.
//!
//! The API answers either with a `{data, success, message?}` envelope or the
//! raw payload, and spells the same field several ways. All of that is
//! resolved here so nothing downstream sees an alias.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{
    AnalysisStatus, PoseAnalysis, SnapshotSet, Swing, SwingTag, TagKind,
};
use crate::models::swing::is_playable_url;

use super::GatewayError;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_warn;

const ENVELOPE_MARKERS: [&str; 3] = ["success", "message", "pagination"];

/// Strips the `{data: ...}` envelope when present.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            let is_envelope = map.len() == 1
                || ENVELOPE_MARKERS.iter().any(|marker| map.contains_key(*marker));
            if is_envelope {
                map.remove("data").unwrap_or(Value::Null)
            } else {
                Value::Object(map)
            }
        }
        other => other,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwingPage {
    pub swings: Vec<Swing>,
    pub pagination: Option<Pagination>,
}

pub fn parse_swing_page(endpoint: &str, value: Value) -> Result<SwingPage, GatewayError> {
    let pagination = value
        .get("pagination")
        .and_then(|raw| parse_pagination(raw));

    let items = match unwrap_envelope(value) {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        Value::Object(mut map) => match map.remove("swings") {
            Some(Value::Array(items)) => items,
            _ => return Err(GatewayError::decode(endpoint, "expected a list of swings")),
        },
        _ => return Err(GatewayError::decode(endpoint, "expected a list of swings")),
    };

    let swings = items
        .into_iter()
        .filter(|item| !item.is_null())
        .filter_map(|item| match parse_swing_value(endpoint, item) {
            Ok(swing) => Some(swing),
            Err(err) => {
                log_warn!("skipping malformed swing in listing: {err}");
                None
            }
        })
        .collect();

    Ok(SwingPage { swings, pagination })
}

fn parse_pagination(raw: &Value) -> Option<Pagination> {
    let map = raw.as_object()?;
    let number = |keys: &[&str]| first_u64(map, keys);

    Some(Pagination {
        page: number(&["page"])? as u32,
        limit: number(&["limit"])? as u32,
        total: number(&["total"]).unwrap_or(0),
        total_pages: number(&["totalPages", "total_pages"]).unwrap_or(0) as u32,
    })
}

pub fn parse_swing(endpoint: &str, value: Value) -> Result<Swing, GatewayError> {
    parse_swing_value(endpoint, unwrap_envelope(value))
}

fn parse_swing_value(endpoint: &str, value: Value) -> Result<Swing, GatewayError> {
    let Value::Object(map) = value else {
        return Err(GatewayError::decode(endpoint, "swing is not an object"));
    };

    let id = first_id(&map, &["id", "swing_id", "swingId"])
        .ok_or_else(|| GatewayError::decode(endpoint, "swing has no id"))?;

    let video_url = first_str(&map, &["videoUrl", "video_url", "file_url", "fileUrl"])
        .filter(|url| {
            let playable = is_playable_url(url);
            if !playable {
                log_warn!("swing {id} has unusable video location '{url}'");
            }
            playable
        });

    let thumbnail_url = first_str(&map, &["thumbnailUrl", "thumbnail_url"])
        .filter(|url| is_playable_url(url));

    Ok(Swing {
        user_id: first_id(&map, &["userId", "user_id"]),
        title: first_str(&map, &["title"]),
        description: first_str(&map, &["description"]),
        video_url,
        thumbnail_url,
        tags: parse_tags(&map),
        created_at: first_timestamp(&map, &["createdAt", "created_at"]),
        updated_at: first_timestamp(&map, &["updatedAt", "updated_at"]),
        duration_secs: map.get("duration").and_then(Value::as_f64),
        file_size: first_u64(&map, &["fileSize", "file_size"]),
        id,
    })
}

fn parse_tags(map: &Map<String, Value>) -> Vec<SwingTag> {
    let mut tags: Vec<SwingTag> = match map.get("tags") {
        Some(Value::Array(items)) => items.iter().filter_map(parse_tag).collect(),
        _ => Vec::new(),
    };

    if let Some(single) = map.get("tag").and_then(parse_tag) {
        if !tags.iter().any(|tag| tag.value == single.value) {
            tags.push(single);
        }
    }

    tags
}

fn parse_tag(value: &Value) -> Option<SwingTag> {
    match value {
        Value::String(raw) if !raw.trim().is_empty() => Some(SwingTag::from_value(raw.trim())),
        Value::Object(map) => {
            let value = first_str(map, &["value"])?;
            let kind = match first_str(map, &["type", "kind"]).as_deref() {
                Some("outcome") => TagKind::Outcome,
                Some("club") => TagKind::Club,
                _ => TagKind::Custom,
            };
            let fallback = SwingTag::from_value(&value);
            Some(SwingTag {
                id: first_id(map, &["id"]).unwrap_or(fallback.id),
                kind,
                label: first_str(map, &["label"]).unwrap_or(fallback.label),
                value,
            })
        }
        _ => None,
    }
}

/// Result of `POST /swings/{id}/snapshots/generate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTicket {
    pub task_id: Option<String>,
    pub status: AnalysisStatus,
}

pub fn parse_generate_ticket(value: Value) -> GenerateTicket {
    let data = unwrap_envelope(value);
    let map = data.as_object();

    GenerateTicket {
        task_id: map.and_then(|m| first_id(m, &["taskId", "task_id"])),
        status: map
            .and_then(|m| first_str(m, &["status"]))
            .and_then(|raw| AnalysisStatus::from_wire(&raw))
            .unwrap_or(AnalysisStatus::Processing),
    }
}

/// Reads either snapshot endpoint into a `PoseAnalysis`.
///
/// A response with no status but a complete snapshot map is treated as
/// available. An `available` status whose snapshot map is incomplete is
/// reported as failed rather than modelled as a partial set.
pub fn parse_analysis(
    endpoint: &str,
    swing_id: &str,
    value: Value,
) -> Result<PoseAnalysis, GatewayError> {
    let data = unwrap_envelope(value);
    let Value::Object(map) = data else {
        return Err(GatewayError::decode(endpoint, "snapshot status is not an object"));
    };

    let snapshots = ["snapshots", "presigned_urls", "presignedUrls"]
        .iter()
        .find_map(|key| map.get(*key))
        .and_then(parse_snapshot_set);

    let status = match first_str(&map, &["status"]) {
        Some(raw) => AnalysisStatus::from_wire(&raw).ok_or_else(|| {
            GatewayError::decode(endpoint, format!("unknown analysis status '{raw}'"))
        })?,
        None if snapshots.is_some() => AnalysisStatus::Available,
        None => AnalysisStatus::NotGenerated,
    };

    let error = first_str(&map, &["error", "error_message", "errorMessage"]);
    let created_at = first_timestamp(&map, &["createdAt", "created_at"]);
    let updated_at = first_timestamp(&map, &["updatedAt", "updated_at"]);

    let mut analysis = match (status, snapshots) {
        (AnalysisStatus::Available, Some(set)) => PoseAnalysis::available(swing_id, set),
        (AnalysisStatus::Available, None) => {
            log_warn!("swing {swing_id} reported available without a complete snapshot set");
            PoseAnalysis::failed(
                swing_id,
                Some(error.unwrap_or_else(|| "incomplete snapshot set".to_string())),
            )
        }
        (AnalysisStatus::Failed, _) => PoseAnalysis::failed(swing_id, error),
        (AnalysisStatus::Processing, _) => PoseAnalysis::processing(swing_id),
        (AnalysisStatus::NotGenerated, _) => PoseAnalysis::not_generated(swing_id),
    };
    analysis.created_at = created_at;
    analysis.updated_at = updated_at;

    Ok(analysis)
}

fn parse_snapshot_set(value: &Value) -> Option<SnapshotSet> {
    let map = value.as_object()?;
    Some(SnapshotSet {
        setup: first_str(map, &["setup"])?,
        top_backswing: first_str(map, &["top_backswing", "topOfBackswing", "topBackswing"])?,
        impact: first_str(map, &["impact"])?,
        follow_through: first_str(map, &["follow_through", "followThrough"])?,
    })
}

/// Raw presigned-upload answer. Validation lives with the upload pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresignedTicket {
    pub upload_url: Option<String>,
    pub file_url: Option<String>,
    /// Ordered as received; storage POST-policy checks care about order.
    pub upload_fields: Option<Vec<(String, String)>>,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
}

pub fn parse_presigned_ticket(endpoint: &str, value: Value) -> Result<PresignedTicket, GatewayError> {
    let Value::Object(map) = unwrap_envelope(value) else {
        return Err(GatewayError::decode(
            endpoint,
            "Invalid response data from presigned URL endpoint",
        ));
    };

    let upload_fields = ["uploadFields", "upload_fields", "fields"]
        .iter()
        .find_map(|key| map.get(*key))
        .and_then(Value::as_object)
        .map(|fields| {
            fields
                .iter()
                .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key.clone(), v)))
                .collect::<Vec<_>>()
        });

    Ok(PresignedTicket {
        upload_url: first_str(&map, &["uploadUrl", "upload_url", "url"]),
        file_url: first_str(&map, &["fileUrl", "file_url"]),
        upload_fields,
        content_type: first_str(&map, &["contentType", "content_type"]),
        content_disposition: first_str(&map, &["contentDisposition", "content_disposition"]),
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn first_str(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Ids arrive as strings or integers depending on the backend version.
fn first_id(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn first_u64(map: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(Value::as_u64)
}

fn first_timestamp(map: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    first_str(map, keys).and_then(|raw| parse_timestamp(&raw))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive timestamps from the backend are UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}
