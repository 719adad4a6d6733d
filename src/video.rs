use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::api::{ApiResponse, ResponseBody};

/// MIME types the backend's upload filter accepts.
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["video/mp4", "video/quicktime", "video/mpeg", "video/webm"];

/// Upload size limit enforced by the backend (500 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// A video as returned by the listing endpoints. Only `_id` and `title` are
/// always present; the rest depends on which listing produced it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VideoRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "originalName", default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sensitivity: Option<String>,
    #[serde(rename = "isShared", default)]
    pub is_shared: Option<bool>,
    #[serde(rename = "allowedViewers", default)]
    pub allowed_viewers: Vec<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

impl VideoRecord {
    /// One-line summary: title, status, sensitivity, size.
    pub fn summary(&self) -> String {
        format!(
            "{} [{}] sensitivity={} size={}",
            self.title,
            self.status.as_deref().unwrap_or("unknown"),
            self.sensitivity.as_deref().unwrap_or("unknown"),
            self.size.map(human_size).unwrap_or_else(|| "?".into()),
        )
    }
}

/// What a listing endpoint answered, from most to least structured.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoListing {
    Sequence(Vec<Value>),
    Other(Value),
    Raw(String),
}

impl VideoListing {
    pub fn from_response(resp: &ApiResponse) -> Self {
        match &resp.body {
            ResponseBody::Json(Value::Array(items)) => VideoListing::Sequence(items.clone()),
            ResponseBody::Json(other) => VideoListing::Other(other.clone()),
            ResponseBody::Text(raw) => VideoListing::Raw(raw.clone()),
        }
    }

    /// Number of entries when the body was a sequence.
    pub fn count(&self) -> Option<usize> {
        match self {
            VideoListing::Sequence(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Entries that look like video records; others are skipped.
    pub fn records(&self) -> Vec<VideoRecord> {
        match self {
            VideoListing::Sequence(items) => items
                .iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Body of a successful upload.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UploadResponse {
    pub message: Option<String>,
    pub video: Option<CreatedVideo>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CreatedVideo {
    #[serde(alias = "_id")]
    pub id: String,
    pub status: Option<String>,
}

/// Guess the MIME type from the file extension, limited to the video
/// formats the backend knows about.
pub fn infer_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "mp4" | "m4v" => Some("video/mp4"),
        "mov" | "qt" => Some("video/quicktime"),
        "mpeg" | "mpg" => Some("video/mpeg"),
        "webm" => Some("video/webm"),
        _ => None,
    }
}

/// Reasons the backend is likely to refuse this upload. The upload is sent
/// regardless; these only become warnings.
pub fn upload_warnings(mime: &str, size: u64) -> Vec<String> {
    let mut warnings = Vec::new();
    if !ALLOWED_MIME_TYPES.contains(&mime) {
        warnings.push(format!(
            "MIME type {} is not one of {}",
            mime,
            ALLOWED_MIME_TYPES.join(", ")
        ));
    }
    if size > MAX_UPLOAD_BYTES {
        warnings.push(format!(
            "file is {}, larger than the {} upload limit",
            human_size(size),
            human_size(MAX_UPLOAD_BYTES)
        ));
    }
    warnings
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn infers_backend_video_types() {
        assert_eq!(infer_mime(Path::new("Burhan.MOV")), Some("video/quicktime"));
        assert_eq!(infer_mime(Path::new("clip.mp4")), Some("video/mp4"));
        assert_eq!(infer_mime(Path::new("a/b/c.mpg")), Some("video/mpeg"));
        assert_eq!(infer_mime(Path::new("x.webm")), Some("video/webm"));
        assert_eq!(infer_mime(Path::new("notes.txt")), None);
        assert_eq!(infer_mime(Path::new("no_extension")), None);
    }

    #[test]
    fn warns_on_disallowed_type_and_size() {
        assert!(upload_warnings("video/mp4", 1024).is_empty());
        let warnings = upload_warnings("video/x-matroska", MAX_UPLOAD_BYTES + 1);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("video/x-matroska"));
        assert!(warnings[1].contains("500.0 MiB"));
    }

    #[test]
    fn listing_shapes() {
        let list = ApiResponse::new(StatusCode::OK, "[]".into());
        assert_eq!(VideoListing::from_response(&list).count(), Some(0));

        let obj = ApiResponse::new(StatusCode::UNAUTHORIZED, r#"{"message":"no"}"#.into());
        let listing = VideoListing::from_response(&obj);
        assert!(matches!(listing, VideoListing::Other(_)));
        assert_eq!(listing.count(), None);

        let raw = ApiResponse::new(StatusCode::OK, "Internal Server Error".into());
        assert_eq!(
            VideoListing::from_response(&raw),
            VideoListing::Raw("Internal Server Error".into())
        );
    }

    #[test]
    fn records_skip_entries_that_do_not_fit() {
        let body = json!([
            {"_id": "1", "title": "Trek", "status": "processed", "sensitivity": "safe", "size": 2048},
            {"unexpected": true}
        ]);
        let resp = ApiResponse::new(StatusCode::OK, body.to_string());
        let listing = VideoListing::from_response(&resp);
        assert_eq!(listing.count(), Some(2));
        let records = listing.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].summary(), "Trek [processed] sensitivity=safe size=2.0 KiB");
    }
}
