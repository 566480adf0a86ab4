//! Core domain types: delivered entries and live-preview query parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Content type uid of page entries.
pub const PAGE_CONTENT_TYPE: &str = "page";

/// Field page entries are looked up by.
pub const PAGE_URL_FIELD: &str = "url";

/// Key under which editable-field tags are stored on an entry object.
pub const EDITABLE_TAGS_KEY: &str = "$";

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A delivered entry. The shape is owned by the remote content model, so the
/// fields are kept as an opaque JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(pub Map<String, Value>);

impl Entry {
    /// Entry uid, if present.
    pub fn uid(&self) -> Option<&str> {
        self.str_field("uid")
    }

    /// Entry title, if present.
    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    /// Raw field access.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether editable-field tags have been attached.
    pub fn has_editable_tags(&self) -> bool {
        self.0.contains_key(EDITABLE_TAGS_KEY)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// LivePreviewQuery
// ---------------------------------------------------------------------------

/// Per-request live-preview parameters, as appended by the editor to the
/// previewed page's URL. Lives for a single fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivePreviewQuery {
    /// Preview session hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_preview: Option<String>,
    #[serde(default, alias = "contentTypeUid", skip_serializing_if = "Option::is_none")]
    pub content_type_uid: Option<String>,
    #[serde(default, alias = "entryUid", skip_serializing_if = "Option::is_none")]
    pub entry_uid: Option<String>,
    /// Timeline preview timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_timestamp: Option<String>,
    /// Release being previewed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_id: Option<String>,
}

impl LivePreviewQuery {
    /// Parameters for a session hash alone.
    pub fn with_hash(hash: impl Into<String>) -> Self {
        Self {
            live_preview: Some(hash.into()),
            ..Default::default()
        }
    }

    /// Parse from a URL query string (with or without the leading `?`).
    /// Unknown keys are ignored.
    pub fn from_query_str(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = Some(value.into_owned()).filter(|v| !v.is_empty());
            match key.as_ref() {
                "live_preview" => params.live_preview = value,
                "content_type_uid" | "contentTypeUid" => params.content_type_uid = value,
                "entry_uid" | "entryUid" => params.entry_uid = value,
                "preview_timestamp" => params.preview_timestamp = value,
                "release_id" => params.release_id = value,
                _ => {}
            }
        }

        params
    }

    /// The session hash, when one was supplied.
    pub fn hash(&self) -> Option<&str> {
        self.live_preview.as_deref().filter(|h| !h.is_empty())
    }

    /// Whether these parameters identify a preview session.
    pub fn is_active(&self) -> bool {
        self.hash().is_some()
    }
}
