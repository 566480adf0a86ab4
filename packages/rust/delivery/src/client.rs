//! Content Delivery API client.
//!
//! The client is immutable after construction and cheap to clone. Live-preview
//! parameters are passed per call rather than stored on the client, so
//! concurrent fetches with different preview sessions never interfere.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use pagestack_shared::{Entry, HttpConfig, LivePreviewQuery, PagestackError, Result, StackConfig};

use crate::query::EntryQuery;

/// User-Agent string for delivery requests.
const USER_AGENT: &str = concat!("pagestack/", env!("CARGO_PKG_VERSION"));

/// Delivery API version path segment.
const API_VERSION: &str = "v3";

/// Maximum number of bytes of an error body kept in error messages.
const MAX_ERROR_BODY: usize = 200;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct EntriesResponse {
    #[serde(default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_message: Option<String>,
    error_code: Option<i64>,
}

// ---------------------------------------------------------------------------
// DeliveryClient
// ---------------------------------------------------------------------------

/// Client for the Content Delivery API of one stack.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    config: Arc<StackConfig>,
    client: Client,
    delivery_base: Url,
    /// Set only when live preview is enabled.
    preview_base: Option<Url>,
}

impl DeliveryClient {
    /// Build a client from a resolved stack config.
    ///
    /// Fails when no delivery host could be resolved, or when live preview is
    /// enabled without a preview host or preview token.
    pub fn new(config: Arc<StackConfig>, http: &HttpConfig) -> Result<Self> {
        let delivery_host = config.delivery_host.as_deref().ok_or_else(|| {
            PagestackError::config(format!(
                "no content delivery host for region '{}'; set {}",
                config.region,
                pagestack_shared::vars::DELIVERY_HOST
            ))
        })?;
        let delivery_base = base_url(delivery_host)?;

        let preview_base = if config.live_preview.enable {
            let host = config.live_preview.host.as_deref().ok_or_else(|| {
                PagestackError::config(format!(
                    "live preview is enabled but no preview host is known for region '{}'; set {}",
                    config.region,
                    pagestack_shared::vars::PREVIEW_HOST
                ))
            })?;
            if config.live_preview.preview_token.is_none() {
                return Err(PagestackError::config(format!(
                    "live preview is enabled but {} is not set",
                    pagestack_shared::vars::PREVIEW_TOKEN
                )));
            }
            Some(base_url(host)?)
        } else {
            None
        };

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()
            .map_err(|e| PagestackError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            delivery_base,
            preview_base,
        })
    }

    /// The stack config this client was built from.
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Preview parameters that apply to a request: live preview must be
    /// enabled for the stack and the parameters must carry a session hash.
    pub fn preview_session<'a>(
        &self,
        preview: Option<&'a LivePreviewQuery>,
    ) -> Option<&'a LivePreviewQuery> {
        if self.preview_base.is_none() {
            return None;
        }
        preview.filter(|p| p.is_active())
    }

    /// Fetch all entries of `content_type` matching `query`.
    #[instrument(
        skip_all,
        fields(content_type = %content_type, preview = tracing::field::Empty)
    )]
    pub async fn find_entries(
        &self,
        content_type: &str,
        query: &EntryQuery,
        preview: Option<&LivePreviewQuery>,
    ) -> Result<Vec<Entry>> {
        let session = self.preview_session(preview);
        tracing::Span::current().record("preview", session.is_some());

        let base = match (session, &self.preview_base) {
            (Some(_), Some(preview_base)) => preview_base,
            _ => &self.delivery_base,
        };
        let url = entries_url(base, content_type)?;

        debug!(%url, filters = ?query.filters(), "querying entries");

        let request = self
            .client
            .get(url.clone())
            .query(&query.to_params(&self.config.environment))
            .header("api_key", &self.config.api_key)
            .header("access_token", &self.config.delivery_token);
        let request = match session {
            Some(params) => self.with_preview_headers(request, params),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| PagestackError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PagestackError::Network(format!("{url}: failed to read body: {e}")))?;

        if !status.is_success() {
            let message = error_message(&body);
            warn!(status = status.as_u16(), %message, "delivery API returned an error");
            return Err(PagestackError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: EntriesResponse = serde_json::from_str(&body).map_err(|e| {
            PagestackError::parse(format!("invalid entries response from {url}: {e}"))
        })?;

        debug!(count = parsed.entries.len(), "entries received");
        Ok(parsed.entries)
    }

    /// Fetch the first entry matching `query`, if any.
    pub async fn find_one(
        &self,
        content_type: &str,
        query: &EntryQuery,
        preview: Option<&LivePreviewQuery>,
    ) -> Result<Option<Entry>> {
        let entries = self.find_entries(content_type, query, preview).await?;
        Ok(entries.into_iter().next())
    }

    fn with_preview_headers(
        &self,
        request: RequestBuilder,
        params: &LivePreviewQuery,
    ) -> RequestBuilder {
        let mut request = request.header("live_preview", params.hash().unwrap_or_default());
        if let Some(token) = &self.config.live_preview.preview_token {
            request = request.header("preview_token", token);
        }
        if let Some(timestamp) = &params.preview_timestamp {
            request = request.header("preview_timestamp", timestamp);
        }
        if let Some(release) = &params.release_id {
            request = request.header("release_id", release);
        }
        request
    }
}

// ---------------------------------------------------------------------------
// URL helpers
// ---------------------------------------------------------------------------

/// Turn a configured host into a base URL. Hosts with an explicit scheme are
/// used as-is; bare hosts get `https://`.
fn base_url(host: &str) -> Result<Url> {
    let raw = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };

    let mut url = Url::parse(&raw)
        .map_err(|e| PagestackError::config(format!("invalid host '{host}': {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn entries_url(base: &Url, content_type: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| PagestackError::config(format!("host '{base}' cannot be a base URL")))?
        .pop_if_empty()
        .extend([API_VERSION, "content_types", content_type, "entries"]);
    Ok(url)
}

/// Pull a readable message out of an API error body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            error_message: Some(message),
            error_code,
        }) => match error_code {
            Some(code) => format!("{message} (code {code})"),
            None => message,
        },
        _ => body.chars().take(MAX_ERROR_BODY).collect(),
    }
}
