//! Live-preview bridge configuration.
//!
//! The live-preview library runs in the browser and is initialised once with
//! a configuration object describing the stack. This crate produces that
//! object from the same [`StackConfig`] the delivery client uses, so the
//! editor and the rendered content always point at the same region.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pagestack_shared::{PagestackError, Result, StackConfig};

/// Element id of the rendered `<script>` tag.
pub const SCRIPT_ELEMENT_ID: &str = "live-preview-config";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Editing experience the bridge opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    /// Visual builder.
    #[default]
    Builder,
    /// Classic side-by-side preview.
    Preview,
}

impl std::str::FromStr for EditMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "builder" => Ok(Self::Builder),
            "preview" => Ok(Self::Preview),
            other => Err(format!("unknown edit mode '{other}': expected 'builder' or 'preview'")),
        }
    }
}

/// Bridge settings that are not part of the stack config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewOptions {
    pub mode: EditMode,
    /// Content is rendered server-side; the bridge reloads the page on change.
    pub ssr: bool,
    /// Show the floating "edit" button.
    pub edit_button: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            mode: EditMode::Builder,
            ssr: true,
            edit_button: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Init payload
// ---------------------------------------------------------------------------

/// The object passed to the live-preview library's `init`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivePreviewInit {
    pub ssr: bool,
    pub enable: bool,
    pub mode: EditMode,
    pub stack_sdk: StackSdkConfig,
    pub stack_details: StackDetails,
    pub client_url_params: ClientUrlParams,
    pub edit_button: EditButton,
}

/// Delivery-client configuration as the bridge expects to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackSdkConfig {
    pub api_key: String,
    pub delivery_token: String,
    pub environment: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(rename = "live_preview")]
    pub live_preview: StackSdkLivePreview,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSdkLivePreview {
    pub enable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackDetails {
    pub api_key: String,
    pub environment: String,
}

/// Where the bridge reaches the editor application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientUrlParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditButton {
    pub enable: bool,
}

impl LivePreviewInit {
    /// Build the init payload from the shared stack config.
    pub fn from_config(config: &StackConfig, options: PreviewOptions) -> Self {
        if config.live_preview.enable && config.application_host.is_none() {
            warn!(
                region = %config.region,
                "live preview enabled without an application host; edit links will not resolve"
            );
        }

        let init = Self {
            ssr: options.ssr,
            enable: config.live_preview.enable,
            mode: options.mode,
            stack_sdk: StackSdkConfig {
                api_key: config.api_key.clone(),
                delivery_token: config.delivery_token.clone(),
                environment: config.environment.clone(),
                region: config.region.to_string(),
                host: config.delivery_host.clone(),
                live_preview: StackSdkLivePreview {
                    enable: config.live_preview.enable,
                    preview_token: config.live_preview.preview_token.clone(),
                    host: config.live_preview.host.clone(),
                },
            },
            stack_details: StackDetails {
                api_key: config.api_key.clone(),
                environment: config.environment.clone(),
            },
            client_url_params: ClientUrlParams {
                host: config.application_host.clone(),
            },
            edit_button: EditButton {
                enable: options.edit_button,
            },
        };

        debug!(
            enable = init.enable,
            mode = ?init.mode,
            client_host = ?init.client_url_params.host,
            "live preview configured"
        );
        init
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(serialize_error)
    }

    /// A `<script type="application/json">` element for server-rendered pages.
    /// `<` is escaped so the payload cannot close the element early.
    pub fn to_script_tag(&self) -> Result<String> {
        let json = serde_json::to_string(self)
            .map_err(serialize_error)?
            .replace('<', "\\u003c");
        Ok(format!(
            r#"<script id="{SCRIPT_ELEMENT_ID}" type="application/json">{json}</script>"#
        ))
    }
}

fn serialize_error(e: serde_json::Error) -> PagestackError {
    PagestackError::parse(format!("failed to serialize live preview config: {e}"))
}
