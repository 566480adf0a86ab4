//! Stack configuration for pagestack.
//!
//! Settings come from `~/.pagestack/pagestack.toml` and from `CONTENTSTACK_*`
//! environment variables. Environment values override file values, which
//! override defaults. The merged settings are resolved exactly once into an
//! immutable [`StackConfig`] shared by the delivery client and the
//! live-preview bridge.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PagestackError, Result};
use crate::region::{EndpointStyle, Endpoints, Region, region_for_str, resolve_endpoints};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "pagestack.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".pagestack";

/// Prefix used by front-end `.env` files; read when the plain name is unset.
const FRONTEND_PREFIX: &str = "VITE_";

/// Environment variable names.
pub mod vars {
    pub const REGION: &str = "CONTENTSTACK_REGION";
    pub const API_KEY: &str = "CONTENTSTACK_API_KEY";
    pub const DELIVERY_TOKEN: &str = "CONTENTSTACK_DELIVERY_TOKEN";
    pub const ENVIRONMENT: &str = "CONTENTSTACK_ENVIRONMENT";
    pub const DELIVERY_HOST: &str = "CONTENTSTACK_CONTENT_DELIVERY";
    pub const PREVIEW: &str = "CONTENTSTACK_PREVIEW";
    pub const PREVIEW_TOKEN: &str = "CONTENTSTACK_PREVIEW_TOKEN";
    pub const PREVIEW_HOST: &str = "CONTENTSTACK_PREVIEW_HOST";
    pub const APPLICATION_HOST: &str = "CONTENTSTACK_CONTENT_APPLICATION";
    pub const LOCALE: &str = "CONTENTSTACK_LOCALE";
}

// ---------------------------------------------------------------------------
// Config sources
// ---------------------------------------------------------------------------

/// A key/value lookup that settings are read from.
pub trait ConfigSource {
    /// Raw value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Untrimmed value of `name`, falling back to its `VITE_`-prefixed form.
/// Blank values count as unset at either name.
fn lookup_raw(source: &dyn ConfigSource, name: &str) -> Option<String> {
    let non_blank = |v: &String| !v.trim().is_empty();
    source
        .get(name)
        .filter(non_blank)
        .or_else(|| source.get(&format!("{FRONTEND_PREFIX}{name}")).filter(non_blank))
}

/// Trimmed value of `name`, see [`lookup_raw`].
fn lookup(source: &dyn ConfigSource, name: &str) -> Option<String> {
    lookup_raw(source, name).map(|v| v.trim().to_string())
}

// ---------------------------------------------------------------------------
// Config file structs (matching pagestack.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Stack credentials and hosts.
    #[serde(default)]
    pub stack: StackSettings,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// `[stack]` section. Every field is optional so that file and environment
/// layers can be merged before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Content-delivery host override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_host: Option<String>,
    /// Live-preview enable flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_preview: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_token: Option<String>,
    /// Live-preview host override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_host: Option<String>,
    /// Application (editor UI) host override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl StackSettings {
    /// Read settings from a [`ConfigSource`] using the `CONTENTSTACK_*` names.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        Self {
            region: lookup(source, vars::REGION),
            api_key: lookup(source, vars::API_KEY),
            delivery_token: lookup(source, vars::DELIVERY_TOKEN),
            environment: lookup(source, vars::ENVIRONMENT),
            delivery_host: lookup(source, vars::DELIVERY_HOST),
            // Only the exact, untrimmed string "true" enables preview.
            live_preview: lookup_raw(source, vars::PREVIEW).map(|v| v == "true"),
            preview_token: lookup(source, vars::PREVIEW_TOKEN),
            preview_host: lookup(source, vars::PREVIEW_HOST),
            application_host: lookup(source, vars::APPLICATION_HOST),
            locale: lookup(source, vars::LOCALE),
        }
    }

    /// Layer `over` on top of `self`; set fields in `over` win.
    pub fn overlay(self, over: StackSettings) -> Self {
        Self {
            region: over.region.or(self.region),
            api_key: over.api_key.or(self.api_key),
            delivery_token: over.delivery_token.or(self.delivery_token),
            environment: over.environment.or(self.environment),
            delivery_host: over.delivery_host.or(self.delivery_host),
            live_preview: over.live_preview.or(self.live_preview),
            preview_token: over.preview_token.or(self.preview_token),
            preview_host: over.preview_host.or(self.preview_host),
            application_host: over.application_host.or(self.application_host),
            locale: over.locale.or(self.locale),
        }
    }
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Resolved stack config
// ---------------------------------------------------------------------------

/// The stack's region: either a known data-residency zone or the raw string
/// that failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegionSetting {
    Known(Region),
    Custom(String),
}

impl RegionSetting {
    /// The typed region, if resolution succeeded.
    pub fn region(&self) -> Option<Region> {
        match self {
            Self::Known(region) => Some(*region),
            Self::Custom(_) => None,
        }
    }

    /// Default endpoints for this setting. Custom regions have none.
    pub fn endpoints(&self, style: EndpointStyle) -> Option<Endpoints> {
        resolve_endpoints(self.region(), style)
    }
}

impl std::fmt::Display for RegionSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(region) => write!(f, "{region}"),
            Self::Custom(raw) => f.write_str(raw),
        }
    }
}

/// Live-preview block of the stack configuration. Always present; inert when
/// `enable` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivePreviewSettings {
    pub enable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Immutable, fully resolved stack configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    pub api_key: String,
    pub delivery_token: String,
    pub environment: String,
    pub region: RegionSetting,
    /// Effective content-delivery host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_host: Option<String>,
    /// Effective application host, used as the live-preview client URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub live_preview: LivePreviewSettings,
}

impl StackConfig {
    /// Validate merged settings and resolve region and hosts.
    ///
    /// Missing credentials are reported together in one config error. For
    /// each host, an explicit override wins over the region's endpoint.
    pub fn resolve(settings: &StackSettings) -> Result<Self> {
        let required = [
            (&settings.api_key, vars::API_KEY),
            (&settings.delivery_token, vars::DELIVERY_TOKEN),
            (&settings.environment, vars::ENVIRONMENT),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(value, _)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
            .map(|(_, name)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(PagestackError::config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        let region = resolve_region(settings.region.as_deref());
        let endpoints = region.endpoints(EndpointStyle::BareHost);
        let endpoints = endpoints.as_ref();
        let pick = |over: &Option<String>, default: Option<&String>| {
            over.clone().or_else(|| default.cloned())
        };

        let config = Self {
            api_key: settings.api_key.clone().unwrap_or_default(),
            delivery_token: settings.delivery_token.clone().unwrap_or_default(),
            environment: settings.environment.clone().unwrap_or_default(),
            delivery_host: pick(
                &settings.delivery_host,
                endpoints.map(|e| &e.content_delivery),
            ),
            live_preview: LivePreviewSettings {
                enable: settings.live_preview.unwrap_or(false),
                preview_token: settings.preview_token.clone(),
                host: pick(&settings.preview_host, endpoints.map(|e| &e.preview)),
            },
            application_host: pick(
                &settings.application_host,
                endpoints.map(|e| &e.application),
            ),
            locale: settings.locale.clone(),
            region,
        };

        tracing::debug!(
            region = %config.region,
            delivery_host = ?config.delivery_host,
            live_preview = config.live_preview.enable,
            "resolved stack config"
        );

        Ok(config)
    }

    /// Shortcut: read settings from `source` alone and resolve them.
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self> {
        Self::resolve(&StackSettings::from_source(source))
    }

    /// Whether live preview is switched on for this stack.
    pub fn preview_enabled(&self) -> bool {
        self.live_preview.enable
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.delivery_token = mask(&copy.delivery_token);
        copy.live_preview.preview_token = copy.live_preview.preview_token.as_deref().map(mask);
        copy
    }
}

/// Resolve the region setting; absent means the API default (`us`).
fn resolve_region(raw: Option<&str>) -> RegionSetting {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return RegionSetting::Known(Region::Us);
    };

    match region_for_str(raw) {
        Some(region) => RegionSetting::Known(region),
        None => {
            tracing::warn!(region = raw, "unrecognized region, relying on host overrides");
            RegionSetting::Custom(raw.to_string())
        }
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.pagestack/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PagestackError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.pagestack/pagestack.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PagestackError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        PagestackError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    if config.http.timeout_secs == 0 {
        return Err(PagestackError::config(format!(
            "{}: http.timeout_secs must be at least 1",
            path.display()
        )));
    }
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PagestackError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PagestackError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PagestackError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Merge file settings with `source` (which wins) and resolve the stack config.
pub fn resolve_stack_config(app: &AppConfig, source: &dyn ConfigSource) -> Result<StackConfig> {
    let merged = app.stack.clone().overlay(StackSettings::from_source(source));
    StackConfig::resolve(&merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn credentials() -> Vec<(&'static str, &'static str)> {
        vec![
            (vars::API_KEY, "blt_api"),
            (vars::DELIVERY_TOKEN, "cs_delivery"),
            (vars::ENVIRONMENT, "production"),
        ]
    }

    #[test]
    fn resolves_known_region_endpoints() {
        let mut pairs = credentials();
        pairs.push((vars::REGION, "EU"));
        let config = StackConfig::from_source(&source(&pairs)).expect("resolve");

        assert_eq!(config.region, RegionSetting::Known(Region::Eu));
        assert_eq!(config.delivery_host.as_deref(), Some("eu-cdn.contentstack.com"));
        assert_eq!(
            config.live_preview.host.as_deref(),
            Some("eu-rest-preview.contentstack.com")
        );
        assert_eq!(config.application_host.as_deref(), Some("eu-app.contentstack.com"));
        assert!(!config.preview_enabled());
    }

    #[test]
    fn absent_region_defaults_to_us() {
        let config = StackConfig::from_source(&source(&credentials())).expect("resolve");
        assert_eq!(config.region, RegionSetting::Known(Region::Us));
        assert_eq!(config.delivery_host.as_deref(), Some("cdn.contentstack.io"));
    }

    #[test]
    fn unknown_region_falls_back_to_overrides() {
        let mut pairs = credentials();
        pairs.push((vars::REGION, "internal-dev"));
        pairs.push((vars::DELIVERY_HOST, "dev-cdn.example.net"));
        let config = StackConfig::from_source(&source(&pairs)).expect("resolve");

        assert_eq!(config.region, RegionSetting::Custom("internal-dev".into()));
        assert_eq!(config.delivery_host.as_deref(), Some("dev-cdn.example.net"));
        assert_eq!(config.live_preview.host, None);
        assert_eq!(config.application_host, None);
    }

    #[test]
    fn overrides_win_independently() {
        let mut pairs = credentials();
        pairs.push((vars::REGION, "azure-na"));
        pairs.push((vars::PREVIEW_HOST, "preview.local"));
        let config = StackConfig::from_source(&source(&pairs)).expect("resolve");

        assert_eq!(
            config.delivery_host.as_deref(),
            Some("azure-na-cdn.contentstack.com")
        );
        assert_eq!(config.live_preview.host.as_deref(), Some("preview.local"));
        assert_eq!(
            config.application_host.as_deref(),
            Some("azure-na-app.contentstack.com")
        );

        let mut pairs = credentials();
        pairs.push((vars::REGION, "eu"));
        pairs.push((vars::DELIVERY_HOST, "cdn.local"));
        let config = StackConfig::from_source(&source(&pairs)).expect("resolve");
        assert_eq!(config.delivery_host.as_deref(), Some("cdn.local"));
        assert_eq!(
            config.live_preview.host.as_deref(),
            Some("eu-rest-preview.contentstack.com")
        );
        assert_eq!(config.application_host.as_deref(), Some("eu-app.contentstack.com"));

        let mut pairs = credentials();
        pairs.push((vars::APPLICATION_HOST, "app.local"));
        let config = StackConfig::from_source(&source(&pairs)).expect("resolve");
        assert_eq!(config.application_host.as_deref(), Some("app.local"));
        assert_eq!(config.delivery_host.as_deref(), Some("cdn.contentstack.io"));
    }

    #[test]
    fn missing_credentials_are_all_reported() {
        let err = StackConfig::from_source(&source(&[(vars::API_KEY, "blt_api")]))
            .expect_err("should fail");
        let msg = err.to_string();
        assert!(msg.contains(vars::DELIVERY_TOKEN));
        assert!(msg.contains(vars::ENVIRONMENT));
        assert!(!msg.contains(vars::API_KEY));
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let mut pairs = credentials();
        pairs[0] = (vars::API_KEY, "   ");
        assert!(StackConfig::from_source(&source(&pairs)).is_err());
    }

    #[test]
    fn preview_flag_requires_exact_true() {
        for (value, expected) in [
            ("true", true),
            ("TRUE", false),
            ("1", false),
            ("false", false),
            (" true", false),
            ("true\n", false),
        ] {
            let mut pairs = credentials();
            pairs.push((vars::PREVIEW, value));
            let config = StackConfig::from_source(&source(&pairs)).expect("resolve");
            assert_eq!(config.preview_enabled(), expected, "value {value:?}");
        }
    }

    #[test]
    fn frontend_prefixed_names_are_read() {
        let pairs = [
            ("VITE_CONTENTSTACK_API_KEY", "blt_api"),
            ("VITE_CONTENTSTACK_DELIVERY_TOKEN", "cs_delivery"),
            ("VITE_CONTENTSTACK_ENVIRONMENT", "preview"),
            ("VITE_CONTENTSTACK_PREVIEW", "true"),
            (vars::ENVIRONMENT, "production"),
        ];
        let config = StackConfig::from_source(&source(&pairs)).expect("resolve");
        assert_eq!(config.api_key, "blt_api");
        // Plain name wins over the prefixed one.
        assert_eq!(config.environment, "production");
        assert!(config.preview_enabled());
    }

    #[test]
    fn blank_plain_name_falls_back_to_frontend_prefix() {
        let pairs = [
            (vars::API_KEY, ""),
            ("VITE_CONTENTSTACK_API_KEY", "blt_vite"),
            (vars::DELIVERY_TOKEN, "cs_delivery"),
            (vars::ENVIRONMENT, "  "),
            ("VITE_CONTENTSTACK_ENVIRONMENT", "preview"),
        ];
        let config = StackConfig::from_source(&source(&pairs)).expect("resolve");
        assert_eq!(config.api_key, "blt_vite");
        assert_eq!(config.environment, "preview");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let path = std::env::temp_dir().join(format!(
            "pagestack-zero-timeout-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[http]\ntimeout_secs = 0\n").expect("write config");
        let result = load_config_from(&path);
        let _ = std::fs::remove_file(&path);

        let err = result.expect_err("zero timeout should fail");
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn env_overrides_file_settings() {
        let file: AppConfig = toml::from_str(
            r#"
[stack]
region = "eu"
api_key = "file_key"
delivery_token = "file_token"
environment = "staging"
live_preview = true

[http]
timeout_secs = 5
"#,
        )
        .expect("parse");
        assert_eq!(file.http.timeout_secs, 5);

        let env = source(&[(vars::ENVIRONMENT, "production"), (vars::PREVIEW, "no")]);
        let config = resolve_stack_config(&file, &env).expect("resolve");
        assert_eq!(config.api_key, "file_key");
        assert_eq!(config.environment, "production");
        assert_eq!(config.region, RegionSetting::Known(Region::Eu));
        assert!(!config.preview_enabled());
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("timeout_secs"));
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.stack, StackSettings::default());
    }

    #[test]
    fn redaction_masks_tokens() {
        let mut pairs = credentials();
        pairs.push((vars::PREVIEW_TOKEN, "csprev_secret"));
        let config = StackConfig::from_source(&source(&pairs)).expect("resolve");
        let shown = config.redacted();
        assert_eq!(shown.delivery_token, "cs_d****");
        assert_eq!(shown.live_preview.preview_token.as_deref(), Some("cspr****"));
        assert_eq!(shown.api_key, config.api_key);
    }
}
