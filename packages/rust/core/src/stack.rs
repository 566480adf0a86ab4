//! The [`Stack`] facade.
//!
//! One stack config is resolved once and handed to both the delivery client
//! and the live-preview bridge, so their hosts can never disagree.

use std::sync::Arc;

use tracing::info;

use pagestack_delivery::{DeliveryClient, TagStyle};
use pagestack_preview::{LivePreviewInit, PreviewOptions};
use pagestack_shared::{
    AppConfig, ConfigSource, HttpConfig, ProcessEnv, Result, StackConfig, load_config,
    resolve_stack_config,
};

/// A configured stack: delivery client plus live-preview bridge config.
#[derive(Debug, Clone)]
pub struct Stack {
    pub(crate) config: Arc<StackConfig>,
    pub(crate) client: DeliveryClient,
    pub(crate) live_preview: LivePreviewInit,
    pub(crate) tag_style: TagStyle,
}

impl Stack {
    /// Build a stack from an already resolved config.
    pub fn new(config: StackConfig, http: &HttpConfig, options: PreviewOptions) -> Result<Self> {
        let config = Arc::new(config);
        let client = DeliveryClient::new(Arc::clone(&config), http)?;
        let live_preview = LivePreviewInit::from_config(&config, options);

        info!(
            region = %config.region,
            environment = %config.environment,
            live_preview = config.live_preview.enable,
            "stack configured"
        );

        Ok(Self {
            config,
            client,
            live_preview,
            tag_style: TagStyle::default(),
        })
    }

    /// Resolve the config from file settings overlaid with `source`, then build.
    pub fn from_sources(
        app: &AppConfig,
        source: &dyn ConfigSource,
        options: PreviewOptions,
    ) -> Result<Self> {
        let config = resolve_stack_config(app, source)?;
        Self::new(config, &app.http, options)
    }

    /// Load `~/.pagestack/pagestack.toml`, overlay the process environment, and build.
    pub fn from_env(options: PreviewOptions) -> Result<Self> {
        let app = load_config()?;
        Self::from_sources(&app, &ProcessEnv, options)
    }

    /// Render editable tags in the given style (default: object).
    pub fn with_tag_style(mut self, style: TagStyle) -> Self {
        self.tag_style = style;
        self
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn client(&self) -> &DeliveryClient {
        &self.client
    }

    /// Init payload for the browser-side live-preview bridge.
    pub fn live_preview(&self) -> &LivePreviewInit {
        &self.live_preview
    }
}
