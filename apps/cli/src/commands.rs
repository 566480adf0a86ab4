//! CLI command definitions, routing, and tracing setup.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use pagestack_core::Stack;
use pagestack_delivery::TagStyle;
use pagestack_preview::{EditMode, PreviewOptions};
use pagestack_shared::{
    EndpointStyle, LivePreviewQuery, ProcessEnv, Region, config_file_path, init_config,
    load_config, resolve_stack_config,
};

/// Exit code for a lookup that found no page.
const EXIT_NOT_FOUND: u8 = 2;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// pagestack — fetch CMS pages by URL, with live-preview support.
#[derive(Parser)]
#[command(
    name = "pagestack",
    version,
    about = "Fetch CMS page entries by URL and emit live-preview bridge configuration.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Editable tag rendering.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum TagArg {
    Object,
    Attr,
}

impl From<TagArg> for TagStyle {
    fn from(arg: TagArg) -> Self {
        match arg {
            TagArg::Object => TagStyle::Object,
            TagArg::Attr => TagStyle::Attribute,
        }
    }
}

/// Live-preview editing mode.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum ModeArg {
    Builder,
    Preview,
}

impl From<ModeArg> for EditMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Builder => EditMode::Builder,
            ModeArg::Preview => EditMode::Preview,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch the page entry whose `url` field matches URL and print it as JSON.
    Page {
        /// Page URL path (e.g. `/home`).
        url: String,

        /// Live-preview session hash.
        #[arg(long)]
        live_preview: Option<String>,

        /// Raw query string of the previewed request (e.g. `live_preview=..&entry_uid=..`).
        #[arg(long)]
        query: Option<String>,

        /// Editable tag style when live preview is enabled.
        #[arg(long, default_value = "object")]
        tags: TagArg,

        /// Print compact JSON.
        #[arg(long)]
        compact: bool,
    },

    /// Print the live-preview bridge init configuration.
    PreviewInit {
        /// Editing mode.
        #[arg(long, default_value = "builder")]
        mode: ModeArg,

        /// Content is rendered client-side.
        #[arg(long)]
        no_ssr: bool,

        /// Hide the floating edit button.
        #[arg(long)]
        no_edit_button: bool,

        /// Wrap the JSON in a `<script>` element for server-rendered pages.
        #[arg(long)]
        script: bool,
    },

    /// List supported regions and their endpoints.
    Regions {
        /// Show endpoints with an `https://` scheme.
        #[arg(long)]
        https: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved stack configuration (tokens redacted).
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout stays
/// machine-readable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "pagestack=warn",
        1 => "pagestack=info",
        2 => "pagestack=debug",
        _ => "pagestack=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Page {
            url,
            live_preview,
            query,
            tags,
            compact,
        } => cmd_page(&url, live_preview, query.as_deref(), tags.into(), compact).await,
        Command::PreviewInit {
            mode,
            no_ssr,
            no_edit_button,
            script,
        } => {
            let options = PreviewOptions {
                mode: mode.into(),
                ssr: !no_ssr,
                edit_button: !no_edit_button,
            };
            cmd_preview_init(options, script)
        }
        Command::Regions { https } => cmd_regions(https),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_page(
    url: &str,
    live_preview: Option<String>,
    query: Option<&str>,
    tags: TagStyle,
    compact: bool,
) -> Result<ExitCode> {
    let stack = Stack::from_env(PreviewOptions::default())?.with_tag_style(tags);

    let mut params = query
        .map(LivePreviewQuery::from_query_str)
        .unwrap_or_default();
    if live_preview.is_some() {
        params.live_preview = live_preview;
    }

    info!(url, preview = params.is_active(), "fetching page");

    let spinner = spinner(&format!("Fetching {url}"));
    let page = stack.get_page(url, Some(&params)).await;
    spinner.finish_and_clear();

    let Some(entry) = page? else {
        eprintln!("no page found at '{url}'");
        return Ok(ExitCode::from(EXIT_NOT_FOUND));
    };

    let json = if compact {
        serde_json::to_string(&entry)?
    } else {
        serde_json::to_string_pretty(&entry)?
    };
    println!("{json}");

    Ok(ExitCode::SUCCESS)
}

fn cmd_preview_init(options: PreviewOptions, script: bool) -> Result<ExitCode> {
    let stack = Stack::from_env(options)?;
    let init = stack.live_preview();

    let rendered = if script {
        init.to_script_tag()?
    } else {
        init.to_json()?
    };
    println!("{rendered}");

    Ok(ExitCode::SUCCESS)
}

fn cmd_regions(https: bool) -> Result<ExitCode> {
    let style = if https {
        EndpointStyle::Https
    } else {
        EndpointStyle::BareHost
    };

    println!(
        "{:<10} {:<40} {:<48} {}",
        "REGION", "DELIVERY", "PREVIEW", "APPLICATION"
    );
    for region in Region::ALL {
        let endpoints = region.endpoints(style);
        println!(
            "{:<10} {:<40} {:<48} {}",
            region.as_str(),
            endpoints.content_delivery,
            endpoints.preview,
            endpoints.application
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_config_init() -> Result<ExitCode> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_config_show() -> Result<ExitCode> {
    let app = load_config()?;
    let config = resolve_stack_config(&app, &ProcessEnv)?;

    println!("# config file: {}", config_file_path()?.display());
    println!("{}", toml::to_string_pretty(&config.redacted())?);

    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Stderr spinner shown while a request is in flight.
fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn page_command_parses_preview_flags() {
        let cli = Cli::try_parse_from([
            "pagestack",
            "page",
            "/home",
            "--live-preview",
            "hash123",
            "--tags",
            "attr",
        ])
        .expect("parse");

        match cli.command {
            Command::Page {
                url,
                live_preview,
                tags,
                ..
            } => {
                assert_eq!(url, "/home");
                assert_eq!(live_preview.as_deref(), Some("hash123"));
                assert_eq!(TagStyle::from(tags), TagStyle::Attribute);
            }
            _ => panic!("expected page command"),
        }
    }

    #[test]
    fn preview_init_defaults() {
        let cli = Cli::try_parse_from(["pagestack", "preview-init"]).expect("parse");
        match cli.command {
            Command::PreviewInit {
                mode,
                no_ssr,
                script,
                ..
            } => {
                assert_eq!(EditMode::from(mode), EditMode::Builder);
                assert!(!no_ssr);
                assert!(!script);
            }
            _ => panic!("expected preview-init command"),
        }
    }
}
