use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Default backend base URL when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:10000";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the conversational backend
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Title shown in the widget top bar
    #[arg(long, env = "WIDGET_TITLE")]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub widget: WidgetConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Backend base URL; a trailing slash is normalized away before use.
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub title: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("backend.base_url", DEFAULT_BACKEND_URL)?
            .set_default("backend.request_timeout_secs", 30)?
            .set_default("widget.title", "Assistant")?;

        // Config file: explicit path first (--config / CONFIG_FILE), then an
        // optional ./config.{yaml,toml,...} fallback.
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }

        // Environment variables prefixed with WIDGET_, e.g. WIDGET_SERVER__PORT=8000.
        builder = builder.add_source(
            Environment::with_prefix("WIDGET")
                .separator("__")
                .try_parsing(true),
        );

        // CLI flags (and their env fallbacks) win over everything else.
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(base_url) = cli.backend_url {
            builder = builder.set_override("backend.base_url", base_url)?;
        }
        if let Some(title) = cli.title {
            builder = builder.set_override("widget.title", title)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}
