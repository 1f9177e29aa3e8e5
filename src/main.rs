//! gemini-proxy: HTTP proxy for the Gemini API
//!
//! Accepts a prompt over HTTP, forwards it to Gemini's generateContent
//! endpoint with a server-held API key, and relays the generated text.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use gemini_proxy::{
    config::{AppConfig, LogFormat},
    run_server,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
#[command(name = "gemini-proxy")]
#[command(version)]
#[command(about = "HTTP proxy for the Gemini API that keeps the API key server-side")]
#[command(long_about = "
gemini-proxy accepts POST requests with a prompt, forwards them to the
Gemini generateContent API using the key from GEMINI_API_KEY, and returns
{ \"text\": ... } or a { \"proxyError\", \"detail\" } envelope.

Example usage:
  GEMINI_API_KEY=... gemini-proxy run --port 3000
  gemini-proxy --config config.yaml check-config
")]
struct Cli {
    /// Path to config file (defaults: config.yaml, config.yml, ./config/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the proxy server
    Run {
        /// Override listen port
        #[arg(short, long)]
        port: Option<u16>,
        /// Override upstream API root (e.g., "http://localhost:9090/v1beta")
        #[arg(long)]
        upstream_url: Option<String>,
    },

    /// Validate configuration and report whether the API key is set
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_source = AppConfig::resolve_path(cli.config.as_deref());
    let config = load_config_or_exit(config_source.as_deref());
    init_tracing(cli.log_level, config.logging.format);

    match &config_source {
        Some(path) => tracing::info!("Loaded configuration from {}", path.display()),
        None => tracing::info!("No config file found, using built-in defaults"),
    }

    match cli.command {
        Commands::Run { port, upstream_url } => {
            run_proxy(config, port, upstream_url).await?;
        }
        Commands::CheckConfig => {
            check_config(&config);
        }
    }

    Ok(())
}

fn init_tracing(log_level: Option<LogLevel>, format: LogFormat) {
    let level_filter = if let Some(level) = log_level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            .to_string()
    };

    let builder = tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter));

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Run the proxy server
async fn run_proxy(
    mut config: AppConfig,
    port_override: Option<u16>,
    upstream_url_override: Option<String>,
) -> anyhow::Result<()> {
    if let Some(port) = port_override {
        config.server.port = port;
    }
    if let Some(url) = upstream_url_override {
        config.upstream.base_url = url;
    }

    run_server(config).await
}

/// Validate configuration and print a summary
fn check_config(config: &AppConfig) {
    if let Err(e) = config.validate() {
        eprintln!("✗ Configuration error: {}", e);
        std::process::exit(1);
    }

    println!("✓ Configuration is valid\n");
    println!("Server:");
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    println!("  Path: {}", config.server.path);
    println!("  Max body: {} bytes", config.server.max_body_bytes);
    println!("\nUpstream:");
    println!("  URL: {}", config.upstream.base_url());
    println!("  TLS: {}", if config.upstream.is_tls() { "enabled" } else { "disabled" });
    println!("  Default model: {}", config.upstream.default_model);
    println!("  Timeout: {}s", config.upstream.timeout_seconds);
    let key_status = if config.upstream.load_credential().is_some() {
        "set"
    } else {
        "NOT SET (requests will fail with CONFIG_ERROR)"
    };
    println!("  API key ({}): {}", config.upstream.api_key_env, key_status);
    println!("\nLogging:");
    println!("  Format: {:?}", config.logging.format);
}

/// Load configuration or exit with error
fn load_config_or_exit(config_path: Option<&Path>) -> AppConfig {
    match AppConfig::load_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            eprintln!("\nRun without --config to use built-in defaults,");
            eprintln!("or copy config.yaml.default and modify it:");
            eprintln!("  cp config.yaml.default config.yaml");
            std::process::exit(1);
        }
    }
}
