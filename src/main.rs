//! REST resource router (v1)
//!
//! Serves the in-memory demo API, prints its finalized route table, or
//! issues a bearer token for it.
//!
//! # Architecture Overview
//!
//! ```text
//!     settings (TOML)  ──▶  config  ──▶  routing (ResourceRouter, GenericRouter)
//!                                              │ collect_routes
//!                                              ▼
//!     Client Request   ──▶  http server ──▶  RouteTable ──▶ method map ──▶ Handler
//!     Client Response  ◀──  JSON + CORS ◀──  ApiError / Response ◀──────────┘
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use restful_router::config::{load_config, load_from_env, ConfigError, Settings};
use restful_router::demo;
use restful_router::http::HttpServer;
use restful_router::i18n::Translations;
use restful_router::observability::{logging, metrics};
use restful_router::routing::{PathConfig, RouteRule};
use restful_router::security::JwtCodec;
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "restful-router")]
#[command(about = "Resource router serving a demo REST API", long_about = None)]
struct Cli {
    /// Settings file; falls back to $RESTFUL_SETTINGS, then defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the demo API
    Serve,
    /// Print the finalized route table
    Routes,
    /// Issue a token signed with auth.secret_key
    Token {
        /// Claims as a JSON object
        #[arg(long, default_value = "{}")]
        claims: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config)?;

    logging::init_logging(&settings.observability);
    tracing::info!("restful-router v{} starting", env!("CARGO_PKG_VERSION"));

    let rules = demo::routes(&PathConfig::from(&settings.routing))?;

    match cli.command {
        Commands::Routes => print_routes(&rules),
        Commands::Serve => serve(settings, rules).await?,
        Commands::Token { claims } => {
            let claims: Map<String, Value> = serde_json::from_str(&claims)?;
            println!("{}", JwtCodec::from_config(&settings.auth)?.generate(claims)?);
        }
    }

    Ok(())
}

fn load_settings(path: Option<PathBuf>) -> Result<Settings, ConfigError> {
    match path {
        Some(path) => load_config(&path),
        None => match load_from_env() {
            Err(ConfigError::MissingEnvironment(_)) => Ok(Settings::default()),
            result => result,
        },
    }
}

fn print_routes(rules: &[RouteRule]) {
    for rule in rules {
        let methods = rule.methods();
        println!(
            "{:<60} {:<28} {:<10} {}",
            rule.pattern,
            if methods.is_empty() { "*".to_string() } else { methods.join(",") },
            rule.handler.spec().name,
            rule.name.as_deref().unwrap_or("-"),
        );
    }
}

async fn serve(settings: Settings, rules: Vec<RouteRule>) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %settings.listener.bind_address,
        api_prefix = %settings.routing.api_prefix,
        trailing_slash = settings.routing.trailing_slash,
        debug = settings.debug,
        "Configuration loaded"
    );

    if settings.observability.metrics_enabled {
        if let Ok(addr) = settings.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %settings.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let translations = match &settings.i18n.locales_path {
        Some(path) => Translations::load(Path::new(path), settings.i18n.default_locale.clone())?,
        None => Translations::new(settings.i18n.default_locale.clone()),
    };

    let codec = if settings.auth.secret_key.is_empty() {
        tracing::warn!("auth.secret_key is empty; every token will be rejected");
        None
    } else {
        Some(JwtCodec::from_config(&settings.auth)?)
    };

    let listener = TcpListener::bind(&settings.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let mut server = HttpServer::new(settings, rules)?.with_translations(translations);
    if let Some(codec) = codec {
        server = server.with_verifier(codec);
    }
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
