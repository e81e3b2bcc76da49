//! kupid-gw - HTTP gateway for the Kupid onboarding and matching front-end
//!
//! Serves the `/api/*` proxy routes, the onboarding check and the OAuth
//! callback. Holds no state of its own: every request is validated,
//! forwarded to an n8n webhook or Supabase edge function, and normalized.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kupid_common::config::{
    config_file_path, load_toml_config, GatewayConfig, GatewayOverrides, ENV_BIND_ADDR, ENV_CONFIG_PATH,
    ENV_SITE_URL, ENV_SUPABASE_ANON_KEY, ENV_SUPABASE_URL, ENV_WEBHOOK_BASE_URL,
};
use kupid_common::ProxyRoute;
use kupid_gw::{build_router, AppState};

/// Command-line arguments for kupid-gw
#[derive(Parser, Debug)]
#[command(name = "kupid-gw")]
#[command(about = "Proxy gateway for the Kupid dating front-end")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = ENV_CONFIG_PATH)]
    config: Option<PathBuf>,

    /// Address to listen on (e.g. 127.0.0.1:3000)
    #[arg(short, long, env = ENV_BIND_ADDR)]
    bind: Option<String>,

    /// Public origin used for OAuth redirects
    #[arg(long, env = ENV_SITE_URL)]
    site_url: Option<String>,

    /// Base URL of the n8n webhook workflows
    #[arg(long, env = ENV_WEBHOOK_BASE_URL)]
    webhook_base_url: Option<String>,

    /// Supabase project URL
    #[arg(long, env = ENV_SUPABASE_URL)]
    supabase_url: Option<String>,

    /// Supabase anon key
    #[arg(long, env = ENV_SUPABASE_ANON_KEY, hide_env_values = true)]
    supabase_anon_key: Option<String>,
}

impl Args {
    fn overrides(&self) -> GatewayOverrides {
        GatewayOverrides {
            bind_addr: self.bind.clone(),
            site_url: self.site_url.clone(),
            webhook_base_url: self.webhook_base_url.clone(),
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is resolved before tracing so the TOML log level applies
    let config_path = config_file_path(args.config.as_deref());
    let toml = match &config_path {
        Some(path) => load_toml_config(path)?,
        None => None,
    };
    let config = GatewayConfig::resolve(&args.overrides(), toml)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("kupid_gw={0},kupid_common={0},tower_http=info", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Kupid gateway (kupid-gw) v{}",
        env!("CARGO_PKG_VERSION")
    );
    match &config_path {
        Some(path) if path.exists() => info!("Config file: {}", path.display()),
        Some(path) => info!("No config file at {}, using environment and defaults", path.display()),
        None => info!("No config directory, using environment and defaults"),
    }

    info!("Webhook base: {}", config.webhook_base_url);
    match config.supabase() {
        Ok(supabase) => info!("Supabase project: {}", supabase.url),
        Err(_) => warn!("Supabase not configured; edge-function routes and sign-in will fail"),
    }
    for route in ProxyRoute::ALL {
        info!("{} -> {}", route.path(), config.backend_for(route));
    }

    let bind_addr = config.bind_addr;
    let state = AppState::new(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!("kupid-gw listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
