//! Configuration loading and resolution
//!
//! Every gateway setting resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: a warning is logged and defaults apply.

use crate::routes::{Backend, ProxyRoute};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub const ENV_CONFIG_PATH: &str = "KUPID_CONFIG";
pub const ENV_BIND_ADDR: &str = "KUPID_BIND_ADDR";
pub const ENV_SITE_URL: &str = "KUPID_SITE_URL";
pub const ENV_WEBHOOK_BASE_URL: &str = "KUPID_WEBHOOK_BASE_URL";
pub const ENV_UPSTREAM_TIMEOUT: &str = "KUPID_UPSTREAM_TIMEOUT_SECS";
pub const ENV_SUPABASE_URL: &str = "NEXT_PUBLIC_SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "NEXT_PUBLIC_SUPABASE_ANON_KEY";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_WEBHOOK_BASE_URL: &str = "https://graysonlee.app.n8n.cloud/webhook";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// On-disk gateway configuration (`kupid-gw.toml`)
///
/// All fields are optional; anything absent falls through to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    pub site_url: Option<String>,
    pub webhook_base_url: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub upstream_timeout_secs: Option<u64>,
    /// Route name → backend override
    #[serde(default)]
    pub routes: HashMap<String, Backend>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct GatewayOverrides {
    pub bind_addr: Option<String>,
    pub site_url: Option<String>,
    pub webhook_base_url: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
}

/// Supabase project coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseConfig {
    pub url: Url,
    pub anon_key: String,
}

impl SupabaseConfig {
    /// `{url}/functions/v1/{name}`
    pub fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.url.as_str().trim_end_matches('/'), name)
    }

    /// `{url}/auth/v1/{path}`
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url.as_str().trim_end_matches('/'), path)
    }
}

/// Fully resolved gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    /// Public origin used for redirects; `None` derives it from the Host header
    pub site_url: Option<Url>,
    pub webhook_base_url: Url,
    /// Missing Supabase settings only fail the requests that need them
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub upstream_timeout: Duration,
    pub routes: HashMap<ProxyRoute, Backend>,
    pub log_level: String,
}

impl GatewayConfig {
    /// Resolve configuration from CLI overrides, environment and TOML
    pub fn resolve(cli: &GatewayOverrides, toml: Option<TomlConfig>) -> Result<Self> {
        let toml = toml.unwrap_or_default();

        let bind_addr = pick(&cli.bind_addr, ENV_BIND_ADDR, &toml.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", bind_addr, e)))?;

        let site_url = pick(&cli.site_url, ENV_SITE_URL, &toml.site_url)
            .map(|raw| parse_url("site_url", &raw))
            .transpose()?;

        let webhook_base_url = pick(&cli.webhook_base_url, ENV_WEBHOOK_BASE_URL, &toml.webhook_base_url)
            .unwrap_or_else(|| DEFAULT_WEBHOOK_BASE_URL.to_string());
        let webhook_base_url = parse_url("webhook_base_url", &webhook_base_url)?;

        let supabase_url = pick(&cli.supabase_url, ENV_SUPABASE_URL, &toml.supabase_url);
        let supabase_anon_key = pick(&cli.supabase_anon_key, ENV_SUPABASE_ANON_KEY, &toml.supabase_anon_key);

        let upstream_timeout_secs = match std::env::var(ENV_UPSTREAM_TIMEOUT) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("Invalid {} '{}': {}", ENV_UPSTREAM_TIMEOUT, raw, e))
            })?,
            Err(_) => toml.upstream_timeout_secs.unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        };
        if upstream_timeout_secs == 0 {
            return Err(Error::Config("upstream_timeout_secs must be greater than 0".to_string()));
        }

        let routes = resolve_routes(&toml.routes)?;

        if supabase_url.is_none() || supabase_anon_key.is_none() {
            warn!(
                "{} / {} not set; edge-function routes, onboarding check and auth callback will fail",
                ENV_SUPABASE_URL, ENV_SUPABASE_ANON_KEY
            );
        }

        Ok(Self {
            bind_addr,
            site_url,
            webhook_base_url,
            supabase_url,
            supabase_anon_key,
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
            routes,
            log_level: toml.logging.level,
        })
    }

    /// Supabase settings, or the configuration error surfaced as HTTP 500
    pub fn supabase(&self) -> Result<SupabaseConfig> {
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(url), Some(key)) if !url.trim().is_empty() && !key.trim().is_empty() => {
                Ok(SupabaseConfig {
                    url: parse_url("supabase_url", url)?,
                    anon_key: key.clone(),
                })
            }
            _ => Err(Error::Config("Missing Supabase configuration".to_string())),
        }
    }

    /// Backend bound to `route`
    pub fn backend_for(&self, route: ProxyRoute) -> Backend {
        self.routes
            .get(&route)
            .copied()
            .unwrap_or_else(|| route.default_backend())
    }

    /// `{webhook_base_url}/{slug}`
    pub fn webhook_url(&self, slug: &str) -> String {
        format!("{}/{}", self.webhook_base_url.as_str().trim_end_matches('/'), slug)
    }
}

fn pick(cli: &Option<String>, env_name: &str, toml: &Option<String>) -> Option<String> {
    if let Some(value) = cli {
        return Some(value.clone());
    }
    if let Ok(value) = std::env::var(env_name) {
        if !value.trim().is_empty() {
            return Some(value);
        }
    }
    toml.clone()
}

fn parse_url(field: &str, raw: &str) -> Result<Url> {
    Url::parse(raw.trim()).map_err(|e| Error::Config(format!("Invalid {} '{}': {}", field, raw, e)))
}

fn resolve_routes(overrides: &HashMap<String, Backend>) -> Result<HashMap<ProxyRoute, Backend>> {
    let mut routes: HashMap<ProxyRoute, Backend> = ProxyRoute::ALL
        .iter()
        .map(|route| (*route, route.default_backend()))
        .collect();

    for (name, backend) in overrides {
        let route: ProxyRoute = name
            .parse()
            .map_err(|_| Error::Config(format!("Unknown route in [routes]: {}", name)))?;
        if !route.supports(*backend) {
            return Err(Error::Config(format!(
                "Route {} has no {} endpoint",
                route, backend
            )));
        }
        routes.insert(route, *backend);
    }

    Ok(routes)
}

/// Config file path: explicit argument, then `$KUPID_CONFIG`, then
/// `<config_dir>/kupid/kupid-gw.toml`
pub fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("kupid").join("kupid-gw.toml"))
}

/// Load the TOML config file
///
/// Returns `Ok(None)` when the file does not exist; a file that exists but
/// does not parse is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        warn!("Config file not found at {}, using defaults", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(Some(config))
}
