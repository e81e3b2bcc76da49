//! Configuration resolution tests
//!
//! Covers:
//! - Priority order CLI → ENV → TOML → default
//! - Missing TOML file is not an error
//! - Malformed TOML, invalid route bindings and a zero timeout are configuration errors
//! - Missing Supabase settings only fail on use
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.

use kupid_common::config::{
    load_toml_config, GatewayConfig, GatewayOverrides, TomlConfig, DEFAULT_BIND_ADDR,
    ENV_BIND_ADDR, ENV_SUPABASE_ANON_KEY, ENV_SUPABASE_URL, ENV_UPSTREAM_TIMEOUT,
    ENV_WEBHOOK_BASE_URL,
};
use kupid_common::{Backend, Error, ProxyRoute};
use serial_test::serial;
use std::env;
use std::time::Duration;
use tempfile::TempDir;

fn clear_env() {
    for name in [
        ENV_BIND_ADDR,
        ENV_WEBHOOK_BASE_URL,
        ENV_SUPABASE_URL,
        ENV_SUPABASE_ANON_KEY,
        ENV_UPSTREAM_TIMEOUT,
        "KUPID_SITE_URL",
    ] {
        env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_defaults_without_any_source() {
    clear_env();

    let config = GatewayConfig::resolve(&GatewayOverrides::default(), None).unwrap();

    assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    assert_eq!(config.webhook_base_url.as_str(), "https://graysonlee.app.n8n.cloud/webhook");
    assert_eq!(config.upstream_timeout, Duration::from_secs(30));
    assert_eq!(config.log_level, "info");
    assert!(config.site_url.is_none());
    assert_eq!(config.backend_for(ProxyRoute::AddUser), Backend::Webhook);
    assert_eq!(config.backend_for(ProxyRoute::GetPreferences), Backend::EdgeFunction);
}

#[test]
#[serial]
fn test_missing_supabase_fails_on_use_only() {
    clear_env();

    let config = GatewayConfig::resolve(&GatewayOverrides::default(), None).unwrap();

    match config.supabase() {
        Err(Error::Config(msg)) => assert_eq!(msg, "Missing Supabase configuration"),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(ENV_WEBHOOK_BASE_URL, "http://env.example/webhook");
    env::set_var(ENV_SUPABASE_URL, "https://proj.supabase.co");
    env::set_var(ENV_SUPABASE_ANON_KEY, "anon-env");

    let toml = TomlConfig {
        webhook_base_url: Some("http://toml.example/webhook".to_string()),
        supabase_anon_key: Some("anon-toml".to_string()),
        ..TomlConfig::default()
    };
    let config = GatewayConfig::resolve(&GatewayOverrides::default(), Some(toml)).unwrap();

    assert_eq!(config.webhook_url("getuser"), "http://env.example/webhook/getuser");
    let supabase = config.supabase().unwrap();
    assert_eq!(supabase.anon_key, "anon-env");
    assert_eq!(
        supabase.function_url("get-preferences"),
        "https://proj.supabase.co/functions/v1/get-preferences"
    );

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_BIND_ADDR, "0.0.0.0:8080");

    let cli = GatewayOverrides {
        bind_addr: Some("127.0.0.1:9090".to_string()),
        ..GatewayOverrides::default()
    };
    let config = GatewayConfig::resolve(&cli, None).unwrap();
    assert_eq!(config.bind_addr.port(), 9090);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_timeout_env_is_config_error() {
    clear_env();
    env::set_var(ENV_UPSTREAM_TIMEOUT, "soon");

    let result = GatewayConfig::resolve(&GatewayOverrides::default(), None);
    assert!(matches!(result, Err(Error::Config(_))));

    clear_env();
}

#[test]
#[serial]
fn test_zero_timeout_is_config_error() {
    clear_env();
    env::set_var(ENV_UPSTREAM_TIMEOUT, "0");

    let result = GatewayConfig::resolve(&GatewayOverrides::default(), None);
    assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("greater than 0")));

    clear_env();
    let toml = TomlConfig {
        upstream_timeout_secs: Some(0),
        ..TomlConfig::default()
    };
    assert!(matches!(
        GatewayConfig::resolve(&GatewayOverrides::default(), Some(toml)),
        Err(Error::Config(_))
    ));
}

#[test]
#[serial]
fn test_route_override_from_toml_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kupid-gw.toml");
    std::fs::write(
        &path,
        r#"
bind_addr = "127.0.0.1:4000"
upstream_timeout_secs = 5

[routes]
add-user = "edge_function"
search-matches = "edge_function"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let toml = load_toml_config(&path).unwrap();
    let config = GatewayConfig::resolve(&GatewayOverrides::default(), toml).unwrap();

    assert_eq!(config.bind_addr.port(), 4000);
    assert_eq!(config.upstream_timeout, Duration::from_secs(5));
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.backend_for(ProxyRoute::AddUser), Backend::EdgeFunction);
    assert_eq!(config.backend_for(ProxyRoute::SearchMatches), Backend::EdgeFunction);
    assert_eq!(config.backend_for(ProxyRoute::GetUser), Backend::Webhook);
}

#[test]
#[serial]
fn test_unsupported_route_binding_rejected() {
    clear_env();
    let mut toml = TomlConfig::default();
    toml.routes.insert("get-preferences".to_string(), Backend::Webhook);

    let result = GatewayConfig::resolve(&GatewayOverrides::default(), Some(toml));
    assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("get-preferences")));
}

#[test]
#[serial]
fn test_unknown_route_rejected() {
    clear_env();
    let mut toml = TomlConfig::default();
    toml.routes.insert("delete-everything".to_string(), Backend::Webhook);

    assert!(GatewayConfig::resolve(&GatewayOverrides::default(), Some(toml)).is_err());
}

#[test]
fn test_missing_config_file_does_not_error() {
    let dir = TempDir::new().unwrap();
    let result = load_toml_config(&dir.path().join("absent.toml")).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_malformed_config_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "bind_addr = [unclosed").unwrap();

    assert!(matches!(load_toml_config(&path), Err(Error::Config(_))));
}
