use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

fn invalid_var(result: Result<AppConfig, ConfigError>) -> String {
    match result {
        Err(ConfigError::InvalidEnvVar { var, .. }) => var,
        other => panic!("expected InvalidEnvVar, got: {other:?}"),
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "MEDSCHED_ENV"));
}

#[test]
fn environment_displays_as_env_value() {
    for value in ["development", "test", "production"] {
        assert_eq!(parse_environment(value).unwrap().to_string(), value);
    }
}

#[test]
fn build_app_config_uses_defaults_when_env_is_empty() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.sources_path.to_str(), Some("./config/sources.yaml"));
    assert_eq!(cfg.output_dir.to_str(), Some("./output"));
    assert_eq!(cfg.request_timeout_secs, 10);
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(cfg.inter_request_delay_ms, 500);
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("MEDSCHED_ENV", "production");
    map.insert("MEDSCHED_SOURCES_PATH", "/etc/medsched/sources.yaml");
    map.insert("MEDSCHED_OUTPUT_DIR", "/var/lib/medsched");
    map.insert("MEDSCHED_REQUEST_TIMEOUT_SECS", "30");
    map.insert("MEDSCHED_USER_AGENT", "medsched-test/0.1");
    map.insert("MEDSCHED_INTER_REQUEST_DELAY_MS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(
        cfg.sources_path.to_str(),
        Some("/etc/medsched/sources.yaml")
    );
    assert_eq!(cfg.output_dir.to_str(), Some("/var/lib/medsched"));
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "medsched-test/0.1");
    assert_eq!(cfg.inter_request_delay_ms, 0);
}

#[test]
fn build_app_config_rejects_non_numeric_timeout() {
    let mut map = HashMap::new();
    map.insert("MEDSCHED_REQUEST_TIMEOUT_SECS", "ten");
    let var = invalid_var(build_app_config(lookup_from_map(&map)));
    assert_eq!(var, "MEDSCHED_REQUEST_TIMEOUT_SECS");
}

#[test]
fn build_app_config_rejects_zero_timeout() {
    let mut map = HashMap::new();
    map.insert("MEDSCHED_REQUEST_TIMEOUT_SECS", "0");
    let var = invalid_var(build_app_config(lookup_from_map(&map)));
    assert_eq!(var, "MEDSCHED_REQUEST_TIMEOUT_SECS");
}

#[test]
fn build_app_config_rejects_invalid_delay() {
    let mut map = HashMap::new();
    map.insert("MEDSCHED_INTER_REQUEST_DELAY_MS", "-5");
    let var = invalid_var(build_app_config(lookup_from_map(&map)));
    assert_eq!(var, "MEDSCHED_INTER_REQUEST_DELAY_MS");
}
