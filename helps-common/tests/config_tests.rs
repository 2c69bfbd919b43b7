//! Integration tests for gateway configuration resolution

use helps_common::config::{self, ENV_DCS_URL, ENV_PORT};
use serial_test::serial;
use std::io::Write;

fn clear_env() {
    std::env::remove_var(ENV_PORT);
    std::env::remove_var(ENV_DCS_URL);
}

#[test]
#[serial]
fn cli_beats_env_and_file() {
    clear_env();
    std::env::set_var(ENV_PORT, "9999");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 7777\ndcs_base_url = \"https://example.org\"").unwrap();

    let config = config::resolve(Some(1234), None, Some(file.path())).unwrap();
    assert_eq!(config.port, 1234);
    assert_eq!(config.dcs_base_url, "https://example.org");

    clear_env();
}

#[test]
#[serial]
fn env_beats_file() {
    clear_env();
    std::env::set_var(ENV_PORT, "9999");
    std::env::set_var(ENV_DCS_URL, "https://env.example.org/");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 7777").unwrap();

    let config = config::resolve(None, None, Some(file.path())).unwrap();
    assert_eq!(config.port, 9999);
    // Trailing slash is stripped
    assert_eq!(config.dcs_base_url, "https://env.example.org");

    clear_env();
}

#[test]
#[serial]
fn file_values_apply_when_nothing_else_set() {
    clear_env();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "port = 7777\nhost = \"0.0.0.0\"\ncatalog_ttl_secs = 30"
    )
    .unwrap();

    let config = config::resolve(None, None, Some(file.path())).unwrap();
    assert_eq!(config.port, 7777);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.catalog_ttl_secs, 30);
}

#[test]
#[serial]
fn invalid_env_port_is_rejected() {
    clear_env();
    std::env::set_var(ENV_PORT, "not-a-port");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 7777").unwrap();

    assert!(config::resolve(None, None, Some(file.path())).is_err());
    clear_env();
}
