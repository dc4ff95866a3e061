// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Tally configuration system.

use tally_config::model::TallyConfig;
use tally_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_tally_config() {
    let toml = r#"
[platform]
name = "tally-staging"
log_level = "debug"

[storage]
database_path = "/tmp/test.db"
wal_mode = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.platform.name, "tally-staging");
    assert_eq!(config.platform.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
}

/// Unknown field in [storage] section produces an error.
#[test]
fn unknown_field_in_storage_produces_error() {
    let toml = r#"
[storage]
databse_path = "/tmp/x.db"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    // Figment wraps serde's deny_unknown_fields error
    assert!(
        err_str.contains("unknown field") || err_str.contains("databse_path"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let toml = "";
    let config = load_config_from_str(toml).expect("empty TOML should use defaults");

    assert_eq!(config.platform.name, "tally");
    assert_eq!(config.platform.log_level, "info");
    assert!(config.storage.database_path.ends_with("tally.db"));
    assert!(config.storage.wal_mode);
}

/// Environment-style override maps to storage.database_path via dot notation
/// (NOT storage.database.path).
#[test]
fn env_style_override_sets_database_path() {
    use figment::{providers::Serialized, Figment};

    let config: TallyConfig = Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(("storage.database_path", "/var/lib/tally/env.db"))
        .extract()
        .expect("should set database_path via dot notation");

    assert_eq!(config.storage.database_path, "/var/lib/tally/env.db");
}

/// Semantic validation runs after deserialization.
#[test]
fn invalid_log_level_fails_validation() {
    let toml = r#"
[platform]
log_level = "shouting"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors
        .iter()
        .any(|e| e.to_string().contains("log_level")));
}

/// A fully valid config passes the high-level entry point.
#[test]
fn valid_config_passes_load_and_validate() {
    let toml = r#"
[platform]
name = "tally"
log_level = "warn"

[storage]
database_path = "/tmp/tally-test.db"
"#;

    let config = load_and_validate_str(toml).expect("should validate");
    assert_eq!(config.platform.log_level, "warn");
}
