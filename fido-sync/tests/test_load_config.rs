use serial_test::serial;
use std::env;
use std::fs::write;
use tempfile::NamedTempFile;

use fido_sync::load_config::load_config;
use fido_sync_core::config::DeploymentMode;
use fido_sync_core::producers::{ProducerConfig, SheetLayout};

const CONFIG_YAML: &str = r#"
store:
  production_sheet: Fido Foster Dogs Database
  development_sheet: Fido Sandbox
producers:
  - type: shelterluv
    rescue_name: Paws of Coronado
    token_env: PAWS_OF_CORONADO_TOKEN
  - type: road_to_freedom
  - type: shared_sheet
    rescue_name: Mother of Dragons
    spreadsheet: Mother of Dragons Foster Dog List
    layout: mother_of_dragons
"#;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

fn clear_env() {
    env::remove_var("ENVIRONMENT");
    env::remove_var("DEV_SHEET_NAME");
}

#[test]
#[serial]
fn test_load_config_defaults_to_development_sheet() {
    clear_env();
    let file = config_file(CONFIG_YAML);

    let config = load_config(file.path()).expect("Config should load");

    assert_eq!(config.mode, DeploymentMode::Development);
    assert_eq!(config.spreadsheet, "Fido Sandbox");
    assert_eq!(config.store.current_tab, "Current");
    assert_eq!(config.producers.len(), 3);
    assert_eq!(
        config.producers[2],
        ProducerConfig::SharedSheet {
            rescue_name: "Mother of Dragons".to_string(),
            spreadsheet: "Mother of Dragons Foster Dog List".to_string(),
            layout: SheetLayout::MotherOfDragons,
        }
    );
}

#[test]
#[serial]
fn test_load_config_production_ignores_dev_override() {
    clear_env();
    env::set_var("ENVIRONMENT", "production");
    env::set_var("DEV_SHEET_NAME", "Someone's Copy");
    let file = config_file(CONFIG_YAML);

    let config = load_config(file.path()).expect("Config should load");

    assert_eq!(config.mode, DeploymentMode::Production);
    assert_eq!(config.spreadsheet, "Fido Foster Dogs Database");
    clear_env();
}

#[test]
#[serial]
fn test_load_config_dev_sheet_override() {
    clear_env();
    env::set_var("ENVIRONMENT", "dev");
    env::set_var("DEV_SHEET_NAME", "Someone's Copy");
    let file = config_file("producers: []\n");

    let config = load_config(file.path()).expect("Config should load");

    assert_eq!(config.spreadsheet, "Someone's Copy");
    assert!(config.producers.is_empty());
    clear_env();
}

#[test]
#[serial]
fn test_load_config_rejects_unknown_environment() {
    clear_env();
    env::set_var("ENVIRONMENT", "staging");
    let file = config_file(CONFIG_YAML);

    let err = load_config(file.path()).unwrap_err();

    assert!(err.to_string().contains("staging"));
    clear_env();
}

#[test]
#[serial]
fn test_load_config_reports_malformed_yaml() {
    clear_env();
    let file = config_file("producers:\n  - type: carrier_pigeon\n");

    let err = load_config(file.path()).unwrap_err();

    assert!(err.to_string().contains("Failed to parse config YAML"));
}

#[test]
#[serial]
fn test_load_config_missing_file() {
    let err = load_config("/nonexistent/fido.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
