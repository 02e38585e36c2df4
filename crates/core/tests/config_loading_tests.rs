//! Loading declarative container configuration from YAML and JSON files

use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;
use wirebox_core::{
    Arguments, ConfigError, Container, ContainerConfig, ContainerError, TypeBinding,
};

#[derive(Default)]
struct Options {
    prefix: Option<String>,
}

struct Settings {
    options: Arc<Options>,
    page: String,
}

fn container() -> Container {
    let container = Container::new();
    container
        .define_type(
            TypeBinding::<Options>::with_default("Options").method(
                "set_prefix",
                |options: &mut Options, args: &Arguments| {
                    options.prefix = Some(args.literal::<String>(0)?);
                    Ok(())
                },
            ),
        )
        .unwrap()
        .define_type(TypeBinding::new("Settings", |args: &Arguments| {
            Ok(Settings {
                options: args.object::<Options>(0)?,
                page: args.literal::<String>(1)?,
            })
        }))
        .unwrap();
    container
}

fn write_config(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_yaml_file() {
    let file = write_config(
        ".yaml",
        r#"
options:
  object: Options
  shared: true
  methods:
    set_prefix: [avh_]
settings:
  object: Settings
  arguments: [options, general]
"#,
    );

    let config = ContainerConfig::from_file(file.path()).unwrap();
    assert_eq!(config.len(), 2);

    let container = container();
    container.apply_config(&config).unwrap();

    let settings = container.make::<Settings>("settings").unwrap();
    let options = container.make::<Options>("options").unwrap();

    assert_eq!(settings.page, "general");
    assert_eq!(settings.options.prefix.as_deref(), Some("avh_"));
    assert!(Arc::ptr_eq(&settings.options, &options));
}

#[test]
fn test_load_json_file() {
    let file = write_config(
        ".json",
        r#"{ "Options": { "shared": false, "methods": { "set_prefix": "wp_" } } }"#,
    );

    let config = ContainerConfig::from_file(file.path()).unwrap();
    let container = Container::with_config(&config).unwrap();
    container
        .define_type(
            TypeBinding::<Options>::with_default("Options").method(
                "set_prefix",
                |options: &mut Options, args: &Arguments| {
                    options.prefix = Some(args.literal::<String>(0)?);
                    Ok(())
                },
            ),
        )
        .unwrap();

    let first = container.make::<Options>("Options").unwrap();
    let second = container.make::<Options>("Options").unwrap();
    assert_eq!(first.prefix.as_deref(), Some("wp_"));
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_unsupported_extension() {
    let file = write_config(".ini", "[Options]\nshared = true\n");
    let result = ContainerConfig::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = ContainerConfig::from_file(dir.path().join("missing.yaml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_invalid_yaml_file() {
    let file = write_config(".yml", "options: [unterminated\n");
    let result = ContainerConfig::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::Yaml(_))));
}

#[test]
fn test_configured_type_must_exist() {
    let config = ContainerConfig::from_yaml_str("cache:\n  object: FileCache\n").unwrap();
    let container = Container::with_config(&config).unwrap();

    let error = container.get("cache").unwrap_err();
    assert!(matches!(error, ContainerError::TypeNotFound { ref type_name } if type_name == "FileCache"));
}

#[test]
fn test_yaml_entries_keep_declaration_order() {
    let file = write_config(".yaml", "settings: {}\noptions: {}\nauth: {}\n");
    let config = ContainerConfig::from_file(file.path()).unwrap();

    let aliases: Vec<&str> = config.entries().map(|(alias, _)| alias.as_str()).collect();
    assert_eq!(aliases, vec!["settings", "options", "auth"]);
}
