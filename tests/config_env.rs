#![allow(missing_docs)]

use std::{collections::HashMap, path::PathBuf};

use uploadgear::{
    config::{DEFAULT_LOCAL_DIR, LOCAL_DIR_VAR, STORAGE_ROOT_VAR},
    ConfigError, UploadConfig,
};

#[test]
fn reads_both_locations() {
    let vars = HashMap::from([
        (STORAGE_ROOT_VAR, "/srv/files"),
        (LOCAL_DIR_VAR, "/var/uploads"),
    ]);
    let config = UploadConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
        .expect("config should load");

    assert_eq!(config.storage_root, PathBuf::from("/srv/files"));
    assert_eq!(config.local_storage_dir, PathBuf::from("/var/uploads"));
}

#[test]
fn local_dir_defaults_when_unset() {
    let config = UploadConfig::from_lookup(|name| {
        (name == STORAGE_ROOT_VAR).then(|| "/srv/files".to_owned())
    })
    .expect("config should load");

    assert_eq!(config.local_storage_dir, PathBuf::from(DEFAULT_LOCAL_DIR));
}

#[test]
fn missing_storage_root_is_reported() {
    let err = UploadConfig::from_lookup(|_| None).expect_err("root is required");
    assert_eq!(
        err,
        ConfigError::MissingVar {
            name: STORAGE_ROOT_VAR.to_owned()
        }
    );
}

#[test]
fn empty_paths_are_rejected() {
    let err = UploadConfig::from_lookup(|_| Some(String::new())).expect_err("empty root");
    assert!(matches!(err, ConfigError::EmptyPath { .. }));

    let config = UploadConfig::new("/srv/files").with_local_storage_dir("");
    assert!(matches!(
        config.validate(),
        Err(ConfigError::EmptyPath { name }) if name == LOCAL_DIR_VAR
    ));
}
