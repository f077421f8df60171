//! Migration of the flat configuration record persisted by older releases.
//!
//! Runs once at load time and emits typed setup records; nothing holds on to
//! the legacy shape afterwards.

use super::DeployConfig;
use serde::Deserialize;

/// The old flat record, one field per form input, camelCase as persisted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyDeployRecord {
    pub application_name: String,
    pub version_label_format: String,
    pub aws_region: String,
    pub bucket_name: String,
    pub bucket_region: String,
    pub key_prefix: String,
    pub root_object: String,
    pub includes: String,
    pub excludes: String,
    pub overwrite_existing_file: bool,
    pub use_transfer_acceleration: bool,
}

/// Identity of the deployment: what gets registered, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSetup {
    pub application_name: String,
    pub version_label_format: String,
    pub region: String,
}

/// How the bundle reaches the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSetup {
    pub bucket_name: String,
    pub bucket_region: String,
    pub key_prefix: String,
    pub root_object: String,
    pub includes: String,
    pub excludes: String,
    pub overwrite_existing_file: bool,
    pub use_transfer_acceleration: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupRecord {
    Environment(EnvironmentSetup),
    Storage(StorageSetup),
}

/// Splits the flat legacy record into the typed setup sections newer
/// releases persist.
pub fn migrate(record: LegacyDeployRecord) -> Vec<SetupRecord> {
    vec![
        SetupRecord::Environment(EnvironmentSetup {
            application_name: record.application_name,
            version_label_format: record.version_label_format,
            region: record.aws_region,
        }),
        SetupRecord::Storage(StorageSetup {
            bucket_name: record.bucket_name,
            bucket_region: record.bucket_region,
            key_prefix: record.key_prefix,
            root_object: record.root_object,
            includes: record.includes,
            excludes: record.excludes,
            overwrite_existing_file: record.overwrite_existing_file,
            use_transfer_acceleration: record.use_transfer_acceleration,
        }),
    ]
}

impl DeployConfig {
    /// Builds a current config from a legacy record via [`migrate`].
    pub fn from_legacy(record: LegacyDeployRecord) -> Self {
        let mut config = DeployConfig::default();
        for section in migrate(record) {
            match section {
                SetupRecord::Environment(env) => {
                    config.application_name = env.application_name;
                    config.version_label = env.version_label_format;
                    if !env.region.is_empty() {
                        config.region = env.region;
                    }
                }
                SetupRecord::Storage(storage) => {
                    config.bucket_name = storage.bucket_name;
                    config.bucket_region = if storage.bucket_region.is_empty() {
                        None
                    } else {
                        Some(storage.bucket_region)
                    };
                    config.key_prefix = storage.key_prefix;
                    config.root_object = storage.root_object;
                    config.includes = storage.includes;
                    config.excludes = storage.excludes;
                    config.overwrite_existing = storage.overwrite_existing_file;
                    config.use_transfer_acceleration = storage.use_transfer_acceleration;
                }
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_json() -> &'static str {
        r#"{
            "applicationName": "demo",
            "versionLabelFormat": "build-${BUILD_NUMBER}",
            "awsRegion": "us-west-2",
            "bucketName": "deploys",
            "bucketRegion": "",
            "keyPrefix": "builds",
            "rootObject": "target/app.zip",
            "includes": "**",
            "excludes": "**/*.log",
            "overwriteExistingFile": true,
            "useTransferAcceleration": false
        }"#
    }

    #[test]
    fn migrate_emits_both_sections() {
        let record: LegacyDeployRecord = serde_json::from_str(legacy_json()).unwrap();
        let sections = migrate(record);
        assert_eq!(sections.len(), 2);
        assert!(matches!(sections[0], SetupRecord::Environment(_)));
        assert!(matches!(sections[1], SetupRecord::Storage(_)));
    }

    #[test]
    fn legacy_record_maps_onto_current_config() {
        let record: LegacyDeployRecord = serde_json::from_str(legacy_json()).unwrap();
        let config = DeployConfig::from_legacy(record);

        assert_eq!(config.application_name, "demo");
        assert_eq!(config.version_label, "build-${BUILD_NUMBER}");
        assert_eq!(config.region, "us-west-2");
        assert_eq!(config.bucket_name, "deploys");
        assert_eq!(config.bucket_region, None);
        assert_eq!(config.key_prefix, "builds");
        assert_eq!(config.excludes, "**/*.log");
        assert!(config.overwrite_existing);
        assert!(!config.use_transfer_acceleration);
    }

    #[test]
    fn missing_legacy_fields_fall_back_to_defaults() {
        let record: LegacyDeployRecord =
            serde_json::from_str(r#"{"applicationName": "demo"}"#).unwrap();
        let config = DeployConfig::from_legacy(record);
        assert_eq!(config.application_name, "demo");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.bucket_region, None);
    }
}
