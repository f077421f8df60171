pub mod legacy;

use crate::error::DeployError;
use crate::utils::placeholder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Everything one deploy invocation needs.
///
/// Built once, then treated as immutable. String fields may carry `${...}`
/// placeholders; call [`DeployConfig::resolve_placeholders`] before handing
/// the config to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeployConfig {
    pub application_name: String,

    pub version_label: String,

    /// Region the deployment control plane lives in.
    pub region: String,

    pub bucket_name: String,

    /// Overrides `region` for the bucket client when set and non-empty.
    pub bucket_region: Option<String>,

    /// Prepended to the object key; may be empty.
    pub key_prefix: String,

    /// Workspace-relative file (assumed pre-packaged) or directory to bundle.
    pub root_object: String,

    /// Comma-separated include globs for directory bundling; empty means
    /// everything.
    pub includes: String,

    /// Comma-separated exclude globs; an exclude match always wins.
    pub excludes: String,

    /// Re-upload even when the remote bundle digest matches.
    pub overwrite_existing: bool,

    pub use_transfer_acceleration: bool,

    /// Directory workspace-relative paths resolve against.
    #[serde(skip)]
    pub workspace: PathBuf,

    /// Where the temporary bundle is staged; system temp dir when unset.
    #[serde(skip)]
    pub staging_dir: Option<PathBuf>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            application_name: String::new(),
            version_label: String::new(),
            region: "us-east-1".to_string(),
            bucket_name: String::new(),
            bucket_region: None,
            key_prefix: String::new(),
            root_object: String::new(),
            includes: String::new(),
            excludes: String::new(),
            overwrite_existing: false,
            use_transfer_acceleration: false,
            workspace: PathBuf::from("."),
            staging_dir: None,
        }
    }
}

impl DeployConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            application_name: env::var("EB_DEPLOY_APPLICATION").unwrap_or(default.application_name),

            version_label: env::var("EB_DEPLOY_VERSION_LABEL").unwrap_or(default.version_label),

            region: env::var("AWS_REGION").unwrap_or(default.region),

            bucket_name: env::var("EB_DEPLOY_BUCKET").unwrap_or(default.bucket_name),

            bucket_region: env::var("EB_DEPLOY_BUCKET_REGION").ok(),

            key_prefix: env::var("EB_DEPLOY_KEY_PREFIX").unwrap_or(default.key_prefix),

            root_object: env::var("EB_DEPLOY_ROOT").unwrap_or(default.root_object),

            includes: env::var("EB_DEPLOY_INCLUDES").unwrap_or(default.includes),

            excludes: env::var("EB_DEPLOY_EXCLUDES").unwrap_or(default.excludes),

            overwrite_existing: env::var("EB_DEPLOY_OVERWRITE")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.overwrite_existing),

            use_transfer_acceleration: env::var("EB_DEPLOY_ACCELERATE")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.use_transfer_acceleration),

            workspace: default.workspace,
            staging_dir: None,
        }
    }

    /// Expands `${...}` tokens in every string field against `context`.
    pub fn resolve_placeholders(&self, context: &HashMap<String, String>) -> Self {
        Self {
            application_name: placeholder::resolve(&self.application_name, context),
            version_label: placeholder::resolve(&self.version_label, context),
            region: placeholder::resolve(&self.region, context),
            bucket_name: placeholder::resolve(&self.bucket_name, context),
            bucket_region: self
                .bucket_region
                .as_ref()
                .map(|r| placeholder::resolve(r, context)),
            key_prefix: placeholder::resolve(&self.key_prefix, context),
            root_object: placeholder::resolve(&self.root_object, context),
            includes: placeholder::resolve(&self.includes, context),
            excludes: placeholder::resolve(&self.excludes, context),
            overwrite_existing: self.overwrite_existing,
            use_transfer_acceleration: self.use_transfer_acceleration,
            workspace: self.workspace.clone(),
            staging_dir: self.staging_dir.clone(),
        }
    }

    /// Region the bucket client should be built against.
    pub fn effective_bucket_region(&self) -> &str {
        match self.bucket_region.as_deref() {
            Some(region) if !region.is_empty() => region,
            _ => &self.region,
        }
    }

    /// Must hold at execution time, after placeholder resolution.
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.application_name.is_empty() {
            return Err(DeployError::Config("application name is empty".into()));
        }
        if self.version_label.is_empty() {
            return Err(DeployError::Config("version label is empty".into()));
        }
        if self.bucket_name.is_empty() {
            return Err(DeployError::Config("bucket name is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DeployConfig::default();
        assert_eq!(config.region, "us-east-1");
        assert!(!config.overwrite_existing);
        assert!(!config.use_transfer_acceleration);
    }

    #[test]
    fn validate_rejects_empty_identity() {
        let mut config = DeployConfig::default();
        config.bucket_name = "deploys".into();
        config.version_label = "1".into();
        assert!(config.validate().is_err());

        config.application_name = "demo".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bucket_region_override_wins() {
        let mut config = DeployConfig::default();
        config.region = "us-east-1".into();
        assert_eq!(config.effective_bucket_region(), "us-east-1");

        config.bucket_region = Some(String::new());
        assert_eq!(config.effective_bucket_region(), "us-east-1");

        config.bucket_region = Some("eu-west-1".into());
        assert_eq!(config.effective_bucket_region(), "eu-west-1");
    }

    #[test]
    fn resolves_placeholders_in_string_fields() {
        let mut config = DeployConfig::default();
        config.application_name = "${JOB_NAME}".into();
        config.version_label = "build-${BUILD_NUMBER}".into();
        config.bucket_region = Some("${BUCKET_REGION}".into());

        let mut ctx = HashMap::new();
        ctx.insert("JOB_NAME".to_string(), "demo".to_string());
        ctx.insert("BUILD_NUMBER".to_string(), "42".to_string());
        ctx.insert("BUCKET_REGION".to_string(), "eu-west-1".to_string());

        let resolved = config.resolve_placeholders(&ctx);
        assert_eq!(resolved.application_name, "demo");
        assert_eq!(resolved.version_label, "build-42");
        assert_eq!(resolved.bucket_region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn deserializes_camel_case_file_shape() {
        let raw = r#"{
            "applicationName": "demo",
            "versionLabel": "42",
            "bucketName": "deploys",
            "keyPrefix": "builds",
            "rootObject": "target/app.zip",
            "overwriteExisting": true
        }"#;
        let config: DeployConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.application_name, "demo");
        assert_eq!(config.key_prefix, "builds");
        assert!(config.overwrite_existing);
        assert_eq!(config.region, "us-east-1");
    }
}
