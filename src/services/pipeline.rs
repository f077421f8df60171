//! The upload-and-register pipeline: bundle, fingerprint, probe, decide,
//! negotiate transport, upload, register, clean up.

use crate::config::DeployConfig;
use crate::error::DeployError;
use crate::services::bundler::{self, ArtifactBundle};
use crate::services::control_plane::ControlPlane;
use crate::services::dedup::{self, UploadDecision};
use crate::services::storage::ObjectStore;
use crate::utils::hash;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Deterministic remote key for a deploy: `{prefix}/{application}-{version}.zip`,
/// prefix omitted when empty. Re-deploying the same version overwrites the
/// same key.
pub fn object_key(key_prefix: &str, application_name: &str, version_label: &str) -> String {
    let prefix = key_prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{application_name}-{version_label}.zip")
    } else {
        format!("{prefix}/{application_name}-{version_label}.zip")
    }
}

/// What one invocation did, for the caller's log line.
#[derive(Debug)]
pub struct DeployOutcome {
    pub object_key: String,
    pub decision: UploadDecision,
    pub accelerated: bool,
    pub upload_duration: Option<Duration>,
}

/// One deploy invocation. Owns its store and control-plane clients, runs the
/// stages strictly in sequence, and removes the staged bundle on every
/// terminal path.
///
/// Known limitation: two concurrent invocations for the same
/// (application, version) race on probe-then-upload; each evaluates the
/// dedup decision independently. Callers needing stronger guarantees should
/// serialize deploys per version or move to conditional writes
/// (`If-None-Match` style preconditions) instead of a separate probe.
pub struct DeployPipeline {
    config: DeployConfig,
    store: Box<dyn ObjectStore>,
    control_plane: Box<dyn ControlPlane>,
}

impl DeployPipeline {
    pub fn new(
        config: DeployConfig,
        store: Box<dyn ObjectStore>,
        control_plane: Box<dyn ControlPlane>,
    ) -> Self {
        Self {
            config,
            store,
            control_plane,
        }
    }

    /// Runs the pipeline to completion or first fatal error.
    ///
    /// The version record is registered even when the upload was skipped; a
    /// record must exist pointing at the (possibly pre-existing) remote
    /// object either way.
    pub async fn run(mut self) -> Result<DeployOutcome, DeployError> {
        self.config.validate()?;

        let key = object_key(
            &self.config.key_prefix,
            &self.config.application_name,
            &self.config.version_label,
        );
        let root = self.config.workspace.join(&self.config.root_object);

        info!(
            root = %root.display(),
            target = %format!("s3://{}/{}", self.config.bucket_name, key),
            "staging bundle"
        );

        let bundle = bundler::bundle(
            &root,
            &self.config.includes,
            &self.config.excludes,
            self.config.staging_dir.as_deref(),
        )
        .map_err(|e| DeployError::Bundle {
            path: root,
            source: e.into(),
        })?;

        let result = self.execute(&bundle, &key).await;
        bundle.remove();
        result
    }

    async fn execute(
        &mut self,
        bundle: &ArtifactBundle,
        key: &str,
    ) -> Result<DeployOutcome, DeployError> {
        let bucket = self.config.bucket_name.clone();

        let local_digest = match hash::sha256_hex_of_file(bundle.path()).await {
            Ok(digest) => Some(digest),
            Err(e) => {
                // Recovered locally: an unknown digest never matches, so the
                // decision below degrades to an upload.
                warn!(
                    path = %bundle.path().display(),
                    error = %e,
                    "could not fingerprint bundle; upload will be forced"
                );
                None
            }
        };

        let remote = self
            .store
            .object_state(key)
            .await
            .map_err(|e| DeployError::Probe {
                bucket: bucket.clone(),
                key: key.to_string(),
                source: e.into(),
            })?;

        let decision = dedup::decide(&remote, local_digest.as_deref(), self.config.overwrite_existing);

        let mut accelerated = false;
        if self.config.use_transfer_acceleration {
            match self.store.accelerate_enabled().await {
                Ok(true) => {
                    self.store.enable_accelerate();
                    accelerated = true;
                    info!(bucket = %bucket, "bucket is configured for transfer acceleration");
                }
                Ok(false) => {
                    info!(bucket = %bucket, "bucket does not support transfer acceleration");
                }
                // Negotiation never fails the pipeline.
                Err(e) => {
                    warn!(
                        bucket = %bucket,
                        error = %e,
                        "transfer acceleration check failed; using standard transport"
                    );
                }
            }
        }

        let mut upload_duration = None;
        match decision {
            UploadDecision::MustUpload => {
                let started = Instant::now();
                self.store
                    .put_file(key, bundle.path(), local_digest.as_deref())
                    .await
                    .map_err(|e| DeployError::Upload {
                        bucket: bucket.clone(),
                        key: key.to_string(),
                        source: e.into(),
                    })?;
                let elapsed = started.elapsed();
                info!(
                    bucket = %bucket,
                    key,
                    duration_ms = elapsed.as_millis() as u64,
                    "upload complete"
                );
                upload_duration = Some(elapsed);
            }
            UploadDecision::SkipUpload => {
                info!(bucket = %bucket, key, "remote bundle matches local digest; skipping upload");
            }
        }

        info!(
            application = %self.config.application_name,
            version = %self.config.version_label,
            "registering application version"
        );
        self.control_plane
            .create_application_version(
                &self.config.application_name,
                &self.config.version_label,
                &bucket,
                key,
            )
            .await
            .map_err(|e| DeployError::Registration {
                application_name: self.config.application_name.clone(),
                version_label: self.config.version_label.clone(),
                bucket,
                key: key.to_string(),
                uploaded: decision == UploadDecision::MustUpload,
                source: e.into(),
            })?;

        Ok(DeployOutcome {
            object_key: key.to_string(),
            decision,
            accelerated,
            upload_duration,
        })
    }
}
