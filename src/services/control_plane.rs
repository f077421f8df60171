use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_elasticbeanstalk::Client;
use aws_sdk_elasticbeanstalk::types::S3Location;

#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Registers (application, version) pointing at the uploaded bundle.
    /// The application is auto-created when it does not exist yet.
    async fn create_application_version(
        &self,
        application_name: &str,
        version_label: &str,
        bucket: &str,
        key: &str,
    ) -> Result<()>;
}

pub struct BeanstalkControlPlane {
    client: Client,
}

impl BeanstalkControlPlane {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ControlPlane for BeanstalkControlPlane {
    async fn create_application_version(
        &self,
        application_name: &str,
        version_label: &str,
        bucket: &str,
        key: &str,
    ) -> Result<()> {
        let source_bundle = S3Location::builder().s3_bucket(bucket).s3_key(key).build();

        self.client
            .create_application_version()
            .application_name(application_name)
            .version_label(version_label)
            .auto_create_application(true)
            .source_bundle(source_bundle)
            .send()
            .await?;
        Ok(())
    }
}
