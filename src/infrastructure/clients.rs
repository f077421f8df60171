use crate::config::DeployConfig;
use crate::services::control_plane::BeanstalkControlPlane;
use crate::services::storage::S3ObjectStore;
use aws_sdk_s3::config::Region;
use tracing::info;

/// Builds the S3-backed store for one invocation.
///
/// The bucket may live in a different region than the control plane; an
/// explicit bucket-region override wins over the deploy region.
pub async fn object_store(config: &DeployConfig) -> S3ObjectStore {
    let region = config.effective_bucket_region().to_string();

    info!("☁️  S3 object store: {} ({})", config.bucket_name, region);

    let aws_config = aws_config::from_env()
        .region(Region::new(region))
        .load()
        .await;

    let s3_client = aws_sdk_s3::Client::new(&aws_config);
    S3ObjectStore::new(s3_client, config.bucket_name.clone())
}

/// Builds the Elastic Beanstalk control-plane client in the deploy region.
pub async fn control_plane(config: &DeployConfig) -> BeanstalkControlPlane {
    let aws_config = aws_config::from_env()
        .region(Region::new(config.region.clone()))
        .load()
        .await;

    let eb_client = aws_sdk_elasticbeanstalk::Client::new(&aws_config);
    BeanstalkControlPlane::new(eb_client)
}
