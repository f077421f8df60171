use clap::Parser;
use dotenvy::dotenv;
use eb_deploy::config::legacy::LegacyDeployRecord;
use eb_deploy::infrastructure::clients;
use eb_deploy::{DeployConfig, DeployPipeline, UploadDecision};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Uploads a build artifact to S3 and registers it as an Elastic Beanstalk
/// application version.
#[derive(Parser, Debug)]
#[command(name = "eb-deploy", version, about)]
struct Cli {
    /// JSON config file in the current shape; CLI flags override its fields.
    #[arg(long, conflicts_with = "legacy_config")]
    config: Option<PathBuf>,

    /// JSON config file persisted by older releases; migrated at load time.
    #[arg(long)]
    legacy_config: Option<PathBuf>,

    /// Application to register the version under (auto-created if missing).
    #[arg(long)]
    application: Option<String>,

    /// Version label; may contain `${...}` tokens resolved from the environment.
    #[arg(long)]
    version_label: Option<String>,

    /// Control-plane region.
    #[arg(long)]
    region: Option<String>,

    /// Target bucket.
    #[arg(long)]
    bucket: Option<String>,

    /// Bucket region when it differs from the control-plane region.
    #[arg(long)]
    bucket_region: Option<String>,

    /// Key prefix inside the bucket.
    #[arg(long)]
    key_prefix: Option<String>,

    /// Workspace-relative file or directory to bundle.
    #[arg(long)]
    root: Option<String>,

    /// Comma-separated include globs for directory bundling.
    #[arg(long)]
    includes: Option<String>,

    /// Comma-separated exclude globs; an exclude match wins.
    #[arg(long)]
    excludes: Option<String>,

    /// Re-upload even when the remote bundle digest matches.
    #[arg(long)]
    overwrite: bool,

    /// Use S3 transfer acceleration when the bucket supports it.
    #[arg(long)]
    accelerate: bool,

    /// Directory workspace-relative paths resolve against.
    #[arg(long, default_value = ".")]
    workspace: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing with EnvFilter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eb_deploy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = load_base_config(&cli)?;
    apply_overrides(&mut config, &cli);
    config.workspace = cli.workspace.clone();

    // The process environment is the build context for `${...}` tokens.
    let context: HashMap<String, String> = std::env::vars().collect();
    let config = config.resolve_placeholders(&context);

    info!(
        "🚀 Deploying {} version {} via s3://{}",
        config.application_name, config.version_label, config.bucket_name
    );

    let store = clients::object_store(&config).await;
    let control_plane = clients::control_plane(&config).await;

    let application_name = config.application_name.clone();
    let version_label = config.version_label.clone();

    let pipeline = DeployPipeline::new(config, Box::new(store), Box::new(control_plane));
    let outcome = pipeline.run().await?;

    match outcome.decision {
        UploadDecision::MustUpload => info!(
            "✅ Registered {} version {} ({} uploaded in {:?})",
            application_name,
            version_label,
            outcome.object_key,
            outcome.upload_duration.unwrap_or_default()
        ),
        UploadDecision::SkipUpload => info!(
            "✅ Registered {} version {} (reused remote bundle {})",
            application_name, version_label, outcome.object_key
        ),
    }

    Ok(())
}

fn load_base_config(cli: &Cli) -> anyhow::Result<DeployConfig> {
    if let Some(path) = &cli.config {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    } else if let Some(path) = &cli.legacy_config {
        let raw = std::fs::read_to_string(path)?;
        let legacy: LegacyDeployRecord = serde_json::from_str(&raw)?;
        Ok(DeployConfig::from_legacy(legacy))
    } else {
        Ok(DeployConfig::from_env())
    }
}

fn apply_overrides(config: &mut DeployConfig, cli: &Cli) {
    if let Some(application) = &cli.application {
        config.application_name = application.clone();
    }
    if let Some(version_label) = &cli.version_label {
        config.version_label = version_label.clone();
    }
    if let Some(region) = &cli.region {
        config.region = region.clone();
    }
    if let Some(bucket) = &cli.bucket {
        config.bucket_name = bucket.clone();
    }
    if let Some(bucket_region) = &cli.bucket_region {
        config.bucket_region = Some(bucket_region.clone());
    }
    if let Some(key_prefix) = &cli.key_prefix {
        config.key_prefix = key_prefix.clone();
    }
    if let Some(root) = &cli.root {
        config.root_object = root.clone();
    }
    if let Some(includes) = &cli.includes {
        config.includes = includes.clone();
    }
    if let Some(excludes) = &cli.excludes {
        config.excludes = excludes.clone();
    }
    if cli.overwrite {
        config.overwrite_existing = true;
    }
    if cli.accelerate {
        config.use_transfer_acceleration = true;
    }
}
