pub mod config;
pub mod error;
pub mod infrastructure;
pub mod services;
pub mod utils;

pub use config::DeployConfig;
pub use error::DeployError;
pub use services::dedup::{RemoteObjectState, UploadDecision};
pub use services::pipeline::{DeployOutcome, DeployPipeline, object_key};
