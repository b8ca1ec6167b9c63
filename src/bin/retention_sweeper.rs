use chrono::Utc;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;

use volume_janitor::config::SweeperConfig;
use volume_janitor::sweeper;
use volume_janitor::volume_client::Ec2VolumeClient;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        // CloudWatch adds the ingestion time.
        .without_time()
        .init();

    run(service_fn(handler)).await
}

/// The scheduled trigger's payload carries nothing the sweep consumes.
async fn handler(_event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = SweeperConfig::from_env()?;
    let client = Ec2VolumeClient::new(config.region.clone());
    let summary = sweeper::sweep(&client, config.retention_days, Utc::now()).await?;
    Ok(serde_json::to_value(summary)?)
}
