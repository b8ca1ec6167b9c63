use aws_lambda_events::sns::SnsEvent;
use chrono::Utc;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::{json, Value};
use tracing::info;

use volume_janitor::config;
use volume_janitor::notification::AsgNotification;
use volume_janitor::tagger;
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

async fn handler(event: LambdaEvent<SnsEvent>) -> Result<Value, Error> {
    // Dump the whole notification for posterity.
    info!("{}", serde_json::to_string(&event.payload)?);

    let region = config::region_from_env()?;
    let client = Ec2VolumeClient::new(region);
    let notification = AsgNotification::from_sns(&event.payload)?;
    tagger::handle_lifecycle_event(&client, &notification, Utc::now()).await?;
    Ok(json!({}))
}
