use aws_lambda_events::sns::SnsEvent;
use serde::Deserialize;

use crate::error::VolumeJanitorError;

pub const TERMINATION_EVENT_PREFIX: &str = "autoscaling:EC2_INSTANCE_TERMINATE";
pub const LAUNCH_EVENT_PREFIX: &str = "autoscaling:EC2_INSTANCE_LAUNCH";

/// The ASG lifecycle payload carried as a JSON string inside the SNS record.
/// Only the fields the tagger consumes are deserialized.
#[derive(Debug, Deserialize, PartialEq)]
pub struct AsgNotification {
    #[serde(rename = "EC2InstanceId")]
    pub instance_id: String,
    #[serde(rename = "Event")]
    pub event: String,
}

impl AsgNotification {
    pub fn from_sns(event: &SnsEvent) -> Result<Self, VolumeJanitorError> {
        let record = event
            .records
            .first()
            .ok_or(VolumeJanitorError::EmptyNotification)?;
        serde_json::from_str(&record.sns.message)
            .map_err(|error| VolumeJanitorError::MalformedNotification(error.to_string()))
    }

    /// Covers EC2_INSTANCE_TERMINATE and EC2_INSTANCE_TERMINATE_ERROR.
    pub fn is_termination(&self) -> bool {
        self.event.starts_with(TERMINATION_EVENT_PREFIX)
    }

    /// Covers EC2_INSTANCE_LAUNCH and EC2_INSTANCE_LAUNCH_ERROR.
    pub fn is_launch(&self) -> bool {
        self.event.starts_with(LAUNCH_EVENT_PREFIX)
    }
}
