use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::error::VolumeJanitorError;
use crate::notification::AsgNotification;
use crate::volume::{INSTANCE_ID_TAG, TERMINATION_DATE_TAG};
use crate::volume_client::VolumeStore;

/// Reacts to one ASG lifecycle notification.
///
/// On termination, every volume tagged with the instance's id gets a
/// `TerminationDate` stamp; on launch, every volume attached to the new
/// instance gets an `InstanceId` stamp. The two branches are checked
/// independently against the same event; an event matching neither prefix is
/// a no-op. Cloud API failures propagate and fail the invocation so the
/// trigger can redeliver.
pub async fn handle_lifecycle_event<S: VolumeStore + Sync>(
    store: &S,
    notification: &AsgNotification,
    now: DateTime<Utc>,
) -> Result<(), VolumeJanitorError> {
    if notification.is_termination() {
        info!("Dealing with a termination");
        let volumes = store
            .volumes_by_tag(INSTANCE_ID_TAG, Some(&notification.instance_id))
            .await?;
        let termination_date = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        for volume in volumes {
            info!(
                "{} was attached to terminated instance {}",
                volume.volume_id, notification.instance_id
            );
            store
                .create_tags(
                    &volume.volume_id,
                    &[(TERMINATION_DATE_TAG, termination_date.as_str())],
                )
                .await?;
            info!("Added TerminationDate tag for volume: {}", volume.volume_id);
        }
    }

    if notification.is_launch() {
        info!("Dealing with a launch");
        let volumes = store.volumes_attached_to(&notification.instance_id).await?;
        for volume in volumes {
            info!(
                "{} attached to new instance {}",
                volume.volume_id, notification.instance_id
            );
            store
                .create_tags(
                    &volume.volume_id,
                    &[(INSTANCE_ID_TAG, notification.instance_id.as_str())],
                )
                .await?;
            info!("Added InstanceId tag for volume: {}", volume.volume_id);
        }
    }

    Ok(())
}
