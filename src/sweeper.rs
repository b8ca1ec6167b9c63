use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::VolumeJanitorError;
use crate::volume::{VolumeRecord, VolumeState, TERMINATION_DATE_TAG};
use crate::volume_client::VolumeStore;

#[derive(Debug, PartialEq)]
pub enum SweepDecision {
    Delete,
    Retain,
    Ineligible,
    MissingTag,
}

/// Counts reported at the end of a sweep and returned as the invocation
/// result.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct SweepSummary {
    pub evaluated: usize,
    pub deleted: usize,
    pub retained: usize,
    pub ineligible: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Strict timestamp parsing for `TerminationDate` values. Accepts RFC 3339,
/// plus the offsetless `YYYY-MM-DDTHH:MM:SS[.f]` form the predecessor tagger
/// wrote, interpreted as UTC. Anything else is an error.
pub fn parse_termination_date(raw: &str) -> Result<DateTime<Utc>, VolumeJanitorError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| VolumeJanitorError::MalformedTimestamp(raw.to_string()))
}

/// Decides the fate of one volume. Deletion requires the `available` state
/// and an elapsed time strictly greater than the retention window; a volume
/// at exactly the boundary is retained.
pub fn evaluate(
    volume: &VolumeRecord,
    now: DateTime<Utc>,
    retention_days: i64,
) -> Result<SweepDecision, VolumeJanitorError> {
    if volume.state != VolumeState::Available {
        return Ok(SweepDecision::Ineligible);
    }
    // The tag-key filter makes a missing value near-unreachable; tolerate it
    // as a skip rather than failing the volume.
    let raw = match volume.tag_value(TERMINATION_DATE_TAG) {
        Some(raw) => raw,
        None => return Ok(SweepDecision::MissingTag),
    };
    let termination_date = parse_termination_date(raw)?;
    if now - termination_date > Duration::days(retention_days) {
        Ok(SweepDecision::Delete)
    } else {
        Ok(SweepDecision::Retain)
    }
}

/// One scheduled sweep: evaluate every volume carrying a `TerminationDate`
/// tag and delete the ones past the retention window. Volumes are evaluated
/// independently; a failure on one is logged and counted without aborting
/// the rest.
pub async fn sweep<S: VolumeStore + Sync>(
    store: &S,
    retention_days: i64,
    now: DateTime<Utc>,
) -> Result<SweepSummary, VolumeJanitorError> {
    let volumes = store.volumes_by_tag(TERMINATION_DATE_TAG, None).await?;
    let mut summary = SweepSummary::default();
    for volume in volumes {
        summary.evaluated += 1;
        info!("Evaluating {} to see if it can be deleted", volume.volume_id);
        match sweep_one(store, &volume, retention_days, now).await {
            Ok(SweepDecision::Delete) => summary.deleted += 1,
            Ok(SweepDecision::Retain) => summary.retained += 1,
            Ok(SweepDecision::Ineligible) => summary.ineligible += 1,
            Ok(SweepDecision::MissingTag) => summary.skipped += 1,
            Err(error) => {
                error!(
                    "Failed to evaluate volume {}: {}",
                    volume.volume_id, error
                );
                summary.failed += 1;
            }
        }
    }
    info!(
        "Sweep finished: {} evaluated, {} deleted, {} retained, {} ineligible, {} skipped, {} failed",
        summary.evaluated,
        summary.deleted,
        summary.retained,
        summary.ineligible,
        summary.skipped,
        summary.failed
    );
    Ok(summary)
}

async fn sweep_one<S: VolumeStore + Sync>(
    store: &S,
    volume: &VolumeRecord,
    retention_days: i64,
    now: DateTime<Utc>,
) -> Result<SweepDecision, VolumeJanitorError> {
    let decision = evaluate(volume, now, retention_days)?;
    match decision {
        SweepDecision::Delete => {
            info!("Volume {} should be deleted.", volume.volume_id);
            store.delete_volume(&volume.volume_id).await?;
            info!("Volume {} deleted.", volume.volume_id);
        }
        SweepDecision::Retain => {
            info!("Volume {} should be retained.", volume.volume_id);
        }
        SweepDecision::Ineligible => {
            info!(
                "Volume {} is not in the correct state for deletion: {}",
                volume.volume_id,
                volume.state.as_str()
            );
        }
        SweepDecision::MissingTag => {
            warn!(
                "Volume {} matched the TerminationDate filter but carries no readable value",
                volume.volume_id
            );
        }
    }
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use crate::error::VolumeJanitorError;
    use crate::sweeper::{evaluate, parse_termination_date, sweep, SweepDecision, SweepSummary};
    use crate::volume::{VolumeRecord, VolumeState, TERMINATION_DATE_TAG};
    use crate::volume_client::VolumeStore;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use rusoto_core::RusotoError;
    use std::str::FromStr;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        volumes: Vec<VolumeRecord>,
        fail_delete_for: Option<String>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl VolumeStore for FakeStore {
        async fn volumes_by_tag(
            &self,
            key: &str,
            value: Option<&str>,
        ) -> Result<Vec<VolumeRecord>, VolumeJanitorError> {
            assert_eq!(key, TERMINATION_DATE_TAG);
            assert_eq!(value, None);
            Ok(self.volumes.clone())
        }

        async fn volumes_attached_to(
            &self,
            _instance_id: &str,
        ) -> Result<Vec<VolumeRecord>, VolumeJanitorError> {
            panic!("the sweeper never queries attachments");
        }

        async fn create_tags(
            &self,
            _volume_id: &str,
            _tags: &[(&str, &str)],
        ) -> Result<(), VolumeJanitorError> {
            panic!("the sweeper never writes tags");
        }

        async fn delete_volume(&self, volume_id: &str) -> Result<(), VolumeJanitorError> {
            if self.fail_delete_for.as_deref() == Some(volume_id) {
                return Err(VolumeJanitorError::DeleteVolume(RusotoError::Validation(
                    "boom".to_string(),
                )));
            }
            self.deleted.lock().unwrap().push(volume_id.to_string());
            Ok(())
        }
    }

    fn volume(volume_id: &str, state: VolumeState, termination_date: Option<&str>) -> VolumeRecord {
        VolumeRecord {
            volume_id: volume_id.to_string(),
            state,
            tags: termination_date
                .map(|value| vec![(TERMINATION_DATE_TAG.to_string(), value.to_string())])
                .unwrap_or_default(),
        }
    }

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::<Utc>::from_str(raw).unwrap()
    }

    #[test]
    fn test_parse_termination_date() {
        assert_eq!(
            parse_termination_date("2024-01-01T00:00:00Z").unwrap(),
            at("2024-01-01T00:00:00Z")
        );
        assert_eq!(
            parse_termination_date("2024-01-01T02:00:00+02:00").unwrap(),
            at("2024-01-01T00:00:00Z")
        );
        // Offsetless timestamps, as the predecessor wrote them.
        assert_eq!(
            parse_termination_date("2024-01-01T00:00:00").unwrap(),
            at("2024-01-01T00:00:00Z")
        );
        assert_eq!(
            parse_termination_date("2024-01-01T00:00:00.123456").unwrap(),
            at("2024-01-01T00:00:00.123456Z")
        );
        assert_eq!(
            parse_termination_date("last tuesday").err().unwrap(),
            VolumeJanitorError::MalformedTimestamp("last tuesday".to_string())
        );
    }

    #[test]
    fn test_evaluate_past_retention_deletes() {
        let volume = volume(
            "vol-1",
            VolumeState::Available,
            Some("2024-01-01T00:00:00"),
        );
        let decision = evaluate(&volume, at("2024-01-10T00:00:00Z"), 7).unwrap();
        assert_eq!(decision, SweepDecision::Delete);
    }

    #[test]
    fn test_evaluate_within_retention_retains() {
        let volume = volume(
            "vol-1",
            VolumeState::Available,
            Some("2024-01-01T00:00:00"),
        );
        let decision = evaluate(&volume, at("2024-01-05T00:00:00Z"), 7).unwrap();
        assert_eq!(decision, SweepDecision::Retain);
    }

    #[test]
    fn test_evaluate_exact_boundary_retains() {
        let volume = volume(
            "vol-1",
            VolumeState::Available,
            Some("2024-01-01T00:00:00Z"),
        );
        let decision = evaluate(&volume, at("2024-01-08T00:00:00Z"), 7).unwrap();
        assert_eq!(decision, SweepDecision::Retain);
    }

    #[test]
    fn test_evaluate_attached_volume_is_ineligible() {
        let volume = volume("vol-1", VolumeState::InUse, Some("2020-01-01T00:00:00Z"));
        let decision = evaluate(&volume, at("2024-01-01T00:00:00Z"), 7).unwrap();
        assert_eq!(decision, SweepDecision::Ineligible);
    }

    #[test]
    fn test_evaluate_missing_tag_is_skipped() {
        let volume = volume("vol-1", VolumeState::Available, None);
        let decision = evaluate(&volume, at("2024-01-01T00:00:00Z"), 7).unwrap();
        assert_eq!(decision, SweepDecision::MissingTag);
    }

    #[test]
    fn test_evaluate_malformed_timestamp_is_an_error() {
        let volume = volume("vol-1", VolumeState::Available, Some("not-a-date"));
        let result = evaluate(&volume, at("2024-01-01T00:00:00Z"), 7);
        assert_eq!(
            result.err().unwrap(),
            VolumeJanitorError::MalformedTimestamp("not-a-date".to_string())
        );
    }

    #[tokio::test]
    async fn test_sweep_deletes_only_expired_available_volumes() {
        let store = FakeStore {
            volumes: vec![
                volume("vol-old", VolumeState::Available, Some("2024-01-01T00:00:00Z")),
                volume("vol-new", VolumeState::Available, Some("2024-01-09T00:00:00Z")),
                volume("vol-busy", VolumeState::InUse, Some("2024-01-01T00:00:00Z")),
                volume("vol-bare", VolumeState::Available, None),
            ],
            ..FakeStore::default()
        };

        let summary = sweep(&store, 7, at("2024-01-10T00:00:00Z")).await.unwrap();

        assert_eq!(*store.deleted.lock().unwrap(), vec!["vol-old".to_string()]);
        assert_eq!(
            summary,
            SweepSummary {
                evaluated: 4,
                deleted: 1,
                retained: 1,
                ineligible: 1,
                skipped: 1,
                failed: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_sweep_isolates_per_volume_failures() {
        let store = FakeStore {
            volumes: vec![
                volume("vol-1", VolumeState::Available, Some("2024-01-01T00:00:00Z")),
                volume("vol-2", VolumeState::Available, Some("garbage")),
                volume("vol-3", VolumeState::Available, Some("2024-01-01T00:00:00Z")),
            ],
            fail_delete_for: Some("vol-1".to_string()),
            ..FakeStore::default()
        };

        let summary = sweep(&store, 7, at("2024-02-01T00:00:00Z")).await.unwrap();

        // vol-1's delete failed and vol-2's tag is unparseable, but vol-3 is
        // still evaluated and deleted.
        assert_eq!(*store.deleted.lock().unwrap(), vec!["vol-3".to_string()]);
        assert_eq!(
            summary,
            SweepSummary {
                evaluated: 3,
                deleted: 1,
                retained: 0,
                ineligible: 0,
                skipped: 0,
                failed: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_sweep_with_no_candidates() {
        let store = FakeStore::default();
        let summary = sweep(&store, 7, at("2024-01-10T00:00:00Z")).await.unwrap();
        assert_eq!(summary, SweepSummary::default());
        assert!(store.deleted.lock().unwrap().is_empty());
    }
}
