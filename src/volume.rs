use std::convert::TryFrom;

use crate::error::VolumeJanitorError;

pub const TERMINATION_DATE_TAG: &str = "TerminationDate";
pub const INSTANCE_ID_TAG: &str = "InstanceId";

#[derive(Debug, Clone, PartialEq)]
pub enum VolumeState {
    Available,
    InUse,
    Other(String),
}

impl VolumeState {
    fn parse(state: &str) -> Self {
        match state {
            "available" => VolumeState::Available,
            "in-use" => VolumeState::InUse,
            other => VolumeState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match *self {
            VolumeState::Available => "available",
            VolumeState::InUse => "in-use",
            VolumeState::Other(ref state) => state,
        }
    }
}

/// A volume as the handlers see it: identifier, state, and its tags in the
/// order the API returned them. The first value for a duplicated tag key wins.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeRecord {
    pub volume_id: String,
    pub state: VolumeState,
    pub tags: Vec<(String, String)>,
}

impl VolumeRecord {
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(tag_key, _)| tag_key == key)
            .map(|(_, value)| value.as_str())
    }
}

impl TryFrom<rusoto_ec2::Volume> for VolumeRecord {
    type Error = VolumeJanitorError;

    fn try_from(volume: rusoto_ec2::Volume) -> Result<Self, Self::Error> {
        let volume_id = volume.volume_id.ok_or(VolumeJanitorError::MissingVolumeId)?;
        let state = volume
            .state
            .map(|state| VolumeState::parse(&state))
            .unwrap_or_else(|| VolumeState::Other(String::new()));
        let tags = volume
            .tags
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tag| match (tag.key, tag.value) {
                (Some(key), Some(value)) => Some((key, value)),
                _ => None,
            })
            .collect();
        Ok(VolumeRecord {
            volume_id,
            state,
            tags,
        })
    }
}
