use std::error::Error;

use rusoto_core::RusotoError;
use rusoto_ec2::{CreateTagsError, DeleteVolumeError, DescribeVolumesError};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};

#[derive(Debug, PartialEq)]
pub enum VolumeJanitorError {
    MissingEnvVar(String),
    InvalidRetentionDays(String),
    InvalidRegion(String),
    EmptyNotification,
    MalformedNotification(String),
    MalformedTimestamp(String),
    MissingVolumeId,
    DescribeVolumes(RusotoError<DescribeVolumesError>),
    CreateTags(RusotoError<CreateTagsError>),
    DeleteVolume(RusotoError<DeleteVolumeError>),
}

impl Display for VolumeJanitorError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            VolumeJanitorError::MissingEnvVar(ref name) => {
                write!(f, "Required environment variable {} is not set", name)
            }
            VolumeJanitorError::InvalidRetentionDays(ref value) => {
                write!(f, "retention_days is not a valid number of days: {}", value)
            }
            VolumeJanitorError::InvalidRegion(ref value) => {
                write!(f, "Unrecognized region: {}", value)
            }
            VolumeJanitorError::EmptyNotification => {
                write!(f, "Notification contains no records")
            }
            VolumeJanitorError::MalformedNotification(ref error) => {
                write!(f, "Failed to parse lifecycle notification: {}", error)
            }
            VolumeJanitorError::MalformedTimestamp(ref value) => {
                write!(f, "Failed to parse TerminationDate value: {}", value)
            }
            VolumeJanitorError::MissingVolumeId => write!(f, "Volume has no volume id"),
            VolumeJanitorError::DescribeVolumes(ref error) => std::fmt::Display::fmt(error, f),
            VolumeJanitorError::CreateTags(ref error) => std::fmt::Display::fmt(error, f),
            VolumeJanitorError::DeleteVolume(ref error) => std::fmt::Display::fmt(error, f),
        }
    }
}

impl Error for VolumeJanitorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            VolumeJanitorError::DescribeVolumes(ref error) => Some(error),
            VolumeJanitorError::CreateTags(ref error) => Some(error),
            VolumeJanitorError::DeleteVolume(ref error) => Some(error),
            _ => None,
        }
    }
}

impl From<RusotoError<DescribeVolumesError>> for VolumeJanitorError {
    fn from(e: RusotoError<DescribeVolumesError>) -> VolumeJanitorError {
        VolumeJanitorError::DescribeVolumes(e)
    }
}

impl From<RusotoError<CreateTagsError>> for VolumeJanitorError {
    fn from(e: RusotoError<CreateTagsError>) -> VolumeJanitorError {
        VolumeJanitorError::CreateTags(e)
    }
}

impl From<RusotoError<DeleteVolumeError>> for VolumeJanitorError {
    fn from(e: RusotoError<DeleteVolumeError>) -> VolumeJanitorError {
        VolumeJanitorError::DeleteVolume(e)
    }
}
