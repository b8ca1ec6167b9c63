use std::env;
use std::str::FromStr;

use rusoto_core::Region;

use crate::error::VolumeJanitorError;

pub const RETENTION_DAYS_VAR: &str = "retention_days";
pub const REGION_VAR: &str = "AWS_REGION";

/// Configuration the sweeper reads before touching the cloud API. Missing or
/// unparseable values abort the invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SweeperConfig {
    pub retention_days: i64,
    pub region: Region,
}

impl SweeperConfig {
    pub fn from_env() -> Result<Self, VolumeJanitorError> {
        let raw = env::var(RETENTION_DAYS_VAR)
            .map_err(|_| VolumeJanitorError::MissingEnvVar(RETENTION_DAYS_VAR.to_string()))?;
        let retention_days = i64::from_str(&raw)
            .map_err(|_| VolumeJanitorError::InvalidRetentionDays(raw.clone()))?;
        if retention_days < 0 {
            return Err(VolumeJanitorError::InvalidRetentionDays(raw));
        }
        Ok(SweeperConfig {
            retention_days,
            region: region_from_env()?,
        })
    }
}

/// The execution environment's region, as set by the Lambda runtime.
pub fn region_from_env() -> Result<Region, VolumeJanitorError> {
    let raw = env::var(REGION_VAR)
        .map_err(|_| VolumeJanitorError::MissingEnvVar(REGION_VAR.to_string()))?;
    Region::from_str(&raw).map_err(|_| VolumeJanitorError::InvalidRegion(raw))
}
