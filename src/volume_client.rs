use async_trait::async_trait;
use rusoto_core::Region;
use rusoto_ec2::{Ec2, Ec2Client};

use rusoto_ec2::{CreateTagsRequest, DeleteVolumeRequest, DescribeVolumesRequest, Filter, Tag};

use crate::error::VolumeJanitorError;
use crate::volume::VolumeRecord;
use std::convert::TryFrom;

/// The EC2 surface the handlers consume. Handlers are written against this
/// trait so they can be exercised with an in-memory fake.
#[async_trait]
pub trait VolumeStore {
    /// Volumes matching a tag filter. `value` of `None` filters on the tag
    /// key alone, regardless of value.
    async fn volumes_by_tag(
        &self,
        key: &str,
        value: Option<&str>,
    ) -> Result<Vec<VolumeRecord>, VolumeJanitorError>;

    /// Volumes currently attached to the given instance.
    async fn volumes_attached_to(
        &self,
        instance_id: &str,
    ) -> Result<Vec<VolumeRecord>, VolumeJanitorError>;

    async fn create_tags(
        &self,
        volume_id: &str,
        tags: &[(&str, &str)],
    ) -> Result<(), VolumeJanitorError>;

    async fn delete_volume(&self, volume_id: &str) -> Result<(), VolumeJanitorError>;
}

pub struct Ec2VolumeClient {
    client: Ec2Client,
}

impl Ec2VolumeClient {
    pub fn new(region: Region) -> Self {
        Ec2VolumeClient {
            client: Ec2Client::new(region),
        }
    }

    pub fn new_with_client(client: Ec2Client) -> Self {
        Ec2VolumeClient { client }
    }

    async fn describe_with_filters(
        &self,
        filters: Vec<Filter>,
    ) -> Result<Vec<VolumeRecord>, VolumeJanitorError> {
        let mut records = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let result = self
                .client
                .describe_volumes(DescribeVolumesRequest {
                    filters: Some(filters.clone()),
                    next_token: next_token.take(),
                    ..DescribeVolumesRequest::default()
                })
                .await?;
            for volume in result.volumes.unwrap_or_default() {
                records.push(VolumeRecord::try_from(volume)?);
            }
            next_token = result.next_token;
            if next_token.is_none() {
                break;
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl VolumeStore for Ec2VolumeClient {
    async fn volumes_by_tag(
        &self,
        key: &str,
        value: Option<&str>,
    ) -> Result<Vec<VolumeRecord>, VolumeJanitorError> {
        let filter = match value {
            Some(value) => Filter {
                name: Some(format!("tag:{}", key)),
                values: Some(vec![value.to_string()]),
            },
            None => Filter {
                name: Some("tag-key".to_string()),
                values: Some(vec![key.to_string()]),
            },
        };
        self.describe_with_filters(vec![filter]).await
    }

    async fn volumes_attached_to(
        &self,
        instance_id: &str,
    ) -> Result<Vec<VolumeRecord>, VolumeJanitorError> {
        let filter = Filter {
            name: Some("attachment.instance-id".to_string()),
            values: Some(vec![instance_id.to_string()]),
        };
        self.describe_with_filters(vec![filter]).await
    }

    async fn create_tags(
        &self,
        volume_id: &str,
        tags: &[(&str, &str)],
    ) -> Result<(), VolumeJanitorError> {
        self.client
            .create_tags(CreateTagsRequest {
                resources: vec![volume_id.to_string()],
                tags: tags
                    .iter()
                    .map(|(key, value)| Tag {
                        key: Some(key.to_string()),
                        value: Some(value.to_string()),
                    })
                    .collect(),
                ..CreateTagsRequest::default()
            })
            .await?;
        Ok(())
    }

    async fn delete_volume(&self, volume_id: &str) -> Result<(), VolumeJanitorError> {
        self.client
            .delete_volume(DeleteVolumeRequest {
                volume_id: volume_id.to_string(),
                ..DeleteVolumeRequest::default()
            })
            .await?;
        Ok(())
    }
}
