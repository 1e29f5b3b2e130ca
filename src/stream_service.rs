use anyhow::Context;
use aws_sdk_kinesis::primitives::Blob;

use crate::extract::LocationRecord;

/// Event types that get forwarded to the partitioned stream.
pub const GEOFENCE_EVENT_TYPES: [&str; 2] = ["user.entered_geofence", "user.exited_geofence"];

/// Partition key for records with no user id. Keeps the key deterministic
/// instead of rejecting the record.
pub const FALLBACK_PARTITION_KEY: &str = "unknown";

pub fn is_geofence_event(record: &LocationRecord) -> bool {
    matches!(record.event_type.as_deref(), Some(event_type) if GEOFENCE_EVENT_TYPES.contains(&event_type))
}

pub fn partition_key(record: &LocationRecord) -> &str {
    record
        .user_id
        .as_deref()
        .filter(|user_id| !user_id.is_empty())
        .unwrap_or(FALLBACK_PARTITION_KEY)
}

/// Publishes geofence records to the named stream, partitioned by user id
/// so each user's events land on one shard in order.
pub struct StreamService {
    client: aws_sdk_kinesis::Client,
    stream_name: String,
}

impl StreamService {
    pub fn new(sdk_config: &aws_config::SdkConfig, stream_name: String) -> Self {
        let client = aws_sdk_kinesis::Client::new(sdk_config);

        StreamService {
            client,
            stream_name,
        }
    }

    pub async fn put_location(&self, record: &LocationRecord) -> anyhow::Result<()> {
        let body = serde_json::to_vec(record).context("Failed to serialize location record")?;

        tracing::debug!(
            "Publishing record to stream {} with partition key {}",
            self.stream_name,
            partition_key(record)
        );

        self.client
            .put_record()
            .stream_name(&self.stream_name)
            .partition_key(partition_key(record))
            .data(Blob::new(body))
            .send()
            .await
            .context("Failed to publish location record to stream")?;

        Ok(())
    }
}
