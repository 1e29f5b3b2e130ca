use anyhow::Context;
use aws_sdk_s3::primitives::ByteStream;

use crate::extract::LocationRecord;

/// Uploads extracted records to the configured bucket. The copy here is
/// derived data, the local tables stay the system of record.
pub struct ObjectStorageService {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl ObjectStorageService {
    pub fn new(sdk_config: &aws_config::SdkConfig, bucket: String) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        // local emulators (minio, localstack) need path-style addressing
        if sdk_config.endpoint_url().is_some() {
            builder = builder.force_path_style(true);
        }
        let client = aws_sdk_s3::Client::from_conf(builder.build());

        ObjectStorageService { client, bucket }
    }

    pub async fn put_location(&self, record: &LocationRecord) -> anyhow::Result<()> {
        let key = object_key(record);
        let body = serde_json::to_vec(record).context("Failed to serialize location record")?;

        tracing::debug!("Uploading location record to s3://{}/{}", self.bucket, key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type("application/json")
            .send()
            .await
            .context("Failed to upload location record to object storage")?;

        Ok(())
    }
}

/// Deterministic key path for a record: the same (user, trip, timestamp)
/// triple always maps to the same key, so a re-delivered event overwrites
/// its earlier copy instead of erroring.
pub fn object_key(record: &LocationRecord) -> String {
    format!(
        "locations/{}/{}/{}.json",
        key_segment(record.user_id.as_deref()),
        key_segment(record.trip_id.as_deref()),
        key_segment(record.timestamp.as_deref())
    )
}

// absent fields land under "unknown"; separators inside a field must not
// open extra key levels
fn key_segment(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => value
            .chars()
            .map(|c| match c {
                '/' | '\\' => '_',
                c => c,
            })
            .collect(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        user_id: Option<&str>,
        trip_id: Option<&str>,
        timestamp: Option<&str>,
    ) -> LocationRecord {
        LocationRecord {
            user_id: user_id.map(String::from),
            trip_id: trip_id.map(String::from),
            timestamp: timestamp.map(String::from),
            latitude: 45.5,
            longitude: -73.6,
            event_type: None,
        }
    }

    #[test]
    fn key_uses_user_trip_and_timestamp() {
        let record = record(Some("u1"), Some("t1"), Some("2024-01-01T00:00:00Z"));
        assert_eq!(
            object_key(&record),
            "locations/u1/t1/2024-01-01T00:00:00Z.json"
        );
    }

    #[test]
    fn key_is_deterministic() {
        let a = record(Some("u1"), Some("t1"), Some("2024-01-01T00:00:00Z"));
        let b = record(Some("u1"), Some("t1"), Some("2024-01-01T00:00:00Z"));
        assert_eq!(object_key(&a), object_key(&b));
    }

    #[test]
    fn missing_fields_fall_back_to_unknown() {
        let record = record(None, None, None);
        assert_eq!(object_key(&record), "locations/unknown/unknown/unknown.json");
    }

    #[test]
    fn empty_fields_fall_back_to_unknown() {
        let record = record(Some(""), Some("t1"), Some("ts"));
        assert_eq!(object_key(&record), "locations/unknown/t1/ts.json");
    }

    #[test]
    fn separators_cannot_nest_key_levels() {
        let record = record(Some("u/1"), Some("t\\1"), Some("ts"));
        assert_eq!(object_key(&record), "locations/u_1/t_1/ts.json");
    }
}
