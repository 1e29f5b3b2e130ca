use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::info;

use crate::db_service::DbService;
use crate::env_utils;
use crate::object_storage::ObjectStorageService;
use crate::stream_service::StreamService;

/// Everything a request handler needs, constructed once at startup and
/// shared across requests via axum `State`.
pub struct AppState {
    pub db: DbService,
    pub object_store: ObjectStorageService,
    pub stream: StreamService,
}

impl AppState {
    pub async fn from_env() -> anyhow::Result<Self> {
        let db = DbService::new(&env_utils::get_db_path()).await?;
        db.init_tables().await?;

        let sdk_config = load_aws_config().await;

        Ok(Self::with_clients(
            db,
            &sdk_config,
            env_utils::get_bucket_name(),
            env_utils::get_stream_name(),
        ))
    }

    pub fn with_clients(
        db: DbService,
        sdk_config: &SdkConfig,
        bucket: String,
        stream_name: String,
    ) -> Self {
        AppState {
            db,
            object_store: ObjectStorageService::new(sdk_config, bucket),
            stream: StreamService::new(sdk_config, stream_name),
        }
    }
}

/// Shared SDK config for the S3 and Kinesis clients. Credentials come
/// from the default provider chain (env vars, profile, instance role).
pub async fn load_aws_config() -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(env_utils::get_aws_region()));

    if let Some(endpoint_url) = env_utils::get_aws_endpoint_url() {
        info!("Using custom AWS endpoint: {}", endpoint_url);
        loader = loader.endpoint_url(endpoint_url);
    }

    loader.load().await
}
