use std::env;

use tracing::error;

pub fn get_port() -> u16 {
    let default_port: u16 = 8080;

    let port = match env::var("PORT") {
        Ok(port) => port,
        _ => default_port.to_string(),
    };
    let port: u16 = match port.parse::<_>() {
        Ok(port) => port,
        _ => {
            error!("Failed to parse PORT env var, using default");
            default_port
        }
    };

    port
}

pub fn get_db_path() -> String {
    match env::var("WEBHOOK_DB_PATH") {
        Ok(path) => path,
        _ => "webhook_data.db".to_string(),
    }
}

pub fn get_aws_region() -> String {
    match env::var("AWS_DEFAULT_REGION") {
        Ok(region) => region,
        _ => "us-east-1".to_string(),
    }
}

pub fn get_bucket_name() -> String {
    match env::var("AWS_BUCKET_NAME") {
        Ok(bucket) => bucket,
        _ => "location-webhook-data".to_string(),
    }
}

pub fn get_stream_name() -> String {
    match env::var("KINESIS_STREAM_NAME") {
        Ok(stream) => stream,
        _ => "location-stream".to_string(),
    }
}

// set to point the AWS clients at a local emulator (minio, localstack)
pub fn get_aws_endpoint_url() -> Option<String> {
    env::var("AWS_ENDPOINT_URL").ok()
}
