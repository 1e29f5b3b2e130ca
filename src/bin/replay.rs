use std::{env, time::Duration};

use anyhow::Context;
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

use location_webhook::env_utils;

/// Replays sample payloads against a running webhook endpoint with a
/// fixed delay between sends.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let webhook_url = match env::var("WEBHOOK_URL") {
        Ok(url) => url,
        _ => format!(
            "http://127.0.0.1:{}/webhook-endpoint",
            env_utils::get_port()
        ),
    };
    let payloads_file = match env::var("PAYLOADS_FILE") {
        Ok(path) => path,
        _ => "files/payloads.json".to_string(),
    };

    let payloads = load_payloads(&payloads_file)?;
    info!(
        "Replaying {} payloads against {}",
        payloads.len(),
        webhook_url
    );

    let client = reqwest::Client::new();
    for payload in &payloads {
        send_webhook(&client, &webhook_url, payload).await;
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    anyhow::Ok(())
}

fn load_payloads(path: &str) -> anyhow::Result<Vec<Value>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read payloads file {}", path))?;

    serde_json::from_str(&contents).context("Failed to parse payloads file as a JSON array")
}

async fn send_webhook(client: &reqwest::Client, url: &str, payload: &Value) {
    match client.post(url).json(payload).send().await {
        Ok(response) if response.status().is_success() => {
            info!("Webhook sent successfully");
        }
        Ok(response) => {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Failed to send webhook, status {}: {}", status, body);
        }
        Err(err) => {
            error!("Failed to send webhook: {}", err);
        }
    }
}
