use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use location_webhook::{app, env_utils, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    debug!("initializing app state ...");

    let state = Arc::new(AppState::from_env().await?);

    let port = env_utils::get_port();
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    info!("Starting server at: {}", addr);

    axum::Server::bind(&addr)
        .serve(app(state).into_make_service())
        .await
        .context("error while starting API server")?;

    anyhow::Ok(())
}
