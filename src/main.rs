mod api_doc;
mod config;
mod error;
mod extract;
mod handlers;
mod helm;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use config::Config;
use helm::HelmCli;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    tracing::info!("helm-gateway starting");

    let config = Arc::new(Config::from_env()?);
    config.log_startup();

    let engine = HelmCli::new(Arc::clone(&config));
    let state = AppState {
        engine: Arc::new(engine),
        config: Arc::clone(&config),
    };

    let addr = format!("{}:{}", config.service_host, config.service_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    let app = routes::router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
