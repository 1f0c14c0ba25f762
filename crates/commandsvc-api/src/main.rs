//! MDM command service API server entry point.

use std::sync::Arc;

use tower_http::trace::TraceLayer;

use commandsvc_api::config::Config;
use commandsvc_api::endpoint::{self, CommandEndpoint};
use commandsvc_api::error::AppError;
use commandsvc_api::routes;
use commandsvc_api::state::AppState;
use commandsvc_api::telemetry;
use commandsvc_archive::SqliteArchive;
use commandsvc_core::clock::MonotonicClock;
use commandsvc_service::{ArchivingCommandService, BroadcastPublisher, middleware};

/// Messages buffered per subscriber on the command topic.
const TOPIC_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    telemetry::init_tracing();
    let metrics = telemetry::install_metrics()?;

    tracing::info!("Starting MDM command service");

    let config = Config::from_env()?;
    let addr = config.socket_addr()?;

    let archive =
        SqliteArchive::connect(&config.archive_url, config.archive_namespace.clone()).await?;
    let publisher = BroadcastPublisher::new([config.command_topic.clone()], TOPIC_CAPACITY);

    // Service chain: instrumenting -> logging -> archiving service.
    let service = ArchivingCommandService::new(
        Arc::new(archive),
        Arc::new(publisher),
        Arc::new(MonotonicClock::new()),
    )
    .await?
    .with_topic(config.command_topic.clone());
    let service = middleware::with_middleware(service);

    // Endpoint chain: instrumenting -> logging -> validating endpoint.
    let endpoint = endpoint::with_middleware(CommandEndpoint::new(Arc::new(service)));

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(Arc::new(endpoint), metrics));

    tracing::info!(
        archive = %config.archive_url,
        namespace = %config.archive_namespace,
        topic = %config.command_topic,
        "Listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
