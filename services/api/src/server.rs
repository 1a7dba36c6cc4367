use crate::cli::ServeArgs;
use crate::infra::{seed_members, AppState, SEEDED_MEMBERS};
use crate::routes::with_hazard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use road_watch::config::AppConfig;
use road_watch::error::AppError;
use road_watch::store::{MemoryStore, SnapshotStore};
use road_watch::telemetry;
use road_watch::workflows::hazards::{HazardService, ReportRepository, VotePolicy};
use road_watch::workflows::reputation::UserRepository;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    match config.storage.data_path.clone() {
        Some(path) => {
            let store = Arc::new(SnapshotStore::open(&path)?);
            info!(path = %path.display(), "using snapshot store");
            serve(config, store).await
        }
        None => {
            info!("using in-memory store");
            serve(config, Arc::new(MemoryStore::new())).await
        }
    }
}

async fn serve<S>(config: AppConfig, store: Arc<S>) -> Result<(), AppError>
where
    S: UserRepository + ReportRepository + 'static,
{
    if let Some(seed) = config.community.leaderboard_seed {
        seed_members(store.as_ref(), seed, SEEDED_MEMBERS)?;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let hazard_service = Arc::new(HazardService::new(
        store.clone(),
        store,
        VotePolicy::from(&config.community),
    ));

    let app = with_hazard_routes(hazard_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "road watch service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
