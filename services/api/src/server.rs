use crate::cli::ServeArgs;
use crate::infra::{load_records, AppState, InMemoryCutoffRepository, InMemoryResponseCache};
use crate::routes::with_prediction_routes;
use admit_ai::config::AppConfig;
use admit_ai::counselling::{ProjectionConfig, RecommendationService};
use admit_ai::error::AppError;
use admit_ai::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let records = load_records(args.data.as_deref())?;
    let record_count = records.len();
    let repository = Arc::new(InMemoryCutoffRepository::new(records));
    let cache = Arc::new(InMemoryResponseCache::default());
    let service = Arc::new(RecommendationService::new(
        repository,
        cache,
        ProjectionConfig::default(),
        Duration::from_secs(config.cache.ttl_seconds),
        config.query.result_limit,
    ));

    let app = with_prediction_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, record_count, "admission shortlist service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
