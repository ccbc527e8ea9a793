use crate::cli::ServeArgs;
use crate::infra::{build_careers_service, AppState};
use crate::routes::with_careers_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use kiosk_careers::config::AppConfig;
use kiosk_careers::error::AppError;
use kiosk_careers::telemetry;
use std::sync::atomic::Ordering;
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

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let careers_service = build_careers_service(&config.careers)?;
    let postings = careers_service.catalog().len();

    let app = with_careers_routes(careers_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, postings, "careers service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
