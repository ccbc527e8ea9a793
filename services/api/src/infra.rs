use kiosk_careers::config::CareersConfig;
use kiosk_careers::error::AppError;
use kiosk_careers::workflows::careers::{
    CareersService, JobCatalog, ResumeFile, SimulatedTransport,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Catalog named by configuration, or the bundled postings.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<Arc<JobCatalog>, AppError> {
    let catalog = match path {
        Some(path) => {
            let catalog = JobCatalog::load(path)?;
            info!(path = %path.display(), postings = catalog.len(), "loaded job catalog");
            catalog
        }
        None => JobCatalog::builtin()?,
    };
    Ok(Arc::new(catalog))
}

pub(crate) fn build_careers_service(
    config: &CareersConfig,
) -> Result<Arc<CareersService>, AppError> {
    let catalog = load_catalog(config.catalog_path.as_deref())?;
    let service = CareersService::new(
        catalog,
        Arc::new(SimulatedTransport::default()),
        config.submit_delay,
    )
    .with_session_idle_timeout(config.session_idle_timeout);
    Ok(Arc::new(service))
}

/// File picker stand-in: references a local file without reading it.
pub(crate) fn resume_from_path(path: &Path) -> ResumeFile {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    ResumeFile {
        name,
        content_key: format!("file://{}", path.display()),
        media_type: mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string()),
    }
}
