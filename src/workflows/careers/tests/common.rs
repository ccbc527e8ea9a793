use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::careers::application::{ResumeFile, ValidatedApplication};
use crate::workflows::careers::catalog::JobCatalog;
use crate::workflows::careers::domain::JobId;
use crate::workflows::careers::service::{CareersService, DraftUpdate};
use crate::workflows::careers::session::SessionId;
use crate::workflows::careers::submission::{
    SimulatedTransport, SubmissionReceipt, SubmissionTransport, TransportError,
};

pub(super) const SUBMIT_DELAY: Duration = Duration::from_millis(1500);

pub(super) fn catalog() -> Arc<JobCatalog> {
    Arc::new(JobCatalog::builtin().expect("bundled catalog parses"))
}

pub(super) fn build_service() -> Arc<CareersService> {
    Arc::new(CareersService::new(
        catalog(),
        Arc::new(SimulatedTransport::default()),
        SUBMIT_DELAY,
    ))
}

pub(super) fn build_service_with(transport: Arc<dyn SubmissionTransport>) -> Arc<CareersService> {
    Arc::new(CareersService::new(catalog(), transport, SUBMIT_DELAY))
}

pub(super) fn resume() -> ResumeFile {
    ResumeFile {
        name: "jane-doe.pdf".to_string(),
        content_key: "upload-1".to_string(),
        media_type: Some("application/pdf".to_string()),
    }
}

pub(super) fn valid_update() -> DraftUpdate {
    DraftUpdate {
        applicant_name: Some("Jane Doe".to_string()),
        email: Some("jane@x.com".to_string()),
        phone: Some("+1 555 0100".to_string()),
        cover_letter: None,
        resume: Some(resume()),
    }
}

/// Open a session and walk it to the application form for `job`.
pub(super) fn applying_session(service: &CareersService, job: &str) -> SessionId {
    let session_id = service.open_session().session_id;
    service
        .select_job(&session_id, &JobId::new(job))
        .expect("job exists");
    service.begin_apply(&session_id).expect("can apply");
    session_id
}

/// Transport that refuses every delivery and counts attempts.
#[derive(Default)]
pub(super) struct OfflineTransport {
    attempts: AtomicUsize,
}

impl OfflineTransport {
    pub(super) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl SubmissionTransport for OfflineTransport {
    fn deliver(
        &self,
        _job_id: &JobId,
        _application: &ValidatedApplication,
    ) -> Result<SubmissionReceipt, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::Unavailable("hiring inbox offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_status(response: &Response, status: StatusCode) {
    assert_eq!(response.status(), status);
}
