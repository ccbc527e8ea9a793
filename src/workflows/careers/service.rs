use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::application::{FormField, ResumeFile};
use super::catalog::JobCatalog;
use super::domain::{JobId, JobListing};
use super::filter::{FilterCriteria, FilterEngine};
use super::selection::{SelectionError, SubmissionTicket};
use super::session::{CareersSession, SessionError, SessionId, SessionStore, SessionView};
use super::submission::{
    dispatch, PendingSubmission, SubmissionOutcome, SubmissionTransport, TransportError,
};

/// Facet lists used to populate the filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub departments: Vec<String>,
    pub job_types: Vec<String>,
}

/// Partial draft update; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftUpdate {
    #[serde(default)]
    pub applicant_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub resume: Option<ResumeFile>,
}

impl DraftUpdate {
    fn fields(self) -> (Vec<(FormField, String)>, Option<ResumeFile>) {
        let fields = [
            (FormField::ApplicantName, self.applicant_name),
            (FormField::Email, self.email),
            (FormField::Phone, self.phone),
            (FormField::CoverLetter, self.cover_letter),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect();
        (fields, self.resume)
    }
}

/// Facade composing the catalog, session store and submission transport.
pub struct CareersService {
    catalog: Arc<JobCatalog>,
    sessions: Arc<SessionStore>,
    transport: Arc<dyn SubmissionTransport>,
    submit_delay: Duration,
}

impl CareersService {
    pub fn new(
        catalog: Arc<JobCatalog>,
        transport: Arc<dyn SubmissionTransport>,
        submit_delay: Duration,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(catalog.clone())),
            catalog,
            transport,
            submit_delay,
        }
    }

    /// Replace the session store with one expiring sessions idle for `idle_timeout`.
    pub fn with_session_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.sessions = Arc::new(SessionStore::with_idle_timeout(
            self.catalog.clone(),
            idle_timeout,
        ));
        self
    }

    pub fn session_idle_timeout(&self) -> Duration {
        self.sessions.idle_timeout()
    }

    pub fn catalog(&self) -> &JobCatalog {
        &self.catalog
    }

    pub fn list_jobs(&self, criteria: &FilterCriteria) -> Vec<JobListing> {
        FilterEngine::apply(&self.catalog, criteria)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn job(&self, id: &JobId) -> Result<JobListing, CareersServiceError> {
        self.catalog
            .find(id)
            .cloned()
            .ok_or_else(|| SelectionError::UnknownJob(id.clone()).into())
    }

    pub fn facets(&self) -> Facets {
        Facets {
            departments: self.catalog.departments().to_vec(),
            job_types: self.catalog.job_types().to_vec(),
        }
    }

    pub fn open_session(&self) -> SessionView {
        let view = self.sessions.create();
        info!(session_id = %view.session_id, "careers session opened");
        view
    }

    pub fn session(&self, id: &SessionId) -> Result<SessionView, CareersServiceError> {
        Ok(self.sessions.with_session(id, |session| session.view(id))?)
    }

    pub fn close_session(&self, id: &SessionId) -> Result<(), CareersServiceError> {
        Ok(self.sessions.remove(id)?)
    }

    pub fn set_criteria(
        &self,
        id: &SessionId,
        criteria: FilterCriteria,
    ) -> Result<SessionView, CareersServiceError> {
        Ok(self.sessions.with_session(id, |session| {
            session.set_criteria(criteria);
            session.view(id)
        })?)
    }

    pub fn select_job(
        &self,
        id: &SessionId,
        job_id: &JobId,
    ) -> Result<SessionView, CareersServiceError> {
        self.transition(id, |session| session.controller_mut().select_job(job_id))
    }

    pub fn begin_apply(&self, id: &SessionId) -> Result<SessionView, CareersServiceError> {
        self.transition(id, |session| session.controller_mut().begin_apply())
    }

    pub fn cancel_apply(&self, id: &SessionId) -> Result<SessionView, CareersServiceError> {
        self.transition(id, |session| session.controller_mut().cancel_apply())
    }

    pub fn update_draft(
        &self,
        id: &SessionId,
        update: DraftUpdate,
    ) -> Result<SessionView, CareersServiceError> {
        self.transition(id, |session| {
            let draft = session.controller_mut().draft_mut()?;
            let (fields, resume) = update.fields();
            for (field, value) in fields {
                draft.set_field(field, value);
            }
            draft.set_resume(resume);
            Ok(())
        })
    }

    pub fn reset(&self, id: &SessionId) -> Result<SessionView, CareersServiceError> {
        self.transition(id, |session| session.controller_mut().reset())
    }

    /// Validate, deliver through the transport after the configured delay, then mark the
    /// session submitted. The session lock is released while the delivery runs.
    ///
    /// Delivery and settlement run on a detached task, so the session is settled even when
    /// the caller stops waiting.
    pub async fn submit(&self, id: &SessionId) -> Result<SessionView, CareersServiceError> {
        let ticket = self
            .sessions
            .with_session(id, |session| session.controller_mut().begin_submission())??;

        let pending = dispatch(
            self.transport.clone(),
            ticket.job_id().clone(),
            ticket.application().clone(),
            self.submit_delay,
        );
        let settled = tokio::spawn(settle_when_delivered(
            self.sessions.clone(),
            id.clone(),
            ticket,
            pending,
        ));

        match settled.await {
            Ok(result) => result,
            Err(err) => {
                warn!(session_id = %id, error = %err, "submission settlement task failed");
                Err(TransportError::Unavailable(err.to_string()).into())
            }
        }
    }

    fn transition<F>(&self, id: &SessionId, f: F) -> Result<SessionView, CareersServiceError>
    where
        F: FnOnce(&mut CareersSession) -> Result<(), SelectionError>,
    {
        self.sessions.with_session(id, |session| -> Result<_, CareersServiceError> {
            f(session)?;
            Ok(session.view(id))
        })?
    }
}

async fn settle_when_delivered(
    sessions: Arc<SessionStore>,
    id: SessionId,
    ticket: SubmissionTicket,
    pending: PendingSubmission,
) -> Result<SessionView, CareersServiceError> {
    let outcome = pending.outcome().await;
    sessions.with_session(&id, |session| settle(session, &id, ticket, outcome))?
}

fn settle(
    session: &mut CareersSession,
    id: &SessionId,
    ticket: SubmissionTicket,
    outcome: SubmissionOutcome,
) -> Result<SessionView, CareersServiceError> {
    match outcome {
        SubmissionOutcome::Delivered(receipt) => {
            session.controller_mut().complete_submission(ticket)?;
            info!(
                session_id = %id,
                confirmation_id = %receipt.confirmation_id,
                "application accepted"
            );
            session.record_receipt(receipt);
            Ok(session.view(id))
        }
        SubmissionOutcome::Failed(err) => {
            session.controller_mut().abort_submission(ticket)?;
            Err(CareersServiceError::Transport(err))
        }
        SubmissionOutcome::Cancelled => {
            session.controller_mut().abort_submission(ticket)?;
            Err(CareersServiceError::Cancelled)
        }
    }
}

/// Error raised by the careers service.
#[derive(Debug, thiserror::Error)]
pub enum CareersServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("application submission was cancelled")]
    Cancelled,
}
