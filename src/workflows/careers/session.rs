use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use super::application::ApplicationDraft;
use super::catalog::JobCatalog;
use super::domain::JobListing;
use super::filter::{FilterCriteria, FilterEngine};
use super::selection::{ApplicationMode, SelectionController};
use super::submission::SubmissionReceipt;

/// Identifier wrapper for one visitor's careers session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session '{0}' not found")]
    NotFound(SessionId),
}

/// One visitor's UI state: filter criteria and the selection state machine.
///
/// Filtering and selecting are independent calls; a caller that wants a department badge to
/// both filter and open a posting issues both.
#[derive(Debug, Clone)]
pub struct CareersSession {
    catalog: Arc<JobCatalog>,
    criteria: FilterCriteria,
    controller: SelectionController,
    last_receipt: Option<SubmissionReceipt>,
}

impl CareersSession {
    pub fn new(catalog: Arc<JobCatalog>) -> Self {
        Self {
            controller: SelectionController::new(catalog.clone()),
            catalog,
            criteria: FilterCriteria::default(),
            last_receipt: None,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    pub fn visible_jobs(&self) -> Vec<&JobListing> {
        FilterEngine::apply(&self.catalog, &self.criteria)
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SelectionController {
        &mut self.controller
    }

    pub fn record_receipt(&mut self, receipt: SubmissionReceipt) {
        self.last_receipt = Some(receipt);
    }

    /// Receipt for the application currently shown as submitted.
    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        match self.controller.mode() {
            ApplicationMode::Submitted => self.last_receipt.as_ref(),
            _ => None,
        }
    }

    pub fn view(&self, id: &SessionId) -> SessionView {
        let snapshot = self.controller.snapshot();
        SessionView {
            session_id: id.clone(),
            mode: snapshot.mode,
            selected_job: self.controller.selected_listing().cloned(),
            draft: snapshot.draft,
            submission_pending: snapshot.submission_pending,
            criteria: self.criteria.clone(),
            visible_jobs: self.visible_jobs().len(),
            receipt: self.receipt().cloned(),
        }
    }
}

/// Everything the rendering layer needs to draw a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub mode: ApplicationMode,
    pub selected_job: Option<JobListing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<ApplicationDraft>,
    pub submission_pending: bool,
    pub criteria: FilterCriteria,
    pub visible_jobs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<SubmissionReceipt>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("ses-{id:06}"))
}

/// Sessions untouched for this long are dropped.
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct SessionEntry {
    session: CareersSession,
    last_touched: Instant,
}

impl SessionEntry {
    /// Sessions waiting on a delivery are never considered idle.
    fn is_expired(&self, now: Instant, idle_timeout: Duration) -> bool {
        !self.session.controller().is_submission_pending()
            && now.saturating_duration_since(self.last_touched) >= idle_timeout
    }
}

/// In-memory sessions keyed by id. Nothing is persisted; idle sessions expire.
#[derive(Debug)]
pub struct SessionStore {
    catalog: Arc<JobCatalog>,
    idle_timeout: Duration,
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
}

impl SessionStore {
    pub fn new(catalog: Arc<JobCatalog>) -> Self {
        Self::with_idle_timeout(catalog, DEFAULT_SESSION_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(catalog: Arc<JobCatalog>, idle_timeout: Duration) -> Self {
        Self {
            catalog,
            idle_timeout,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Open a session, sweeping expired ones first.
    pub fn create(&self) -> SessionView {
        let id = next_session_id();
        let session = CareersSession::new(self.catalog.clone());
        let view = session.view(&id);
        let now = Instant::now();

        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now, self.idle_timeout));
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "expired idle careers sessions");
        }
        sessions.insert(
            id,
            SessionEntry {
                session,
                last_touched: now,
            },
        );
        view
    }

    /// Run `f` against a session while holding the store lock. `f` must not block.
    ///
    /// An expired session is removed and reported as not found.
    pub fn with_session<F, R>(&self, id: &SessionId, f: F) -> Result<R, SessionError>
    where
        F: FnOnce(&mut CareersSession) -> R,
    {
        let now = Instant::now();
        let mut sessions = self.lock();

        let expired = match sessions.get(id) {
            Some(entry) => entry.is_expired(now, self.idle_timeout),
            None => return Err(SessionError::NotFound(id.clone())),
        };
        if expired {
            sessions.remove(id);
            debug!(session_id = %id, "careers session expired");
            return Err(SessionError::NotFound(id.clone()));
        }

        let entry = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;
        entry.last_touched = now;
        Ok(f(&mut entry.session))
    }

    pub fn remove(&self, id: &SessionId) -> Result<(), SessionError> {
        self.lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Recovers from poisoning; a panicked closure leaves at most one session half-updated.
    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
