use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::application::ValidatedApplication;
use super::domain::JobId;

/// Confirmation returned once an application has been handed off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub confirmation_id: String,
    pub job_id: JobId,
    pub applicant_email: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("application transport unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook that carries a validated application somewhere.
pub trait SubmissionTransport: Send + Sync {
    fn deliver(
        &self,
        job_id: &JobId,
        application: &ValidatedApplication,
    ) -> Result<SubmissionReceipt, TransportError>;
}

/// Local stand-in for a hiring backend. Every delivery succeeds.
#[derive(Debug, Default)]
pub struct SimulatedTransport {
    sequence: AtomicU64,
}

impl SubmissionTransport for SimulatedTransport {
    fn deliver(
        &self,
        job_id: &JobId,
        application: &ValidatedApplication,
    ) -> Result<SubmissionReceipt, TransportError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(SubmissionReceipt {
            confirmation_id: format!("apl-{id:06}"),
            job_id: job_id.clone(),
            applicant_email: application.email.clone(),
            received_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Delivered(SubmissionReceipt),
    Failed(TransportError),
    Cancelled,
}

/// Handle to a delivery running on the tokio runtime.
#[derive(Debug)]
pub struct PendingSubmission {
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<SubmissionOutcome>,
}

impl PendingSubmission {
    /// Stop the delivery if it has not happened yet. No-op afterwards.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    pub async fn outcome(self) -> SubmissionOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() => SubmissionOutcome::Cancelled,
            Err(err) => SubmissionOutcome::Failed(TransportError::Unavailable(err.to_string())),
        }
    }
}

/// Deliver `application` after `delay` on a background task.
///
/// Dropping the returned handle does not cancel the delivery. There is no retry.
pub fn dispatch(
    transport: Arc<dyn SubmissionTransport>,
    job_id: JobId,
    application: ValidatedApplication,
    delay: Duration,
) -> PendingSubmission {
    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        tokio::select! {
            Ok(()) = cancel_rx => {
                debug!(job_id = %job_id, "application delivery cancelled");
                SubmissionOutcome::Cancelled
            }
            _ = tokio::time::sleep(delay) => match transport.deliver(&job_id, &application) {
                Ok(receipt) => {
                    debug!(
                        job_id = %job_id,
                        confirmation_id = %receipt.confirmation_id,
                        "application delivered"
                    );
                    SubmissionOutcome::Delivered(receipt)
                }
                Err(err) => {
                    warn!(job_id = %job_id, error = %err, "application delivery failed");
                    SubmissionOutcome::Failed(err)
                }
            },
        }
    });

    PendingSubmission {
        cancel: Some(cancel_tx),
        handle,
    }
}
