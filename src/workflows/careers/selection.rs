use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::application::{
    ApplicationDraft, FormField, ResumeFile, ValidatedApplication, ValidationErrors,
};
use super::catalog::JobCatalog;
use super::domain::{JobId, JobListing};

/// Which screen of the careers flow is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationMode {
    #[default]
    Browsing,
    ViewingDetails,
    ApplyingForm,
    Submitted,
}

impl ApplicationMode {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationMode::Browsing => "browsing",
            ApplicationMode::ViewingDetails => "viewing_details",
            ApplicationMode::ApplyingForm => "applying_form",
            ApplicationMode::Submitted => "submitted",
        }
    }
}

impl fmt::Display for ApplicationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Transition requested by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionAction {
    BeginApply,
    CancelApply,
    EditDraft,
    Submit,
    Reset,
}

impl SelectionAction {
    pub const fn label(self) -> &'static str {
        match self {
            SelectionAction::BeginApply => "begin applying",
            SelectionAction::CancelApply => "cancel the application",
            SelectionAction::EditDraft => "edit the application",
            SelectionAction::Submit => "submit the application",
            SelectionAction::Reset => "return to browsing",
        }
    }
}

impl fmt::Display for SelectionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("cannot {action} while {from}")]
    InvalidStateTransition {
        from: ApplicationMode,
        action: SelectionAction,
    },
    #[error("job '{0}' is not in the catalog")]
    UnknownJob(JobId),
    #[error("an application submission is already in flight")]
    SubmissionInFlight,
    #[error("submission no longer matches the active application")]
    StaleSubmission,
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

/// Proof that a draft passed validation and is being delivered.
///
/// Issued by [`SelectionController::begin_submission`] and redeemed exactly once through
/// [`SelectionController::complete_submission`] or [`SelectionController::abort_submission`].
#[derive(Debug)]
pub struct SubmissionTicket {
    generation: u64,
    job_id: JobId,
    application: ValidatedApplication,
}

impl SubmissionTicket {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn application(&self) -> &ValidatedApplication {
        &self.application
    }
}

/// Serializable view of the controller for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionSnapshot {
    pub mode: ApplicationMode,
    pub selected_job_id: Option<JobId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<ApplicationDraft>,
    pub submission_pending: bool,
}

/// State machine over the browse → details → apply → submitted flow.
#[derive(Debug, Clone)]
pub struct SelectionController {
    catalog: Arc<JobCatalog>,
    selected: Option<JobId>,
    mode: ApplicationMode,
    draft: ApplicationDraft,
    generation: u64,
    in_flight: Option<u64>,
}

impl SelectionController {
    pub fn new(catalog: Arc<JobCatalog>) -> Self {
        Self {
            catalog,
            selected: None,
            mode: ApplicationMode::Browsing,
            draft: ApplicationDraft::default(),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn mode(&self) -> ApplicationMode {
        self.mode
    }

    pub fn selected_job_id(&self) -> Option<&JobId> {
        self.selected.as_ref()
    }

    pub fn selected_listing(&self) -> Option<&JobListing> {
        self.selected.as_ref().and_then(|id| self.catalog.find(id))
    }

    pub fn is_submission_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The draft, present only while the form is showing.
    pub fn draft(&self) -> Option<&ApplicationDraft> {
        (self.mode == ApplicationMode::ApplyingForm).then_some(&self.draft)
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            mode: self.mode,
            selected_job_id: self.selected.clone(),
            draft: self.draft().cloned(),
            submission_pending: self.is_submission_pending(),
        }
    }

    /// Allowed from every mode. Any draft or pending submission is discarded.
    pub fn select_job(&mut self, id: &JobId) -> Result<(), SelectionError> {
        if !self.catalog.contains(id) {
            return Err(SelectionError::UnknownJob(id.clone()));
        }

        if self.in_flight.take().is_some() {
            debug!(job_id = %id, "abandoning in-flight submission on reselection");
        }
        self.generation += 1;
        self.draft = ApplicationDraft::default();
        self.selected = Some(id.clone());
        self.mode = ApplicationMode::ViewingDetails;

        debug!(job_id = %id, "job selected");
        Ok(())
    }

    pub fn begin_apply(&mut self) -> Result<(), SelectionError> {
        self.expect_mode(ApplicationMode::ViewingDetails, SelectionAction::BeginApply)?;
        self.draft = ApplicationDraft::default();
        self.mode = ApplicationMode::ApplyingForm;
        Ok(())
    }

    pub fn cancel_apply(&mut self) -> Result<(), SelectionError> {
        self.expect_editable(SelectionAction::CancelApply)?;
        self.draft = ApplicationDraft::default();
        self.mode = ApplicationMode::ViewingDetails;
        Ok(())
    }

    pub fn draft_mut(&mut self) -> Result<&mut ApplicationDraft, SelectionError> {
        self.expect_editable(SelectionAction::EditDraft)?;
        Ok(&mut self.draft)
    }

    pub fn set_field(
        &mut self,
        field: FormField,
        value: impl Into<String>,
    ) -> Result<(), SelectionError> {
        self.draft_mut()?.set_field(field, value);
        Ok(())
    }

    pub fn set_resume(&mut self, file: Option<ResumeFile>) -> Result<(), SelectionError> {
        self.draft_mut()?.set_resume(file);
        Ok(())
    }

    /// Validate the draft and mark a submission as in flight.
    ///
    /// Validation failures leave the controller untouched so the form can be corrected.
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, SelectionError> {
        self.expect_editable(SelectionAction::Submit)?;

        let job_id = self
            .selected
            .clone()
            .ok_or(SelectionError::InvalidStateTransition {
                from: self.mode,
                action: SelectionAction::Submit,
            })?;
        let application = self.draft.submit()?;

        self.in_flight = Some(self.generation);
        debug!(job_id = %job_id, "application submission started");

        Ok(SubmissionTicket {
            generation: self.generation,
            job_id,
            application,
        })
    }

    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
    ) -> Result<ValidatedApplication, SelectionError> {
        self.redeem(&ticket)?;
        self.draft = ApplicationDraft::default();
        self.mode = ApplicationMode::Submitted;

        info!(job_id = %ticket.job_id, "application submitted");
        Ok(ticket.application)
    }

    /// Clear the in-flight flag and keep the draft for another attempt.
    pub fn abort_submission(&mut self, ticket: SubmissionTicket) -> Result<(), SelectionError> {
        self.redeem(&ticket)?;
        debug!(job_id = %ticket.job_id, "application submission aborted");
        Ok(())
    }

    /// Validate and submit without an intermediate transport step.
    pub fn submit(&mut self) -> Result<ValidatedApplication, SelectionError> {
        let ticket = self.begin_submission()?;
        self.complete_submission(ticket)
    }

    pub fn reset(&mut self) -> Result<(), SelectionError> {
        self.expect_mode(ApplicationMode::Submitted, SelectionAction::Reset)?;
        self.selected = None;
        self.mode = ApplicationMode::Browsing;
        Ok(())
    }

    fn redeem(&mut self, ticket: &SubmissionTicket) -> Result<(), SelectionError> {
        if self.in_flight != Some(ticket.generation) || self.generation != ticket.generation {
            return Err(SelectionError::StaleSubmission);
        }
        self.in_flight = None;
        Ok(())
    }

    fn expect_mode(
        &self,
        expected: ApplicationMode,
        action: SelectionAction,
    ) -> Result<(), SelectionError> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(SelectionError::InvalidStateTransition {
                from: self.mode,
                action,
            })
        }
    }

    fn expect_editable(&self, action: SelectionAction) -> Result<(), SelectionError> {
        self.expect_mode(ApplicationMode::ApplyingForm, action)?;
        if self.in_flight.is_some() {
            return Err(SelectionError::SubmissionInFlight);
        }
        Ok(())
    }
}
