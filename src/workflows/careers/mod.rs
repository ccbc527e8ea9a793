//! Job board filtering and the browse → apply → submit flow of the careers page.

pub mod application;
pub mod catalog;
pub mod domain;
pub mod filter;
pub mod router;
pub mod selection;
pub mod service;
pub mod session;
pub mod submission;

#[cfg(test)]
mod tests;

pub use application::{
    ApplicationDraft, FieldViolation, FormField, RequiredField, ResumeFile, ValidatedApplication,
    ValidationErrors, ViolationReason,
};
pub use catalog::{CatalogError, JobCatalog, ALL};
pub use domain::{JobId, JobListing, JobType};
pub use filter::{FilterCriteria, FilterEngine, FilterQuery};
pub use router::careers_router;
pub use selection::{
    ApplicationMode, SelectionAction, SelectionController, SelectionError, SelectionSnapshot,
    SubmissionTicket,
};
pub use service::{CareersService, CareersServiceError, DraftUpdate, Facets};
pub use session::{
    CareersSession, SessionError, SessionId, SessionStore, SessionView,
    DEFAULT_SESSION_IDLE_TIMEOUT,
};
pub use submission::{
    dispatch, PendingSubmission, SimulatedTransport, SubmissionOutcome, SubmissionReceipt,
    SubmissionTransport, TransportError,
};
