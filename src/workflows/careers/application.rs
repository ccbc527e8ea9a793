use std::fmt;

use serde::{Deserialize, Serialize};

/// Free-text inputs on the application form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    ApplicantName,
    Email,
    Phone,
    CoverLetter,
}

/// Opaque handle produced by the platform file picker. Contents are never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeFile {
    pub name: String,
    pub content_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

/// In-progress application form contents. Writes are unchecked until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub resume: Option<ResumeFile>,
    pub cover_letter: Option<String>,
}

impl ApplicationDraft {
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::ApplicantName => self.applicant_name = value,
            FormField::Email => self.email = value,
            FormField::Phone => self.phone = value,
            FormField::CoverLetter => {
                self.cover_letter = if value.trim().is_empty() {
                    None
                } else {
                    Some(value)
                }
            }
        }
    }

    /// `None` models a dismissed file picker: any previous choice is kept.
    pub fn set_resume(&mut self, file: Option<ResumeFile>) {
        if let Some(file) = file {
            self.resume = Some(file);
        }
    }

    pub fn clear_resume(&mut self) {
        self.resume = None;
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    /// Collect every violation rather than stopping at the first.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut violations = Vec::new();

        if self.applicant_name.trim().is_empty() {
            violations.push(FieldViolation::missing(RequiredField::ApplicantName));
        }

        let email = self.email.trim();
        if email.is_empty() {
            violations.push(FieldViolation::missing(RequiredField::Email));
        } else if !email.contains('@') {
            violations.push(FieldViolation {
                field: RequiredField::Email,
                reason: ViolationReason::MissingAtSign,
            });
        }

        if self.phone.trim().is_empty() {
            violations.push(FieldViolation::missing(RequiredField::Phone));
        }

        if self.resume.is_none() {
            violations.push(FieldViolation::missing(RequiredField::Resume));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { violations })
        }
    }

    /// Validate and produce the payload handed to the transport.
    pub fn submit(&self) -> Result<ValidatedApplication, ValidationErrors> {
        self.validate()?;

        let resume = self.resume.clone().ok_or_else(|| ValidationErrors {
            violations: vec![FieldViolation::missing(RequiredField::Resume)],
        })?;

        Ok(ValidatedApplication {
            applicant_name: self.applicant_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            resume,
            cover_letter: self
                .cover_letter
                .as_ref()
                .map(|letter| letter.trim().to_string()),
        })
    }
}

/// A draft that passed validation and is ready for transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedApplication {
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub resume: ResumeFile,
    pub cover_letter: Option<String>,
}

/// Fields that must be present before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    ApplicantName,
    Email,
    Phone,
    Resume,
}

impl RequiredField {
    pub const fn label(self) -> &'static str {
        match self {
            RequiredField::ApplicantName => "full name",
            RequiredField::Email => "email address",
            RequiredField::Phone => "phone number",
            RequiredField::Resume => "resume",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationReason {
    Missing,
    MissingAtSign,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: RequiredField,
    pub reason: ViolationReason,
}

impl FieldViolation {
    fn missing(field: RequiredField) -> Self {
        Self {
            field,
            reason: ViolationReason::Missing,
        }
    }

    pub fn message(&self) -> String {
        match self.reason {
            ViolationReason::Missing => format!("{} is required", self.field.label()),
            ViolationReason::MissingAtSign => {
                format!("{} must contain '@'", self.field.label())
            }
        }
    }
}

/// Every field-level problem found in a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn fields(&self) -> Vec<RequiredField> {
        self.violations
            .iter()
            .map(|violation| violation.field)
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .violations
            .iter()
            .map(FieldViolation::message)
            .collect();
        write!(f, "application is incomplete: {}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
