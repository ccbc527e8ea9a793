use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use super::domain::{JobId, JobListing};

/// Filter value meaning "no constraint on this dimension".
pub const ALL: &str = "All";

const BUILTIN_CATALOG: &str = include_str!("../../../data/jobs.json");

/// Errors raised while loading a catalog source.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read job catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid job catalog data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("job id '{0}' appears more than once in the catalog")]
    DuplicateId(JobId),
}

/// Fixed, ordered set of postings with facet lists derived once at construction.
#[derive(Debug, Clone)]
pub struct JobCatalog {
    listings: Vec<JobListing>,
    departments: Vec<String>,
    job_types: Vec<String>,
}

impl JobCatalog {
    pub fn new(listings: Vec<JobListing>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(listings.len());
        for listing in &listings {
            if !seen.insert(&listing.id) {
                return Err(CatalogError::DuplicateId(listing.id.clone()));
            }
        }

        let departments = facet(listings.iter().map(|listing| listing.department.as_str()));
        let job_types = facet(listings.iter().map(|listing| listing.job_type.label()));

        debug!(
            postings = listings.len(),
            departments = departments.len() - 1,
            "job catalog assembled"
        );

        Ok(Self {
            listings,
            departments,
            job_types,
        })
    }

    /// The postings bundled with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_reader(BUILTIN_CATALOG.as_bytes())
    }

    /// Parse a JSON array of postings.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let listings: Vec<JobListing> = serde_json::from_reader(reader)?;
        Self::new(listings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn list_all(&self) -> &[JobListing] {
        &self.listings
    }

    /// `"All"` followed by each distinct department in first-seen order.
    pub fn departments(&self) -> &[String] {
        &self.departments
    }

    /// `"All"` followed by each distinct job type label in first-seen order.
    pub fn job_types(&self) -> &[String] {
        &self.job_types
    }

    pub fn find(&self, id: &JobId) -> Option<&JobListing> {
        self.listings.iter().find(|listing| &listing.id == id)
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.find(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

fn facet<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut facet = vec![ALL.to_string()];
    for value in values {
        if seen.insert(value) {
            facet.push(value.to_string());
        }
    }
    facet
}
