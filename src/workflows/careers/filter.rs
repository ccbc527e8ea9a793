use serde::{Deserialize, Serialize};

use super::catalog::{JobCatalog, ALL};
use super::domain::JobListing;

/// Search and facet constraints chosen on the job board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub search_term: String,
    pub department: String,
    pub job_type: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            department: ALL.to_string(),
            job_type: ALL.to_string(),
        }
    }
}

impl FilterCriteria {
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn with_job_type(mut self, job_type: impl Into<String>) -> Self {
        self.job_type = job_type.into();
        self
    }

    /// True when every posting would pass.
    pub fn is_unconstrained(&self) -> bool {
        self.search_term.trim().is_empty() && self.department == ALL && self.job_type == ALL
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn matches(&self, needle: &str, listing: &JobListing) -> bool {
        let text_match = needle.is_empty()
            || listing.title.to_lowercase().contains(needle)
            || listing.description.to_lowercase().contains(needle);
        let department_match = self.department == ALL || self.department == listing.department;
        let type_match = self.job_type == ALL || self.job_type == listing.job_type.label();

        text_match && department_match && type_match
    }
}

/// Query-string form of [`FilterCriteria`]; absent values mean "All".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
}

impl From<FilterQuery> for FilterCriteria {
    fn from(query: FilterQuery) -> Self {
        let defaults = FilterCriteria::default();
        Self {
            search_term: query.search.unwrap_or(defaults.search_term),
            department: query.department.unwrap_or(defaults.department),
            job_type: query.job_type.unwrap_or(defaults.job_type),
        }
    }
}

/// Stateless filter over a catalog.
pub struct FilterEngine;

impl FilterEngine {
    /// Postings passing every constraint, in catalog order.
    ///
    /// The search term is trimmed and compared case-insensitively against title and
    /// description, so a whitespace-only term behaves like an empty one. Department and type
    /// compare exactly; a value outside the catalog's facets matches nothing.
    pub fn apply<'a>(catalog: &'a JobCatalog, criteria: &FilterCriteria) -> Vec<&'a JobListing> {
        let needle = criteria.search_term.trim().to_lowercase();
        catalog
            .list_all()
            .iter()
            .filter(|listing| criteria.matches(&needle, listing))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::careers::domain::JobId;

    fn catalog() -> JobCatalog {
        JobCatalog::builtin().expect("bundled catalog parses")
    }

    fn ids(listings: &[&JobListing]) -> Vec<String> {
        listings
            .iter()
            .map(|listing| listing.id.to_string())
            .collect()
    }

    #[test]
    fn unconstrained_criteria_return_everything_in_order() {
        let catalog = catalog();
        let criteria = FilterCriteria::default();
        assert!(criteria.is_unconstrained());

        let visible = FilterEngine::apply(&catalog, &criteria);
        let expected: Vec<&JobListing> = catalog.list_all().iter().collect();
        assert_eq!(visible, expected);
    }

    #[test]
    fn title_search_finds_each_job_in_any_case() {
        let catalog = catalog();
        for listing in catalog.list_all() {
            for term in [
                listing.title.clone(),
                listing.title.to_uppercase(),
                listing.title.to_lowercase(),
            ] {
                let criteria = FilterCriteria::default().with_search(term);
                let visible = FilterEngine::apply(&catalog, &criteria);
                assert!(
                    visible.iter().any(|job| job.id == listing.id),
                    "searching '{}' should surface {}",
                    criteria.search_term,
                    listing.id
                );
            }
        }
    }

    #[test]
    fn react_search_returns_single_posting() {
        let catalog = catalog();
        let criteria = FilterCriteria::default().with_search("React");
        let visible = FilterEngine::apply(&catalog, &criteria);

        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Senior React Developer");
    }

    #[test]
    fn search_matches_description_text() {
        let catalog = catalog();
        let criteria = FilterCriteria::default().with_search("RECEIPT PRINTERS");
        let visible = FilterEngine::apply(&catalog, &criteria);
        assert_eq!(ids(&visible), ["job2"]);
    }

    #[test]
    fn unknown_department_matches_nothing() {
        let catalog = catalog();
        let criteria = FilterCriteria::default().with_department("Legal");
        assert!(FilterEngine::apply(&catalog, &criteria).is_empty());

        let lowercase = FilterCriteria::default().with_department("engineering");
        assert!(FilterEngine::apply(&catalog, &lowercase).is_empty());
    }

    #[test]
    fn unknown_job_type_matches_nothing() {
        let catalog = catalog();
        let criteria = FilterCriteria::default().with_job_type("Freelance");
        assert!(FilterEngine::apply(&catalog, &criteria).is_empty());
    }

    #[test]
    fn constraints_combine_conjunctively() {
        let catalog = catalog();
        let criteria = FilterCriteria::default()
            .with_department("Engineering")
            .with_job_type("Full-time");
        assert_eq!(
            ids(&FilterEngine::apply(&catalog, &criteria)),
            ["job1", "job2"]
        );

        let narrowed = criteria.with_search("firmware");
        assert_eq!(ids(&FilterEngine::apply(&catalog, &narrowed)), ["job2"]);
    }

    #[test]
    fn contract_type_filter_preserves_catalog_order() {
        let catalog = catalog();
        let criteria = FilterCriteria::default().with_job_type("Contract");
        assert_eq!(
            ids(&FilterEngine::apply(&catalog, &criteria)),
            ["job5", "job9"]
        );
    }

    #[test]
    fn whitespace_search_behaves_like_empty() {
        let catalog = catalog();
        let criteria = FilterCriteria::default().with_search("   ");
        assert!(criteria.is_unconstrained());
        assert_eq!(FilterEngine::apply(&catalog, &criteria).len(), catalog.len());

        let padded = FilterCriteria::default().with_search("  react  ");
        let visible = FilterEngine::apply(&catalog, &padded);
        assert_eq!(visible[0].id, JobId::new("job1"));
    }

    #[test]
    fn clear_restores_defaults() {
        let mut criteria = FilterCriteria::default()
            .with_search("qa")
            .with_department("QA")
            .with_job_type("Remote");
        criteria.clear();
        assert_eq!(criteria, FilterCriteria::default());
    }

    #[test]
    fn query_defaults_missing_values_to_all() {
        let criteria = FilterCriteria::from(FilterQuery {
            search: Some("designer".to_string()),
            department: None,
            job_type: None,
        });
        assert_eq!(criteria.search_term, "designer");
        assert_eq!(criteria.department, ALL);
        assert_eq!(criteria.job_type, ALL);
    }
}
