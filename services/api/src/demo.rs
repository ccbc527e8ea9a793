use crate::infra::{load_catalog, resume_from_path};
use clap::Args;
use kiosk_careers::config::AppConfig;
use kiosk_careers::error::AppError;
use kiosk_careers::workflows::careers::{
    CareersService, CareersServiceError, DraftUpdate, FilterCriteria, FilterEngine, JobId,
    JobListing, SelectionError, SimulatedTransport, ALL,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct JobsArgs {
    /// Case-insensitive text matched against titles and descriptions
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Exact department name (defaults to All)
    #[arg(long)]
    pub(crate) department: Option<String>,
    /// Exact job type such as Full-time or Contract (defaults to All)
    #[arg(long = "type")]
    pub(crate) job_type: Option<String>,
    /// JSON catalog to read instead of the configured or bundled one
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Posting to apply for
    #[arg(long, default_value = "job3")]
    pub(crate) job: String,
    /// Applicant name used for the demo application
    #[arg(long, default_value = "Jane Doe")]
    pub(crate) name: String,
    /// Applicant email used for the demo application
    #[arg(long, default_value = "jane@x.com")]
    pub(crate) email: String,
    /// Applicant phone used for the demo application
    #[arg(long, default_value = "+1 555 0100")]
    pub(crate) phone: String,
    /// Resume file to reference; it is never read
    #[arg(long, default_value = "resume.pdf")]
    pub(crate) resume: PathBuf,
    /// Override the simulated delivery delay in milliseconds
    #[arg(long)]
    pub(crate) delay_ms: Option<u64>,
    /// JSON catalog to read instead of the configured or bundled one
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) fn run_jobs(args: JobsArgs) -> Result<(), AppError> {
    let JobsArgs {
        search,
        department,
        job_type,
        catalog,
    } = args;

    let config = AppConfig::load()?;
    let catalog = load_catalog(catalog.or(config.careers.catalog_path).as_deref())?;

    let criteria = FilterCriteria {
        search_term: search.unwrap_or_default(),
        department: department.unwrap_or_else(|| ALL.to_string()),
        job_type: job_type.unwrap_or_else(|| ALL.to_string()),
    };

    let visible = FilterEngine::apply(&catalog, &criteria);
    println!(
        "{} of {} open positions match",
        visible.len(),
        catalog.len()
    );
    for listing in visible {
        println!("{}", listing_line(listing));
    }

    if catalog.is_empty() {
        return Ok(());
    }
    println!("\nDepartments: {}", catalog.departments().join(", "));
    println!("Job types:   {}", catalog.job_types().join(", "));
    Ok(())
}

fn listing_line(listing: &JobListing) -> String {
    format!(
        "- [{}] {} | {} | {} | {} | posted {}",
        listing.id,
        listing.title,
        listing.department,
        listing.job_type,
        listing.location,
        listing.formatted_posted_date()
    )
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        job,
        name,
        email,
        phone,
        resume,
        delay_ms,
        catalog,
    } = args;

    let config = AppConfig::load()?;
    let catalog = load_catalog(catalog.or(config.careers.catalog_path).as_deref())?;
    let delay = delay_ms
        .map(Duration::from_millis)
        .unwrap_or(config.careers.submit_delay);
    let service = CareersService::new(catalog, Arc::new(SimulatedTransport::default()), delay);

    println!("Careers application demo");
    let session_id = service.open_session().session_id;
    println!("- Opened session {}", session_id);

    let job_id = JobId(job);
    let view = match service.select_job(&session_id, &job_id) {
        Ok(view) => view,
        Err(CareersServiceError::Selection(SelectionError::UnknownJob(id))) => {
            println!("  No posting with id {}; try `jobs` to list them", id);
            return Ok(());
        }
        Err(err) => {
            println!("  Selection failed: {}", err);
            return Ok(());
        }
    };
    if let Some(listing) = &view.selected_job {
        println!("- Viewing {}", listing_line(listing));
        for item in &listing.responsibilities {
            println!("    * {}", item);
        }
    }

    if let Err(err) = service.begin_apply(&session_id) {
        println!("  Could not open the application form: {}", err);
        return Ok(());
    }
    println!("- Application form opened");

    match service.submit(&session_id).await {
        Err(CareersServiceError::Selection(SelectionError::Validation(errors))) => {
            println!("  Empty form rejected:");
            for violation in &errors.violations {
                println!("    - {}", violation.message());
            }
        }
        Ok(_) => println!("  Unexpected: empty form was accepted"),
        Err(err) => println!("  Unexpected error: {}", err),
    }

    let update = DraftUpdate {
        applicant_name: Some(name),
        email: Some(email),
        phone: Some(phone),
        cover_letter: None,
        resume: Some(resume_from_path(Path::new(&resume))),
    };
    if let Err(err) = service.update_draft(&session_id, update) {
        println!("  Draft update failed: {}", err);
        return Ok(());
    }

    println!("- Submitting (simulated delivery takes {:?})", delay);
    let view = match service.submit(&session_id).await {
        Ok(view) => view,
        Err(err) => {
            println!("  Submission failed: {}", err);
            return Ok(());
        }
    };
    println!("  Mode: {}", view.mode);
    match view.receipt.as_ref().map(serde_json::to_string_pretty) {
        Some(Ok(json)) => println!("  Receipt:\n{}", json),
        Some(Err(err)) => println!("  Receipt unavailable: {}", err),
        None => println!("  No receipt recorded"),
    }

    match service.reset(&session_id) {
        Ok(view) => println!("- Back to {} ({} postings visible)", view.mode, view.visible_jobs),
        Err(err) => println!("  Reset failed: {}", err),
    }

    Ok(())
}
