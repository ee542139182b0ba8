//! Storage traits shared by every backend.
//!
//! Backends validate input through the `normalized()` helpers on the models
//! before touching storage, so a rejected call never leaves a partial write.

use crate::error::Result;
use crate::models::{
    Application, Employer, JobListing, JobSeeker, NewAccount, NewEmployer, NewJob, ProfileUpdate,
};

pub trait CatalogStore {
    fn add_employer(&self, employer: &NewEmployer) -> Result<i64>;
    /// Ordered by company name.
    fn list_employers(&self) -> Result<Vec<Employer>>;
    fn add_job(&self, job: &NewJob) -> Result<i64>;
    fn get_job(&self, id: i64) -> Result<Option<JobListing>>;
    /// Newest first.
    fn list_jobs(&self) -> Result<Vec<JobListing>>;
}

pub trait SeekerStore {
    fn find_by_email(&self, email: &str) -> Result<Option<JobSeeker>>;
    fn find_by_username(&self, username: &str) -> Result<Option<JobSeeker>>;
    fn upsert_profile(&self, profile: &ProfileUpdate) -> Result<JobSeeker>;
    fn create_account(&self, account: &NewAccount) -> Result<JobSeeker>;
    /// Insert a seeker that has nothing but an email.
    fn register_email(&self, email: &str) -> Result<JobSeeker>;
    fn set_picture(&self, email: &str, path: &str) -> Result<JobSeeker>;
}

pub trait ApplicationStore {
    fn apply(&self, job_id: i64, jobseeker_id: i64, cover_letter: Option<&str>) -> Result<i64>;
    /// Oldest first.
    fn applications_for(&self, jobseeker_id: i64) -> Result<Vec<Application>>;
}

/// Everything the portal needs from a backend.
pub trait Store: CatalogStore + SeekerStore + ApplicationStore {}

impl<T: CatalogStore + SeekerStore + ApplicationStore> Store for T {}
