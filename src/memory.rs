use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::{PortalError, Result};
use crate::models::{
    optional, required, Application, ApplicationStatus, Employer, JobListing, JobSeeker,
    NewAccount, NewEmployer, NewJob, ProfileUpdate,
};
use crate::store::{ApplicationStore, CatalogStore, SeekerStore};

/// Process-local store with the same constraints as the SQLite schema.
/// Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    employers: Vec<Employer>,
    jobs: Vec<StoredJob>,
    seekers: Vec<JobSeeker>,
    applications: Vec<Application>,
    last_id: i64,
}

struct StoredJob {
    id: i64,
    title: String,
    description: String,
    salary: Option<String>,
    employer_id: Option<i64>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn listing(&self, job: &StoredJob) -> JobListing {
        let company = job
            .employer_id
            .and_then(|id| self.employers.iter().find(|e| e.id == id))
            .map(|e| e.company.clone());
        JobListing {
            id: job.id,
            title: job.title.clone(),
            description: job.description.clone(),
            salary: job.salary.clone(),
            employer_id: job.employer_id,
            company,
        }
    }

    fn seeker_by_email(&mut self, email: &str) -> Option<&mut JobSeeker> {
        self.seekers.iter_mut().find(|s| s.email == email)
    }

    fn email_taken(&self, email: &str) -> bool {
        self.seekers.iter().any(|s| s.email == email)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| PortalError::Connectivity("in-memory store lock poisoned".to_string()))
    }
}

/// Two optional values collide only when both are present and equal, matching
/// SQL UNIQUE semantics for NULL.
fn collides(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

impl CatalogStore for MemoryStore {
    fn add_employer(&self, employer: &NewEmployer) -> Result<i64> {
        let employer = employer.normalized()?;
        let mut state = self.state()?;

        for existing in &state.employers {
            if existing.company == employer.company {
                return Err(PortalError::ConstraintViolation(format!(
                    "company '{}'",
                    employer.company
                )));
            }
            if collides(&existing.website, &employer.website) {
                return Err(PortalError::ConstraintViolation("employer website".to_string()));
            }
            if collides(&existing.phone, &employer.phone) {
                return Err(PortalError::ConstraintViolation("employer phone".to_string()));
            }
        }

        let id = state.next_id();
        info!(employer_id = id, company = %employer.company, "added employer");
        state.employers.push(Employer {
            id,
            company: employer.company,
            industry: employer.industry,
            location: employer.location,
            website: employer.website,
            contact_person: employer.contact_person,
            phone: employer.phone,
        });
        Ok(id)
    }

    fn list_employers(&self) -> Result<Vec<Employer>> {
        let state = self.state()?;
        let mut employers = state.employers.clone();
        employers.sort_by(|a, b| a.company.cmp(&b.company));
        Ok(employers)
    }

    fn add_job(&self, job: &NewJob) -> Result<i64> {
        let job = job.normalized()?;
        let mut state = self.state()?;
        if let Some(employer_id) = job.employer_id {
            if !state.employers.iter().any(|e| e.id == employer_id) {
                return Err(PortalError::not_found(format!("employer #{}", employer_id)));
            }
        }

        let id = state.next_id();
        info!(job_id = id, title = %job.title, "added job listing");
        state.jobs.push(StoredJob {
            id,
            title: job.title,
            description: job.description,
            salary: job.salary,
            employer_id: job.employer_id,
        });
        Ok(id)
    }

    fn get_job(&self, id: i64) -> Result<Option<JobListing>> {
        let state = self.state()?;
        Ok(state.jobs.iter().find(|j| j.id == id).map(|j| state.listing(j)))
    }

    fn list_jobs(&self) -> Result<Vec<JobListing>> {
        let state = self.state()?;
        // ids only grow, so insertion order reversed is newest first
        let jobs: Vec<JobListing> = state.jobs.iter().rev().map(|j| state.listing(j)).collect();
        debug!(count = jobs.len(), "listed jobs");
        Ok(jobs)
    }
}

impl SeekerStore for MemoryStore {
    fn find_by_email(&self, email: &str) -> Result<Option<JobSeeker>> {
        let email = email.trim();
        let state = self.state()?;
        Ok(state.seekers.iter().find(|s| s.email == email).cloned())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<JobSeeker>> {
        let username = username.trim();
        let state = self.state()?;
        Ok(state
            .seekers
            .iter()
            .find(|s| s.username.as_deref() == Some(username))
            .cloned())
    }

    fn upsert_profile(&self, profile: &ProfileUpdate) -> Result<JobSeeker> {
        let profile = profile.normalized()?;
        let mut state = self.state()?;

        if let Some(seeker) = state.seeker_by_email(&profile.email) {
            seeker.name = profile.name;
            seeker.experience = profile.experience;
            seeker.skills = profile.skills;
            info!(jobseeker_id = seeker.id, "updated profile");
            return Ok(seeker.clone());
        }

        let id = state.next_id();
        let seeker = JobSeeker {
            name: profile.name,
            experience: profile.experience,
            skills: profile.skills,
            ..JobSeeker::with_email(id, profile.email)
        };
        info!(jobseeker_id = id, "created profile");
        state.seekers.push(seeker.clone());
        Ok(seeker)
    }

    fn create_account(&self, account: &NewAccount) -> Result<JobSeeker> {
        let account = account.normalized()?;
        let mut state = self.state()?;

        if state
            .seekers
            .iter()
            .any(|s| s.username.as_deref() == Some(account.username.as_str()))
        {
            return Err(PortalError::ConstraintViolation(format!(
                "username '{}'",
                account.username
            )));
        }
        if state.email_taken(&account.email) {
            return Err(PortalError::ConstraintViolation(format!("email '{}'", account.email)));
        }

        let id = state.next_id();
        let seeker = JobSeeker {
            username: Some(account.username),
            password: Some(account.password),
            name: account.name,
            ..JobSeeker::with_email(id, account.email)
        };
        info!(jobseeker_id = id, "created account");
        state.seekers.push(seeker.clone());
        Ok(seeker)
    }

    fn register_email(&self, email: &str) -> Result<JobSeeker> {
        let email = required("email", email)?;
        let mut state = self.state()?;
        if state.email_taken(&email) {
            return Err(PortalError::ConstraintViolation(format!("email '{}'", email)));
        }

        let id = state.next_id();
        let seeker = JobSeeker::with_email(id, email);
        info!(jobseeker_id = id, "registered job seeker by email");
        state.seekers.push(seeker.clone());
        Ok(seeker)
    }

    fn set_picture(&self, email: &str, path: &str) -> Result<JobSeeker> {
        let email = required("email", email)?;
        let mut state = self.state()?;
        let seeker = state
            .seeker_by_email(&email)
            .ok_or_else(|| PortalError::not_found(format!("job seeker with email {}", email)))?;
        seeker.picture_path = Some(path.to_string());
        Ok(seeker.clone())
    }
}

impl ApplicationStore for MemoryStore {
    fn apply(&self, job_id: i64, jobseeker_id: i64, cover_letter: Option<&str>) -> Result<i64> {
        let mut state = self.state()?;
        if !state.jobs.iter().any(|j| j.id == job_id) {
            return Err(PortalError::not_found(format!("job #{}", job_id)));
        }
        if !state.seekers.iter().any(|s| s.id == jobseeker_id) {
            return Err(PortalError::not_found(format!("job seeker #{}", jobseeker_id)));
        }
        if state
            .applications
            .iter()
            .any(|a| a.job_id == job_id && a.jobseeker_id == jobseeker_id)
        {
            info!(job_id, jobseeker_id, "rejected duplicate application");
            return Err(PortalError::DuplicateApplication { job_id, jobseeker_id });
        }

        let id = state.next_id();
        state.applications.push(Application {
            id,
            job_id,
            jobseeker_id,
            applied_at: Utc::now(),
            status: ApplicationStatus::Pending,
            cover_letter: optional(cover_letter),
        });
        info!(application_id = id, job_id, jobseeker_id, "recorded application");
        Ok(id)
    }

    fn applications_for(&self, jobseeker_id: i64) -> Result<Vec<Application>> {
        let state = self.state()?;
        Ok(state
            .applications
            .iter()
            .filter(|a| a.jobseeker_id == jobseeker_id)
            .cloned()
            .collect())
    }
}
