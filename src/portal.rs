//! Session and profile façade.
//!
//! Presentation code (the CLI and the terminal browser) talks only to
//! [`Portal`]; it coordinates the catalog, job-seeker, and application stores
//! and never builds queries itself.

use tracing::{debug, info};

use crate::error::{PortalError, Result};
use crate::models::{
    required, Application, Employer, JobListing, JobSeeker, NewAccount, NewEmployer, NewJob,
    ProfileUpdate,
};
use crate::search;
use crate::store::Store;

pub struct Portal<S> {
    store: S,
}

impl<S: Store> Portal<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Look up a seeker by username. Passwords are not checked.
    pub fn login(&self, username: &str) -> Result<JobSeeker> {
        let username = required("username", username)?;
        let seeker = self
            .store
            .find_by_username(&username)?
            .ok_or_else(|| PortalError::not_found(format!("user '{}'", username)))?;
        info!(jobseeker_id = seeker.id, "login");
        Ok(seeker)
    }

    pub fn signup(&self, email: &str, username: &str, password: &str, name: Option<&str>) -> Result<JobSeeker> {
        self.store.create_account(&NewAccount {
            username: username.to_string(),
            password: password.to_string(),
            name: name.map(str::to_string),
            email: email.to_string(),
        })
    }

    pub fn save_profile(
        &self,
        email: &str,
        name: Option<&str>,
        experience: Option<&str>,
        skills: Option<&str>,
    ) -> Result<JobSeeker> {
        self.store.upsert_profile(&ProfileUpdate {
            email: email.to_string(),
            name: name.map(str::to_string),
            experience: experience.map(str::to_string),
            skills: skills.map(str::to_string),
        })
    }

    pub fn profile(&self, email: &str) -> Result<JobSeeker> {
        let email = required("email", email)?;
        self.store
            .find_by_email(&email)?
            .ok_or_else(|| PortalError::not_found(format!("job seeker with email {}", email)))
    }

    /// Store the picture path as given; the file itself is never read.
    pub fn set_picture(&self, email: &str, path: &str) -> Result<JobSeeker> {
        self.store.set_picture(email, path)
    }

    /// Apply to a job by email, registering the email as a bare job seeker
    /// when it is not known yet.
    pub fn apply_to_job(&self, job_id: i64, email: &str, cover_letter: Option<&str>) -> Result<i64> {
        let email = required("email", email)?;
        // An unknown job must not leave a freshly registered seeker behind.
        let job = self.job(job_id)?;
        let seeker = match self.store.find_by_email(&email)? {
            Some(seeker) => seeker,
            None => {
                debug!(job_id, "first application from new email");
                self.store.register_email(&email)?
            }
        };
        self.store.apply(job.id, seeker.id, cover_letter)
    }

    pub fn applications(&self, email: &str) -> Result<Vec<Application>> {
        let seeker = self.profile(email)?;
        self.store.applications_for(seeker.id)
    }

    pub fn jobs(&self) -> Result<Vec<JobListing>> {
        self.store.list_jobs()
    }

    pub fn search(&self, query: &str) -> Result<Vec<JobListing>> {
        let jobs = self.store.list_jobs()?;
        let found = search::filter(&jobs, query);
        debug!(query, matched = found.len(), total = jobs.len(), "searched jobs");
        Ok(found)
    }

    pub fn job(&self, id: i64) -> Result<JobListing> {
        self.store
            .get_job(id)?
            .ok_or_else(|| PortalError::not_found(format!("job #{}", id)))
    }

    pub fn post_job(
        &self,
        title: &str,
        description: &str,
        salary: Option<&str>,
        employer_id: Option<i64>,
    ) -> Result<i64> {
        self.store.add_job(&NewJob {
            title: title.to_string(),
            description: description.to_string(),
            salary: salary.map(str::to_string),
            employer_id,
        })
    }

    pub fn add_employer(&self, employer: &NewEmployer) -> Result<i64> {
        self.store.add_employer(employer)
    }

    pub fn employers(&self) -> Result<Vec<Employer>> {
        self.store.list_employers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::memory::MemoryStore;
    use crate::models::ApplicationStatus;
    use crate::seed::seed_if_empty;
    use crate::store::{ApplicationStore, SeekerStore};

    fn sqlite_portal() -> Portal<Database> {
        Portal::new(Database::open_in_memory().expect("in-memory database"))
    }

    #[test]
    fn test_apply_with_new_email_creates_bare_seeker() {
        let portal = sqlite_portal();
        let job_id = portal
            .post_job("Software Engineer", "Develop web applications", Some("$100,000"), None)
            .unwrap();
        assert!(portal.store().find_by_email("new@x.com").unwrap().is_none());

        let application_id = portal.apply_to_job(job_id, "new@x.com", None).unwrap();

        let seeker = portal.profile("new@x.com").unwrap();
        assert_eq!(seeker.username, None);
        assert_eq!(seeker.name, None);
        assert_eq!(seeker.experience, None);
        assert_eq!(seeker.skills, None);

        let applications = portal.applications("new@x.com").unwrap();
        assert_eq!(applications.len(), 1);
        assert_eq!(applications[0].id, application_id);
        assert_eq!(applications[0].job_id, job_id);
        assert_eq!(applications[0].status, ApplicationStatus::Pending);
    }

    #[test]
    fn test_second_apply_by_same_email_is_duplicate() {
        let portal = Portal::new(MemoryStore::new());
        seed_if_empty(portal.store()).unwrap();
        let job_id = portal.jobs().unwrap()[0].id;

        portal.apply_to_job(job_id, "twice@example.com", Some("Cover")).unwrap();
        let err = portal.apply_to_job(job_id, " twice@example.com ", None).unwrap_err();
        assert!(matches!(err, PortalError::DuplicateApplication { .. }));
        assert_eq!(portal.applications("twice@example.com").unwrap().len(), 1);
    }

    #[test]
    fn test_apply_reuses_existing_account() {
        let portal = sqlite_portal();
        let job_id = portal.post_job("HR Manager", "Oversee HR", None, None).unwrap();
        let account = portal.signup("hr@example.com", "hrfan", "pw", Some("Hana")).unwrap();

        portal.apply_to_job(job_id, "hr@example.com", None).unwrap();
        let applications = portal.store().applications_for(account.id);
        assert_eq!(applications.unwrap().len(), 1);
    }

    #[test]
    fn test_apply_requires_email() {
        let portal = sqlite_portal();
        let job_id = portal.post_job("HR Manager", "Oversee HR", None, None).unwrap();
        assert!(matches!(
            portal.apply_to_job(job_id, "  ", None),
            Err(PortalError::Validation(_))
        ));
    }

    #[test]
    fn test_apply_to_missing_job_is_not_found() {
        let portal = Portal::new(MemoryStore::new());
        assert!(matches!(
            portal.apply_to_job(77, "ghost@example.com", None),
            Err(PortalError::NotFound(_))
        ));
        assert!(portal.store().find_by_email("ghost@example.com").unwrap().is_none());
    }

    #[test]
    fn test_failed_apply_leaves_no_seeker_in_sqlite() {
        let portal = sqlite_portal();
        let err = portal.apply_to_job(999, "ghost@example.com", None).unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
        assert!(portal.store().find_by_email("ghost@example.com").unwrap().is_none());
    }

    #[test]
    fn test_login_is_lookup_only() {
        let portal = sqlite_portal();
        portal.signup("sam@example.com", "sam", "secret", None).unwrap();

        let seeker = portal.login("sam").unwrap();
        assert_eq!(seeker.email, "sam@example.com");
        assert!(matches!(portal.login("nobody"), Err(PortalError::NotFound(_))));
        assert!(matches!(portal.login(""), Err(PortalError::Validation(_))));
    }

    #[test]
    fn test_signup_with_taken_username_creates_nothing() {
        let portal = Portal::new(MemoryStore::new());
        portal.signup("a@example.com", "taken", "pw", None).unwrap();

        let err = portal.signup("b@example.com", "taken", "pw", None).unwrap_err();
        assert!(matches!(err, PortalError::ConstraintViolation(_)));
        assert!(portal.store().find_by_email("b@example.com").unwrap().is_none());
    }

    #[test]
    fn test_save_profile_twice_keeps_one_row_with_latest_name() {
        let portal = sqlite_portal();
        let first = portal
            .save_profile("lee@example.com", Some("Lee"), Some("1 year"), Some("SQL"))
            .unwrap();
        let second = portal
            .save_profile("lee@example.com", Some("Lee Chen"), Some("1 year"), Some("SQL"))
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(portal.profile("lee@example.com").unwrap().name.as_deref(), Some("Lee Chen"));
    }

    #[test]
    fn test_set_picture_stores_path_verbatim() {
        let portal = Portal::new(MemoryStore::new());
        portal.save_profile("pic@example.com", Some("Pat"), None, None).unwrap();

        let seeker = portal.set_picture("pic@example.com", "C:\\Users\\pat\\me.jpg").unwrap();
        assert_eq!(seeker.picture_path.as_deref(), Some("C:\\Users\\pat\\me.jpg"));
    }

    #[test]
    fn test_search_filters_the_catalog() {
        let portal = sqlite_portal();
        seed_if_empty(portal.store()).unwrap();

        let found = portal.search("DATA").unwrap();
        let titles: Vec<&str> = found.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Data Scientist"]);
        assert_eq!(portal.search(" ").unwrap(), portal.jobs().unwrap());
    }

    #[test]
    fn test_job_lookup_reports_missing_id() {
        let portal = Portal::new(MemoryStore::new());
        assert!(matches!(portal.job(5), Err(PortalError::NotFound(_))));
    }
}
