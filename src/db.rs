use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{PortalError, Result};
use crate::models::{
    optional, required, Application, ApplicationStatus, Employer, JobListing, JobSeeker,
    NewAccount, NewEmployer, NewJob, ProfileUpdate,
};
use crate::store::{ApplicationStore, CatalogStore, SeekerStore};

/// SQLite-backed store. Works against a database file or a private in-memory database.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                PortalError::Connectivity(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        let conn = Connection::open(path).map_err(|e| {
            PortalError::Connectivity(format!("cannot open {}: {}", path.display(), e))
        })?;
        let db = Self { conn };
        db.init()?;
        info!(path = %path.display(), "opened sqlite store");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| PortalError::Connectivity(format!("cannot open in-memory database: {}", e)))?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    pub fn default_path() -> PathBuf {
        // XDG data directory, or the working directory when there is no home
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobportal") {
            proj_dirs.data_dir().join("jobportal.db")
        } else {
            PathBuf::from("jobportal.db")
        }
    }

    /// Create the four portal tables if they are missing. Safe to call on every open.
    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS employer (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company TEXT NOT NULL UNIQUE,
                industry TEXT,
                location TEXT,
                website TEXT UNIQUE,
                contact_person TEXT,
                phone TEXT UNIQUE
            );

            CREATE TABLE IF NOT EXISTS jobseeker (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE,
                password_opaque TEXT,
                name TEXT,
                email TEXT NOT NULL UNIQUE,
                experience TEXT,
                skills TEXT,
                picture_path TEXT
            );

            CREATE TABLE IF NOT EXISTS joblisting (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                salary TEXT,
                employer_id INTEGER REFERENCES employer(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS job_application (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                job_id INTEGER NOT NULL REFERENCES joblisting(id) ON DELETE CASCADE,
                jobseeker_id INTEGER NOT NULL REFERENCES jobseeker(id) ON DELETE CASCADE,
                applied_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Pending' CHECK (status IN ('Pending', 'Accepted', 'Rejected')),
                cover_letter TEXT,
                UNIQUE (job_id, jobseeker_id)
            );

            CREATE INDEX IF NOT EXISTS idx_joblisting_employer ON joblisting(employer_id);
            CREATE INDEX IF NOT EXISTS idx_application_seeker ON job_application(jobseeker_id);
            "#,
        )?;
        Ok(())
    }

    fn exists(&self, sql: &str, id: i64) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(sql, [id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn get_seeker(&self, id: i64) -> Result<JobSeeker> {
        let sql = format!("{} WHERE id = ?1", SEEKER_SELECT_SQL);
        self.conn
            .query_row(&sql, [id], Self::row_to_seeker)
            .optional()?
            .ok_or_else(|| PortalError::not_found(format!("job seeker #{}", id)))
    }

    fn find_seeker(&self, column: &str, value: &str) -> Result<Option<JobSeeker>> {
        let sql = format!("{} WHERE {} = ?1", SEEKER_SELECT_SQL, column);
        let seeker = self.conn.query_row(&sql, [value], Self::row_to_seeker).optional()?;
        Ok(seeker)
    }

    fn row_to_employer(row: &rusqlite::Row) -> rusqlite::Result<Employer> {
        Ok(Employer {
            id: row.get(0)?,
            company: row.get(1)?,
            industry: row.get(2)?,
            location: row.get(3)?,
            website: row.get(4)?,
            contact_person: row.get(5)?,
            phone: row.get(6)?,
        })
    }

    fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<JobListing> {
        Ok(JobListing {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            salary: row.get(3)?,
            employer_id: row.get(4)?,
            company: row.get(5)?,
        })
    }

    fn row_to_seeker(row: &rusqlite::Row) -> rusqlite::Result<JobSeeker> {
        Ok(JobSeeker {
            id: row.get(0)?,
            username: row.get(1)?,
            password: row.get(2)?,
            name: row.get(3)?,
            email: row.get(4)?,
            experience: row.get(5)?,
            skills: row.get(6)?,
            picture_path: row.get(7)?,
        })
    }

    fn row_to_application(row: &rusqlite::Row) -> rusqlite::Result<Application> {
        let applied_at: String = row.get(3)?;
        let applied_at = DateTime::parse_from_rfc3339(&applied_at)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
        let status: String = row.get(4)?;
        let status = status
            .parse::<ApplicationStatus>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
        Ok(Application {
            id: row.get(0)?,
            job_id: row.get(1)?,
            jobseeker_id: row.get(2)?,
            applied_at,
            status,
            cover_letter: row.get(5)?,
        })
    }
}

const SEEKER_SELECT_SQL: &str =
    "SELECT id, username, password_opaque, name, email, experience, skills, picture_path
     FROM jobseeker";

const JOB_SELECT_SQL: &str = "SELECT j.id, j.title, j.description, j.salary, j.employer_id, e.company
     FROM joblisting j
     LEFT JOIN employer e ON j.employer_id = e.id";

// --- Catalog ---

impl CatalogStore for Database {
    fn add_employer(&self, employer: &NewEmployer) -> Result<i64> {
        let employer = employer.normalized()?;
        self.conn.execute(
            "INSERT INTO employer (company, industry, location, website, contact_person, phone)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                employer.company,
                employer.industry,
                employer.location,
                employer.website,
                employer.contact_person,
                employer.phone,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(employer_id = id, company = %employer.company, "added employer");
        Ok(id)
    }

    fn list_employers(&self) -> Result<Vec<Employer>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, company, industry, location, website, contact_person, phone
             FROM employer ORDER BY company",
        )?;
        let employers = stmt
            .query_map([], Self::row_to_employer)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = employers.len(), "listed employers");
        Ok(employers)
    }

    fn add_job(&self, job: &NewJob) -> Result<i64> {
        let job = job.normalized()?;
        if let Some(employer_id) = job.employer_id {
            if !self.exists("SELECT id FROM employer WHERE id = ?1", employer_id)? {
                return Err(PortalError::not_found(format!("employer #{}", employer_id)));
            }
        }

        self.conn.execute(
            "INSERT INTO joblisting (title, description, salary, employer_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![job.title, job.description, job.salary, job.employer_id],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(job_id = id, title = %job.title, "added job listing");
        Ok(id)
    }

    fn get_job(&self, id: i64) -> Result<Option<JobListing>> {
        let sql = format!("{} WHERE j.id = ?1", JOB_SELECT_SQL);
        let job = self.conn.query_row(&sql, [id], Self::row_to_job).optional()?;
        Ok(job)
    }

    fn list_jobs(&self) -> Result<Vec<JobListing>> {
        let sql = format!("{} ORDER BY j.id DESC", JOB_SELECT_SQL);
        let mut stmt = self.conn.prepare(&sql)?;
        let jobs = stmt
            .query_map([], Self::row_to_job)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = jobs.len(), "listed jobs");
        Ok(jobs)
    }
}

// --- Job seekers ---

impl SeekerStore for Database {
    fn find_by_email(&self, email: &str) -> Result<Option<JobSeeker>> {
        self.find_seeker("email", email.trim())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<JobSeeker>> {
        self.find_seeker("username", username.trim())
    }

    fn upsert_profile(&self, profile: &ProfileUpdate) -> Result<JobSeeker> {
        let profile = profile.normalized()?;
        let tx = self.conn.unchecked_transaction()?;

        let existing: Option<i64> = tx
            .query_row("SELECT id FROM jobseeker WHERE email = ?1", [&profile.email], |row| row.get(0))
            .optional()?;

        let id = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE jobseeker SET name = ?1, experience = ?2, skills = ?3 WHERE id = ?4",
                    params![profile.name, profile.experience, profile.skills, id],
                )?;
                info!(jobseeker_id = id, "updated profile");
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO jobseeker (name, email, experience, skills) VALUES (?1, ?2, ?3, ?4)",
                    params![profile.name, profile.email, profile.experience, profile.skills],
                )?;
                let id = tx.last_insert_rowid();
                info!(jobseeker_id = id, "created profile");
                id
            }
        };
        tx.commit()?;

        self.get_seeker(id)
    }

    fn create_account(&self, account: &NewAccount) -> Result<JobSeeker> {
        let account = account.normalized()?;
        self.conn.execute(
            "INSERT INTO jobseeker (username, password_opaque, name, email) VALUES (?1, ?2, ?3, ?4)",
            params![account.username, account.password, account.name, account.email],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(jobseeker_id = id, username = %account.username, "created account");
        self.get_seeker(id)
    }

    fn register_email(&self, email: &str) -> Result<JobSeeker> {
        let email = required("email", email)?;
        self.conn.execute("INSERT INTO jobseeker (email) VALUES (?1)", [&email])?;
        let id = self.conn.last_insert_rowid();
        info!(jobseeker_id = id, "registered job seeker by email");
        Ok(JobSeeker::with_email(id, email))
    }

    fn set_picture(&self, email: &str, path: &str) -> Result<JobSeeker> {
        let email = required("email", email)?;
        let changed = self.conn.execute(
            "UPDATE jobseeker SET picture_path = ?1 WHERE email = ?2",
            params![path, email],
        )?;
        if changed == 0 {
            return Err(PortalError::not_found(format!("job seeker with email {}", email)));
        }
        self.find_by_email(&email)?
            .ok_or_else(|| PortalError::not_found(format!("job seeker with email {}", email)))
    }
}

// --- Applications ---

impl ApplicationStore for Database {
    fn apply(&self, job_id: i64, jobseeker_id: i64, cover_letter: Option<&str>) -> Result<i64> {
        if !self.exists("SELECT id FROM joblisting WHERE id = ?1", job_id)? {
            return Err(PortalError::not_found(format!("job #{}", job_id)));
        }
        if !self.exists("SELECT id FROM jobseeker WHERE id = ?1", jobseeker_id)? {
            return Err(PortalError::not_found(format!("job seeker #{}", jobseeker_id)));
        }

        let inserted = self.conn.execute(
            "INSERT INTO job_application (job_id, jobseeker_id, applied_at, status, cover_letter)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                job_id,
                jobseeker_id,
                Utc::now().to_rfc3339(),
                ApplicationStatus::Pending.as_str(),
                optional(cover_letter),
            ],
        );

        match inserted {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                info!(application_id = id, job_id, jobseeker_id, "recorded application");
                Ok(id)
            }
            Err(e) if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                info!(job_id, jobseeker_id, "rejected duplicate application");
                Err(PortalError::DuplicateApplication { job_id, jobseeker_id })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn applications_for(&self, jobseeker_id: i64) -> Result<Vec<Application>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, job_id, jobseeker_id, applied_at, status, cover_letter
             FROM job_application WHERE jobseeker_id = ?1 ORDER BY id",
        )?;
        let applications = stmt
            .query_map([jobseeker_id], Self::row_to_application)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(applications)
    }
}
