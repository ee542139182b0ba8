use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{PortalError, Result};

pub const UNKNOWN_COMPANY: &str = "Unknown";
pub const NO_SALARY: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employer {
    pub id: i64,
    pub company: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEmployer {
    pub company: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
}

impl NewEmployer {
    /// Trim every field, turning blank optionals into `None`. Fails when the company is empty.
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            company: required("company", &self.company)?,
            industry: optional(self.industry.as_deref()),
            location: optional(self.location.as_deref()),
            website: optional(self.website.as_deref()),
            contact_person: optional(self.contact_person.as_deref()),
            phone: optional(self.phone.as_deref()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "serialize_salary")]
    pub salary: Option<String>,
    pub employer_id: Option<i64>,
    #[serde(serialize_with = "serialize_company")]
    pub company: Option<String>, // denormalized from the employer row
}

impl JobListing {
    pub fn company_display(&self) -> &str {
        self.company.as_deref().unwrap_or(UNKNOWN_COMPANY)
    }

    pub fn salary_display(&self) -> &str {
        match self.salary.as_deref() {
            Some(salary) if !salary.trim().is_empty() => salary,
            _ => NO_SALARY,
        }
    }
}

// JSON output follows the same display rules as the table.
fn serialize_salary<S: Serializer>(
    salary: &Option<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match salary.as_deref() {
        Some(salary) if !salary.trim().is_empty() => serializer.serialize_str(salary),
        _ => serializer.serialize_str(NO_SALARY),
    }
}

fn serialize_company<S: Serializer>(
    company: &Option<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(company.as_deref().unwrap_or(UNKNOWN_COMPANY))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub salary: Option<String>,
    pub employer_id: Option<i64>,
}

impl NewJob {
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            title: required("title", &self.title)?,
            description: required("description", &self.description)?,
            salary: optional(self.salary.as_deref()),
            employer_id: self.employer_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSeeker {
    pub id: i64,
    pub username: Option<String>,
    #[serde(skip_serializing, default)]
    pub password: Option<String>, // opaque, stored as given
    pub name: Option<String>,
    pub email: String,
    pub experience: Option<String>,
    pub skills: Option<String>,
    pub picture_path: Option<String>,
}

impl JobSeeker {
    /// A seeker row carrying nothing but its natural key.
    pub fn with_email(id: i64, email: String) -> Self {
        Self {
            id,
            username: None,
            password: None,
            name: None,
            email,
            experience: None,
            skills: None,
            picture_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub name: Option<String>,
    pub email: String,
}

impl NewAccount {
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            username: required("username", &self.username)?,
            password: self.password.clone(),
            name: optional(self.name.as_deref()),
            email: required("email", &self.email)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: String,
    pub name: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<String>,
}

impl ProfileUpdate {
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            email: required("email", &self.email)?,
            name: optional(self.name.as_deref()),
            experience: optional(self.experience.as_deref()),
            skills: optional(self.skills.as_deref()),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(ApplicationStatus::Pending),
            "Accepted" => Ok(ApplicationStatus::Accepted),
            "Rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(PortalError::Validation(format!(
                "unknown application status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub jobseeker_id: i64,
    pub applied_at: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
}

// --- Field normalisation ---

pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PortalError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(company: Option<&str>, salary: Option<&str>) -> JobListing {
        JobListing {
            id: 1,
            title: "Accountant".to_string(),
            description: "Maintain financial records".to_string(),
            salary: salary.map(str::to_string),
            employer_id: None,
            company: company.map(str::to_string),
        }
    }

    #[test]
    fn test_display_falls_back_for_orphan_listing() {
        let job = listing(None, None);
        assert_eq!(job.company_display(), "Unknown");
        assert_eq!(job.salary_display(), "N/A");

        let blank_salary = listing(Some("Finance Corp"), Some("  "));
        assert_eq!(blank_salary.company_display(), "Finance Corp");
        assert_eq!(blank_salary.salary_display(), "N/A");
    }

    #[test]
    fn test_json_applies_display_rules() {
        let orphan = serde_json::to_value(listing(None, None)).unwrap();
        assert_eq!(orphan["company"], "Unknown");
        assert_eq!(orphan["salary"], "N/A");
        assert!(orphan["employer_id"].is_null());

        let listed = serde_json::to_value(listing(Some("Finance Corp"), Some("$80,000"))).unwrap();
        assert_eq!(listed["company"], "Finance Corp");
        assert_eq!(listed["salary"], "$80,000");
    }

    #[test]
    fn test_new_job_requires_title_and_description() {
        let job = NewJob {
            title: "  ".to_string(),
            description: "Lead marketing campaigns".to_string(),
            ..Default::default()
        };
        assert!(matches!(job.normalized(), Err(PortalError::Validation(_))));

        let job = NewJob {
            title: "Marketing Manager".to_string(),
            description: String::new(),
            ..Default::default()
        };
        assert!(matches!(job.normalized(), Err(PortalError::Validation(_))));
    }

    #[test]
    fn test_normalized_trims_and_drops_blank_optionals() {
        let employer = NewEmployer {
            company: "  Sales Pro ".to_string(),
            industry: Some("".to_string()),
            website: Some(" https://salespro.example ".to_string()),
            ..Default::default()
        };
        let normalized = employer.normalized().unwrap();
        assert_eq!(normalized.company, "Sales Pro");
        assert_eq!(normalized.industry, None);
        assert_eq!(normalized.website.as_deref(), Some("https://salespro.example"));
    }

    #[test]
    fn test_account_keeps_password_verbatim() {
        let account = NewAccount {
            username: " jdoe ".to_string(),
            password: " s3cret ".to_string(),
            name: None,
            email: "jdoe@example.com".to_string(),
        };
        let normalized = account.normalized().unwrap();
        assert_eq!(normalized.username, "jdoe");
        assert_eq!(normalized.password, " s3cret ");
    }

    #[test]
    fn test_seeker_serialization_hides_password() {
        let mut seeker = JobSeeker::with_email(7, "a@b.c".to_string());
        seeker.password = Some("hunter2".to_string());
        let json = serde_json::to_string(&seeker).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_status_parses_and_defaults_to_pending() {
        assert_eq!("Rejected".parse::<ApplicationStatus>().unwrap(), ApplicationStatus::Rejected);
        assert_eq!(ApplicationStatus::default(), ApplicationStatus::Pending);
        assert_eq!(format!("{:<9}|", ApplicationStatus::Pending), "Pending  |");
        assert!("approved".parse::<ApplicationStatus>().is_err());
    }
}
