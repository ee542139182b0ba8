use std::collections::HashMap;
use tracing::info;

use crate::error::Result;
use crate::models::{NewEmployer, NewJob};
use crate::store::CatalogStore;

// (company, industry, location, website, contact person, phone)
const SAMPLE_EMPLOYERS: [(&str, &str, &str, &str, &str, &str); 3] = [
    ("Tech Solutions", "Software", "Bengaluru", "https://techsolutions.example", "A. Kumar", "+91-9876543210"),
    ("Data Insights", "Analytics", "Pune", "https://datainsights.example", "S. Rao", "+91-9988776655"),
    ("Global Marketing", "Marketing", "Mumbai", "https://globalmkt.example", "R. Singh", "+91-9123456780"),
];

// (title, description, salary, company)
const SAMPLE_JOBS: [(&str, &str, &str, &str); 3] = [
    ("Software Engineer", "Develop web applications", "$100,000", "Tech Solutions"),
    ("Data Scientist", "Analyze data and build predictive models", "$120,000", "Data Insights"),
    ("Marketing Manager", "Lead marketing campaigns", "$90,000", "Global Marketing"),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub employers_added: usize,
    pub jobs_added: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.employers_added == 0 && self.jobs_added == 0
    }
}

/// Fill an empty catalog with sample employers and jobs. Tables that already
/// hold rows are left alone, so running this twice adds nothing.
pub fn seed_if_empty(store: &impl CatalogStore) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if store.list_employers()?.is_empty() {
        for (company, industry, location, website, contact, phone) in SAMPLE_EMPLOYERS {
            store.add_employer(&NewEmployer {
                company: company.to_string(),
                industry: Some(industry.to_string()),
                location: Some(location.to_string()),
                website: Some(website.to_string()),
                contact_person: Some(contact.to_string()),
                phone: Some(phone.to_string()),
            })?;
            report.employers_added += 1;
        }
    }

    if store.list_jobs()?.is_empty() {
        let ids: HashMap<String, i64> = store
            .list_employers()?
            .into_iter()
            .map(|e| (e.company, e.id))
            .collect();
        for (title, description, salary, company) in SAMPLE_JOBS {
            store.add_job(&NewJob {
                title: title.to_string(),
                description: description.to_string(),
                salary: Some(salary.to_string()),
                employer_id: ids.get(company).copied(),
            })?;
            report.jobs_added += 1;
        }
    }

    if !report.is_empty() {
        info!(
            employers = report.employers_added,
            jobs = report.jobs_added,
            "seeded sample catalog"
        );
    }
    Ok(report)
}
