use crate::models::JobListing;

/// Keep the jobs whose title, description, or company contains `query`,
/// ignoring case. A blank query keeps everything. Input order is preserved.
pub fn filter(jobs: &[JobListing], query: &str) -> Vec<JobListing> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return jobs.to_vec();
    }

    jobs.iter()
        .filter(|job| matches(job, &needle))
        .cloned()
        .collect()
}

/// `needle` must already be lowercased.
pub fn matches(job: &JobListing, needle: &str) -> bool {
    job.title.to_lowercase().contains(needle)
        || job.description.to_lowercase().contains(needle)
        || job.company_display().to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: i64, title: &str, description: &str, salary: &str, company: &str) -> JobListing {
        JobListing {
            id,
            title: title.to_string(),
            description: description.to_string(),
            salary: Some(salary.to_string()),
            employer_id: Some(id),
            company: Some(company.to_string()),
        }
    }

    fn catalog() -> Vec<JobListing> {
        vec![
            job(1, "Software Engineer", "Develop web apps", "$100k", "Tech Solutions"),
            job(2, "Data Scientist", "Analyze data", "$120k", "Data Insights"),
            job(3, "Marketing Manager", "Lead marketing campaigns", "$90k", "Global Marketing"),
            job(4, "Product Manager", "Manage product development lifecycle", "$110k", "Product Innovations"),
        ]
    }

    #[test]
    fn test_blank_query_returns_input_unchanged() {
        let jobs = catalog();
        assert_eq!(filter(&jobs, ""), jobs);
        assert_eq!(filter(&jobs, "   \t"), jobs);
    }

    #[test]
    fn test_data_query_matches_only_data_scientist() {
        let ids: Vec<i64> = filter(&catalog()[..2], "data").iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_match_is_case_insensitive_across_fields() {
        let jobs = catalog();
        let by_company: Vec<i64> = filter(&jobs, "TECH sol").iter().map(|j| j.id).collect();
        assert_eq!(by_company, vec![1]);

        let by_description: Vec<i64> = filter(&jobs, "Lifecycle").iter().map(|j| j.id).collect();
        assert_eq!(by_description, vec![4]);
    }

    #[test]
    fn test_query_is_trimmed_before_matching() {
        let ids: Vec<i64> = filter(&catalog(), "  manager ").iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn test_result_preserves_input_order() {
        let mut jobs = catalog();
        jobs.reverse();
        let ids: Vec<i64> = filter(&jobs, "manage").iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![4, 3]);
    }

    #[test]
    fn test_partition_is_exact() {
        let jobs = catalog();
        for query in ["a", "data", "mark", "xyz", "web"] {
            let kept = filter(&jobs, query);
            let needle = query.to_lowercase();
            for job in &jobs {
                let expected = [&job.title, &job.description, &job.company_display().to_string()]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle));
                assert_eq!(kept.contains(job), expected, "query {query:?} job {}", job.id);
            }
        }
    }

    #[test]
    fn test_orphan_listing_matches_unknown_company() {
        let mut orphan = job(9, "Accountant", "Maintain financial records", "", "");
        orphan.company = None;
        assert_eq!(filter(&[orphan.clone()], "unknown"), vec![orphan]);
    }
}
