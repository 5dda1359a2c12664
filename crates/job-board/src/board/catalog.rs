use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use tracing::info;

use super::domain::{EmployerId, Job, JobId, JobPosting, JobType, UserId};
use super::repository::{BoardStore, RepositoryError};
use super::service::{BoardError, JobBoard};

/// Browse-feed query. Every supplied option must hold; `keyword` matches the title,
/// the description, or the owning company's name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub min_salary: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub max_salary: Option<u64>,
}

impl JobFilter {
    fn keyword(&self) -> Option<String> {
        non_blank(self.keyword.as_deref()).map(str::to_lowercase)
    }

    fn location(&self) -> Option<String> {
        non_blank(self.location.as_deref()).map(str::to_lowercase)
    }

    /// Test a single posting. `company` is the owning employer's name when known.
    pub fn matches(&self, job: &Job, company: Option<&str>) -> bool {
        let posting = &job.posting;

        if let Some(keyword) = self.keyword() {
            let hit = contains_ignore_case(&posting.title, &keyword)
                || contains_ignore_case(&posting.description, &keyword)
                || company.is_some_and(|name| contains_ignore_case(name, &keyword));
            if !hit {
                return false;
            }
        }

        if let Some(location) = self.location() {
            if !contains_ignore_case(&posting.location, &location) {
                return false;
            }
        }

        if let Some(job_type) = non_blank(self.job_type.as_deref()) {
            if posting.job_type.label() != job_type {
                return false;
            }
        }

        if self.min_salary.is_some() || self.max_salary.is_some() {
            let Some(salary) = posting.salary else {
                return false;
            };
            if self.min_salary.is_some_and(|min| salary < min) {
                return false;
            }
            if self.max_salary.is_some_and(|max| salary > max) {
                return false;
            }
        }

        true
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(u64),
        Text(String),
    }

    match Option::<Amount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Amount::Number(value)) => Ok(Some(value)),
        Some(Amount::Text(raw)) if raw.trim().is_empty() => Ok(None),
        Some(Amount::Text(raw)) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("'{raw}' is not a whole amount"))),
    }
}

/// Newest first; the zero-padded id breaks ties between postings created in the same instant.
pub(crate) fn sort_newest_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Employer-submitted posting fields. Used whole for creation and as a partial patch
/// for updates, where only supplied fields are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub salary: Option<u64>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default, alias = "expiry_date")]
    pub expiry_date: Option<String>,
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub(crate) fn parse_expiry(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|timestamp| timestamp.with_timezone(&Utc).date_naive())
        })
}

fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .map(|skill| skill.trim().to_string())
        .filter(|skill| !skill.is_empty() && seen.insert(skill.to_lowercase()))
        .collect()
}

fn required_text(
    value: Option<String>,
    field: &str,
    problems: &mut Vec<String>,
) -> Option<String> {
    match value.map(|text| text.trim().to_string()) {
        Some(text) if !text.is_empty() => Some(text),
        _ => {
            problems.push(format!("{field} is required"));
            None
        }
    }
}

fn job_type_field(raw: &str, problems: &mut Vec<String>) -> Option<JobType> {
    let parsed = JobType::parse(raw);
    if parsed.is_none() {
        problems.push("jobType must be one of Full-time, Part-time, Remote".to_string());
    }
    parsed
}

fn expiry_field(raw: &str, problems: &mut Vec<String>) -> Option<NaiveDate> {
    let parsed = parse_expiry(raw);
    if parsed.is_none() {
        problems.push("expiryDate must be a date (YYYY-MM-DD)".to_string());
    }
    parsed
}

impl JobDraft {
    /// Validate a complete posting, listing every missing or malformed field.
    pub fn into_posting(self) -> Result<JobPosting, BoardError> {
        let mut problems = Vec::new();

        let title = required_text(self.title, "title", &mut problems);
        let description = required_text(self.description, "description", &mut problems);
        let location = required_text(self.location, "location", &mut problems);
        let job_type = match non_blank(self.job_type.as_deref()) {
            Some(raw) => job_type_field(raw, &mut problems),
            None => {
                problems.push("jobType is required".to_string());
                None
            }
        };
        let expiry_date = match non_blank(self.expiry_date.as_deref()) {
            Some(raw) => expiry_field(raw, &mut problems),
            None => {
                problems.push("expiryDate is required".to_string());
                None
            }
        };

        match (title, description, location, job_type, expiry_date) {
            (Some(title), Some(description), Some(location), Some(job_type), Some(expiry_date))
                if problems.is_empty() =>
            {
                Ok(JobPosting {
                    title,
                    description,
                    location,
                    salary: self.salary,
                    experience: self
                        .experience
                        .map(|text| text.trim().to_string())
                        .filter(|text| !text.is_empty()),
                    skills: normalize_skills(self.skills.unwrap_or_default()),
                    job_type,
                    expiry_date,
                })
            }
            _ => Err(BoardError::Validation(problems)),
        }
    }

    /// Merge only the supplied fields into `posting`.
    pub fn merge_into(self, mut posting: JobPosting) -> Result<JobPosting, BoardError> {
        let mut problems = Vec::new();

        if self.title.is_some() {
            if let Some(title) = required_text(self.title, "title", &mut problems) {
                posting.title = title;
            }
        }
        if self.description.is_some() {
            if let Some(description) =
                required_text(self.description, "description", &mut problems)
            {
                posting.description = description;
            }
        }
        if self.location.is_some() {
            if let Some(location) = required_text(self.location, "location", &mut problems) {
                posting.location = location;
            }
        }
        if let Some(salary) = self.salary {
            posting.salary = Some(salary);
        }
        if let Some(experience) = self.experience {
            let experience = experience.trim().to_string();
            posting.experience = (!experience.is_empty()).then_some(experience);
        }
        if let Some(skills) = self.skills {
            posting.skills = normalize_skills(skills);
        }
        if let Some(raw) = self.job_type.as_deref() {
            if let Some(job_type) = job_type_field(raw, &mut problems) {
                posting.job_type = job_type;
            }
        }
        if let Some(raw) = self.expiry_date.as_deref() {
            if let Some(expiry_date) = expiry_field(raw, &mut problems) {
                posting.expiry_date = expiry_date;
            }
        }

        if problems.is_empty() {
            Ok(posting)
        } else {
            Err(BoardError::Validation(problems))
        }
    }
}

impl<S> JobBoard<S>
where
    S: BoardStore + 'static,
{
    /// Filtered catalog search minus `exclude`, newest first. Never fails on an empty match.
    pub fn list_jobs(
        &self,
        filter: &JobFilter,
        exclude: &HashSet<JobId>,
    ) -> Result<Vec<Job>, BoardError> {
        let companies = if filter.keyword().is_some() {
            self.company_names()?
        } else {
            HashMap::new()
        };

        let mut jobs: Vec<Job> = self
            .store
            .list_jobs()?
            .into_iter()
            .filter(|job| !exclude.contains(&job.id))
            .filter(|job| {
                let company = companies.get(&job.employer_id).map(String::as_str);
                filter.matches(job, company)
            })
            .collect();
        sort_newest_first(&mut jobs);
        Ok(jobs)
    }

    fn company_names(&self) -> Result<HashMap<EmployerId, String>, BoardError> {
        Ok(self
            .store
            .list_employers()?
            .into_iter()
            .map(|profile| (profile.id, profile.details.company_name))
            .collect())
    }

    /// Post a job on behalf of the employer account `employer_user`.
    pub fn create_job(&self, employer_user: &UserId, draft: JobDraft) -> Result<Job, BoardError> {
        let posting = draft.into_posting()?;
        let employer = self
            .store
            .employer_for_user(employer_user)?
            .ok_or_else(|| BoardError::not_found("employer profile"))?;

        let now = Utc::now();
        let job = self.store.insert_job(Job {
            id: JobId::generate(),
            employer_id: employer.id.clone(),
            posting,
            applications: Vec::new(),
            date_posted: now,
            created_at: now,
            updated_at: now,
        })?;

        if let Err(err) = self.store.attach_posted_job(&employer.id, &job.id) {
            tracing::warn!(job_id = %job.id, error = %err, "rolling back job without owner");
            self.store.delete_job(&job.id)?;
            return Err(match err {
                RepositoryError::NotFound => {
                    BoardError::not_found("employer profile")
                }
                other => other.into(),
            });
        }

        info!(job_id = %job.id, employer_id = %employer.id, "job posted");
        Ok(job)
    }

    pub fn update_job(&self, job_id: &JobId, draft: JobDraft) -> Result<Job, BoardError> {
        let existing = self
            .store
            .fetch_job(job_id)?
            .ok_or_else(|| BoardError::not_found("job"))?;
        let posting = draft.merge_into(existing.posting)?;
        let job = self.store.replace_posting(job_id, posting).map_err(|err| match err {
            RepositoryError::NotFound => BoardError::not_found("job"),
            other => other.into(),
        })?;
        info!(job_id = %job.id, "job updated");
        Ok(job)
    }

    /// Remove a posting and pull it from the owner's posted jobs. Seeker references
    /// are left in place; seeker views skip jobs that no longer resolve.
    pub fn delete_job(&self, job_id: &JobId) -> Result<Job, BoardError> {
        let job = self
            .store
            .delete_job(job_id)?
            .ok_or_else(|| BoardError::not_found("job"))?;
        if !self.store.detach_posted_job(&job.employer_id, &job.id)? {
            tracing::warn!(job_id = %job.id, employer_id = %job.employer_id, "owner profile already gone");
        }
        info!(job_id = %job.id, "job deleted");
        Ok(job)
    }
}
