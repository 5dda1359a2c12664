use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::catalog::sort_newest_first;
use super::domain::{
    ApplicationStatus, ContactCard, EmployerDetails, EmployerId, EmployerProfile, Education, Job,
    JobId, SeekerId, UserId, WorkExperience,
};
use super::repository::{BoardStore, RepositoryError};
use super::service::{BoardError, JobBoard};
use crate::access::{Capability, Principal};

/// Employer profile submission. Absent fields keep their current value on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerProfileInput {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_profile: Option<String>,
    #[serde(default)]
    pub company_website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

fn optional_text(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

impl EmployerProfileInput {
    fn merge_into(self, mut details: EmployerDetails) -> Result<EmployerDetails, BoardError> {
        if let Some(company_name) = self.company_name {
            details.company_name = company_name.trim().to_string();
        }
        if details.company_name.is_empty() {
            return Err(BoardError::Validation(vec![
                "companyName is required".to_string(),
            ]));
        }
        if let Some(profile) = self.company_profile {
            details.company_profile = optional_text(profile);
        }
        if let Some(website) = self.company_website {
            details.company_website = optional_text(website);
        }
        if let Some(location) = self.location {
            details.location = optional_text(location);
        }
        if let Some(email) = self.contact_email {
            details.contact_email = optional_text(email).map(|email| email.to_lowercase());
        }
        Ok(details)
    }
}

/// Employer profile with its posted jobs resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerProfileView {
    pub id: EmployerId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub details: EmployerDetails,
    pub posted_jobs: Vec<Job>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seeker profile summary shown to the reviewing employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantProfile {
    pub id: SeekerId,
    pub skills: Vec<String>,
    pub experience: WorkExperience,
    pub experience_years: u32,
    pub education: Vec<Education>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    pub user: Option<ContactCard>,
}

/// One entry of a job's applications with the seeker reference resolved. `seeker`
/// is `None` when the profile has since been removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantView {
    pub seeker_id: SeekerId,
    pub applied_at: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub seeker: Option<ApplicantProfile>,
}

impl<S> JobBoard<S>
where
    S: BoardStore + 'static,
{
    pub fn create_employer_profile(
        &self,
        user_id: &UserId,
        input: EmployerProfileInput,
    ) -> Result<EmployerProfile, BoardError> {
        let details = input.merge_into(EmployerDetails::default())?;
        let now = Utc::now();
        let profile = EmployerProfile {
            id: EmployerId::generate(),
            user_id: user_id.clone(),
            details,
            posted_jobs: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let profile = self.store.insert_employer(profile).map_err(|err| match err {
            RepositoryError::Conflict => BoardError::Conflict("profile already exists".to_string()),
            other => other.into(),
        })?;
        info!(employer_id = %profile.id, user_id = %user_id, "employer profile created");
        Ok(profile)
    }

    pub fn employer_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<EmployerProfileView>, BoardError> {
        let Some(profile) = self.store.employer_for_user(user_id)? else {
            return Ok(None);
        };
        let posted_jobs = self.resolve_jobs(&profile.posted_jobs)?;
        Ok(Some(EmployerProfileView {
            id: profile.id,
            user_id: profile.user_id,
            details: profile.details,
            posted_jobs,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }))
    }

    pub fn update_employer_profile(
        &self,
        user_id: &UserId,
        input: EmployerProfileInput,
    ) -> Result<EmployerProfile, BoardError> {
        let profile = self.require_employer(user_id)?;
        let details = input.merge_into(profile.details)?;
        Ok(self.store.update_employer_details(&profile.id, details)?)
    }

    /// Jobs posted by the employer account, newest first.
    pub fn my_jobs(&self, user_id: &UserId) -> Result<Vec<Job>, BoardError> {
        let profile = self.require_employer(user_id)?;
        let mut jobs = self.resolve_jobs(&profile.posted_jobs)?;
        sort_newest_first(&mut jobs);
        Ok(jobs)
    }

    fn require_employer(&self, user_id: &UserId) -> Result<EmployerProfile, BoardError> {
        self.store
            .employer_for_user(user_id)?
            .ok_or_else(|| BoardError::not_found("employer profile"))
    }

    fn resolve_jobs(&self, ids: &[JobId]) -> Result<Vec<Job>, BoardError> {
        let mut jobs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(job) = self.store.fetch_job(id)? {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }

    /// Gate for job-scoped employer routes: the caller must hold `capability` and own
    /// the job through their employer profile.
    pub fn owned_job(
        &self,
        principal: &Principal,
        job_id: &JobId,
        capability: Capability,
    ) -> Result<Job, BoardError> {
        principal.require(capability)?;
        let job = self.require_job(job_id)?;
        let owner = self.store.employer_for_user(&principal.user_id)?;
        match owner {
            Some(profile) if profile.id == job.employer_id => Ok(job),
            _ => {
                tracing::warn!(
                    user_id = %principal.user_id,
                    job_id = %job.id,
                    "job ownership check failed"
                );
                Err(BoardError::Forbidden(
                    "access denied: job belongs to another employer".to_string(),
                ))
            }
        }
    }

    /// The job's applications with each seeker resolved to profile and contact details.
    pub fn applicants_for_job(&self, job_id: &JobId) -> Result<Vec<ApplicantView>, BoardError> {
        let job = self.require_job(job_id)?;
        let mut applicants = Vec::with_capacity(job.applications.len());
        for application in job.applications {
            let seeker = match self.store.fetch_seeker(&application.seeker_id)? {
                Some(profile) => {
                    let user = self
                        .store
                        .fetch_user(&profile.user_id)?
                        .as_ref()
                        .map(ContactCard::from);
                    Some(ApplicantProfile {
                        id: profile.id,
                        skills: profile.details.skills,
                        experience: profile.details.experience,
                        experience_years: profile.details.experience_years,
                        education: profile.details.education,
                        resume_url: profile.details.resume_url,
                        user,
                    })
                }
                None => None,
            };
            applicants.push(ApplicantView {
                seeker_id: application.seeker_id,
                applied_at: application.applied_at,
                status: application.status,
                seeker,
            });
        }
        Ok(applicants)
    }

    /// Set the status on the job's copy of the application. The seeker's own
    /// `appliedJobs` entry keeps its previous status.
    pub fn update_application_status(
        &self,
        job_id: &JobId,
        seeker_id: &SeekerId,
        status: ApplicationStatus,
    ) -> Result<Job, BoardError> {
        let job = self
            .store
            .set_application_status(job_id, seeker_id, status)?
            .ok_or_else(|| BoardError::not_found("application"))?;
        info!(
            job_id = %job_id,
            seeker_id = %seeker_id,
            status = status.label(),
            "application status updated"
        );
        Ok(job)
    }
}
