use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::catalog::JobFilter;
use super::domain::{
    AppliedJob, ApplicationStatus, Education, Job, JobApplication, JobId, SeekerDetails,
    SeekerId, SeekerProfile, UserId, WorkExperience,
};
use super::repository::{ApplicationWrite, BookmarkWrite, BoardStore, RepositoryError};
use super::service::{BoardError, JobBoard};

/// Seeker profile submission. Absent fields keep their current value on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeekerProfileInput {
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub experience: Option<WorkExperience>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub education: Option<Vec<Education>>,
    #[serde(default)]
    pub resume_url: Option<String>,
}

impl SeekerProfileInput {
    fn merge_into(self, mut details: SeekerDetails) -> SeekerDetails {
        if let Some(skills) = self.skills {
            details.skills = skills
                .into_iter()
                .map(|skill| skill.trim().to_string())
                .filter(|skill| !skill.is_empty())
                .collect();
        }
        if let Some(experience) = self.experience {
            details.experience = experience;
        }
        if let Some(years) = self.experience_years {
            details.experience_years = years;
        }
        if let Some(education) = self.education {
            details.education = education;
        }
        if let Some(resume_url) = self.resume_url {
            let resume_url = resume_url.trim().to_string();
            details.resume_url = (!resume_url.is_empty()).then_some(resume_url);
        }
        details
    }
}

/// A job the seeker applied to, joined with the seeker's own copy of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedJobView {
    #[serde(flatten)]
    pub job: Job,
    pub applied_at: DateTime<Utc>,
    pub status: ApplicationStatus,
}

impl<S> JobBoard<S>
where
    S: BoardStore + 'static,
{
    pub fn create_seeker_profile(
        &self,
        user_id: &UserId,
        input: SeekerProfileInput,
    ) -> Result<SeekerProfile, BoardError> {
        let now = Utc::now();
        let profile = SeekerProfile {
            id: SeekerId::generate(),
            user_id: user_id.clone(),
            details: input.merge_into(SeekerDetails::default()),
            applied_jobs: Vec::new(),
            saved_jobs: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let profile = self.store.insert_seeker(profile).map_err(|err| match err {
            RepositoryError::Conflict => BoardError::Conflict("profile already exists".to_string()),
            other => other.into(),
        })?;
        info!(seeker_id = %profile.id, user_id = %user_id, "seeker profile created");
        Ok(profile)
    }

    pub fn seeker_profile(&self, user_id: &UserId) -> Result<Option<SeekerProfile>, BoardError> {
        Ok(self.store.seeker_for_user(user_id)?)
    }

    pub fn update_seeker_profile(
        &self,
        user_id: &UserId,
        input: SeekerProfileInput,
    ) -> Result<SeekerProfile, BoardError> {
        let profile = self.require_seeker(user_id)?;
        let details = input.merge_into(profile.details);
        Ok(self.store.update_seeker_details(&profile.id, details)?)
    }

    pub(super) fn require_seeker(&self, user_id: &UserId) -> Result<SeekerProfile, BoardError> {
        self.store
            .seeker_for_user(user_id)?
            .ok_or_else(|| BoardError::not_found("seeker profile"))
    }

    pub(super) fn require_job(&self, job_id: &JobId) -> Result<Job, BoardError> {
        self.store
            .fetch_job(job_id)?
            .ok_or_else(|| BoardError::not_found("job"))
    }

    /// Browse feed. Jobs the seeker already applied to or saved are hidden; a seeker
    /// without a profile sees every match.
    pub fn view_jobs(&self, user_id: &UserId, filter: &JobFilter) -> Result<Vec<Job>, BoardError> {
        let exclude: HashSet<JobId> = match self.store.seeker_for_user(user_id)? {
            Some(profile) => profile
                .applied_jobs
                .into_iter()
                .map(|entry| entry.job_id)
                .chain(profile.saved_jobs)
                .collect(),
            None => HashSet::new(),
        };
        self.list_jobs(filter, &exclude)
    }

    /// Record an application on both the seeker profile and the job.
    ///
    /// Each side is a conditional single-document write, so concurrent duplicates are
    /// refused rather than double-recorded. The pair is not transactional: if the job
    /// side fails, the seeker entry is withdrawn again on a best-effort basis.
    pub fn apply_to_job(&self, user_id: &UserId, job_id: &JobId) -> Result<AppliedJob, BoardError> {
        let job = self.require_job(job_id)?;
        let seeker = self.require_seeker(user_id)?;

        let applied_at = Utc::now();
        let entry = AppliedJob {
            job_id: job.id.clone(),
            applied_at,
            status: ApplicationStatus::Applied,
        };

        match self.store.record_application(&seeker.id, entry.clone())? {
            ApplicationWrite::Recorded => {}
            ApplicationWrite::AlreadyApplied => {
                warn!(seeker_id = %seeker.id, job_id = %job.id, "duplicate application refused");
                return Err(BoardError::Conflict(
                    "already applied to this job".to_string(),
                ));
            }
        }

        let application = JobApplication {
            seeker_id: seeker.id.clone(),
            applied_at,
            status: ApplicationStatus::Applied,
        };
        match self.store.append_application(&job.id, application) {
            Ok(true) => {}
            Ok(false) => {
                warn!(seeker_id = %seeker.id, job_id = %job.id, "job already listed this applicant");
            }
            Err(err) => {
                warn!(
                    seeker_id = %seeker.id,
                    job_id = %job.id,
                    error = %err,
                    "job side of application failed, withdrawing seeker entry"
                );
                if let Err(rollback) = self.store.withdraw_application(&seeker.id, &job.id) {
                    tracing::error!(
                        seeker_id = %seeker.id,
                        job_id = %job.id,
                        error = %rollback,
                        "seeker entry left without matching job application"
                    );
                }
                return Err(match err {
                    RepositoryError::NotFound => BoardError::not_found("job"),
                    other => other.into(),
                });
            }
        }

        info!(seeker_id = %seeker.id, job_id = %job.id, "application recorded");
        Ok(entry)
    }

    /// Bookmark a job. Refused when already saved or already applied.
    pub fn save_job(&self, user_id: &UserId, job_id: &JobId) -> Result<Job, BoardError> {
        let job = self.require_job(job_id)?;
        let seeker = self.require_seeker(user_id)?;

        match self.store.bookmark_job(&seeker.id, &job.id)? {
            BookmarkWrite::Saved => {
                info!(seeker_id = %seeker.id, job_id = %job.id, "job saved");
                Ok(job)
            }
            BookmarkWrite::AlreadySaved => Err(BoardError::Conflict("job already saved".to_string())),
            BookmarkWrite::AlreadyApplied => Err(BoardError::Conflict(
                "cannot save a job you have already applied to".to_string(),
            )),
        }
    }

    /// Drop a bookmark. Succeeds whether or not the job was saved, and for seekers
    /// without a profile.
    pub fn unsave_job(&self, user_id: &UserId, job_id: &JobId) -> Result<(), BoardError> {
        let Some(seeker) = self.store.seeker_for_user(user_id)? else {
            return Ok(());
        };
        match self.store.remove_bookmark(&seeker.id, job_id) {
            Ok(removed) => {
                if removed {
                    info!(seeker_id = %seeker.id, job_id = %job_id, "job unsaved");
                }
                Ok(())
            }
            Err(RepositoryError::NotFound) => Ok(()),
            Err(other) => Err(other.into()),
        }
    }

    /// Applied jobs with the seeker's copy of `appliedAt`/`status`. Entries whose job
    /// has since been deleted are skipped.
    pub fn applied_jobs(&self, user_id: &UserId) -> Result<Vec<AppliedJobView>, BoardError> {
        let Some(seeker) = self.store.seeker_for_user(user_id)? else {
            return Ok(Vec::new());
        };
        let mut views = Vec::with_capacity(seeker.applied_jobs.len());
        for entry in seeker.applied_jobs {
            if let Some(job) = self.store.fetch_job(&entry.job_id)? {
                views.push(AppliedJobView {
                    job,
                    applied_at: entry.applied_at,
                    status: entry.status,
                });
            }
        }
        Ok(views)
    }

    pub fn saved_jobs(&self, user_id: &UserId) -> Result<Vec<Job>, BoardError> {
        let Some(seeker) = self.store.seeker_for_user(user_id)? else {
            return Ok(Vec::new());
        };
        let mut jobs = Vec::with_capacity(seeker.saved_jobs.len());
        for job_id in &seeker.saved_jobs {
            if let Some(job) = self.store.fetch_job(job_id)? {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }
}
