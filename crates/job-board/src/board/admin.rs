use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use super::catalog::sort_newest_first;
use super::domain::{ContactCard, EmployerId, Job, JobId, User, UserId};
use super::repository::BoardStore;
use super::service::{BoardError, JobBoard};

/// Owning employer of a job as shown to moderators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerCard {
    pub id: EmployerId,
    pub company_name: String,
    pub user: Option<ContactCard>,
}

/// Job with its employer resolved; `employer` is `None` once the profile is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    #[serde(flatten)]
    pub job: Job,
    pub employer: Option<EmployerCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_jobs: usize,
    pub total_users: usize,
    /// Sum of every seeker's `appliedJobs` entries.
    pub total_applications: usize,
}

impl<S> JobBoard<S>
where
    S: BoardStore + 'static,
{
    pub fn list_all_users(&self) -> Result<Vec<User>, BoardError> {
        Ok(self.store.list_users()?)
    }

    pub fn list_all_jobs(&self) -> Result<Vec<JobListing>, BoardError> {
        let users: HashMap<UserId, User> = self
            .store
            .list_users()?
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();
        let employers: HashMap<EmployerId, EmployerCard> = self
            .store
            .list_employers()?
            .into_iter()
            .map(|profile| {
                let card = EmployerCard {
                    id: profile.id.clone(),
                    company_name: profile.details.company_name,
                    user: users.get(&profile.user_id).map(ContactCard::from),
                };
                (profile.id, card)
            })
            .collect();

        let mut jobs = self.store.list_jobs()?;
        sort_newest_first(&mut jobs);
        Ok(jobs
            .into_iter()
            .map(|job| {
                let employer = employers.get(&job.employer_id).cloned();
                JobListing { job, employer }
            })
            .collect())
    }

    /// Delete an account and whichever profile it owns. The super-admin cannot be
    /// banned. Jobs and other seekers' references to the removed profile are kept.
    pub fn ban_user(&self, user_id: &UserId) -> Result<User, BoardError> {
        let user = self
            .store
            .fetch_user(user_id)?
            .ok_or_else(|| BoardError::not_found("user"))?;
        if user.is_super_admin {
            tracing::warn!(user_id = %user.id, "refused to ban the super admin");
            return Err(BoardError::Forbidden(
                "cannot ban the super admin".to_string(),
            ));
        }

        self.store.delete_user(&user.id)?;
        let seeker = self.store.delete_seeker_for_user(&user.id)?;
        let employer = self.store.delete_employer_for_user(&user.id)?;
        info!(
            user_id = %user.id,
            removed_seeker_profile = seeker.is_some(),
            removed_employer_profile = employer.is_some(),
            "user banned"
        );
        Ok(user)
    }

    /// Moderator removal of a posting. Shares the employer delete path, so the owner's
    /// posted jobs are cleaned up as well.
    pub fn remove_job(&self, job_id: &JobId) -> Result<Job, BoardError> {
        let job = self.delete_job(job_id)?;
        info!(job_id = %job.id, "job removed by moderator");
        Ok(job)
    }

    pub fn statistics(&self) -> Result<Statistics, BoardError> {
        let total_applications = self
            .store
            .list_seekers()?
            .iter()
            .map(|seeker| seeker.applied_jobs.len())
            .sum();
        Ok(Statistics {
            total_jobs: self.store.count_jobs()?,
            total_users: self.store.count_users()?,
            total_applications,
        })
    }
}
