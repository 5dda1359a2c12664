use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{
    AppliedJob, ApplicationStatus, EmployerDetails, EmployerId, EmployerProfile, Job,
    JobApplication, JobId, JobPosting, SeekerDetails, SeekerId, SeekerProfile, User, UserId,
};
use super::repository::{
    ApplicationWrite, BookmarkWrite, EmployerRepository, JobRepository, RepositoryError,
    SeekerRepository, UserRepository,
};

/// Process-local document store. Each collection sits behind its own mutex, so every
/// single-document write is atomic while multi-document operations are not.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    users: Arc<Mutex<BTreeMap<UserId, User>>>,
    employers: Arc<Mutex<BTreeMap<EmployerId, EmployerProfile>>>,
    seekers: Arc<Mutex<BTreeMap<SeekerId, SeekerProfile>>>,
    jobs: Arc<Mutex<BTreeMap<JobId, Job>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<'a, T>(
    collection: &'a Mutex<T>,
    name: &'static str,
) -> Result<MutexGuard<'a, T>, RepositoryError> {
    collection
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{name} collection lock poisoned")))
}

impl UserRepository for InMemoryStore {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut users = lock(&self.users, "users")?;
        let duplicate = users.values().any(|existing| {
            existing.id == user.id
                || existing.email == user.email
                || (user.is_super_admin && existing.is_super_admin)
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.users, "users")?.get(id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = lock(&self.users, "users")?;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    fn super_admin(&self) -> Result<Option<User>, RepositoryError> {
        let users = lock(&self.users, "users")?;
        Ok(users.values().find(|user| user.is_super_admin).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(lock(&self.users, "users")?.values().cloned().collect())
    }

    fn delete_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.users, "users")?.remove(id))
    }

    fn count_users(&self) -> Result<usize, RepositoryError> {
        Ok(lock(&self.users, "users")?.len())
    }
}

impl EmployerRepository for InMemoryStore {
    fn insert_employer(
        &self,
        profile: EmployerProfile,
    ) -> Result<EmployerProfile, RepositoryError> {
        let mut employers = lock(&self.employers, "employers")?;
        if employers
            .values()
            .any(|existing| existing.id == profile.id || existing.user_id == profile.user_id)
        {
            return Err(RepositoryError::Conflict);
        }
        employers.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn fetch_employer(&self, id: &EmployerId) -> Result<Option<EmployerProfile>, RepositoryError> {
        Ok(lock(&self.employers, "employers")?.get(id).cloned())
    }

    fn employer_for_user(
        &self,
        user: &UserId,
    ) -> Result<Option<EmployerProfile>, RepositoryError> {
        let employers = lock(&self.employers, "employers")?;
        Ok(employers
            .values()
            .find(|profile| &profile.user_id == user)
            .cloned())
    }

    fn list_employers(&self) -> Result<Vec<EmployerProfile>, RepositoryError> {
        Ok(lock(&self.employers, "employers")?.values().cloned().collect())
    }

    fn update_employer_details(
        &self,
        id: &EmployerId,
        details: EmployerDetails,
    ) -> Result<EmployerProfile, RepositoryError> {
        let mut employers = lock(&self.employers, "employers")?;
        let profile = employers.get_mut(id).ok_or(RepositoryError::NotFound)?;
        profile.details = details;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    fn delete_employer_for_user(
        &self,
        user: &UserId,
    ) -> Result<Option<EmployerProfile>, RepositoryError> {
        let mut employers = lock(&self.employers, "employers")?;
        let id = employers
            .values()
            .find(|profile| &profile.user_id == user)
            .map(|profile| profile.id.clone());
        Ok(id.and_then(|id| employers.remove(&id)))
    }

    fn attach_posted_job(&self, id: &EmployerId, job: &JobId) -> Result<(), RepositoryError> {
        let mut employers = lock(&self.employers, "employers")?;
        let profile = employers.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if !profile.posted_jobs.contains(job) {
            profile.posted_jobs.push(job.clone());
        }
        Ok(())
    }

    fn detach_posted_job(&self, id: &EmployerId, job: &JobId) -> Result<bool, RepositoryError> {
        let mut employers = lock(&self.employers, "employers")?;
        match employers.get_mut(id) {
            Some(profile) => {
                profile.posted_jobs.retain(|posted| posted != job);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl SeekerRepository for InMemoryStore {
    fn insert_seeker(&self, profile: SeekerProfile) -> Result<SeekerProfile, RepositoryError> {
        let mut seekers = lock(&self.seekers, "seekers")?;
        if seekers
            .values()
            .any(|existing| existing.id == profile.id || existing.user_id == profile.user_id)
        {
            return Err(RepositoryError::Conflict);
        }
        seekers.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn fetch_seeker(&self, id: &SeekerId) -> Result<Option<SeekerProfile>, RepositoryError> {
        Ok(lock(&self.seekers, "seekers")?.get(id).cloned())
    }

    fn seeker_for_user(&self, user: &UserId) -> Result<Option<SeekerProfile>, RepositoryError> {
        let seekers = lock(&self.seekers, "seekers")?;
        Ok(seekers
            .values()
            .find(|profile| &profile.user_id == user)
            .cloned())
    }

    fn list_seekers(&self) -> Result<Vec<SeekerProfile>, RepositoryError> {
        Ok(lock(&self.seekers, "seekers")?.values().cloned().collect())
    }

    fn update_seeker_details(
        &self,
        id: &SeekerId,
        details: SeekerDetails,
    ) -> Result<SeekerProfile, RepositoryError> {
        let mut seekers = lock(&self.seekers, "seekers")?;
        let profile = seekers.get_mut(id).ok_or(RepositoryError::NotFound)?;
        profile.details = details;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    fn delete_seeker_for_user(
        &self,
        user: &UserId,
    ) -> Result<Option<SeekerProfile>, RepositoryError> {
        let mut seekers = lock(&self.seekers, "seekers")?;
        let id = seekers
            .values()
            .find(|profile| &profile.user_id == user)
            .map(|profile| profile.id.clone());
        Ok(id.and_then(|id| seekers.remove(&id)))
    }

    fn record_application(
        &self,
        id: &SeekerId,
        entry: AppliedJob,
    ) -> Result<ApplicationWrite, RepositoryError> {
        let mut seekers = lock(&self.seekers, "seekers")?;
        let profile = seekers.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if profile.has_applied(&entry.job_id) {
            return Ok(ApplicationWrite::AlreadyApplied);
        }
        profile.saved_jobs.retain(|saved| saved != &entry.job_id);
        profile.applied_jobs.push(entry);
        profile.updated_at = Utc::now();
        Ok(ApplicationWrite::Recorded)
    }

    fn withdraw_application(&self, id: &SeekerId, job: &JobId) -> Result<(), RepositoryError> {
        let mut seekers = lock(&self.seekers, "seekers")?;
        let profile = seekers.get_mut(id).ok_or(RepositoryError::NotFound)?;
        profile.applied_jobs.retain(|entry| &entry.job_id != job);
        Ok(())
    }

    fn bookmark_job(&self, id: &SeekerId, job: &JobId) -> Result<BookmarkWrite, RepositoryError> {
        let mut seekers = lock(&self.seekers, "seekers")?;
        let profile = seekers.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if profile.has_saved(job) {
            return Ok(BookmarkWrite::AlreadySaved);
        }
        if profile.has_applied(job) {
            return Ok(BookmarkWrite::AlreadyApplied);
        }
        profile.saved_jobs.push(job.clone());
        profile.updated_at = Utc::now();
        Ok(BookmarkWrite::Saved)
    }

    fn remove_bookmark(&self, id: &SeekerId, job: &JobId) -> Result<bool, RepositoryError> {
        let mut seekers = lock(&self.seekers, "seekers")?;
        let profile = seekers.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let before = profile.saved_jobs.len();
        profile.saved_jobs.retain(|saved| saved != job);
        Ok(profile.saved_jobs.len() != before)
    }
}

impl JobRepository for InMemoryStore {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut jobs = lock(&self.jobs, "jobs")?;
        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(lock(&self.jobs, "jobs")?.get(id).cloned())
    }

    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(lock(&self.jobs, "jobs")?.values().cloned().collect())
    }

    fn replace_posting(&self, id: &JobId, posting: JobPosting) -> Result<Job, RepositoryError> {
        let mut jobs = lock(&self.jobs, "jobs")?;
        let job = jobs.get_mut(id).ok_or(RepositoryError::NotFound)?;
        job.posting = posting;
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    fn delete_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(lock(&self.jobs, "jobs")?.remove(id))
    }

    fn count_jobs(&self) -> Result<usize, RepositoryError> {
        Ok(lock(&self.jobs, "jobs")?.len())
    }

    fn append_application(
        &self,
        id: &JobId,
        application: JobApplication,
    ) -> Result<bool, RepositoryError> {
        let mut jobs = lock(&self.jobs, "jobs")?;
        let job = jobs.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if job.application_for(&application.seeker_id).is_some() {
            return Ok(false);
        }
        job.applications.push(application);
        job.updated_at = Utc::now();
        Ok(true)
    }

    fn set_application_status(
        &self,
        id: &JobId,
        seeker: &SeekerId,
        status: ApplicationStatus,
    ) -> Result<Option<Job>, RepositoryError> {
        let mut jobs = lock(&self.jobs, "jobs")?;
        let Some(job) = jobs.get_mut(id) else {
            return Ok(None);
        };
        let Some(application) = job
            .applications
            .iter_mut()
            .find(|application| &application.seeker_id == seeker)
        else {
            return Ok(None);
        };
        application.status = status;
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }
}
