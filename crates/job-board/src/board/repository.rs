use super::domain::{
    AppliedJob, ApplicationStatus, EmployerDetails, EmployerId, EmployerProfile, Job,
    JobApplication, JobId, JobPosting, SeekerDetails, SeekerId, SeekerProfile, User, UserId,
};

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Result of the conditional append of an application onto a seeker profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationWrite {
    Recorded,
    AlreadyApplied,
}

/// Result of the conditional "add to set" on a seeker's saved jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkWrite {
    Saved,
    AlreadySaved,
    AlreadyApplied,
}

/// Account collection. `insert_user` owns both uniqueness rules (email and the
/// single super-admin) so they hold without a check-then-insert window.
pub trait UserRepository: Send + Sync {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError>;
    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    fn super_admin(&self) -> Result<Option<User>, RepositoryError>;
    fn list_users(&self) -> Result<Vec<User>, RepositoryError>;
    fn delete_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn count_users(&self) -> Result<usize, RepositoryError>;
}

pub trait EmployerRepository: Send + Sync {
    /// Fails with `Conflict` when the user already owns a profile.
    fn insert_employer(&self, profile: EmployerProfile)
        -> Result<EmployerProfile, RepositoryError>;
    fn fetch_employer(&self, id: &EmployerId) -> Result<Option<EmployerProfile>, RepositoryError>;
    fn employer_for_user(&self, user: &UserId)
        -> Result<Option<EmployerProfile>, RepositoryError>;
    fn list_employers(&self) -> Result<Vec<EmployerProfile>, RepositoryError>;
    fn update_employer_details(
        &self,
        id: &EmployerId,
        details: EmployerDetails,
    ) -> Result<EmployerProfile, RepositoryError>;
    fn delete_employer_for_user(
        &self,
        user: &UserId,
    ) -> Result<Option<EmployerProfile>, RepositoryError>;
    fn attach_posted_job(&self, id: &EmployerId, job: &JobId) -> Result<(), RepositoryError>;
    /// Returns `false` when the profile no longer exists.
    fn detach_posted_job(&self, id: &EmployerId, job: &JobId) -> Result<bool, RepositoryError>;
}

pub trait SeekerRepository: Send + Sync {
    /// Fails with `Conflict` when the user already owns a profile.
    fn insert_seeker(&self, profile: SeekerProfile) -> Result<SeekerProfile, RepositoryError>;
    fn fetch_seeker(&self, id: &SeekerId) -> Result<Option<SeekerProfile>, RepositoryError>;
    fn seeker_for_user(&self, user: &UserId) -> Result<Option<SeekerProfile>, RepositoryError>;
    fn list_seekers(&self) -> Result<Vec<SeekerProfile>, RepositoryError>;
    fn update_seeker_details(
        &self,
        id: &SeekerId,
        details: SeekerDetails,
    ) -> Result<SeekerProfile, RepositoryError>;
    fn delete_seeker_for_user(&self, user: &UserId)
        -> Result<Option<SeekerProfile>, RepositoryError>;
    /// Append the entry unless one exists for the same job, pulling the job from the
    /// saved list in the same write.
    fn record_application(
        &self,
        id: &SeekerId,
        entry: AppliedJob,
    ) -> Result<ApplicationWrite, RepositoryError>;
    /// Compensating removal used when the job side of an apply could not be written.
    fn withdraw_application(&self, id: &SeekerId, job: &JobId) -> Result<(), RepositoryError>;
    fn bookmark_job(&self, id: &SeekerId, job: &JobId) -> Result<BookmarkWrite, RepositoryError>;
    /// Returns whether the job was present.
    fn remove_bookmark(&self, id: &SeekerId, job: &JobId) -> Result<bool, RepositoryError>;
}

pub trait JobRepository: Send + Sync {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError>;
    fn replace_posting(&self, id: &JobId, posting: JobPosting) -> Result<Job, RepositoryError>;
    fn delete_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    fn count_jobs(&self) -> Result<usize, RepositoryError>;
    /// Append unless the seeker already has an entry; `NotFound` when the job is gone.
    fn append_application(
        &self,
        id: &JobId,
        application: JobApplication,
    ) -> Result<bool, RepositoryError>;
    /// Positional update of the single entry for `seeker`; `None` when no such pair exists.
    fn set_application_status(
        &self,
        id: &JobId,
        seeker: &SeekerId,
        status: ApplicationStatus,
    ) -> Result<Option<Job>, RepositoryError>;
}

/// Everything the job board persists.
pub trait BoardStore:
    UserRepository + EmployerRepository + SeekerRepository + JobRepository
{
}

impl<T> BoardStore for T where
    T: UserRepository + EmployerRepository + SeekerRepository + JobRepository
{
}
