use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::access::{CredentialHasher, TokenIssuer};
use crate::board::domain::{
    AppliedJob, ApplicationStatus, EmployerDetails, EmployerId, EmployerProfile, Job,
    JobApplication, JobId, JobPosting, Role, SeekerDetails, SeekerId, SeekerProfile, User, UserId,
};
use crate::board::repository::{
    ApplicationWrite, BookmarkWrite, EmployerRepository, JobRepository, RepositoryError,
    SeekerRepository, UserRepository,
};
use crate::board::{
    board_router, BoardState, EmployerProfileInput, InMemoryStore, JobBoard, JobDraft,
    SeekerProfileInput,
};
use crate::config::SuperAdminSeed;

pub(super) fn fast_hasher() -> CredentialHasher {
    CredentialHasher::with_cost(1024, 1).expect("valid argon2 parameters")
}

pub(super) fn build_board() -> (JobBoard<InMemoryStore>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let board = JobBoard::with_hasher(store.clone(), fast_hasher());
    (board, store)
}

pub(super) fn token_issuer() -> TokenIssuer {
    TokenIssuer::new("board-test-secret", Duration::hours(1))
}

pub(super) fn super_admin_seed() -> SuperAdminSeed {
    SuperAdminSeed {
        name: "Super Admin".to_string(),
        email: "root@board.test".to_string(),
        password: "SuperAdmin@123".to_string(),
        phone: "5550000".to_string(),
    }
}

/// Insert an account straight into the store; the password hash is not usable for login.
pub(super) fn seed_user<R: UserRepository>(store: &R, name: &str, role: Role) -> User {
    let user = User {
        id: UserId::generate(),
        name: name.to_string(),
        email: format!("{}@board.test", name.to_lowercase()),
        phone: "5550100".to_string(),
        password_hash: "unusable".to_string(),
        role,
        is_super_admin: false,
        created_at: Utc::now(),
    };
    store.insert_user(user).expect("user inserted")
}

pub(super) fn employer_input(company: &str) -> EmployerProfileInput {
    EmployerProfileInput {
        company_name: Some(company.to_string()),
        company_website: Some("https://acme.example".to_string()),
        location: Some("New York, NY".to_string()),
        ..EmployerProfileInput::default()
    }
}

pub(super) fn seeker_input() -> SeekerProfileInput {
    SeekerProfileInput {
        skills: Some(vec!["rust".to_string(), "sql".to_string()]),
        experience_years: Some(4),
        ..SeekerProfileInput::default()
    }
}

pub(super) fn employer_with_profile(
    board: &JobBoard<InMemoryStore>,
    name: &str,
    company: &str,
) -> (User, EmployerProfile) {
    let user = seed_user(&**board.store(), name, Role::Employer);
    let profile = board
        .create_employer_profile(&user.id, employer_input(company))
        .expect("employer profile created");
    (user, profile)
}

pub(super) fn seeker_with_profile(
    board: &JobBoard<InMemoryStore>,
    name: &str,
) -> (User, SeekerProfile) {
    let user = seed_user(&**board.store(), name, Role::Seeker);
    let profile = board
        .create_seeker_profile(&user.id, seeker_input())
        .expect("seeker profile created");
    (user, profile)
}

pub(super) fn job_draft(title: &str) -> JobDraft {
    JobDraft {
        title: Some(title.to_string()),
        description: Some(format!("{title} working on the platform team")),
        location: Some("New York, NY".to_string()),
        salary: Some(90_000),
        experience: Some("3+ years".to_string()),
        skills: Some(vec!["rust".to_string()]),
        job_type: Some("Full-time".to_string()),
        expiry_date: Some("2030-01-31".to_string()),
    }
}

pub(super) fn post_job(board: &JobBoard<InMemoryStore>, employer: &User, title: &str) -> Job {
    board
        .create_job(&employer.id, job_draft(title))
        .expect("job posted")
}

pub(super) fn router_for(board: JobBoard<InMemoryStore>) -> (axum::Router, Arc<TokenIssuer>) {
    let tokens = Arc::new(token_issuer());
    let state = BoardState::new(Arc::new(board), tokens.clone());
    (board_router(state), tokens)
}

pub(super) fn bearer(tokens: &TokenIssuer, user: &User) -> String {
    format!("Bearer {}", tokens.issue(user).expect("token issued"))
}

pub(super) fn json_request(
    method: Method,
    uri: &str,
    authorization: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("json body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose job-side application write always fails, used to exercise the
/// compensating withdrawal on apply.
#[derive(Default, Clone)]
pub(super) struct JobWriteFailure {
    pub(super) inner: InMemoryStore,
}

impl UserRepository for JobWriteFailure {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        self.inner.insert_user(user)
    }
    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.fetch_user(id)
    }
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.inner.find_user_by_email(email)
    }
    fn super_admin(&self) -> Result<Option<User>, RepositoryError> {
        self.inner.super_admin()
    }
    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        self.inner.list_users()
    }
    fn delete_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.delete_user(id)
    }
    fn count_users(&self) -> Result<usize, RepositoryError> {
        self.inner.count_users()
    }
}

impl EmployerRepository for JobWriteFailure {
    fn insert_employer(
        &self,
        profile: EmployerProfile,
    ) -> Result<EmployerProfile, RepositoryError> {
        self.inner.insert_employer(profile)
    }
    fn fetch_employer(&self, id: &EmployerId) -> Result<Option<EmployerProfile>, RepositoryError> {
        self.inner.fetch_employer(id)
    }
    fn employer_for_user(
        &self,
        user: &UserId,
    ) -> Result<Option<EmployerProfile>, RepositoryError> {
        self.inner.employer_for_user(user)
    }
    fn list_employers(&self) -> Result<Vec<EmployerProfile>, RepositoryError> {
        self.inner.list_employers()
    }
    fn update_employer_details(
        &self,
        id: &EmployerId,
        details: EmployerDetails,
    ) -> Result<EmployerProfile, RepositoryError> {
        self.inner.update_employer_details(id, details)
    }
    fn delete_employer_for_user(
        &self,
        user: &UserId,
    ) -> Result<Option<EmployerProfile>, RepositoryError> {
        self.inner.delete_employer_for_user(user)
    }
    fn attach_posted_job(&self, id: &EmployerId, job: &JobId) -> Result<(), RepositoryError> {
        self.inner.attach_posted_job(id, job)
    }
    fn detach_posted_job(&self, id: &EmployerId, job: &JobId) -> Result<bool, RepositoryError> {
        self.inner.detach_posted_job(id, job)
    }
}

impl SeekerRepository for JobWriteFailure {
    fn insert_seeker(&self, profile: SeekerProfile) -> Result<SeekerProfile, RepositoryError> {
        self.inner.insert_seeker(profile)
    }
    fn fetch_seeker(&self, id: &SeekerId) -> Result<Option<SeekerProfile>, RepositoryError> {
        self.inner.fetch_seeker(id)
    }
    fn seeker_for_user(&self, user: &UserId) -> Result<Option<SeekerProfile>, RepositoryError> {
        self.inner.seeker_for_user(user)
    }
    fn list_seekers(&self) -> Result<Vec<SeekerProfile>, RepositoryError> {
        self.inner.list_seekers()
    }
    fn update_seeker_details(
        &self,
        id: &SeekerId,
        details: SeekerDetails,
    ) -> Result<SeekerProfile, RepositoryError> {
        self.inner.update_seeker_details(id, details)
    }
    fn delete_seeker_for_user(
        &self,
        user: &UserId,
    ) -> Result<Option<SeekerProfile>, RepositoryError> {
        self.inner.delete_seeker_for_user(user)
    }
    fn record_application(
        &self,
        id: &SeekerId,
        entry: AppliedJob,
    ) -> Result<ApplicationWrite, RepositoryError> {
        self.inner.record_application(id, entry)
    }
    fn withdraw_application(&self, id: &SeekerId, job: &JobId) -> Result<(), RepositoryError> {
        self.inner.withdraw_application(id, job)
    }
    fn bookmark_job(&self, id: &SeekerId, job: &JobId) -> Result<BookmarkWrite, RepositoryError> {
        self.inner.bookmark_job(id, job)
    }
    fn remove_bookmark(&self, id: &SeekerId, job: &JobId) -> Result<bool, RepositoryError> {
        self.inner.remove_bookmark(id, job)
    }
}

impl JobRepository for JobWriteFailure {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        self.inner.insert_job(job)
    }
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        self.inner.fetch_job(id)
    }
    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        self.inner.list_jobs()
    }
    fn replace_posting(&self, id: &JobId, posting: JobPosting) -> Result<Job, RepositoryError> {
        self.inner.replace_posting(id, posting)
    }
    fn delete_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        self.inner.delete_job(id)
    }
    fn count_jobs(&self) -> Result<usize, RepositoryError> {
        self.inner.count_jobs()
    }
    fn append_application(
        &self,
        _id: &JobId,
        _application: JobApplication,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("jobs collection offline".to_string()))
    }
    fn set_application_status(
        &self,
        id: &JobId,
        seeker: &SeekerId,
        status: ApplicationStatus,
    ) -> Result<Option<Job>, RepositoryError> {
        self.inner.set_application_status(id, seeker, status)
    }
}
