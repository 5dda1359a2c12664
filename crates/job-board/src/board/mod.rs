//! Job catalog and lifecycle engine.
//!
//! Jobs, seeker profiles, and employer profiles are separate documents that reference
//! each other by id. [`JobBoard`] owns every operation that touches more than one of
//! them, and each such write is either a conditional single-document update or a
//! best-effort pair with a compensating step, so duplicates never land twice.

pub mod accounts;
pub mod admin;
pub mod catalog;
pub mod domain;
pub mod employer;
pub mod memory;
pub mod repository;
pub mod router;
pub mod seeker;
pub mod service;

#[cfg(test)]
mod tests;

pub use accounts::{Credentials, Registration};
pub use admin::{EmployerCard, JobListing, Statistics};
pub use catalog::{JobDraft, JobFilter};
pub use domain::{
    AppliedJob, ApplicationStatus, ContactCard, EmployerDetails, EmployerId, EmployerProfile,
    Education, Job, JobApplication, JobId, JobPosting, JobType, Role, SeekerDetails, SeekerId,
    SeekerProfile, User, UserId, WorkExperience,
};
pub use employer::{ApplicantProfile, ApplicantView, EmployerProfileInput, EmployerProfileView};
pub use memory::InMemoryStore;
pub use repository::{
    ApplicationWrite, BoardStore, BookmarkWrite, EmployerRepository, JobRepository,
    RepositoryError, SeekerRepository, UserRepository,
};
pub use router::{board_router, BoardState};
pub use seeker::{AppliedJobView, SeekerProfileInput};
pub use service::{BoardError, JobBoard};
