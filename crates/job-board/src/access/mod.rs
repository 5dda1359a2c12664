//! Role-based gating for every state-changing operation.
//!
//! Handlers never compare roles directly. They resolve a [`Principal`] from the bearer
//! token and ask it for a [`Capability`]; the capability table below is the single
//! place that decides which role may do what. Moderation additionally requires the
//! super-admin flag, so an ordinary `admin` account holds no capabilities at all.

pub mod password;
pub mod token;

use serde::Serialize;

use crate::board::domain::{Role, User, UserId};
use crate::board::BoardError;

pub use password::{CredentialHasher, PasswordError};
pub use token::{Claims, TokenError, TokenIssuer};

/// Operations a caller may be entitled to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageSeekerProfile,
    BrowseJobs,
    ApplyToJobs,
    ManageEmployerProfile,
    PostJobs,
    ReviewApplicants,
    ModeratePlatform,
}

impl Capability {
    pub const fn label(self) -> &'static str {
        match self {
            Capability::ManageSeekerProfile => "manage seeker profile",
            Capability::BrowseJobs => "browse jobs",
            Capability::ApplyToJobs => "apply to jobs",
            Capability::ManageEmployerProfile => "manage employer profile",
            Capability::PostJobs => "post jobs",
            Capability::ReviewApplicants => "review applicants",
            Capability::ModeratePlatform => "moderate the platform",
        }
    }
}

const SEEKER_CAPABILITIES: &[Capability] = &[
    Capability::ManageSeekerProfile,
    Capability::BrowseJobs,
    Capability::ApplyToJobs,
];

const EMPLOYER_CAPABILITIES: &[Capability] = &[
    Capability::ManageEmployerProfile,
    Capability::PostJobs,
    Capability::ReviewApplicants,
];

const SUPER_ADMIN_CAPABILITIES: &[Capability] = &[Capability::ModeratePlatform];

/// Authenticated caller, rebuilt from the stored account on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    pub is_super_admin: bool,
}

impl Principal {
    pub fn capabilities(&self) -> &'static [Capability] {
        match (self.role, self.is_super_admin) {
            (Role::Seeker, _) => SEEKER_CAPABILITIES,
            (Role::Employer, _) => EMPLOYER_CAPABILITIES,
            (Role::Admin, true) => SUPER_ADMIN_CAPABILITIES,
            (Role::Admin, false) => &[],
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn require(&self, capability: Capability) -> Result<(), BoardError> {
        if self.can(capability) {
            return Ok(());
        }
        tracing::warn!(
            user_id = %self.user_id,
            role = self.role.label(),
            capability = capability.label(),
            "capability check failed"
        );
        let message = if capability == Capability::ModeratePlatform {
            "access denied: super admin privileges required".to_string()
        } else {
            format!(
                "access denied: {} accounts cannot {}",
                self.role.label(),
                capability.label()
            )
        };
        Err(BoardError::Forbidden(message))
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            role: user.role,
            is_super_admin: user.is_super_admin,
        }
    }
}
