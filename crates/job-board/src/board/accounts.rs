use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use super::domain::{Role, User, UserId};
use super::repository::{BoardStore, RepositoryError};
use super::service::{BoardError, JobBoard};
use crate::config::SuperAdminSeed;

const MIN_PASSWORD_LEN: usize = 3;

/// Sign-up payload. Every field is optional at the wire level so that a missing
/// field is reported by name instead of as a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

struct ValidRegistration {
    name: String,
    email: String,
    password: String,
    phone: String,
    role: Role,
}

fn required(value: Option<String>, field: &str, errors: &mut Vec<String>) -> String {
    match value.map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => value,
        _ => {
            errors.push(format!("{field} is required"));
            String::new()
        }
    }
}

pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn looks_like_phone(phone: &str) -> bool {
    let body = phone.strip_prefix('+').unwrap_or(phone);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return false;
    }
    let digits = body.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
}

impl Registration {
    fn validate(self) -> Result<ValidRegistration, BoardError> {
        let mut errors = Vec::new();
        let name = required(self.name, "name", &mut errors);
        let email = normalize_email(&required(self.email, "email", &mut errors));
        // Passwords are taken verbatim; only emptiness is checked before the length rule.
        let password = match self.password {
            Some(password) if !password.is_empty() => password,
            _ => {
                errors.push("password is required".to_string());
                String::new()
            }
        };
        let phone = required(self.phone, "phone", &mut errors);
        let role_raw = required(self.role, "role", &mut errors);

        if !email.is_empty() && !looks_like_email(&email) {
            errors.push("email must be a valid address".to_string());
        }
        if !password.is_empty() && password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        if !phone.is_empty() && !looks_like_phone(&phone) {
            errors.push("phone must contain 7 to 15 digits".to_string());
        }
        let role = Role::parse(&role_raw);
        if !role_raw.is_empty() && role.is_none() {
            errors.push("role must be one of seeker, employer, admin".to_string());
        }

        match role {
            Some(role) if errors.is_empty() => Ok(ValidRegistration {
                name,
                email,
                password,
                phone,
                role,
            }),
            _ => Err(BoardError::Validation(errors)),
        }
    }
}

impl<S> JobBoard<S>
where
    S: BoardStore + 'static,
{
    /// Create an account. Hashing is CPU bound, so async callers should run this on
    /// a blocking thread.
    pub fn register(&self, registration: Registration) -> Result<User, BoardError> {
        let registration = registration.validate()?;
        let password_hash = self.hasher.hash(&registration.password)?;
        let user = User {
            id: UserId::generate(),
            name: registration.name,
            email: registration.email,
            phone: registration.phone,
            password_hash,
            role: registration.role,
            is_super_admin: false,
            created_at: Utc::now(),
        };
        let user = self.store.insert_user(user).map_err(|err| match err {
            RepositoryError::Conflict => {
                BoardError::Conflict("email already registered".to_string())
            }
            other => other.into(),
        })?;
        info!(user_id = %user.id, role = user.role.label(), "user registered");
        Ok(user)
    }

    /// Check credentials and the role the client claims to be signing in as.
    pub fn login(&self, credentials: Credentials) -> Result<User, BoardError> {
        let invalid = || BoardError::Auth("invalid credentials".to_string());
        let email = credentials
            .email
            .map(|email| normalize_email(&email))
            .filter(|email| !email.is_empty())
            .ok_or_else(invalid)?;
        let password = credentials.password.ok_or_else(invalid)?;

        let Some(user) = self.store.find_user_by_email(&email)? else {
            warn!("login attempt for unknown email");
            return Err(invalid());
        };
        if !self.hasher.verify(&password, &user.password_hash) {
            warn!(user_id = %user.id, "login attempt with wrong password");
            return Err(invalid());
        }
        let claimed = credentials.role.as_deref().and_then(Role::parse);
        if claimed != Some(user.role) {
            warn!(user_id = %user.id, "login attempt with mismatched role");
            return Err(BoardError::Auth("invalid role for this account".to_string()));
        }
        Ok(user)
    }

    /// Make sure the platform has its super-admin, creating it from `seed` on first
    /// start. Returns the existing account untouched on later starts.
    pub fn ensure_super_admin(&self, seed: &SuperAdminSeed) -> Result<User, BoardError> {
        if let Some(existing) = self.store.super_admin()? {
            return Ok(existing);
        }

        let password_hash = self.hasher.hash(&seed.password)?;
        let user = User {
            id: UserId::generate(),
            name: seed.name.trim().to_string(),
            email: normalize_email(&seed.email),
            phone: seed.phone.trim().to_string(),
            password_hash,
            role: Role::Admin,
            is_super_admin: true,
            created_at: Utc::now(),
        };
        match self.store.insert_user(user) {
            Ok(user) => {
                info!(user_id = %user.id, email = %user.email, "super admin created");
                Ok(user)
            }
            Err(RepositoryError::Conflict) => self.store.super_admin()?.ok_or_else(|| {
                BoardError::Conflict(
                    "super admin email already belongs to another account".to_string(),
                )
            }),
            Err(other) => Err(other.into()),
        }
    }
}
