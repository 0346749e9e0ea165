//! Authentication service: registration, login and the
//! self-service/admin account operations guarded by the policy.

use rollcall_core::error::{RollcallError, RollcallResult};
use rollcall_core::models::role::Role;
use rollcall_core::models::user::{CreateUser, UpdateUser, User};
use rollcall_core::repository::UserRepository;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::policy;
use crate::token::{self, ValidatedClaims};

/// Input for direct registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
}

/// Input for the login flow.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    /// Email address or national id.
    pub credential_key: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    pub user: User,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over the repository implementation so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn repository(&self) -> &U {
        &self.user_repo
    }

    /// Verify a bearer token against this service's signing config.
    pub fn verify_token(&self, token: &str) -> Result<ValidatedClaims, AuthError> {
        token::validate_access_token(token, &self.config)
    }

    pub async fn register(&self, input: RegisterInput) -> RollcallResult<User> {
        self.check_password_policy(&input.password)?;

        let user = self
            .user_repo
            .create(CreateUser {
                name: input.name,
                email: input.email,
                password: input.password,
                role: input.role.unwrap_or_default(),
                national_id: input.national_id,
                external_id: input.external_id,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Authenticate with a credential key + password and issue a token.
    ///
    /// Unknown identities and wrong passwords are indistinguishable to
    /// the caller.
    pub async fn login(&self, input: LoginInput) -> RollcallResult<LoginOutput> {
        // 1. Look up the active account and its hash.
        let Some(credentials) = self.user_repo.get_credentials(&input.credential_key).await?
        else {
            password::burn_verification(&input.password, self.config.pepper.as_deref());
            warn!("Login rejected: unknown credential key");
            return Err(AuthError::InvalidCredentials.into());
        };

        // 2. Verify password.
        let valid = password::verify_password(
            &input.password,
            &credentials.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            warn!(user_id = %credentials.user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Issue JWT access token.
        let access_token = token::issue_access_token(&credentials.user, &self.config)?;
        info!(user_id = %credentials.user.id, "Login succeeded");

        Ok(LoginOutput {
            access_token,
            user: credentials.user,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// The caller's own active account.
    pub async fn profile(&self, caller: &ValidatedClaims) -> RollcallResult<User> {
        let id = parse_user_id(caller.user_id())?;
        self.user_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| RollcallError::not_found("user", id))
    }

    pub async fn list_users(&self, caller: &ValidatedClaims) -> RollcallResult<Vec<User>> {
        policy::require_staff(caller)?;
        self.user_repo.list_active().await
    }

    pub async fn update_user(
        &self,
        caller: &ValidatedClaims,
        target_id: &str,
        update: UpdateUser,
    ) -> RollcallResult<User> {
        policy::authorize_update(caller, Some(target_id), &update)?;
        if update.is_empty() {
            return Err(RollcallError::validation("no fields to update"));
        }
        if let Some(new_password) = update.password.as_deref() {
            self.check_password_policy(new_password)?;
        }

        let id = parse_user_id(target_id)?;
        let user = self
            .user_repo
            .update(id, update)
            .await?
            .ok_or_else(|| RollcallError::not_found("user", id))?;

        info!(user_id = %id, actor = %caller.user_id(), "User updated");
        Ok(user)
    }

    pub async fn delete_user(
        &self,
        caller: &ValidatedClaims,
        target_id: &str,
    ) -> RollcallResult<User> {
        policy::authorize_owner_or_admin(caller, Some(target_id))?;

        let id = parse_user_id(target_id)?;
        let user = self
            .user_repo
            .soft_delete(id)
            .await?
            .ok_or_else(|| RollcallError::not_found("user", id))?;

        info!(user_id = %id, actor = %caller.user_id(), "User soft-deleted");
        Ok(user)
    }

    fn check_password_policy(&self, password: &str) -> RollcallResult<()> {
        if password.chars().count() < self.config.min_password_length {
            return Err(RollcallError::validation(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        if password::is_password_hash(password) {
            return Err(RollcallError::validation(
                "password must be plaintext, not a hash",
            ));
        }
        Ok(())
    }
}

/// Ids that do not parse cannot name an existing record.
fn parse_user_id(raw: &str) -> RollcallResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| RollcallError::not_found("user", raw))
}
