//! Credential issuance: signup, login and bearer token resolution.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::Argon2;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use hexrealm_domain::{DomainError, Handle, ServerCode, User};
use hexrealm_shared::{AuthRequest, AuthResponse};

use super::world_view::player_data;
use crate::infrastructure::ports::{AuthTokenRepo, ClockPort, RandomPort, RepoError, UserRepo};

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Access denied")]
    AccessDenied,
    #[error("That handle is already taken in this realm")]
    HandleTaken,
    #[error("Invalid handle or password")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<DomainError> for AuthError {
    fn from(err: DomainError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

pub struct Authenticate {
    users: Arc<dyn UserRepo>,
    tokens: Arc<dyn AuthTokenRepo>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
    token_ttl: chrono::Duration,
    /// Realm -> access code. Realms not listed are open.
    access_codes: HashMap<String, String>,
}

impl Authenticate {
    pub fn new(
        users: Arc<dyn UserRepo>,
        tokens: Arc<dyn AuthTokenRepo>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        token_ttl: chrono::Duration,
        access_codes: HashMap<String, String>,
    ) -> Self {
        Self {
            users,
            tokens,
            clock,
            random,
            token_ttl,
            access_codes,
        }
    }

    pub async fn signup(&self, request: &AuthRequest) -> Result<AuthResponse, AuthError> {
        let (handle, server_code) = self.admit(request)?;
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let hash = hash_password(&request.password)?;
        let user = User::new(handle, server_code, self.clock.now());
        match self.users.create(&user, &hash).await {
            Ok(()) => {}
            Err(e) if e.is_constraint() => return Err(AuthError::HandleTaken),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(user_id = %user.id, server_code = %user.server_code, "Signed up");

        let token = self.issue_token(&user).await?;
        Ok(AuthResponse::ok(token, player_data(&user)))
    }

    pub async fn login(&self, request: &AuthRequest) -> Result<AuthResponse, AuthError> {
        let (handle, server_code) = self.admit(request)?;
        let stored = self
            .users
            .find_credentials(&server_code, &handle)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(&request.password, &stored.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        tracing::info!(user_id = %stored.user.id, "Logged in");

        let token = self.issue_token(&stored.user).await?;
        Ok(AuthResponse::ok(token, player_data(&stored.user)))
    }

    /// The user behind a bearer token, if it is known and unexpired.
    pub async fn verify_token(&self, token: &str) -> Result<Option<User>, RepoError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        match self.tokens.resolve(token, self.clock.now()).await? {
            Some(user_id) => self.users.get(user_id).await,
            None => Ok(None),
        }
    }

    /// Validate the request's names and the realm gate.
    fn admit(&self, request: &AuthRequest) -> Result<(Handle, ServerCode), AuthError> {
        let handle = Handle::new(request.handle.as_str())?;
        let server_code = ServerCode::new(request.server_code.as_str())?;
        self.check_access(&server_code, request.access_code.as_deref())?;
        Ok((handle, server_code))
    }

    fn check_access(&self, realm: &ServerCode, code: Option<&str>) -> Result<(), AuthError> {
        let Some(expected) = self.access_codes.get(realm.as_str()) else {
            return Ok(());
        };
        let code = code.map(str::trim).unwrap_or_default();
        if code == expected {
            return Ok(());
        }
        if self.access_codes.values().any(|other| other == code) {
            return Err(AuthError::AccessDenied);
        }
        Err(AuthError::Validation(format!(
            "Realm '{realm}' requires a valid access code"
        )))
    }

    async fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let token = self.random.gen_token();
        let expires_at = self.clock.now() + self.token_ttl;
        self.tokens.issue(&token, user.id, expires_at).await?;
        Ok(token)
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut password_hash::rand_core::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is unreadable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{CyclingRandom, FixedClock};
    use crate::infrastructure::ports::{MockAuthTokenRepo, MockUserRepo, StoredCredentials};
    use chrono::Utc;

    fn request(handle: &str, password: &str, realm: &str, code: Option<&str>) -> AuthRequest {
        AuthRequest {
            handle: handle.to_string(),
            password: password.to_string(),
            access_code: code.map(str::to_string),
            server_code: realm.to_string(),
        }
    }

    fn auth(users: MockUserRepo, tokens: MockAuthTokenRepo) -> Authenticate {
        let codes = HashMap::from([
            ("beta".to_string(), "xyzzy".to_string()),
            ("gamma".to_string(), "plugh".to_string()),
        ]);
        Authenticate::new(
            Arc::new(users),
            Arc::new(tokens),
            Arc::new(FixedClock(Utc::now())),
            Arc::new(CyclingRandom::new(vec![])),
            chrono::Duration::hours(1),
            codes,
        )
    }

    #[test]
    fn password_hash_round_trips() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn signup_issues_a_token_for_a_fresh_user() {
        let mut users = MockUserRepo::new();
        users
            .expect_create()
            .withf(|user, hash| user.hp == 20 && user.strength == 1 && hash.starts_with("$argon2"))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut tokens = MockAuthTokenRepo::new();
        tokens.expect_issue().times(1).returning(|_, _, _| Ok(()));

        let response = auth(users, tokens)
            .signup(&request("wanderer", "secret1", "alpha", None))
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.token.as_deref(), Some("token-0"));
    }

    #[tokio::test]
    async fn wrong_realm_code_is_access_denied() {
        let err = auth(MockUserRepo::new(), MockAuthTokenRepo::new())
            .signup(&request("wanderer", "secret1", "beta", Some("plugh")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccessDenied));
    }

    #[tokio::test]
    async fn missing_realm_code_is_a_validation_error() {
        let err = auth(MockUserRepo::new(), MockAuthTokenRepo::new())
            .signup(&request("wanderer", "secret1", "beta", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let err = auth(MockUserRepo::new(), MockAuthTokenRepo::new())
            .signup(&request("wanderer", "abc", "alpha", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_handle_is_taken() {
        let mut users = MockUserRepo::new();
        users
            .expect_create()
            .returning(|_, _| Err(RepoError::constraint("users.handle")));
        let err = auth(users, MockAuthTokenRepo::new())
            .signup(&request("wanderer", "secret1", "alpha", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::HandleTaken));
    }

    #[tokio::test]
    async fn login_checks_the_password() {
        let stored_user = User::new(
            Handle::new("wanderer").unwrap(),
            ServerCode::new("alpha").unwrap(),
            Utc::now(),
        );
        let hash = hash_password("secret1").unwrap();
        let mut users = MockUserRepo::new();
        users.expect_find_credentials().returning(move |_, _| {
            Ok(Some(StoredCredentials {
                user: stored_user.clone(),
                password_hash: hash.clone(),
            }))
        });
        let mut tokens = MockAuthTokenRepo::new();
        tokens.expect_issue().times(1).returning(|_, _, _| Ok(()));
        let auth = auth(users, tokens);

        let err = auth
            .login(&request("wanderer", "wrong-pass", "alpha", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(auth
            .login(&request("wanderer", "secret1", "alpha", None))
            .await
            .unwrap()
            .success);
    }

    #[tokio::test]
    async fn blank_token_never_hits_the_store() {
        let mut tokens = MockAuthTokenRepo::new();
        tokens.expect_resolve().never();
        let auth = auth(MockUserRepo::new(), tokens);
        assert!(auth.verify_token("  ").await.unwrap().is_none());
    }
}
