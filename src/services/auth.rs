//! Authentication service: login, registration, refresh-token rotation

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{Duration, Utc};
use rand::RngCore;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{
        AuthResponse, Claims, LoginRequest, RegisterRequest, Role, User, UserInfo,
    },
    repository::Repository,
    validation,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by email and password, issuing an access token and a
    /// fresh refresh token persisted with its expiry.
    pub async fn authenticate(&self, request: &LoginRequest) -> AppResult<AuthResponse> {
        validation::validate(request)?;

        let user = self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user, &request.password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        self.issue_tokens(&user).await
    }

    /// Register a new user with the default role
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<UserInfo> {
        validation::validate(request)?;

        if self.repository.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict(
                "A user with this email already exists".to_string(),
            ));
        }

        let password_hash = self.hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .create(&request.email, &password_hash, Role::User)
            .await?;

        tracing::info!(user_id = user.id, "Registered new user");

        Ok(user.into())
    }

    /// Exchange a refresh token for a new access token. The refresh token is
    /// rotated: the presented token is invalidated and a new one issued.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let user = self
            .repository
            .users
            .get_by_refresh_token(refresh_token)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid refresh token".to_string()))?;

        let expired = user
            .refresh_token_expires_at
            .map(|expiry| expiry <= Utc::now())
            .unwrap_or(true);
        if expired {
            return Err(AppError::Authentication(
                "Refresh token has expired".to_string(),
            ));
        }

        self.issue_tokens(&user).await
    }

    /// Invalidate the stored refresh token of the authenticated principal
    pub async fn logout(&self, user_id: i32) -> AppResult<()> {
        // Confirm the principal still exists before touching its token
        self.repository.users.get_by_id(user_id).await?;
        self.repository.users.clear_refresh_token(user_id).await?;

        Ok(())
    }

    /// Current user profile
    pub async fn current_user(&self, user_id: i32) -> AppResult<UserInfo> {
        let user = self.repository.users.get_by_id(user_id).await?;
        Ok(user.into())
    }

    async fn issue_tokens(&self, user: &User) -> AppResult<AuthResponse> {
        let token = self.create_access_token(user)?;

        let refresh_token = generate_refresh_token();
        let expires_at = Utc::now() + Duration::days(self.config.refresh_token_days as i64);
        self.repository
            .users
            .set_refresh_token(user.id, &refresh_token, expires_at)
            .await?;

        Ok(AuthResponse {
            token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_minutes as i64 * 60,
        })
    }

    fn create_access_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + self.config.access_token_minutes as i64 * 60;

        let claims = Claims {
            sub: user.id.to_string(),
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}

/// Opaque refresh token: 32 random bytes, base64 encoded
fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}
