use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{self, JwtError, TokenScope};
use crate::database::models::admin::AdminUser;
use crate::database::models::user::{User, UserRole};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("This account has been disabled")]
    AccountDisabled,
    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Token(#[from] JwtError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Public view of a user account, returned by auth and profile endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub city_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            role: user.role,
            city_id: user.city_id,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserSession {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminSession {
    pub token: String,
    pub admin: AdminProfile,
}

pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a student account and log it in.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
        phone: Option<&str>,
        city_id: Option<i32>,
    ) -> Result<UserSession, AuthError> {
        let taken: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND deleted_at IS NULL)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        if taken.0 {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = auth::hash_password(password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, name, phone, role, city_id)
            VALUES ($1, $2, $3, $4, $5, 'student', $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(phone)
        .bind(city_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Created user account {}", user.id);

        let token = auth::issue_token(user.id, TokenScope::User)?;
        Ok(UserSession {
            token,
            user: user.into(),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserSession, AuthError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1 AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

        if !auth::verify_password(password, &user.password_hash)? {
            tracing::warn!("Failed login attempt for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        let token = auth::issue_token(user.id, TokenScope::User)?;
        Ok(UserSession {
            token,
            user: user.into(),
        })
    }

    pub async fn admin_login(&self, email: &str, password: &str) -> Result<AdminSession, AuthError> {
        let admin = sqlx::query_as::<_, AdminUser>("SELECT * FROM admin_users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !auth::verify_password(password, &admin.password_hash)? {
            tracing::warn!("Failed admin login attempt for {}", admin.id);
            return Err(AuthError::InvalidCredentials);
        }

        if !admin.is_active {
            return Err(AuthError::AccountDisabled);
        }

        let token = auth::issue_token(admin.id, TokenScope::Admin)?;
        Ok(AdminSession {
            token,
            admin: AdminProfile {
                id: admin.id,
                email: admin.email,
                name: admin.name,
            },
        })
    }
}
