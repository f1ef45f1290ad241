use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{AccessClaims, TokenIssuer};
use crate::error::AppError;
use crate::models::session::Session;
use crate::models::user::User;

/// Sessions outlive access tokens by orders of magnitude; refresh does not
/// extend this window.
pub const SESSION_TTL_DAYS: i64 = 10;

#[derive(Debug)]
pub struct LoginOutcome {
    pub access_token: String,
    pub session_token: String,
    pub user: User,
}

/// Row shape for the session/user join used by refresh.
#[derive(sqlx::FromRow)]
struct SessionOwner {
    session_id: String,
    expires_at: chrono::DateTime<Utc>,
    id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
}

#[derive(Clone)]
pub struct AuthService {
    db: SqlitePool,
    issuer: TokenIssuer,
}

impl AuthService {
    pub fn new(db: SqlitePool, issuer: TokenIssuer) -> Self {
        AuthService { db, issuer }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        let Some(user) = user else {
            // Burn the same Argon2 work as a real verification so an unknown
            // email is not distinguishable from a wrong password by timing
            let _ = hash_password(password);
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self
            .issuer
            .issue_access_token(&user.id, &user.email, &user.role)?;

        let session_token = TokenIssuer::generate_session_token();
        let now = Utc::now();
        let expires_at = now + Duration::days(SESSION_TTL_DAYS);

        sqlx::query(
            "INSERT INTO sessions (id, token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&session_token)
        .bind(&user.id)
        .bind(expires_at)
        .bind(now)
        .execute(&self.db)
        .await?;

        tracing::debug!(user_id = %user.id, "login succeeded, session created");

        Ok(LoginOutcome {
            access_token,
            session_token,
            user,
        })
    }

    pub async fn refresh(&self, session_token: &str) -> Result<(String, User), AppError> {
        let row = sqlx::query_as::<_, SessionOwner>(
            r#"
            SELECT s.id AS session_id, s.expires_at,
                   u.id, u.name, u.email, u.password_hash, u.role
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = ?
            "#,
        )
        .bind(session_token)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidSession)?;

        if Utc::now() > row.expires_at {
            // Lazy purge: the stale row dies on its first use attempt
            sqlx::query("DELETE FROM sessions WHERE id = ?")
                .bind(&row.session_id)
                .execute(&self.db)
                .await?;
            return Err(AppError::SessionExpired);
        }

        let user = User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role,
        };

        let access_token = self
            .issuer
            .issue_access_token(&user.id, &user.email, &user.role)?;

        Ok((access_token, user))
    }

    /// Idempotent by design: clients retry logout, so an unknown or
    /// already-removed token is not an error.
    pub async fn logout(&self, session_token: &str) -> Result<(), AppError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, token, user_id, expires_at, created_at FROM sessions WHERE token = ?",
        )
        .bind(session_token)
        .fetch_optional(&self.db)
        .await?;

        if let Some(session) = session {
            sqlx::query("DELETE FROM sessions WHERE id = ?")
                .bind(&session.id)
                .execute(&self.db)
                .await?;
            tracing::debug!(user_id = %session.user_id, "session removed");
        }

        Ok(())
    }

    pub fn validate_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        self.issuer.verify_access_token(token)
    }

    pub async fn user_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    /// Bulk removal of sessions past expiry. Meant for an external scheduler;
    /// only ever deletes rows already expired, so it is safe to run alongside
    /// live login/refresh/logout traffic.
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(Utc::now())
            .execute(&self.db)
            .await?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            tracing::info!(deleted, "removed expired sessions");
        }
        Ok(deleted)
    }
}
