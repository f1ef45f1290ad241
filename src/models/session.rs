use chrono::{DateTime, Utc};

/// Opaque refresh credential. One row per login; deleted on logout,
/// on a refresh attempt past expiry, or by bulk cleanup.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
