use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Concert {
    pub id: String,
    pub name: String,
    pub organizer: String,
    pub artist: String,
    pub venue: String,
    pub details: String,
    pub price: i64,
    pub date: DateTime<Utc>,
    pub image: String,
}
