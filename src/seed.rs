use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::models::user::ROLE_ADMIN;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "admin123";

pub async fn run(pool: &SqlitePool) -> Result<(), AppError> {
    seed_admin(pool).await?;
    seed_concert(pool).await?;
    Ok(())
}

async fn seed_admin(pool: &SqlitePool) -> Result<(), AppError> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(ADMIN_EMAIL)
        .fetch_one(pool)
        .await?;

    if existing > 0 {
        tracing::info!("admin user already exists, skipping");
        return Ok(());
    }

    sqlx::query("INSERT INTO users (id, name, email, password_hash, role) VALUES (?, ?, ?, ?, ?)")
        .bind(Uuid::new_v4().to_string())
        .bind("Admin User")
        .bind(ADMIN_EMAIL)
        .bind(hash_password(ADMIN_PASSWORD)?)
        .bind(ROLE_ADMIN)
        .execute(pool)
        .await?;

    tracing::info!(email = ADMIN_EMAIL, "admin user created");
    Ok(())
}

async fn seed_concert(pool: &SqlitePool) -> Result<(), AppError> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM concerts")
        .fetch_one(pool)
        .await?;

    if existing > 0 {
        tracing::info!("concerts already exist, skipping");
        return Ok(());
    }

    let date: DateTime<Utc> = "2024-12-31T20:00:00Z".parse().expect("valid timestamp");

    sqlx::query(
        r#"
        INSERT INTO concerts (id, name, organizer, artist, venue, details, price, date, image)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind("Kessoku Debut Concert")
    .bind("Starry Inc")
    .bind("Kessoku Band")
    .bind("Buddokan Stadium")
    .bind(
        "Join us for an unforgettable Kessoku Debut Concert with live music, amazing \
         performances, and a spectacular countdown to midnight.",
    )
    .bind(10_i64)
    .bind(date)
    .bind("kessoku-concert.jpg")
    .execute(pool)
    .await?;

    tracing::info!("demo concert created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let pool = db::connect_memory().await;

        run(&pool).await.unwrap();
        run(&pool).await.unwrap();

        let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        let concerts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM concerts")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(users, 1);
        assert_eq!(concerts, 1);
    }

    #[tokio::test]
    async fn seeded_admin_has_hashed_password() {
        let pool = db::connect_memory().await;
        run(&pool).await.unwrap();

        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE email = ?",
        )
        .bind(ADMIN_EMAIL)
        .fetch_one(&pool)
        .await
        .unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(crate::auth::password::verify_password(ADMIN_PASSWORD, &hash).unwrap());
    }
}
