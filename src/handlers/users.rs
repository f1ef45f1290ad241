use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::password::hash_password,
    error::AppError,
    handlers::auth::MessageResponse,
    models::user::{CreateUser, UpdateUser, User, UserSummary, ROLE_USER},
    AppState,
};

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserSummary>), AppError> {
    let password_hash = hash_password(&payload.password)?;
    let role = payload.role.unwrap_or_else(|| ROLE_USER.to_string());

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, name, email, password_hash, role
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&password_hash)
    .bind(&role)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(UserSummary::from(user))))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<UserSummary>, AppError> {
    let mut user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role FROM users WHERE id = ?",
    )
    .bind(&id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("User"))?;

    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(email) = payload.email {
        user.email = email;
    }
    if let Some(password) = payload.password {
        user.password_hash = hash_password(&password)?;
    }

    sqlx::query("UPDATE users SET name = ?, email = ?, password_hash = ? WHERE id = ?")
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.id)
        .execute(&state.db)
        .await?;

    Ok(Json(UserSummary::from(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User"));
    }

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
