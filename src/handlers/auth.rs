use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::user::UserSummary, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub session_token: String,
    pub user: UserSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokenRequest {
    pub session_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let outcome = state.auth.login(&payload.email, &payload.password).await?;

    Ok(Json(LoginResponse {
        access_token: outcome.access_token,
        session_token: outcome.session_token,
        user: UserSummary::from(outcome.user),
    }))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<SessionTokenRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let (access_token, user) = state.auth.refresh(&payload.session_token).await?;

    Ok(Json(RefreshResponse {
        access_token,
        user: UserSummary::from(user),
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<SessionTokenRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth.logout(&payload.session_token).await?;

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}
