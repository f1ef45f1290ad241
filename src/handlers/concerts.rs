use axum::{extract::State, Json};

use crate::{error::AppError, models::concert::Concert, AppState};

pub async fn list_concerts(
    State(state): State<AppState>,
) -> Result<Json<Vec<Concert>>, AppError> {
    let concerts = sqlx::query_as::<_, Concert>(
        "SELECT id, name, organizer, artist, venue, details, price, date, image FROM concerts ORDER BY date",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(concerts))
}
