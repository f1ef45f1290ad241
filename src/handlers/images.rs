use std::path::Path as FsPath;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use rand_core::{OsRng, RngCore};
use serde::Serialize;

use crate::{error::AppError, handlers::auth::MessageResponse, AppState};

const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub url: String,
}

/// Uploaded names are server-generated, but serving goes by client-supplied
/// path segments; anything that could escape the uploads directory is refused.
fn sanitize_name(name: &str) -> Result<&str, AppError> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(AppError::NotFound("Image"));
    }
    Ok(name)
}

fn content_type_for(name: &str) -> &'static str {
    match FsPath::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

pub async fn get_image(
    State(state): State<AppState>,
    Path(image_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let name = sanitize_name(&image_name)?;
    let path = state.files_dir.join(name);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("Image"))
        }
        Err(e) => return Err(AppError::Io(e)),
    };

    Ok(([(header::CONTENT_TYPE, content_type_for(name))], bytes))
}

pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.file_name().is_none() {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !ALLOWED_MIME_TYPES.contains(&content_type.as_str()) {
            return Err(AppError::Validation("File is not an image".to_string()));
        }

        let ext = field
            .file_name()
            .and_then(|name| FsPath::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default();

        let mut random = [0u8; 16];
        OsRng.fill_bytes(&mut random);
        let filename = format!("{}{}", hex::encode(random), ext);

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;

        tokio::fs::create_dir_all(&state.files_dir).await?;
        tokio::fs::write(state.files_dir.join(&filename), &bytes).await?;

        tracing::info!(%filename, size = bytes.len(), "image uploaded");

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                message: "Image uploaded successfully".to_string(),
                url: format!("/images/{}", filename),
                filename,
            }),
        ));
    }

    Err(AppError::Validation("No image file provided".to_string()))
}

pub async fn delete_image(
    State(state): State<AppState>,
    Path(image_name): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let name = sanitize_name(&image_name)?;
    let path = state.files_dir.join(name);

    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(Json(MessageResponse {
            message: "Image deleted successfully".to_string(),
        })),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound("Image")),
        Err(e) => Err(AppError::Io(e)),
    }
}
