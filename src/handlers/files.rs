// src/handlers/files.rs

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::{config::Config, error::AppError};

/// Lists the regular files available for download.
/// Login required; a missing directory yields an empty list.
pub async fn list_files(State(config): State<Config>) -> Result<impl IntoResponse, AppError> {
    let mut files = Vec::new();

    match tokio::fs::read_dir(&config.files_dir).await {
        Ok(mut entries) => {
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| AppError::InternalServerError(e.to_string()))?
            {
                let is_file = entry
                    .file_type()
                    .await
                    .map_err(|e| AppError::InternalServerError(e.to_string()))?
                    .is_file();
                if is_file {
                    files.push(entry.file_name().to_string_lossy().into_owned());
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Files directory '{}' does not exist", config.files_dir);
        }
        Err(e) => return Err(AppError::InternalServerError(e.to_string())),
    }

    files.sort();

    Ok(Json(serde_json::json!({ "files": files })))
}

/// Streams one file from the download directory as an attachment.
/// Login required. Filenames must be bare names, never paths.
pub async fn download_file(
    State(config): State<Config>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(AppError::BadRequest("Invalid filename".to_string()));
    }

    let path = std::path::Path::new(&config.files_dir).join(&filename);

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound("File not found".to_string())
        } else {
            AppError::InternalServerError(e.to_string())
        }
    })?;

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    Ok((headers, bytes))
}
