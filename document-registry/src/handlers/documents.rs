use crate::dtos::DocumentResponse;
use crate::models::UpdateFields;
use crate::services::{metrics, ServiceError, UploadRequest, UploadedFile};
use crate::startup::AppState;
use crate::utils::ValidatedJson;
use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(anyhow::anyhow!("Upload exceeds the request size limit"))
    } else {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    }
}

/// Buffers a file part, aborting once the running length passes `limit`.
async fn read_file_capped(field: &mut Field<'_>, limit: usize) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > limit {
            metrics::record_upload_rejected("too_large");
            return Err(ServiceError::PayloadTooLarge(limit).into());
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(multipart_error)
}

pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload = UploadRequest::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        // Unknown parts are skipped; multer discards their bodies on the next read.
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = read_file_capped(&mut field, state.upload.max_upload_bytes).await?;

                upload.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            "uploader" => upload.uploader = Some(read_text(field).await?),
            "department" => upload.department = Some(read_text(field).await?),
            "notes" => upload.notes = Some(read_text(field).await?),
            _ => {}
        }
    }

    let created = state.documents.create(upload).await?;

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(created))))
}

pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let documents = state.documents.list_all().await?;

    Ok(Json(
        documents
            .into_iter()
            .map(DocumentResponse::from)
            .collect::<Vec<_>>(),
    ))
}

pub async fn list_documents_by_department(
    State(state): State<AppState>,
    Path(department): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let documents = state.documents.list_by_department(&department).await?;

    Ok(Json(
        documents
            .into_iter()
            .map(DocumentResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// Single-record fetch; unlike the list endpoints this includes `fileData`.
pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let document = state.documents.get(&document_id).await?;

    Ok(Json(DocumentResponse::from(document)))
}

pub async fn update_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    ValidatedJson(fields): ValidatedJson<UpdateFields>,
) -> Result<impl IntoResponse, AppError> {
    let document = state.documents.update(&document_id, fields).await?;

    Ok(Json(DocumentResponse::from(document)))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.documents.delete(&document_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn download_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let download = state.documents.download(&document_id).await?;

    tracing::info!(
        document_id = %document_id,
        file_type = %download.file_type,
        size = download.file_data.len(),
        "Document download completed"
    );

    let disposition = format!(
        "attachment; filename=\"{}\"",
        download.file_name.replace(['"', '\\'], "_")
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, download.file_type.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.file_data,
    ))
}
