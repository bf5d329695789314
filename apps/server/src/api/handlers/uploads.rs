//! Multipart upload handlers

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    response::IntoResponse,
};

use super::parse_id;
use crate::{
    api::{
        envelope::{BatchEnvelope, DataEnvelope, ListEnvelope, MessageEnvelope},
        extractors::QueryItems,
    },
    auth::{uploader_subject, AdminPrincipal, AuthenticatedPrincipal},
    models::{UploadCategory, UploadMetadata},
    services::IncomingFile,
    state::AppState,
    Error, Result,
};

const UPLOAD: &str = "Upload";

/// Files and form fields read from one multipart body.
#[derive(Debug, Default)]
struct UploadForm {
    files: Vec<IncomingFile>,
    metadata: UploadMetadata,
}

/// Reads the whole body. Files are accepted only under `file_field`;
/// unknown text fields are ignored.
async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() {
            if name != file_field {
                return Err(Error::Validation(format!(
                    "Unexpected file field '{name}', expected '{file_field}'"
                )));
            }
            form.files.push(read_file(field).await?);
            continue;
        }

        match name.as_str() {
            "category" => {
                let raw = read_text(field).await?;
                if !raw.trim().is_empty() {
                    form.metadata.category = UploadCategory::parse(&raw).ok_or_else(|| {
                        Error::Validation(format!("Invalid category '{}'", raw.trim()))
                    })?;
                }
            }
            "tags" => form.metadata.tags = UploadMetadata::parse_tags(&read_text(field).await?),
            "description" => {
                let text = read_text(field).await?;
                let text = text.trim();
                form.metadata.description = (!text.is_empty()).then(|| text.to_string());
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_file(field: Field<'_>) -> Result<IncomingFile> {
    let original_name = field.file_name().unwrap_or("upload").to_string();
    let mimetype = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| Error::Validation(format!("Failed to read '{original_name}': {e}")))?;

    Ok(IncomingFile {
        original_name,
        mimetype,
        bytes: bytes.to_vec(),
    })
}

async fn read_text(field: Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| Error::Validation(format!("Invalid form field: {e}")))
}

/// POST /api/upload
pub async fn upload_single(
    State(state): State<AppState>,
    principal: Option<AuthenticatedPrincipal>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut form = read_form(multipart, "file").await?;
    let file = match form.files.len() {
        0 => return Err(Error::Validation("No file uploaded".to_string())),
        1 => form.files.remove(0),
        _ => {
            return Err(Error::Validation(
                "Only one file is accepted here, use /api/upload/multiple".to_string(),
            ))
        }
    };

    let uploader = uploader_subject(principal.as_ref().map(|p| &p.0));
    let record = state
        .upload_service
        .upload(&uploader, file, &form.metadata)
        .await?;
    Ok(DataEnvelope::created(record).with_message("File uploaded successfully"))
}

/// POST /api/upload/multiple
pub async fn upload_multiple(
    State(state): State<AppState>,
    principal: Option<AuthenticatedPrincipal>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let form = read_form(multipart, "files").await?;
    let uploader = uploader_subject(principal.as_ref().map(|p| &p.0));
    let records = state
        .upload_service
        .upload_many(&uploader, form.files, &form.metadata)
        .await?;
    Ok(BatchEnvelope::new(records))
}

/// GET /api/upload
pub async fn list_uploads(
    State(state): State<AppState>,
    query: QueryItems,
) -> Result<impl IntoResponse> {
    let category = match query.get("category") {
        Some(raw) => Some(
            UploadCategory::parse(raw)
                .ok_or_else(|| Error::Validation(format!("Invalid category '{raw}'")))?,
        ),
        None => None,
    };
    let page = state
        .config
        .search
        .normalizer_options()
        .page_from_items(&query.0);

    let (records, total) = state.upload_service.list(category, page).await?;
    Ok(ListEnvelope::new(records, total, page))
}

pub async fn get_upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(UPLOAD, &id)?;
    let record = state.upload_service.get(id).await?;
    Ok(DataEnvelope::ok(record))
}

pub async fn delete_upload(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(UPLOAD, &id)?;
    state.upload_service.delete(id).await?;
    Ok(MessageEnvelope::new("File deleted successfully"))
}
