//! Upload and content replacement handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::extract::multipart::Field;
use axum::http::StatusCode;
use bytes::Bytes;
use chrono::NaiveDate;

use docvault_core::error::AppError;
use docvault_core::types::NodeId;
use docvault_entity::node::Node;
use docvault_service::content::{
    CompleteUploadRequest, PresignRequest, PresignedUpload, UploadAttributes,
};

use crate::dto::response::ApiResponse;
use crate::extractors::ActingActor;
use crate::state::AppState;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// The `file` part of a multipart body.
#[derive(Debug)]
struct UploadedFile {
    filename: String,
    content_type: String,
    data: Bytes,
}

/// Reads the `file` part and the node attribute parts of a multipart body.
async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(UploadAttributes, UploadedFile), AppError> {
    let mut attributes = UploadAttributes::default();
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(String::from)
                    .ok_or_else(|| AppError::validation("file part has no file name"))?;
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                file = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            "parent_id" => {
                let text = field_text(field).await?;
                if !text.is_empty() {
                    attributes.parent_id = Some(
                        text.parse::<NodeId>()
                            .map_err(|_| AppError::validation("Invalid parent_id"))?,
                    );
                }
            }
            "name" => attributes.name = non_empty(field_text(field).await?),
            "status" => attributes.status = non_empty(field_text(field).await?),
            "comments" => attributes.comments = non_empty(field_text(field).await?),
            "expires_on" => {
                if let Some(text) = non_empty(field_text(field).await?) {
                    attributes.expires_on = Some(
                        text.parse::<NaiveDate>()
                            .map_err(|_| AppError::validation("Invalid expires_on, expected YYYY-MM-DD"))?,
                    );
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::validation("file is required"))?;
    Ok((attributes, file))
}

async fn field_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map(|t| t.trim().to_string())
        .map_err(|e| AppError::validation(format!("Read error: {e}")))
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

/// POST /api/uploads: multipart upload creating a file node
pub async fn upload(
    State(state): State<AppState>,
    actor: ActingActor,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Node>>), AppError> {
    let (attributes, file) = read_multipart(multipart).await?;
    let node = state
        .services
        .content
        .upload(
            &actor,
            attributes,
            &file.filename,
            file.data,
            &file.content_type,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(node))))
}

/// POST /api/uploads/presign
pub async fn presign(
    State(state): State<AppState>,
    actor: ActingActor,
    Json(req): Json<PresignRequest>,
) -> Result<Json<ApiResponse<PresignedUpload>>, AppError> {
    let presigned = state.services.content.presign_upload(&actor, req).await?;
    Ok(Json(ApiResponse::ok(presigned)))
}

/// POST /api/uploads/complete
pub async fn complete(
    State(state): State<AppState>,
    actor: ActingActor,
    Json(req): Json<CompleteUploadRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Node>>), AppError> {
    let node = state.services.content.complete_upload(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(node))))
}

/// PUT /api/nodes/{id}/content: multipart content replacement
pub async fn replace_content(
    State(state): State<AppState>,
    actor: ActingActor,
    Path(id): Path<NodeId>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Node>>, AppError> {
    let (_, file) = read_multipart(multipart).await?;
    let node = state
        .services
        .content
        .replace_content(&actor, id, &file.filename, file.data, &file.content_type)
        .await?;
    Ok(Json(ApiResponse::ok(node)))
}
