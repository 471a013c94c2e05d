use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::resource::{FileResource, ResourceKind, ResourceService, WebsiteUrl},
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
};

const MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10 MB

#[derive(Debug, Deserialize)]
pub struct AddUrlRequest {
    pub url: String,
    pub plan_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UrlIdentifierRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file: FileResource,
    pub credits_left: i64,
}

#[derive(Debug, Serialize)]
pub struct AddUrlResponse {
    pub url: WebsiteUrl,
    pub credits_left: i64,
}

pub struct ResourceController {
    resource_service: Arc<ResourceService>,
}

impl ResourceController {
    pub fn new(resource_service: Arc<ResourceService>) -> Self {
        Self { resource_service }
    }

    /// POST /api/files - Upload a file (multipart: `file` + `plan_id`)
    pub async fn upload_file(
        State(controller): State<Arc<ResourceController>>,
        Extension(auth_user): Extension<AuthUser>,
        mut multipart: Multipart,
    ) -> AppResult<(StatusCode, Json<UploadResponse>)> {
        let mut file: Option<(String, String, Vec<u8>)> = None;
        let mut plan_id: Option<Uuid> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
        {
            let field_name = field.name().map(String::from);
            match field_name.as_deref() {
                Some("file") => {
                    let name = field
                        .file_name()
                        .ok_or_else(|| {
                            AppError::BadRequest("file field requires a filename".to_string())
                        })?
                        .to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;

                    if bytes.len() > MAX_FILE_SIZE {
                        return Err(AppError::BadRequest(
                            "File must be 10 MB or less".to_string(),
                        ));
                    }
                    file = Some((name, content_type, bytes.to_vec()));
                }
                Some("plan_id") => {
                    let value = field.text().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read plan_id: {}", e))
                    })?;
                    plan_id = Some(
                        Uuid::parse_str(&value)
                            .map_err(|_| AppError::BadRequest("Invalid plan_id".to_string()))?,
                    );
                }
                _ => {}
            }
        }

        let (name, content_type, bytes) =
            file.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
        let plan_id =
            plan_id.ok_or_else(|| AppError::BadRequest("Missing plan_id".to_string()))?;

        let (file, receipt) = controller
            .resource_service
            .upload_file(auth_user.user_id, plan_id, &name, &content_type, &bytes)
            .await
            .map_err(AppError::from)?;

        Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                file,
                credits_left: receipt.credits_left,
            }),
        ))
    }

    /// GET /api/files - List the caller's files
    pub async fn list_files(
        State(controller): State<Arc<ResourceController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<Vec<FileResource>>> {
        let files = controller
            .resource_service
            .list_files(auth_user.user_id)
            .await
            .map_err(AppError::from)?;
        Ok(Json(files))
    }

    /// POST /api/files/:name/activate - Select one file for retrieval
    pub async fn activate_file(
        State(controller): State<Arc<ResourceController>>,
        Extension(auth_user): Extension<AuthUser>,
        Path(name): Path<String>,
    ) -> AppResult<StatusCode> {
        controller
            .resource_service
            .set_active(auth_user.user_id, ResourceKind::File, &name)
            .await
            .map_err(AppError::from)?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// DELETE /api/files/:name - Remove a file and its stored payload
    pub async fn delete_file(
        State(controller): State<Arc<ResourceController>>,
        Extension(auth_user): Extension<AuthUser>,
        Path(name): Path<String>,
    ) -> AppResult<StatusCode> {
        controller
            .resource_service
            .delete(auth_user.user_id, ResourceKind::File, &name)
            .await
            .map_err(AppError::from)?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// POST /api/urls - Register a website URL
    pub async fn add_url(
        State(controller): State<Arc<ResourceController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<AddUrlRequest>,
    ) -> AppResult<(StatusCode, Json<AddUrlResponse>)> {
        let (url, receipt) = controller
            .resource_service
            .add_url(auth_user.user_id, request.plan_id, &request.url)
            .await
            .map_err(AppError::from)?;

        Ok((
            StatusCode::CREATED,
            Json(AddUrlResponse {
                url,
                credits_left: receipt.credits_left,
            }),
        ))
    }

    /// GET /api/urls - List the caller's URLs
    pub async fn list_urls(
        State(controller): State<Arc<ResourceController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<Vec<WebsiteUrl>>> {
        let urls = controller
            .resource_service
            .list_urls(auth_user.user_id)
            .await
            .map_err(AppError::from)?;
        Ok(Json(urls))
    }

    /// POST /api/urls/activate - Select one URL for retrieval
    pub async fn activate_url(
        State(controller): State<Arc<ResourceController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<UrlIdentifierRequest>,
    ) -> AppResult<StatusCode> {
        controller
            .resource_service
            .set_active(auth_user.user_id, ResourceKind::Url, &request.url)
            .await
            .map_err(AppError::from)?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// DELETE /api/urls - Remove a URL (identifier in the body)
    pub async fn delete_url(
        State(controller): State<Arc<ResourceController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<UrlIdentifierRequest>,
    ) -> AppResult<StatusCode> {
        controller
            .resource_service
            .delete(auth_user.user_id, ResourceKind::Url, &request.url)
            .await
            .map_err(AppError::from)?;
        Ok(StatusCode::NO_CONTENT)
    }
}
