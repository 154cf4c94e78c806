//! Image upload endpoint.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};

use crate::models::{ImageFile, ImageFolder, UploadedImage};
use crate::rest::dto::UploadForm;
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// Upload an image into the `shops` or `products` folder
#[utoipa::path(
    post,
    path = "/api/v1/uploads/{folder}",
    tag = "Uploads",
    params(
        ("folder" = String, Path, description = "shops or products")
    ),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Hosted image URL", body = UploadedImage),
        (status = 400, description = "Unknown folder, missing file or invalid image", body = ErrorResponse),
        (status = 413, description = "Body exceeds the upload limit", body = ErrorResponse)
    )
)]
pub async fn upload(
    State(state): State<ApiState>,
    Path(folder): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadedImage>, ApiError> {
    let folder = ImageFolder::parse(&folder).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Unknown upload folder '{}', expected shops or products",
            folder
        ))
    })?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("image").to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| ImageFile::content_type_for(&file_name).to_string());
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let uploaded = state
            .service
            .upload_image(
                folder,
                ImageFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                },
            )
            .await?;
        return Ok(Json(uploaded));
    }

    Err(ApiError::BadRequest(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}
