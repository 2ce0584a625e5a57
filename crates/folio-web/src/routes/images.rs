//! Image upload.

use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};
use folio_core::media;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// A file part read from a multipart form.
pub struct FilePart {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub async fn read(field: Field<'_>) -> ApiResult<Self> {
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?.to_vec();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub async fn store(self, state: &AppState) -> ApiResult<media::UploadedImage> {
        let image = media::upload_image(
            state.images.as_ref(),
            &self.file_name,
            self.content_type.as_deref(),
            self.bytes,
        )
        .await?;
        Ok(image)
    }
}

pub fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::bad_request(format!("malformed upload: {}", e))
}

/// Upload one image from the `file` part; used by the markdown editor.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            let image = FilePart::read(field).await?.store(&state).await?;
            return Ok(Json(json!({ "success": true, "imageUrl": image.url })));
        }
    }
    Err(ApiError::bad_request("no file uploaded"))
}
