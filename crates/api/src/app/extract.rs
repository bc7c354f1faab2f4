//! Extractors whose rejections render through [`ApiError`].

use std::str::FromStr;

use axum::extract::{FromRequest, Multipart};

use devcamper_core::RecordId;
use devcamper_infra::PhotoUpload;

use super::errors::ApiError;

/// JSON body; malformed input answers with the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Parse a path segment as a record id; malformed ids are cast errors.
pub fn record_id(raw: &str) -> Result<RecordId, ApiError> {
    Ok(RecordId::from_str(raw)?)
}

/// Multipart field holding the uploaded photo.
pub const PHOTO_FIELD: &str = "file";

/// First `file` field of the form, if any.
pub async fn photo_upload(mut multipart: Multipart) -> Result<Option<PhotoUpload>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?.to_vec();
        return Ok(Some(PhotoUpload {
            file_name,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn malformed_id_is_a_bad_request() {
        let err = record_id("5d713995b721c3bb38c1f5d0").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid identifier: 5d713995b721c3bb38c1f5d0");
    }

    #[test]
    fn well_formed_id_parses() {
        let id = RecordId::new();
        assert_eq!(record_id(&id.to_string()).unwrap(), id);
    }
}
