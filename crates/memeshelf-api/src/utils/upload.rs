//! Multipart upload form parsing

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use memeshelf_core::AppError;
use uuid::Uuid;

/// The fields of an upload form, before any validation.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: String,
    pub title: String,
    pub tags: String,
    pub album_id: Option<Uuid>,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the maximum allowed size".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", e.body_text()))
    }
}

/// Reads `file`, `title`, `tags` and `album_id` from the form.
/// Exactly one `file` field is accepted; unknown fields are ignored.
pub async fn extract_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if file_data.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                form.filename = field.file_name().unwrap_or("unknown").to_string();
                form.content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                file_data = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            }
            "title" => form.title = field.text().await.map_err(multipart_error)?,
            "tags" => form.tags = field.text().await.map_err(multipart_error)?,
            "album_id" => {
                let raw = field.text().await.map_err(multipart_error)?;
                form.album_id = parse_album_id(&raw)?;
            }
            _ => {}
        }
    }

    form.data = file_data.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
    Ok(form)
}

fn parse_album_id(raw: &str) -> Result<Option<Uuid>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(raw)
        .map(Some)
        .map_err(|_| AppError::InvalidInput("Select a valid album".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_album_means_none() {
        assert_eq!(parse_album_id("  ").unwrap(), None);
        let id = Uuid::new_v4();
        assert_eq!(parse_album_id(&id.to_string()).unwrap(), Some(id));
        assert!(matches!(
            parse_album_id("not-an-id"),
            Err(AppError::InvalidInput(_))
        ));
    }
}
