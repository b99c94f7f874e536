use actix_multipart::Multipart;
use futures::StreamExt;
use summarist_common::{Result, SummaristError};
use tracing::debug;

/// Form field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// A file received through a multipart form
#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Read the `file` field, refusing to buffer more than `max_bytes`
///
/// Other fields are drained and ignored.
pub async fn read_upload(mut payload: Multipart, max_bytes: usize) -> Result<Upload> {
    let mut upload = None;

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(invalid_form)?;
        let content_disposition = field.content_disposition();

        if content_disposition.get_name() != Some(FILE_FIELD) || upload.is_some() {
            while let Some(chunk) = field.next().await {
                chunk.map_err(invalid_form)?;
            }
            continue;
        }

        let filename = content_disposition
            .get_filename()
            .unwrap_or("unknown")
            .to_string();

        let mut content = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(invalid_form)?;
            if content.len() + data.len() > max_bytes {
                return Err(SummaristError::payload_too_large(format!(
                    "File too large (max {} MB)",
                    max_bytes / (1024 * 1024)
                )));
            }
            content.extend_from_slice(&data);
        }

        debug!("Received upload {} ({} bytes)", filename, content.len());
        upload = Some(Upload { filename, content });
    }

    upload.ok_or_else(|| SummaristError::user_input("No file uploaded"))
}

fn invalid_form(err: actix_multipart::MultipartError) -> SummaristError {
    SummaristError::user_input(format!("Invalid multipart form: {}", err))
}
