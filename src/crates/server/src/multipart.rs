use crate::error::ApiError;
use actix_multipart::{Multipart, MultipartError};
use bytes::BytesMut;
use futures::TryStreamExt;
use std::collections::HashMap;

/// One file carried by a multipart request, fully buffered.
pub struct UploadedFile {
    pub file_name: String,
    pub data: BytesMut,
}

/// Parsed multipart form: file parts keyed by part name, text parts
/// collected as plain fields.
#[derive(Default)]
pub struct UploadForm {
    files: HashMap<String, UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(payload: &mut Multipart, max_file_size: usize) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        loop {
            let mut field = match payload.try_next().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                // a body carrying no parts at all surfaces as an
                // incomplete stream; the handlers report which part is
                // missing, so treat it as an empty form
                Err(MultipartError::Incomplete) => break,
                Err(e) => {
                    return Err(ApiError::bad_request(format!(
                        "Malformed multipart payload: {e}"
                    )))
                }
            };
            let disposition = field.content_disposition();
            let part_name = disposition.get_name().unwrap_or_default().to_string();
            let file_name = disposition.get_filename().map(str::to_string);

            let mut data = BytesMut::new();
            while let Some(chunk) = field
                .try_next()
                .await
                .map_err(|e| ApiError::bad_request(format!("Malformed multipart payload: {e}")))?
            {
                if data.len() + chunk.len() > max_file_size {
                    return Err(ApiError::bad_request(format!(
                        "File too large: the limit is {max_file_size} bytes"
                    )));
                }
                data.extend_from_slice(&chunk);
            }

            match file_name {
                Some(file_name) => {
                    form.files
                        .insert(part_name, UploadedFile { file_name, data });
                }
                None => {
                    let value = String::from_utf8_lossy(&data).to_string();
                    form.fields.insert(part_name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn require_file(&self, name: &str, error: &str) -> Result<&UploadedFile, ApiError> {
        self.file(name).ok_or_else(|| ApiError::bad_request(error))
    }

    pub fn require_field(&self, name: &str) -> Result<&str, ApiError> {
        self.field(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::bad_request(format!("{name} is required")))
    }
}
