use crate::error::{AppError, AppResult};
use actix_multipart::Multipart;
use futures_util::StreamExt;

/// Largest multipart body accepted by the upload routes.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

pub struct Part {
    pub name: String,
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

/// Every named part of a multipart request, read into memory.
pub struct Parts(Vec<Part>);

impl Parts {
    pub async fn read(mut payload: Multipart) -> AppResult<Self> {
        let mut parts = Vec::new();
        let mut total = 0usize;

        while let Some(item) = payload.next().await {
            let mut field = item?;
            let Some(disposition) = field.content_disposition() else {
                continue;
            };
            let Some(name) = disposition.get_name().map(str::to_string) else {
                continue;
            };
            let filename = disposition.get_filename().map(str::to_string);

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk?;
                total += chunk.len();
                if total > MAX_UPLOAD_BYTES {
                    return Err(AppError::BadRequest(format!(
                        "Upload exceeds {} bytes",
                        MAX_UPLOAD_BYTES
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }
            parts.push(Part {
                name,
                filename,
                bytes,
            });
        }
        Ok(Parts(parts))
    }

    pub fn take(&mut self, name: &str) -> Option<Part> {
        let idx = self.0.iter().position(|p| p.name == name)?;
        Some(self.0.remove(idx))
    }

    pub fn require(&mut self, name: &str) -> AppResult<Part> {
        self.take(name)
            .ok_or_else(|| AppError::BadRequest(format!("Missing '{}' part", name)))
    }

    /// Like `require`, but also rejects an empty part.
    pub fn require_file(&mut self, name: &str) -> AppResult<Part> {
        let part = self.require(name)?;
        if part.bytes.is_empty() {
            return Err(AppError::BadRequest(format!("The '{}' part is empty", name)));
        }
        Ok(part)
    }
}
