//! Image files attached to stock units.
//!
//! Files live under `<media_dir>/<VIN>/<uuid>.<ext>` and are served by the
//! static file route mounted at `media_url`.

use crate::error::{AppError, AppResult};
use crate::import::parser::normalize_vin;
use log::{debug, info};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    fn key_dir(&self, key: &str) -> AppResult<(String, PathBuf)> {
        let vin = normalize_vin(key)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid image key '{}'", key)))?;
        let dir = self.root.join(&vin);
        Ok((vin, dir))
    }

    /// Validates that `bytes` is a PNG, JPEG or WebP image, writes it and
    /// returns its public URL.
    pub fn save_image(&self, key: &str, bytes: &[u8]) -> AppResult<String> {
        let (vin, dir) = self.key_dir(key)?;
        let format = image::guess_format(bytes)
            .map_err(|_| AppError::BadRequest("The file is not a recognized image".into()))?;
        let extension = match format {
            image::ImageFormat::Png => "png",
            image::ImageFormat::Jpeg => "jpg",
            image::ImageFormat::WebP => "webp",
            other => {
                return Err(AppError::BadRequest(format!(
                    "Unsupported image format {:?}",
                    other
                )))
            }
        };

        fs::create_dir_all(&dir)?;
        let file_name = format!("{}.{}", uuid::Uuid::new_v4(), extension);
        fs::write(dir.join(&file_name), bytes)?;

        let url = format!("{}/{}/{}", self.url_prefix, vin, file_name);
        info!("Stored image {} ({} bytes)", url, bytes.len());
        Ok(url)
    }

    /// Deletes every stored file of `key`. Returns how many were removed.
    pub fn purge(&self, key: &str) -> AppResult<usize> {
        let (vin, dir) = self.key_dir(key)?;
        if !dir.exists() {
            debug!("No stored images for {}", vin);
            return Ok(0);
        }
        let count = fs::read_dir(&dir)?
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .count();
        fs::remove_dir_all(&dir)?;
        info!("Removed {} stored images for {}", count, vin);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_save_and_purge() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::new(dir.path(), "/media/");

        let url = media.save_image("wba11aa0x0n000001", PNG_HEADER).unwrap();
        assert!(url.starts_with("/media/WBA11AA0X0N000001/"));
        assert!(url.ends_with(".png"));
        assert!(dir.path().join("WBA11AA0X0N000001").is_dir());

        assert_eq!(media.purge("WBA11AA0X0N000001").unwrap(), 1);
        assert!(!dir.path().join("WBA11AA0X0N000001").exists());
        assert_eq!(media.purge("WBA11AA0X0N000001").unwrap(), 0);
    }

    #[test]
    fn test_rejects_path_like_keys_and_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::new(dir.path(), "/media");
        assert!(matches!(
            media.save_image("../../etc", PNG_HEADER),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            media.save_image("WBA11AA0X0N000001", b"plain text"),
            Err(AppError::BadRequest(_))
        ));
    }
}
