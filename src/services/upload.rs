use crate::error::{AppError, AppResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

#[derive(Clone)]
pub struct UploadConfig {
    pub upload_dir: String,
}

const COMPLAINT_SUBDIR: &str = "complaints";
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024; // 5 MB
const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Validate file magic bytes match the declared content type.
fn validate_magic_bytes(data: &[u8], content_type: &str) -> bool {
    match content_type {
        "image/jpeg" => data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF],
        "image/png" => data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47],
        "image/gif" => data.len() >= 4 && data[..4] == [0x47, 0x49, 0x46, 0x38],
        "image/webp" => {
            data.len() >= 12
                && data[..4] == [0x52, 0x49, 0x46, 0x46]
                && data[8..12] == [0x57, 0x45, 0x42, 0x50]
        }
        _ => false,
    }
}

/// Map a public `/uploads/...` path back to its location on disk.
/// Rejects anything that does not point inside the upload directory.
fn disk_path_for(config: &UploadConfig, public_path: &str) -> Option<PathBuf> {
    let relative = public_path.strip_prefix("/uploads/")?;
    if relative.is_empty() || relative.split('/').any(|seg| seg.is_empty() || seg == "..") {
        return None;
    }
    Some(Path::new(&config.upload_dir).join(relative))
}

pub struct UploadService;

impl UploadService {
    /// Save a complaint photo to disk.
    /// Returns the public URL path (e.g. `/uploads/complaints/<uuid>.jpg`).
    pub async fn save_file(
        config: &UploadConfig,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<String> {
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::PayloadTooLarge);
        }

        if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
            return Err(AppError::Validation(format!(
                "Unsupported file type: {}. Allowed: jpeg, png, gif, webp",
                content_type
            )));
        }

        if !validate_magic_bytes(data, content_type) {
            return Err(AppError::Validation(
                "File content does not match declared content type".to_string(),
            ));
        }

        let ext = match content_type {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => return Err(AppError::Validation("Unsupported file type".to_string())),
        };

        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let dir = Path::new(&config.upload_dir).join(COMPLAINT_SUBDIR);

        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Validation(format!("Failed to create upload directory: {}", e))
        })?;

        let file_path = dir.join(&filename);
        fs::write(&file_path, data)
            .await
            .map_err(|e| AppError::Validation(format!("Failed to write file: {}", e)))?;

        Ok(format!("/uploads/{}/{}", COMPLAINT_SUBDIR, filename))
    }

    /// Remove a stored file by its public path. A file that is already gone
    /// is not an error; callers treat any failure as non-fatal.
    pub async fn delete_file(config: &UploadConfig, public_path: &str) -> AppResult<()> {
        let Some(path) = disk_path_for(config, public_path) else {
            return Err(AppError::Validation(format!(
                "Not an upload path: {}",
                public_path
            )));
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(anyhow::anyhow!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg_magic_bytes_valid() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert!(validate_magic_bytes(&data, "image/jpeg"));
    }

    #[test]
    fn png_magic_bytes_valid() {
        let data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A];
        assert!(validate_magic_bytes(&data, "image/png"));
    }

    #[test]
    fn mismatched_magic_bytes_rejected() {
        let png_data = [0x89, 0x50, 0x4E, 0x47];
        assert!(!validate_magic_bytes(&png_data, "image/jpeg"));
        assert!(!validate_magic_bytes(&[], "image/png"));
    }

    #[test]
    fn unknown_content_type_rejected() {
        let data = [0xFF, 0xD8, 0xFF];
        assert!(!validate_magic_bytes(&data, "application/pdf"));
    }

    #[test]
    fn disk_path_maps_into_upload_dir() {
        let config = UploadConfig {
            upload_dir: "./uploads".to_string(),
        };
        let path = disk_path_for(&config, "/uploads/complaints/abc.jpg").unwrap();
        assert_eq!(path, Path::new("./uploads").join("complaints/abc.jpg"));
    }

    #[test]
    fn disk_path_rejects_traversal() {
        let config = UploadConfig {
            upload_dir: "./uploads".to_string(),
        };
        assert!(disk_path_for(&config, "/uploads/../etc/passwd").is_none());
        assert!(disk_path_for(&config, "/uploads/complaints/../../x").is_none());
        assert!(disk_path_for(&config, "/etc/passwd").is_none());
        assert!(disk_path_for(&config, "/uploads/").is_none());
    }
}
