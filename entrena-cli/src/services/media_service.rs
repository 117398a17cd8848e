use anyhow::{Context, Result};
use std::path::Path;
use uuid::Uuid;

use crate::api::BackendClient;
use crate::models::ValidationError;

/// Content type for a demonstration image or video, chosen by extension
pub fn content_type_for(path: &Path) -> Result<mime::Mime, ValidationError> {
    let content_type: Option<mime::Mime> = match extension(path).as_str() {
        "jpg" | "jpeg" => Some(mime::IMAGE_JPEG),
        "png" => Some(mime::IMAGE_PNG),
        "gif" => Some(mime::IMAGE_GIF),
        "webp" => "image/webp".parse().ok(),
        "mp4" => "video/mp4".parse().ok(),
        "mov" => "video/quicktime".parse().ok(),
        _ => None,
    };
    content_type.ok_or_else(|| ValidationError::UnsupportedMedia(path.display().to_string()))
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Storage key for a new upload: one folder per trainer, random file name
pub fn object_path(trainer_id: &str, path: &Path) -> String {
    let ext = match extension(path).as_str() {
        "jpeg" => "jpg".to_string(),
        other => other.to_string(),
    };
    format!("{}/{}.{}", trainer_id, Uuid::new_v4(), ext)
}

/// Upload a local file and return the public URL to store on the routine
pub async fn upload_media(client: &BackendClient, trainer_id: &str, path: &Path) -> Result<String> {
    let content_type = content_type_for(path)?;

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let key = object_path(trainer_id, path);
    let url = client
        .upload(&key, bytes, content_type.as_ref())
        .await
        .context("No se pudo subir la imagen")?;

    tracing::info!("Uploaded demonstration media to {}", key);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("a.JPG")).unwrap(), mime::IMAGE_JPEG);
        assert_eq!(content_type_for(Path::new("a.png")).unwrap(), mime::IMAGE_PNG);
        assert_eq!(
            content_type_for(Path::new("demo.mp4")).unwrap().as_ref(),
            "video/mp4"
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let err = content_type_for(Path::new("notes.txt")).unwrap_err();
        assert_eq!(err, ValidationError::UnsupportedMedia("notes.txt".into()));
        assert!(content_type_for(Path::new("noext")).is_err());
    }

    #[test]
    fn test_object_path_is_per_trainer() {
        let key = object_path("t1", Path::new("/tmp/foto.jpeg"));
        assert!(key.starts_with("t1/"));
        assert!(key.ends_with(".jpg"));
    }
}
