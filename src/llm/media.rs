use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use futures::future::try_join_all;
use tracing::warn;

use crate::llm::GenerateError;

/// Image media types Gemini accepts for inline data.
const SUPPORTED_IMAGE_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/webp"];

/// File extensions offered by the picker and accepted from drag-and-drop.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// One image ready for transport: base64 payload plus its media type.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub data: String,
    pub mime_type: String,
}

pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    infer::get(data).map(|kind| kind.mime_type().to_string())
}

fn normalize_image_mime_type(mime_type: &str) -> String {
    let lowered = mime_type.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "image/jpg" => "image/jpeg".to_string(),
        _ => lowered,
    }
}

pub fn is_supported_image_mime(mime_type: &str) -> bool {
    SUPPORTED_IMAGE_MIME_TYPES.contains(&mime_type)
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lowered = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&lowered.as_str())
        })
        .unwrap_or(false)
}

async fn encode_image_file(path: PathBuf) -> Result<ImagePayload, GenerateError> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|err| GenerateError::ImageRead {
            path: path.display().to_string(),
            detail: err.to_string(),
        })?;

    if bytes.is_empty() {
        return Err(GenerateError::ImageRead {
            path: path.display().to_string(),
            detail: "file is empty".to_string(),
        });
    }

    let mime_type = match detect_mime_type(&bytes) {
        Some(detected) => {
            let normalized = normalize_image_mime_type(&detected);
            if !is_supported_image_mime(&normalized) {
                warn!(
                    "Unsupported media type {normalized} for {}; sending as image/png",
                    path.display()
                );
                "image/png".to_string()
            } else {
                normalized
            }
        }
        None => "image/png".to_string(),
    };

    Ok(ImagePayload {
        data: general_purpose::STANDARD.encode(&bytes),
        mime_type,
    })
}

/// Reads and base64-encodes every file concurrently. The joined output keeps
/// the input order regardless of which encode finishes first, and the first
/// failure rejects the whole batch.
pub async fn encode_image_files(paths: Vec<PathBuf>) -> Result<Vec<ImagePayload>, GenerateError> {
    try_join_all(paths.into_iter().map(encode_image_file)).await
}
