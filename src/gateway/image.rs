//! Image references - remote URIs pass through, local files become data URIs

use std::path::{Path, PathBuf};

use base64::Engine;

use crate::error::GatewayError;

/// Resolve the form's image value into what the backend stores.
///
/// `http(s)://` and `data:` references are sent as-is. A value naming an
/// existing local file is inlined as `data:<mime>;base64,...`. Anything
/// else is passed through untouched.
pub async fn resolve(reference: Option<String>) -> Result<Option<String>, GatewayError> {
    let Some(reference) = reference else {
        return Ok(None);
    };

    if is_remote(&reference) {
        return Ok(Some(reference));
    }

    let path = expand_home(&reference);
    if !path.is_file() {
        return Ok(Some(reference));
    }

    let bytes = tokio::fs::read(&path).await.map_err(|e| GatewayError::Image {
        path: reference.clone(),
        reason: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Inlining local image");
    Ok(Some(to_data_uri(&path, &bytes)))
}

fn is_remote(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:")
}

fn expand_home(reference: &str) -> PathBuf {
    if let Some(rest) = reference.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(reference)
}

pub fn to_data_uri(path: &Path, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime_for(path), encoded)
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}
