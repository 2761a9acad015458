//! File naming and JPEG-normalized image saving.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::AtelierError;

/// Generate an output filename from a prompt.
///
/// Sanitizes the first 50 characters of the prompt to kebab-case,
/// appends a unix timestamp, and adds the `.jpg` extension.
#[must_use]
pub fn auto_filename(prompt: &str) -> String {
    let sanitized = sanitize_for_filename(prompt, 50);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    format!("{sanitized}-{timestamp}.jpg")
}

/// Sanitize a string for use in a filename.
///
/// Converts to lowercase, replaces non-alphanumeric chars with hyphens,
/// collapses consecutive hyphens, and trims to max length.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true; // Prevents leading hyphen

    for ch in input.chars().take(max_len * 2) {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    // Trim trailing hyphen
    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "image".to_string()
    } else {
        result
    }
}

/// Save image bytes to a file as JPEG, converting if the source is not
/// already JPEG-encoded.
///
/// # Errors
///
/// Returns an error if the file cannot be written or conversion fails.
pub fn save_image(data: &[u8], source_mime: &str, output_path: &Path) -> Result<(), AtelierError> {
    if source_mime == "image/jpeg" {
        std::fs::write(output_path, data).map_err(AtelierError::Io)
    } else {
        convert_and_save(data, output_path)
    }
}

/// Convert image bytes to JPEG and save.
fn convert_and_save(data: &[u8], output_path: &Path) -> Result<(), AtelierError> {
    let img = image::load_from_memory(data)
        .map_err(|e| AtelierError::ImageConversion(format!("Failed to decode image: {e}")))?;
    img.save_with_format(output_path, image::ImageFormat::Jpeg)
        .map_err(|e| AtelierError::ImageConversion(format!("Failed to save as jpeg: {e}")))
}

/// Resolve the output path: use explicit path or auto-generate.
#[must_use]
pub fn resolve_output_path(explicit: Option<&str>, prompt: &str) -> PathBuf {
    match explicit {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(auto_filename(prompt)),
    }
}
