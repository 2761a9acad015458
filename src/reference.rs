//! Loading user-selected files as request reference images.

use std::path::Path;

use uuid::Uuid;

use crate::error::AtelierError;
use crate::ports::image_generator::ReferenceImage;

/// Read a file into a [`ReferenceImage`], inferring the MIME type from the
/// extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read or has an unsupported
/// extension.
pub fn load_reference_image(path: &Path) -> Result<ReferenceImage, AtelierError> {
    let mime_type = mime_from_extension(path)?;
    let data = std::fs::read(path)?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    Ok(ReferenceImage {
        id: format!("ref-{}", Uuid::new_v4()),
        name,
        data,
        mime_type: mime_type.to_string(),
    })
}

/// Map a file extension to the MIME type sent to the API.
fn mime_from_extension(path: &Path) -> Result<&'static str, AtelierError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "webp" => Ok("image/webp"),
        _ => Err(AtelierError::InvalidArgument(format!(
            "Unsupported reference image '{}'. Valid types: png, jpeg, webp",
            path.display()
        ))),
    }
}
