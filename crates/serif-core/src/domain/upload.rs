//! Image upload gate - validation and object path layout.

use uuid::Uuid;

use crate::error::DomainError;

/// Uploaded images are capped at 5 MiB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Gate an upload before it reaches the object store. Rejection reasons are
/// surfaced verbatim to the caller.
pub fn validate_image(content_type: &str, size: usize) -> Result<(), DomainError> {
    if !content_type.starts_with("image/") {
        return Err(DomainError::Validation("File must be an image".into()));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(DomainError::Validation(
            "Image size must be less than 5MB".into(),
        ));
    }
    Ok(())
}

/// File extension taken from the client-supplied name, reduced to a safe
/// lowercase token. Anything suspicious collapses to "bin".
pub fn sanitize_extension(filename: &str) -> String {
    if !filename.contains('.') {
        return "bin".to_owned();
    }
    let ext = filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return "bin".to_owned();
    }
    ext
}

/// Storage path for an upload: a server-derived per-owner prefix plus a
/// collision-resistant name built from the upload time and a random suffix.
pub fn image_object_path(owner: Uuid, uploaded_at_millis: i64, suffix: &str, ext: &str) -> String {
    format!("{owner}/{uploaded_at_millis}-{suffix}.{ext}")
}
