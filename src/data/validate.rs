use thiserror::Error;

use super::model::ImagePayload;

/// Longest description the service accepts, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Largest image the service accepts (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Problems caught locally before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please choose an image first.")]
    MissingImage,

    #[error("The selected file is not a supported image.")]
    NotAnImage,

    #[error("Image is {size} bytes; the maximum is {max} bytes.")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Please enter a description.")]
    EmptyDescription,

    #[error("Description is {len} characters; the maximum is {}.", MAX_DESCRIPTION_CHARS)]
    DescriptionTooLong { len: usize },
}

/// A request that passed local validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub image: ImagePayload,
    /// Trimmed description.
    pub description: String,
}

/// Check the input form. Image problems are reported before description problems.
pub fn validate_request(
    image: Option<&ImagePayload>,
    description: &str,
) -> Result<GenerateRequest, ValidationError> {
    let image = image.ok_or(ValidationError::MissingImage)?;
    if image.len() > MAX_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge {
            size: image.len(),
            max: MAX_IMAGE_BYTES,
        });
    }

    let description = description.trim();
    if description.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooLong { len });
    }

    Ok(GenerateRequest {
        image: image.clone(),
        description: description.to_string(),
    })
}
