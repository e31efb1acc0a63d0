use tubely_storage::media_subtype;

/// Validation errors for declared media types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Malformed content type: {0:?}")]
    MalformedContentType(String),

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Missing form field: {0}")]
    MissingField(String),
}

/// Normalize a declared content type to its lowercase `type/subtype` essence.
pub fn normalize_media_type(content_type: &str) -> Result<String, ValidationError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    if media_subtype(&essence).is_none() || essence.matches('/').count() != 1 {
        return Err(ValidationError::MalformedContentType(
            content_type.to_string(),
        ));
    }

    Ok(essence)
}

/// Declared media type validator
///
/// The declared type is trusted as-is; file contents are never sniffed.
#[derive(Debug, Clone)]
pub struct MediaValidator {
    allowed_content_types: Vec<String>,
}

impl MediaValidator {
    pub fn new(allowed_content_types: Vec<String>) -> Self {
        Self {
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    /// Validate content type, returning its normalized form
    pub fn validate_content_type(&self, content_type: &str) -> Result<String, ValidationError> {
        let normalized = normalize_media_type(content_type)?;

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_parameters() {
        assert_eq!(
            normalize_media_type("Video/MP4; codecs=\"avc1\"").unwrap(),
            "video/mp4"
        );
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        for bad in ["", "mp4", "video/", "/mp4", "video/mp4/extra"] {
            assert!(
                matches!(
                    normalize_media_type(bad),
                    Err(ValidationError::MalformedContentType(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validator_allowlist() {
        let validator = MediaValidator::new(vec!["video/mp4".to_string()]);
        assert_eq!(
            validator.validate_content_type("video/mp4").unwrap(),
            "video/mp4"
        );
        assert!(matches!(
            validator.validate_content_type("video/webm"),
            Err(ValidationError::InvalidContentType { .. })
        ));
    }
}
