//! Shared key generation for storage backends.
//!
//! Video keys are random and partitioned by aspect category; thumbnail keys are
//! derived from the video id so re-uploads overwrite in place.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use tubely_core::constants::VIDEO_KEY_RANDOM_BYTES;
use tubely_core::AspectCategory;
use uuid::Uuid;

/// Extract the subtype from a media type: `video/mp4; codecs=avc1` gives `mp4`.
///
/// Returns `None` when there is no `/` or nothing after it.
pub fn media_subtype(content_type: &str) -> Option<&str> {
    let essence = content_type.split(';').next()?.trim();
    let (kind, subtype) = essence.split_once('/')?;
    let subtype = subtype.trim();
    if kind.trim().is_empty() || subtype.is_empty() {
        return None;
    }
    Some(subtype)
}

/// Generate a fresh key for a video object.
///
/// Produces `{category}/{random}.{subtype}`, or `{random}.{subtype}` when no
/// category is known. Every call yields a different key.
pub fn video_key(category: Option<AspectCategory>, subtype: &str) -> String {
    let mut bytes = [0u8; VIDEO_KEY_RANDOM_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let name = URL_SAFE_NO_PAD.encode(bytes);

    match category {
        Some(category) => format!("{}/{}.{}", category, name, subtype),
        None => format!("{}.{}", name, subtype),
    }
}

/// Generate the key for a video's thumbnail: `{video_id}.{subtype}`.
pub fn thumbnail_key(video_id: Uuid, subtype: &str) -> String {
    format!("{}.{}", video_id, subtype)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_subtype() {
        assert_eq!(media_subtype("video/mp4"), Some("mp4"));
        assert_eq!(media_subtype("image/png; charset=binary"), Some("png"));
        assert_eq!(media_subtype("mp4"), None);
        assert_eq!(media_subtype("video/"), None);
        assert_eq!(media_subtype(""), None);
    }

    #[test]
    fn test_video_key_is_partitioned_and_random() {
        let first = video_key(Some(AspectCategory::Landscape), "mp4");
        let second = video_key(Some(AspectCategory::Landscape), "mp4");

        assert!(first.starts_with("landscape/"));
        assert!(first.ends_with(".mp4"));
        assert_ne!(first, second);

        // 32 bytes encode to 43 unpadded base64 characters
        let name = first
            .trim_start_matches("landscape/")
            .trim_end_matches(".mp4");
        assert_eq!(name.len(), 43);
        assert!(!name.contains('='));
        assert!(!name.contains('+') && !name.contains('/'));
    }

    #[test]
    fn test_video_key_without_category() {
        let key = video_key(None, "mp4");
        assert!(!key.contains('/'));
        assert!(key.ends_with(".mp4"));
    }

    #[test]
    fn test_thumbnail_key_is_deterministic() {
        let id = Uuid::new_v4();
        assert_eq!(thumbnail_key(id, "png"), thumbnail_key(id, "png"));
        assert_eq!(thumbnail_key(id, "jpeg"), format!("{}.jpeg", id));
    }
}
