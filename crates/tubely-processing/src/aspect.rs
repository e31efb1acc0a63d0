use tubely_core::{AspectCategory, StreamGeometry};

/// Bucket a stream by the integer quotient `width / height`.
///
/// A quotient of 1 is landscape and 0 is portrait; anything wider than 2:1 lands in
/// `Other`, as does a zero height.
pub fn classify(geometry: StreamGeometry) -> AspectCategory {
    if geometry.height == 0 {
        return AspectCategory::Other;
    }

    match geometry.width / geometry.height {
        1 => AspectCategory::Landscape,
        0 => AspectCategory::Portrait,
        _ => AspectCategory::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_dims(width: u32, height: u32) -> AspectCategory {
        classify(StreamGeometry::new(width, height))
    }

    #[test]
    fn test_common_geometries() {
        assert_eq!(classify_dims(1920, 1080), AspectCategory::Landscape);
        assert_eq!(classify_dims(1080, 1920), AspectCategory::Portrait);
        assert_eq!(classify_dims(1280, 400), AspectCategory::Other);
    }

    #[test]
    fn test_truncation_boundaries() {
        // Square and anything short of 2:1 truncate to 1.
        assert_eq!(classify_dims(1080, 1080), AspectCategory::Landscape);
        assert_eq!(classify_dims(1999, 1000), AspectCategory::Landscape);
        assert_eq!(classify_dims(2000, 1000), AspectCategory::Other);
        assert_eq!(classify_dims(999, 1000), AspectCategory::Portrait);
        assert_eq!(classify_dims(1, 1), AspectCategory::Landscape);
    }

    #[test]
    fn test_zero_height_is_other() {
        assert_eq!(classify_dims(1920, 0), AspectCategory::Other);
    }

    #[test]
    fn test_classification_is_deterministic() {
        for (w, h) in [(640, 480), (480, 640), (4000, 100), (1, 7)] {
            assert_eq!(classify_dims(w, h), classify_dims(w, h));
        }
    }
}
