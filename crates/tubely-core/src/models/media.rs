use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Width and height of the primary stream of a probed file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamGeometry {
    pub width: u32,
    pub height: u32,
}

impl StreamGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        StreamGeometry { width, height }
    }
}

/// Coarse orientation bucket used to namespace video storage keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectCategory {
    Landscape,
    Portrait,
    Other,
}

impl AspectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectCategory::Landscape => "landscape",
            AspectCategory::Portrait => "portrait",
            AspectCategory::Other => "other",
        }
    }
}

impl Display for AspectCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_category_display() {
        assert_eq!(AspectCategory::Landscape.to_string(), "landscape");
        assert_eq!(AspectCategory::Portrait.to_string(), "portrait");
        assert_eq!(AspectCategory::Other.to_string(), "other");
    }

    #[test]
    fn test_aspect_category_serializes_lowercase() {
        let json = serde_json::to_string(&AspectCategory::Portrait).unwrap();
        assert_eq!(json, "\"portrait\"");
    }
}
