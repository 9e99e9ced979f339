use serde::{Deserialize, Serialize};

/// Brush sizes offered by the tools panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrushSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl BrushSize {
    pub const ALL: [BrushSize; 3] = [BrushSize::Small, BrushSize::Medium, BrushSize::Large];

    /// Size in logical (density-independent) units
    pub fn logical(self) -> f32 {
        match self {
            Self::Small => 10.0,
            Self::Medium => 20.0,
            Self::Large => 30.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }
}

/// Convert a logical size to device pixels for the given display density
pub fn logical_to_device(logical: f32, pixels_per_point: f32) -> f32 {
    logical * pixels_per_point
}
