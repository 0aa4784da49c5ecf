use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Thresholds separating the FPS health classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthLimits {
    pub dead: u32,
    pub danger: u32,
    pub warn: u32,
    /// Readings above this cannot come from a real display
    pub ceiling: u32,
}

impl Default for HealthLimits {
    fn default() -> Self {
        Self { dead: 7, danger: 25, warn: 40, ceiling: 60 }
    }
}

/// Coarse rating of an FPS reading for display purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum FpsHealth {
    Dead,
    Danger,
    Warn,
    Normal,
    Invalid,
}

impl FpsHealth {
    pub fn classify(fps: u32, limits: &HealthLimits) -> Self {
        if fps < limits.dead {
            FpsHealth::Dead
        } else if fps < limits.danger {
            FpsHealth::Danger
        } else if fps < limits.warn {
            FpsHealth::Warn
        } else if fps > limits.ceiling {
            FpsHealth::Invalid
        } else {
            FpsHealth::Normal
        }
    }
}
