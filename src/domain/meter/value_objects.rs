use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::domain::host::LifecycleSignal;

/// Why a measurement session ended
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// Explicit stop from the owner
    #[default]
    User,
    /// Window lost focus
    Blur,
    /// Page was hidden or backgrounded
    #[strum(serialize = "visibilitychange")]
    #[serde(rename = "visibilitychange")]
    VisibilityChange,
    /// No frame arrived within the watchdog window
    Timeout,
    /// Missing timestamps or a low-resolution clock
    NotSupported,
    /// Sample budget exhausted
    Completed,
}

impl From<LifecycleSignal> for StopReason {
    fn from(signal: LifecycleSignal) -> Self {
        match signal {
            LifecycleSignal::VisibilityChange => StopReason::VisibilityChange,
            LifecycleSignal::Blur => StopReason::Blur,
        }
    }
}

/// Payload delivered to the update hook when a sampling window closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FpsSample {
    /// FPS over the window that just closed
    pub fps: u32,
    /// FPS over the whole session
    pub avg_fps: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn reasons_use_wire_names() {
        let names: Vec<&'static str> = StopReason::iter().map(Into::into).collect();
        assert_eq!(
            names,
            ["user", "blur", "visibilitychange", "timeout", "not-supported", "completed"]
        );
    }

    #[test]
    fn reasons_parse_from_wire_names() {
        for reason in StopReason::iter() {
            assert_eq!(StopReason::from_str(reason.as_ref()), Ok(reason));
        }
        assert!(StopReason::from_str("visibility-change").is_err());
    }

    #[test]
    fn serde_matches_strum() {
        let json = serde_json::to_string(&StopReason::NotSupported).unwrap();
        assert_eq!(json, "\"not-supported\"");
        let back: StopReason = serde_json::from_str("\"visibilitychange\"").unwrap();
        assert_eq!(back, StopReason::VisibilityChange);
    }

    #[test]
    fn signals_map_to_reasons() {
        assert_eq!(StopReason::from(LifecycleSignal::Blur), StopReason::Blur);
        assert_eq!(
            StopReason::from(LifecycleSignal::VisibilityChange),
            StopReason::VisibilityChange
        );
    }
}
