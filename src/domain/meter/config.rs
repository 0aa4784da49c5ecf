use serde::{Deserialize, Serialize};

use crate::domain::errors::{MeterError, MeterResult};
use crate::domain::meter::value_objects::{FpsSample, StopReason};

pub const DEFAULT_MAX_FPS: u32 = 60;
pub const DEFAULT_SAMPLE_WINDOW_MS: u32 = 500;
pub const DEFAULT_WATCHDOG_TIMEOUT_MS: u32 = 1000;

/// Numeric settings of a meter. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeterConfig {
    /// Ceiling for every computed FPS value
    pub max_fps: u32,
    /// Number of sampling windows after which the meter stops itself
    pub max_samples: Option<usize>,
    /// Minimum elapsed time between two FPS computations
    pub sample_window_ms: u32,
    /// Longest gap between frames before the session is abandoned
    pub watchdog_timeout_ms: u32,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            max_fps: DEFAULT_MAX_FPS,
            max_samples: None,
            sample_window_ms: DEFAULT_SAMPLE_WINDOW_MS,
            watchdog_timeout_ms: DEFAULT_WATCHDOG_TIMEOUT_MS,
        }
    }
}

impl MeterConfig {
    pub fn from_json(json: &str) -> MeterResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MeterError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_fps(mut self, max_fps: u32) -> Self {
        self.max_fps = max_fps;
        self
    }

    pub fn with_max_samples(mut self, max_samples: Option<usize>) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn with_sample_window_ms(mut self, sample_window_ms: u32) -> Self {
        self.sample_window_ms = sample_window_ms;
        self
    }

    pub fn with_watchdog_timeout_ms(mut self, watchdog_timeout_ms: u32) -> Self {
        self.watchdog_timeout_ms = watchdog_timeout_ms;
        self
    }

    pub fn validate(&self) -> MeterResult<()> {
        if self.max_fps == 0 {
            return Err(MeterError::InvalidConfig("maxFps must be positive".to_string()));
        }
        if self.max_samples == Some(0) {
            return Err(MeterError::InvalidConfig("maxSamples must be positive when set".to_string()));
        }
        if self.watchdog_timeout_ms == 0 {
            return Err(MeterError::InvalidConfig("watchdogTimeoutMs must be positive".to_string()));
        }
        Ok(())
    }

    /// True once `samples` completed windows exhaust the budget
    pub fn budget_reached(&self, samples: usize) -> bool {
        self.max_samples.is_some_and(|max| samples >= max)
    }
}

pub type UpdateHook = Box<dyn FnMut(FpsSample)>;
pub type StopHook = Box<dyn FnMut(StopReason)>;

/// Caller callbacks. Both default to no-ops.
#[derive(Default)]
pub struct MeterHooks {
    pub(crate) on_update: Option<UpdateHook>,
    pub(crate) on_stop: Option<StopHook>,
}

impl MeterHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_update(mut self, hook: impl FnMut(FpsSample) + 'static) -> Self {
        self.on_update = Some(Box::new(hook));
        self
    }

    pub fn on_stop(mut self, hook: impl FnMut(StopReason) + 'static) -> Self {
        self.on_stop = Some(Box::new(hook));
        self
    }
}

impl std::fmt::Debug for MeterHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeterHooks")
            .field("on_update", &self.on_update.is_some())
            .field("on_stop", &self.on_stop.is_some())
            .finish()
    }
}
