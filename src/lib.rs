use wasm_bindgen::prelude::*;

use crate::domain::logging::LogComponent;

pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use domain::health::{FpsHealth, HealthLimits};
pub use domain::host::{FrameHost, LifecycleSignal};
pub use domain::meter::{FpsSample, FrameRateMeter, MeterConfig, MeterHooks, StopReason};
pub use infrastructure::{BrowserHost, ManualHost};

/// Install panic hook, console logger and browser clock
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let console_logger = if cfg!(debug_assertions) {
        infrastructure::services::ConsoleLogger::new_development()
    } else {
        infrastructure::services::ConsoleLogger::new_production()
    };
    domain::logging::init_logger(Box::new(console_logger));
    domain::logging::init_time_provider(Box::new(infrastructure::services::BrowserTimeProvider::new()));

    log_info!(LogComponent::Presentation("Initialize"), "fps meter ready");
}
