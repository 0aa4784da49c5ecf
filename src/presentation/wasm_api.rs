use std::str::FromStr;

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::domain::errors::MeterError;
use crate::domain::health::{FpsHealth, HealthLimits};
use crate::domain::logging::LogComponent;
use crate::domain::meter::{FpsSample, FrameRateMeter, MeterConfig, MeterHooks, StopReason};
use crate::infrastructure::BrowserHost;
use crate::log_error;

const COMPONENT: LogComponent = LogComponent::Presentation("FPSMeter");

fn to_js_error(err: MeterError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// JS-facing meter.
///
/// ```js
/// const meter = new FPSMeter({ onUpdate: ({ fps, avgFps }) => {}, maxFps: 999 });
/// meter.start();
/// ```
#[wasm_bindgen(js_name = FPSMeter)]
pub struct FpsMeter {
    meter: FrameRateMeter<BrowserHost>,
}

#[wasm_bindgen(js_class = FPSMeter)]
impl FpsMeter {
    /// Options: `onUpdate`, `onStop`, `maxFps`, `maxSamples`,
    /// `sampleWindowMs`, `watchdogTimeoutMs`. All optional.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<FpsMeter, JsValue> {
        let config = parse_config(&options).map_err(to_js_error)?;
        let mut hooks = MeterHooks::new();
        if let Some(on_update) = js_function(&options, "onUpdate") {
            hooks = hooks.on_update(move |sample| {
                let payload = sample_to_js(sample);
                if let Err(e) = on_update.call1(&JsValue::NULL, &payload) {
                    log_error!(COMPONENT, "onUpdate threw: {:?}", e);
                }
            });
        }
        if let Some(on_stop) = js_function(&options, "onStop") {
            hooks = hooks.on_stop(move |reason| {
                if let Err(e) = on_stop.call1(&JsValue::NULL, &JsValue::from_str(reason.as_ref())) {
                    log_error!(COMPONENT, "onStop threw: {:?}", e);
                }
            });
        }
        let host = BrowserHost::new().map_err(|e| to_js_error(e.into()))?;
        Ok(Self { meter: FrameRateMeter::new(host, config, hooks) })
    }

    pub fn start(&self) -> bool {
        self.meter.start()
    }

    /// `reason` defaults to `"user"`.
    pub fn stop(&self, reason: Option<String>) -> Result<bool, JsValue> {
        let reason = match reason {
            Some(name) => StopReason::from_str(&name)
                .map_err(|_| JsValue::from_str(&format!("unknown stop reason: {}", name)))?,
            None => StopReason::User,
        };
        Ok(self.meter.stop(reason))
    }

    pub fn reset(&self) {
        self.meter.reset();
    }

    #[wasm_bindgen(getter, js_name = maxFps)]
    pub fn max_fps(&self) -> u32 {
        self.meter.config().max_fps
    }

    #[wasm_bindgen(getter, js_name = sampleWindowMs)]
    pub fn sample_window_ms(&self) -> u32 {
        self.meter.config().sample_window_ms
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.meter.is_running()
    }

    #[wasm_bindgen(getter)]
    pub fn fps(&self) -> u32 {
        self.meter.fps()
    }

    #[wasm_bindgen(getter, js_name = avgFps)]
    pub fn avg_fps(&self) -> u32 {
        self.meter.avg_fps()
    }

    #[wasm_bindgen(getter, js_name = totalFrames)]
    pub fn total_frames(&self) -> f64 {
        self.meter.total_frames() as f64
    }

    #[wasm_bindgen(getter, js_name = sampleCount)]
    pub fn sample_count(&self) -> usize {
        self.meter.sample_count()
    }

    #[wasm_bindgen(getter)]
    pub fn samples(&self) -> Vec<u32> {
        self.meter.sample_history()
    }

    /// Empty string while running or before the first stop
    #[wasm_bindgen(getter, js_name = stopReason)]
    pub fn stop_reason(&self) -> String {
        self.meter
            .last_stop_reason()
            .map(|reason| reason.to_string())
            .unwrap_or_default()
    }
}

/// Health class (`dead`, `danger`, `warn`, `normal`, `invalid`) of a reading
#[wasm_bindgen(js_name = classifyFps)]
pub fn classify_fps(fps: u32) -> String {
    FpsHealth::classify(fps, &HealthLimits::default()).to_string()
}

/// Numeric options go through JSON, which drops the function-valued keys.
fn parse_config(options: &JsValue) -> Result<MeterConfig, MeterError> {
    if options.is_undefined() || options.is_null() {
        return Ok(MeterConfig::default());
    }
    let json = js_sys::JSON::stringify(options)
        .map_err(|e| MeterError::InvalidConfig(format!("options are not serializable: {:?}", e)))?;
    MeterConfig::from_json(&String::from(json))
}

fn js_function(options: &JsValue, key: &str) -> Option<Function> {
    if !options.is_object() {
        return None;
    }
    Reflect::get(options, &JsValue::from_str(key))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

fn sample_to_js(sample: FpsSample) -> JsValue {
    let payload = Object::new();
    let _ = Reflect::set(&payload, &JsValue::from_str("fps"), &JsValue::from(sample.fps));
    let _ = Reflect::set(&payload, &JsValue::from_str("avgFps"), &JsValue::from(sample.avg_fps));
    payload.into()
}
