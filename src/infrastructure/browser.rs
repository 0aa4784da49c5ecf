use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Window};

use crate::domain::errors::{HostError, HostResult};
use crate::domain::host::{FrameCallback, FrameHost, LifecycleSignal, SignalCallback, TimerCallback};
use crate::domain::logging::LogComponent;
use crate::log_debug;

const COMPONENT: LogComponent = LogComponent::Infrastructure("BrowserHost");

/// Frame host backed by `requestAnimationFrame`, `setTimeout` and the
/// window `blur` / document `visibilitychange` events.
pub struct BrowserHost {
    window: Window,
    document: Document,
    frames_supported: bool,
    precise_clock: bool,
}

/// Both lifecycle listeners. Dropping removes them.
pub struct BrowserSubscription {
    _blur: EventListener,
    _visibility: EventListener,
}

impl BrowserHost {
    pub fn new() -> HostResult<Self> {
        let window = web_sys::window().ok_or(HostError::WindowUnavailable)?;
        let document = window.document().ok_or(HostError::DocumentUnavailable)?;
        let frames_supported = js_sys::Reflect::has(&window, &JsValue::from_str("requestAnimationFrame"))
            .unwrap_or(false);
        let precise_clock = Self::probe_precise_clock(&window);
        log_debug!(
            COMPONENT,
            "requestAnimationFrame: {}, precise clock: {}",
            frames_supported,
            precise_clock
        );
        Ok(Self { window, document, frames_supported, precise_clock })
    }

    /// A `performance.now()` that returns the same value as `Date.now()` is a
    /// millisecond shim and cannot resolve sub-frame deltas.
    fn probe_precise_clock(window: &Window) -> bool {
        match window.performance() {
            Some(performance) => performance.now() != js_sys::Date::now(),
            None => false,
        }
    }
}

impl FrameHost for BrowserHost {
    type Timer = Timeout;
    type Subscription = BrowserSubscription;

    fn supports_frames(&self) -> bool {
        self.frames_supported
    }

    fn has_precise_clock(&self) -> bool {
        self.precise_clock
    }

    fn request_frame(&self, callback: FrameCallback) -> HostResult<()> {
        let closure = Closure::once_into_js(move |timestamp: JsValue| callback(timestamp.as_f64()));
        self.window
            .request_animation_frame(closure.unchecked_ref())
            .map(|_| ())
            .map_err(|e| HostError::BrowserApi(format!("requestAnimationFrame failed: {:?}", e)))
    }

    fn set_timeout(&self, millis: u32, callback: TimerCallback) -> Self::Timer {
        Timeout::new(millis, callback)
    }

    fn cancel_timeout(&self, timer: Self::Timer) {
        // Dropping a gloo timeout clears it.
        drop(timer);
    }

    fn subscribe(&self, callback: SignalCallback) -> HostResult<Self::Subscription> {
        let on_blur = callback.clone();
        let blur = EventListener::new(&self.window, "blur", move |_| on_blur(LifecycleSignal::Blur));
        let visibility = EventListener::new(&self.document, "visibilitychange", move |_| {
            callback(LifecycleSignal::VisibilityChange)
        });
        Ok(BrowserSubscription { _blur: blur, _visibility: visibility })
    }

    fn unsubscribe(&self, subscription: Self::Subscription) {
        drop(subscription);
    }
}
