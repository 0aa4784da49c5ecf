//! Frame-rate meter driven by a [`FrameHost`].
//!
//! Every frame callback is fed through [`MeterState::advance`]; the meter
//! only carries out the side effects the transition asks for (hooks,
//! watchdog, next frame). Lifecycle signals, the watchdog and the owner all
//! end a session through the same idempotent [`FrameRateMeter::stop`].

pub mod config;
pub mod state;
pub mod value_objects;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::domain::errors::HostResult;
use crate::domain::host::{FrameHost, LifecycleSignal};
use crate::domain::logging::{LogComponent, LogLevel};
use crate::{log_debug, log_event, log_warn};

pub use config::{MeterConfig, MeterHooks, StopHook, UpdateHook};
pub use state::{FrameTransition, MeterState, calc_fps};
pub use value_objects::{FpsSample, StopReason};

const COMPONENT: LogComponent = LogComponent::Domain("FrameRateMeter");

/// Host resources held for the duration of a session
struct Session<H: FrameHost> {
    state: MeterState,
    /// Bumped on every start; callbacks from older sessions are dropped.
    generation: u64,
    watchdog: Option<H::Timer>,
    subscription: Option<H::Subscription>,
}

struct Inner<H: FrameHost> {
    host: H,
    config: MeterConfig,
    session: RefCell<Session<H>>,
    on_update: RefCell<Option<UpdateHook>>,
    on_stop: RefCell<Option<StopHook>>,
}

/// Measures the cadence of a host's frame callbacks.
///
/// Cloning yields another handle to the same meter.
pub struct FrameRateMeter<H: FrameHost + 'static> {
    inner: Rc<Inner<H>>,
}

impl<H: FrameHost + 'static> Clone for FrameRateMeter<H> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<H: FrameHost + 'static> FrameRateMeter<H> {
    pub fn new(host: H, config: MeterConfig, hooks: MeterHooks) -> Self {
        Self {
            inner: Rc::new(Inner {
                host,
                config,
                session: RefCell::new(Session {
                    state: MeterState::new(),
                    generation: 0,
                    watchdog: None,
                    subscription: None,
                }),
                on_update: RefCell::new(hooks.on_update),
                on_stop: RefCell::new(hooks.on_stop),
            }),
        }
    }

    /// Begin a session. Returns false when already running or when the host
    /// cannot drive frames.
    pub fn start(&self) -> bool {
        Inner::start(&self.inner)
    }

    /// End the session. Returns false when already idle.
    pub fn stop(&self, reason: StopReason) -> bool {
        self.inner.stop(reason)
    }

    /// Clear counters and history without touching the running flag or
    /// listeners. Meant for idle meters.
    pub fn reset(&self) {
        self.inner.session.borrow_mut().state.reset();
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    pub fn config(&self) -> &MeterConfig {
        &self.inner.config
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> MeterState {
        self.inner.session.borrow().state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner.session.borrow().state.is_running()
    }

    pub fn fps(&self) -> u32 {
        self.inner.session.borrow().state.fps()
    }

    pub fn avg_fps(&self) -> u32 {
        self.inner.session.borrow().state.avg_fps()
    }

    pub fn total_frames(&self) -> u64 {
        self.inner.session.borrow().state.total_frames()
    }

    pub fn frames_since_window(&self) -> u64 {
        self.inner.session.borrow().state.frames_since_window()
    }

    pub fn sample_history(&self) -> Vec<u32> {
        self.inner.session.borrow().state.samples().to_vec()
    }

    pub fn sample_count(&self) -> usize {
        self.inner.session.borrow().state.samples().len()
    }

    pub fn last_stop_reason(&self) -> Option<StopReason> {
        self.inner.session.borrow().state.last_stop_reason()
    }
}

impl<H: FrameHost + 'static> Inner<H> {
    fn start(this: &Rc<Self>) -> bool {
        if this.session.borrow().state.is_running() {
            log_debug!(COMPONENT, "start ignored: already running");
            return false;
        }
        if !this.host.supports_frames() {
            log_warn!(COMPONENT, "start rejected: no frame scheduling primitive");
            return false;
        }

        let weak = Rc::downgrade(this);
        let subscription = match this.host.subscribe(Rc::new(move |signal: LifecycleSignal| {
            if let Some(inner) = weak.upgrade() {
                inner.stop(signal.into());
            }
        })) {
            Ok(subscription) => subscription,
            Err(e) => {
                log_warn!(COMPONENT, "start rejected: cannot listen for lifecycle signals: {}", e);
                return false;
            }
        };

        let generation = {
            let mut session = this.session.borrow_mut();
            if let Some(spent) = session.watchdog.take() {
                this.host.cancel_timeout(spent);
            }
            session.generation += 1;
            session.state.reset();
            session.state.mark_running();
            session.subscription = Some(subscription);
            session.generation
        };

        if let Err(e) = Self::schedule_frame(this, generation) {
            log_warn!(COMPONENT, "start rejected: cannot request first frame: {}", e);
            let mut session = this.session.borrow_mut();
            session.state = MeterState::new();
            if let Some(subscription) = session.subscription.take() {
                this.host.unsubscribe(subscription);
            }
            return false;
        }

        log_event!(
            LogLevel::Info,
            COMPONENT,
            "started";
            window_ms = this.config.sample_window_ms,
            watchdog_ms = this.config.watchdog_timeout_ms,
            max_fps = this.config.max_fps,
            max_samples = format!("{:?}", this.config.max_samples)
        );
        true
    }

    fn stop(&self, reason: StopReason) -> bool {
        {
            let mut session = self.session.borrow_mut();
            if !session.state.is_running() {
                return false;
            }
            if let Some(subscription) = session.subscription.take() {
                self.host.unsubscribe(subscription);
            }
            // A watchdog that already fired stays parked until the next rearm.
            if reason != StopReason::Timeout {
                if let Some(timer) = session.watchdog.take() {
                    self.host.cancel_timeout(timer);
                }
            }
            session.state.mark_stopped(reason);
        }

        log_event!(LogLevel::Info, COMPONENT, "stopped"; reason = reason);
        if let Some(hook) = self.on_stop.borrow_mut().as_mut() {
            hook(reason);
        }
        true
    }

    fn is_current(&self, generation: u64) -> bool {
        let session = self.session.borrow();
        session.generation == generation && session.state.is_running()
    }

    fn on_frame(this: &Rc<Self>, generation: u64, timestamp: Option<f64>) {
        if this.session.borrow().generation != generation {
            return;
        }
        let precise_clock = this.host.has_precise_clock();
        let transition = this
            .session
            .borrow_mut()
            .state
            .advance(&this.config, timestamp, precise_clock);

        match transition {
            FrameTransition::Ignored => return,
            FrameTransition::Unsupported => {
                log_warn!(COMPONENT, "frame timestamps unusable (timestamp {:?}, precise clock {})", timestamp, precise_clock);
                this.stop(StopReason::NotSupported);
                return;
            }
            FrameTransition::Counted => {}
            FrameTransition::Sampled { sample, exhausted } => {
                log_event!(
                    LogLevel::Trace,
                    COMPONENT,
                    "window closed";
                    fps = sample.fps,
                    avg = sample.avg_fps,
                    frames = this.session.borrow().state.total_frames()
                );
                if let Some(hook) = this.on_update.borrow_mut().as_mut() {
                    hook(sample);
                }
                // A session restarted by the hook has not spent the budget.
                if exhausted && this.is_current(generation) {
                    this.stop(StopReason::Completed);
                    return;
                }
            }
        }

        // The update hook may have stopped or restarted the meter.
        if !this.is_current(generation) {
            return;
        }

        Self::arm_watchdog(this, generation);
        if let Err(e) = Self::schedule_frame(this, generation) {
            log_warn!(COMPONENT, "cannot request next frame: {}", e);
            this.stop(StopReason::NotSupported);
        }
    }

    fn arm_watchdog(this: &Rc<Self>, generation: u64) {
        let weak: Weak<Self> = Rc::downgrade(this);
        let timeout_ms = this.config.watchdog_timeout_ms;
        let timer = this.host.set_timeout(
            timeout_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    if inner.is_current(generation) {
                        log_debug!(COMPONENT, "no frame within {}ms", timeout_ms);
                        inner.stop(StopReason::Timeout);
                    }
                }
            }),
        );
        let previous = this.session.borrow_mut().watchdog.replace(timer);
        if let Some(previous) = previous {
            this.host.cancel_timeout(previous);
        }
    }

    fn schedule_frame(this: &Rc<Self>, generation: u64) -> HostResult<()> {
        let weak = Rc::downgrade(this);
        this.host.request_frame(Box::new(move |timestamp| {
            if let Some(inner) = weak.upgrade() {
                Inner::on_frame(&inner, generation, timestamp);
            }
        }))
    }
}

impl<H: FrameHost> Drop for Inner<H> {
    fn drop(&mut self) {
        let session = self.session.get_mut();
        if let Some(subscription) = session.subscription.take() {
            self.host.unsubscribe(subscription);
        }
        if let Some(timer) = session.watchdog.take() {
            self.host.cancel_timeout(timer);
        }
    }
}
