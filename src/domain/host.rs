//! Capabilities the meter borrows from its environment.
//!
//! A host schedules frame callbacks, runs cancellable one-shot timers and
//! reports lifecycle signals. The browser implementation lives in
//! `infrastructure::browser`, a hand-driven one in `infrastructure::manual`.

use std::rc::Rc;

use derive_more::Display;

use crate::domain::errors::HostResult;

/// Callback run once before the next paint. `None` means the host could not
/// supply a timestamp.
pub type FrameCallback = Box<dyn FnOnce(Option<f64>)>;

/// Callback run once when a timer elapses.
pub type TimerCallback = Box<dyn FnOnce()>;

/// Callback run for every lifecycle signal while subscribed.
pub type SignalCallback = Rc<dyn Fn(LifecycleSignal)>;

/// Page lifecycle notifications that end a measurement session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LifecycleSignal {
    /// Document visibility changed (tab hidden or backgrounded)
    #[display(fmt = "visibilitychange")]
    VisibilityChange,
    /// Window lost input focus
    #[display(fmt = "blur")]
    Blur,
}

pub trait FrameHost {
    /// Handle of a scheduled timer. Cancelling a handle whose timer already
    /// fired must be harmless.
    type Timer;
    /// Active lifecycle subscription, released by [`FrameHost::unsubscribe`].
    type Subscription;

    /// Whether a frame scheduling primitive exists at all.
    fn supports_frames(&self) -> bool;

    /// Whether timestamps have sub-millisecond resolution, i.e. the clock is
    /// distinguishable from a wall-clock millisecond counter.
    fn has_precise_clock(&self) -> bool;

    fn request_frame(&self, callback: FrameCallback) -> HostResult<()>;

    fn set_timeout(&self, millis: u32, callback: TimerCallback) -> Self::Timer;

    fn cancel_timeout(&self, timer: Self::Timer);

    fn subscribe(&self, callback: SignalCallback) -> HostResult<Self::Subscription>;

    fn unsubscribe(&self, subscription: Self::Subscription);
}
