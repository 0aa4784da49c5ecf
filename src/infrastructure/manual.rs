//! Hand-driven frame host.
//!
//! Nothing happens on its own: frames run when [`ManualHost::frame_at`] or
//! [`ManualHost::tick`] flushes them, timers fire when virtual time moves
//! forward and lifecycle signals are raised with [`ManualHost::dispatch`].
//! Handles are cheap clones of the same host, so one copy can be given to a
//! meter while another drives it.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::domain::errors::{HostError, HostResult};
use crate::domain::host::{FrameCallback, FrameHost, LifecycleSignal, SignalCallback, TimerCallback};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ManualTimer(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ManualSubscription(u64);

struct PendingTimer {
    due: f64,
    callback: TimerCallback,
}

struct State {
    frames_supported: Cell<bool>,
    precise_clock: Cell<bool>,
    signals_available: Cell<bool>,
    now: Cell<f64>,
    next_id: Cell<u64>,
    frames: RefCell<Vec<FrameCallback>>,
    timers: RefCell<BTreeMap<u64, PendingTimer>>,
    subscribers: RefCell<BTreeMap<u64, SignalCallback>>,
}

#[derive(Clone)]
pub struct ManualHost {
    state: Rc<State>,
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualHost {
    /// Host with frames, a precise clock and lifecycle signals available,
    /// virtual time at 0.
    pub fn new() -> Self {
        Self {
            state: Rc::new(State {
                frames_supported: Cell::new(true),
                precise_clock: Cell::new(true),
                signals_available: Cell::new(true),
                now: Cell::new(0.0),
                next_id: Cell::new(1),
                frames: RefCell::new(Vec::new()),
                timers: RefCell::new(BTreeMap::new()),
                subscribers: RefCell::new(BTreeMap::new()),
            }),
        }
    }

    pub fn set_frames_supported(&self, supported: bool) {
        self.state.frames_supported.set(supported);
    }

    pub fn set_precise_clock(&self, precise: bool) {
        self.state.precise_clock.set(precise);
    }

    pub fn set_signals_available(&self, available: bool) {
        self.state.signals_available.set(available);
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> f64 {
        self.state.now.get()
    }

    pub fn pending_frames(&self) -> usize {
        self.state.frames.borrow().len()
    }

    pub fn pending_timers(&self) -> usize {
        self.state.timers.borrow().len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.subscribers.borrow().len()
    }

    /// Move virtual time to `target`, firing every timer due at or before
    /// it in due order. Time never moves backwards.
    pub fn advance_to(&self, target: f64) {
        loop {
            let next = {
                let timers = self.state.timers.borrow();
                timers
                    .iter()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by(|(a_id, a), (b_id, b)| a.due.total_cmp(&b.due).then(a_id.cmp(b_id)))
                    .map(|(id, _)| *id)
            };
            let Some(id) = next else { break };
            let Some(timer) = self.state.timers.borrow_mut().remove(&id) else { break };
            if timer.due > self.now() {
                self.state.now.set(timer.due);
            }
            (timer.callback)();
        }
        if target > self.now() {
            self.state.now.set(target);
        }
    }

    pub fn advance_by(&self, millis: f64) {
        self.advance_to(self.now() + millis);
    }

    /// Run every queued frame callback with `timestamp`. Frames requested
    /// while flushing wait for the next flush. Returns how many ran.
    pub fn tick(&self, timestamp: Option<f64>) -> usize {
        let batch = std::mem::take(&mut *self.state.frames.borrow_mut());
        let count = batch.len();
        for callback in batch {
            callback(timestamp);
        }
        count
    }

    /// Advance virtual time to `timestamp`, then flush frames with it.
    pub fn frame_at(&self, timestamp: f64) -> usize {
        self.advance_to(timestamp);
        self.tick(Some(timestamp))
    }

    /// Deliver a lifecycle signal to every current subscriber.
    pub fn dispatch(&self, signal: LifecycleSignal) {
        let subscribers: Vec<SignalCallback> = self.state.subscribers.borrow().values().cloned().collect();
        for callback in subscribers {
            callback(signal);
        }
    }

    fn next_id(&self) -> u64 {
        let id = self.state.next_id.get();
        self.state.next_id.set(id + 1);
        id
    }
}

impl FrameHost for ManualHost {
    type Timer = ManualTimer;
    type Subscription = ManualSubscription;

    fn supports_frames(&self) -> bool {
        self.state.frames_supported.get()
    }

    fn has_precise_clock(&self) -> bool {
        self.state.precise_clock.get()
    }

    fn request_frame(&self, callback: FrameCallback) -> HostResult<()> {
        if !self.supports_frames() {
            return Err(HostError::BrowserApi("frame scheduling unavailable".to_string()));
        }
        self.state.frames.borrow_mut().push(callback);
        Ok(())
    }

    fn set_timeout(&self, millis: u32, callback: TimerCallback) -> Self::Timer {
        let id = self.next_id();
        let due = self.now() + millis as f64;
        self.state.timers.borrow_mut().insert(id, PendingTimer { due, callback });
        ManualTimer(id)
    }

    fn cancel_timeout(&self, timer: Self::Timer) {
        self.state.timers.borrow_mut().remove(&timer.0);
    }

    fn subscribe(&self, callback: SignalCallback) -> HostResult<Self::Subscription> {
        if !self.state.signals_available.get() {
            return Err(HostError::DocumentUnavailable);
        }
        let id = self.next_id();
        self.state.subscribers.borrow_mut().insert(id, callback);
        Ok(ManualSubscription(id))
    }

    fn unsubscribe(&self, subscription: Self::Subscription) {
        self.state.subscribers.borrow_mut().remove(&subscription.0);
    }
}
