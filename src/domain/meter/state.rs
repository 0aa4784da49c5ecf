use crate::domain::meter::config::MeterConfig;
use crate::domain::meter::value_objects::{FpsSample, StopReason};

/// Frames per second over `elapsed_ms`, truncated and clamped to `[0, max_fps]`.
///
/// No frames gives 0. A non-positive (or NaN) elapsed time with frames
/// counted gives `max_fps`, the limit of the formula as elapsed shrinks.
pub fn calc_fps(frames: u64, elapsed_ms: f64, max_fps: u32) -> u32 {
    if frames == 0 {
        return 0;
    }
    if elapsed_ms.is_nan() || elapsed_ms <= 0.0 {
        return max_fps;
    }
    let raw = (1000.0 * frames as f64 / elapsed_ms).floor();
    if raw >= max_fps as f64 { max_fps } else { raw as u32 }
}

/// Outcome of feeding one frame callback into the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTransition {
    /// Meter is idle; the callback is stale
    Ignored,
    /// No usable timestamp; the session must stop with `not-supported`
    Unsupported,
    /// Frame counted, window still open
    Counted,
    /// Window closed and a sample was recorded
    Sampled {
        sample: FpsSample,
        /// The sample budget is now exhausted
        exhausted: bool,
    },
}

/// Mutable measurement state. Reset on every start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeterState {
    running: bool,
    begin_timestamp: Option<f64>,
    previous_timestamp: Option<f64>,
    frames_since_window: u64,
    total_frames: u64,
    fps: u32,
    avg_fps: u32,
    samples: Vec<u32>,
    last_stop_reason: Option<StopReason>,
}

impl MeterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears counters, timestamps, history and the last stop reason.
    /// Running flag is untouched.
    pub fn reset(&mut self) {
        let running = self.running;
        *self = Self { running, ..Self::default() };
    }

    pub fn mark_running(&mut self) {
        self.running = true;
        self.last_stop_reason = None;
    }

    /// Returns false when already idle.
    pub fn mark_stopped(&mut self, reason: StopReason) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.last_stop_reason = Some(reason);
        true
    }

    /// Feed one frame callback.
    pub fn advance(&mut self, config: &MeterConfig, timestamp: Option<f64>, precise_clock: bool) -> FrameTransition {
        if !self.running {
            return FrameTransition::Ignored;
        }
        let now = match timestamp {
            Some(ts) if ts.is_finite() && precise_clock => ts,
            _ => return FrameTransition::Unsupported,
        };

        let begin = *self.begin_timestamp.get_or_insert(now);
        let previous = *self.previous_timestamp.get_or_insert(now);

        let elapsed = now - previous;
        self.frames_since_window += 1;
        self.total_frames += 1;

        if elapsed <= config.sample_window_ms as f64 {
            return FrameTransition::Counted;
        }

        self.fps = calc_fps(self.frames_since_window, elapsed, config.max_fps);
        self.avg_fps = calc_fps(self.total_frames, now - begin, config.max_fps);
        self.previous_timestamp = Some(now);
        self.frames_since_window = 0;
        self.samples.push(self.fps);

        FrameTransition::Sampled {
            sample: FpsSample { fps: self.fps, avg_fps: self.avg_fps },
            exhausted: config.budget_reached(self.samples.len()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn begin_timestamp(&self) -> Option<f64> {
        self.begin_timestamp
    }

    pub fn previous_timestamp(&self) -> Option<f64> {
        self.previous_timestamp
    }

    pub fn frames_since_window(&self) -> u64 {
        self.frames_since_window
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn avg_fps(&self) -> u32 {
        self.avg_fps
    }

    pub fn samples(&self) -> &[u32] {
        &self.samples
    }

    pub fn last_stop_reason(&self) -> Option<StopReason> {
        self.last_stop_reason
    }
}
