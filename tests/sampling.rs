mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{Recorder, manual_meter};
use fps_meter_wasm::{FpsSample, FrameRateMeter, ManualHost, MeterConfig, MeterHooks, StopReason};

#[test]
fn two_frames_close_one_window() {
    let config = MeterConfig::default().with_sample_window_ms(10).with_max_fps(999);
    let (host, meter, recorder) = manual_meter(config);
    assert!(meter.start());

    host.frame_at(0.0);
    assert!(recorder.updates().is_empty());

    host.frame_at(20.0);
    let updates = recorder.updates();
    assert_eq!(updates.len(), 1);
    let sample = updates[0];
    assert!(sample.fps > 0 && sample.fps <= 999);
    assert!(sample.avg_fps > 0 && sample.avg_fps <= 999);
    assert_eq!(meter.total_frames(), 2);
    assert_eq!(meter.sample_history().len(), 1);

    insta::assert_json_snapshot!(sample, @r###"
    {
      "fps": 100,
      "avgFps": 100
    }
    "###);
}

#[test]
fn one_update_per_closed_window() {
    let config = MeterConfig::default().with_sample_window_ms(10).with_max_fps(999);
    let (host, meter, recorder) = manual_meter(config);
    meter.start();
    for t in [0.0, 5.0, 10.0, 16.0, 21.0, 40.0] {
        host.frame_at(t);
    }

    assert_eq!(
        recorder.updates(),
        [
            FpsSample { fps: 250, avg_fps: 250 },
            FpsSample { fps: 83, avg_fps: 150 },
        ]
    );
    assert_eq!(meter.sample_history(), [250, 83]);
    assert_eq!(meter.fps(), 83);
    assert_eq!(meter.avg_fps(), 150);
    assert_eq!(meter.frames_since_window(), 0);
}

#[test]
fn elapsed_equal_to_window_keeps_it_open() {
    let config = MeterConfig::default().with_sample_window_ms(10);
    let (host, meter, recorder) = manual_meter(config);
    meter.start();
    host.frame_at(0.0);
    host.frame_at(10.0);
    assert!(recorder.updates().is_empty());
    assert_eq!(meter.frames_since_window(), 2);
}

#[test]
fn sample_budget_stops_with_completed() {
    let config = MeterConfig::default().with_sample_window_ms(1).with_max_samples(Some(5));
    let (host, meter, recorder) = manual_meter(config);
    meter.start();
    for i in 0..10 {
        host.frame_at(i as f64 * 10.0);
    }

    assert!(!meter.is_running());
    assert_eq!(meter.sample_history().len(), 5);
    assert_eq!(recorder.updates().len(), 5);
    assert_eq!(meter.last_stop_reason(), Some(StopReason::Completed));
    assert_eq!(recorder.stops(), [StopReason::Completed]);
    assert_eq!(host.pending_frames(), 0);
    assert_eq!(host.pending_timers(), 0);
}

#[test]
fn default_ceiling_clamps_fast_frames() {
    let config = MeterConfig::default().with_sample_window_ms(0);
    let (host, meter, recorder) = manual_meter(config);
    meter.start();
    for t in [0.0, 0.001, 0.002, 0.002, 1.0] {
        host.frame_at(t);
    }

    let updates = recorder.updates();
    assert!(!updates.is_empty());
    for sample in updates {
        assert!(sample.fps <= 60);
        assert!(sample.avg_fps <= 60);
    }
    assert!(meter.is_running());
}

fn meter_with_slot(
    config: MeterConfig,
    on_sample: impl Fn(&FrameRateMeter<ManualHost>) + 'static,
) -> (ManualHost, FrameRateMeter<ManualHost>, Recorder) {
    let host = ManualHost::new();
    let recorder = Recorder::default();
    let slot: Rc<RefCell<Option<FrameRateMeter<ManualHost>>>> = Rc::new(RefCell::new(None));
    let hook_slot = slot.clone();
    let stops = recorder.stops.clone();
    let updates = recorder.updates.clone();
    let hooks = MeterHooks::new()
        .on_update(move |sample| {
            updates.borrow_mut().push(sample);
            if let Some(meter) = hook_slot.borrow().as_ref() {
                on_sample(meter);
            }
        })
        .on_stop(move |reason| stops.borrow_mut().push(reason));
    let meter = FrameRateMeter::new(host.clone(), config, hooks);
    *slot.borrow_mut() = Some(meter.clone());
    (host, meter, recorder)
}

#[test]
fn update_hook_may_stop_the_meter() {
    let config = MeterConfig::default().with_sample_window_ms(10);
    let (host, meter, recorder) = meter_with_slot(config, |meter| {
        meter.stop(StopReason::User);
    });
    meter.start();
    host.frame_at(0.0);
    host.frame_at(20.0);

    assert!(!meter.is_running());
    assert_eq!(recorder.stops(), [StopReason::User]);
    assert_eq!(host.pending_frames(), 0);
    assert_eq!(host.pending_timers(), 0);
}

#[test]
fn update_hook_may_restart_the_meter() {
    let config = MeterConfig::default().with_sample_window_ms(10);
    let (host, meter, recorder) = meter_with_slot(config, |meter| {
        meter.stop(StopReason::User);
        meter.start();
    });
    meter.start();
    host.frame_at(0.0);
    host.frame_at(20.0);

    assert!(meter.is_running());
    assert_eq!(meter.total_frames(), 0);
    assert_eq!(recorder.stops(), [StopReason::User]);
    assert_eq!(host.pending_frames(), 1);
    assert_eq!(host.pending_timers(), 0);
}

#[test]
fn restart_on_the_last_budgeted_window_survives() {
    let config = MeterConfig::default().with_sample_window_ms(10).with_max_samples(Some(1));
    let (host, meter, recorder) = meter_with_slot(config, |meter| {
        meter.stop(StopReason::User);
        meter.start();
    });
    meter.start();
    host.frame_at(0.0);
    host.frame_at(20.0);

    assert!(meter.is_running());
    assert_eq!(meter.sample_count(), 0);
    assert_eq!(meter.last_stop_reason(), None);
    assert_eq!(recorder.stops(), [StopReason::User]);
    assert_eq!(host.pending_frames(), 1);

    host.frame_at(30.0);
    host.frame_at(50.0);
    assert_eq!(recorder.updates().len(), 2);
    assert!(meter.is_running());
}
