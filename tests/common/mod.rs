#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use fps_meter_wasm::{FpsSample, FrameRateMeter, ManualHost, MeterConfig, MeterHooks, StopReason};

/// Captures every hook invocation.
#[derive(Clone, Default)]
pub struct Recorder {
    pub updates: Rc<RefCell<Vec<FpsSample>>>,
    pub stops: Rc<RefCell<Vec<StopReason>>>,
}

impl Recorder {
    pub fn hooks(&self) -> MeterHooks {
        let updates = self.updates.clone();
        let stops = self.stops.clone();
        MeterHooks::new()
            .on_update(move |sample| updates.borrow_mut().push(sample))
            .on_stop(move |reason| stops.borrow_mut().push(reason))
    }

    pub fn updates(&self) -> Vec<FpsSample> {
        self.updates.borrow().clone()
    }

    pub fn stops(&self) -> Vec<StopReason> {
        self.stops.borrow().clone()
    }
}

pub fn manual_meter(config: MeterConfig) -> (ManualHost, FrameRateMeter<ManualHost>, Recorder) {
    let host = ManualHost::new();
    let recorder = Recorder::default();
    let meter = FrameRateMeter::new(host.clone(), config, recorder.hooks());
    (host, meter, recorder)
}
