//! Periodic indicator blink.
//!
//! Runs as its own task, independent of the command service, and shows
//! that the network loop never blocks the rest of the system.  Writes
//! race with command-driven writes; whichever lands last is visible.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::thread;

use log::info;

use crate::app::ports::IndicatorPort;

pub struct Blinker {
    half_period: Duration,
}

impl Blinker {
    pub fn new(half_period: Duration) -> Self {
        Self { half_period }
    }

    /// Toggle on/off every half-period until `stop` is raised.
    pub fn run(&self, indicator: &impl IndicatorPort, stop: &AtomicBool) {
        info!("LED: blink started ({} ms)", self.half_period.as_millis());
        while !stop.load(Ordering::Relaxed) {
            indicator.set_level(true);
            thread::sleep(self.half_period);
            indicator.set_level(false);
            thread::sleep(self.half_period);
        }
        info!("LED: blink stopped");
    }
}
