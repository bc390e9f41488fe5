//! Status indicator driver.
//!
//! One digital output (white LED on GPIO 18, active HIGH) written by two
//! tasks: the command service and the blink task.  The pin sits behind an
//! `embassy_sync` blocking mutex so each write is a single critical
//! section; the last commanded level is mirrored in an atomic for reads.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: wraps an `esp_idf_hal::gpio::PinDriver<_, Output>`.
//! On host/test: wraps [`SimPin`], which records writes in memory.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::app::ports::IndicatorPort;

pub struct Indicator<P> {
    pin: Mutex<CriticalSectionRawMutex, RefCell<P>>,
    level: AtomicBool,
}

impl<P: OutputPin> Indicator<P> {
    /// Take ownership of an output pin and drive it low.
    pub fn new(pin: P) -> Self {
        let indicator = Self {
            pin: Mutex::new(RefCell::new(pin)),
            level: AtomicBool::new(false),
        };
        indicator.write(false);
        indicator
    }

    /// Run `f` against the underlying pin (test inspection).
    pub fn with_pin<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        self.pin.lock(|cell| f(&cell.borrow()))
    }

    fn write(&self, on: bool) {
        self.pin.lock(|cell| {
            if let Err(e) = cell.borrow_mut().set_state(PinState::from(on)) {
                warn!("LED: pin write failed: {e:?}");
            }
            self.level.store(on, Ordering::Release);
        });
    }
}

impl<P: OutputPin + Send> IndicatorPort for Indicator<P> {
    fn set_level(&self, on: bool) {
        self.write(on);
    }

    fn level(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation pin
// ───────────────────────────────────────────────────────────────

/// In-memory output pin for simulation and tests.
#[derive(Debug, Default)]
pub struct SimPin {
    high: bool,
    writes: u32,
}

impl SimPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Total number of level writes, including the initial one.
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        self.writes += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        self.writes += 1;
        Ok(())
    }
}
