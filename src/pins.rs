//! GPIO assignments for the LedLink board.
//!
//! Single source of truth: drivers and config reference this module
//! rather than hard-coding pin numbers.  `main.rs` must take the matching
//! `peripherals.pins.gpioN` when this changes.

/// Digital output driving the white status LED (active HIGH).
pub const INDICATOR_GPIO: i32 = 18;
