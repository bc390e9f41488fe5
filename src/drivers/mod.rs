//! Indicator output, blink task, and task spawning helpers.

pub mod blink;
pub mod indicator;
pub mod task_pin;
