//! Core-pinned thread spawning for the ESP32 dual-core.
//!
//! Wraps `esp_pthread_set_cfg()` so that the next `std::thread` spawn
//! creates a FreeRTOS task pinned to a specific CPU core with explicit
//! priority and stack size. On non-ESP targets, falls back to a plain
//! named thread.
//!
//! `esp_pthread_set_cfg()` is thread-local and applies to the *next*
//! `pthread_create()` from the calling thread, so the config→spawn pair
//! must not be interleaved with other thread creation on the same thread.

use std::io;
use std::thread::JoinHandle;

/// CPU core a task is pinned to.  Core 0 belongs to the WiFi and lwIP
/// tasks, so application tasks go to core 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 1 (APP_CPU): application tasks.
    App = 1,
}

/// Scheduling parameters for one task.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    /// Must be null-terminated (e.g. `"tcp-server\0"`).
    pub name: &'static str,
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
}

impl TaskSpec {
    pub fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

#[cfg(target_os = "espidf")]
pub fn spawn(task: TaskSpec, f: impl FnOnce() + Send + 'static) -> io::Result<JoinHandle<()>> {
    // SAFETY: the config struct is fully initialised by the IDF default
    // and `name` is a 'static null-terminated string.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = task.core as i32;
        cfg.prio = task.priority as _;
        cfg.stack_size = (task.stack_kb * 1024) as _;
        cfg.thread_name = task.name.as_ptr().cast();
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK as i32 {
        return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
    }

    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        task.display_name(),
        task.core,
        task.priority,
        task.stack_kb
    );

    std::thread::Builder::new()
        .name(task.display_name().into())
        .stack_size(task.stack_kb * 1024)
        .spawn(f)
}

/// Simulation fallback: ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn(task: TaskSpec, f: impl FnOnce() + Send + 'static) -> io::Result<JoinHandle<()>> {
    log::info!(
        "Spawning '{}' (sim, no core pinning, stack={}KB)",
        task.display_name(),
        task.stack_kb
    );

    std::thread::Builder::new()
        .name(task.display_name().into())
        .stack_size(task.stack_kb * 1024)
        .spawn(f)
}
