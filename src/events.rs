//! Notification bus: multi-bit event flags shared between tasks.
//!
//! Events are produced by:
//! - the access-point adapter (AP started, station associated/left)
//!
//! and consumed by:
//! - the command service (waits once for `ApStarted`, never consumes it)
//! - the station monitor (waits on association changes and consumes them)
//!
//! ```text
//! ┌─────────────┐  set()  ┌──────────────────┐ wait_any() ┌─────────────────┐
//! │ Radio/AP    │────────▶│ NotificationBus  │───────────▶│ Command service │
//! │ event hook  │         │  bits: u32       │───────────▶│ Station monitor │
//! └─────────────┘         └──────────────────┘            └─────────────────┘
//! ```
//!
//! Flags carry no payload and no count: setting an already-set flag is a
//! no-op, so a waiter sees "at least one occurrence" of each event since
//! the flag was last cleared.

use core::fmt;
use core::ops::BitOr;
use core::time::Duration;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Event classes carried by the bus.  The discriminant is the bit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NetEvent {
    /// A station associated with the access point.
    StationConnected = 0,
    /// A station left the access point.
    StationDisconnected = 1,
    /// The access point is up and routable.
    ApStarted = 2,
}

impl NetEvent {
    pub const ALL: [Self; 3] = [
        Self::StationConnected,
        Self::StationDisconnected,
        Self::ApStarted,
    ];

    /// Bitmask for this event.
    pub const fn mask(self) -> u32 {
        1 << self as u8
    }
}

// ── EventSet ──────────────────────────────────────────────────

/// A set of [`NetEvent`]s, stored as a bitmask.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct EventSet(u32);

impl EventSet {
    pub const EMPTY: Self = Self(0);

    /// Association changes, as waited on by the station monitor.
    pub const STATION_CHANGES: Self = Self(
        NetEvent::StationConnected.mask() | NetEvent::StationDisconnected.mask(),
    );

    pub const fn only(event: NetEvent) -> Self {
        Self(event.mask())
    }

    pub const fn with(self, event: NetEvent) -> Self {
        Self(self.0 | event.mask())
    }

    pub const fn contains(self, event: NetEvent) -> bool {
        self.0 & event.mask() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Members in bit order.
    pub fn iter(self) -> impl Iterator<Item = NetEvent> {
        NetEvent::ALL.into_iter().filter(move |e| self.contains(*e))
    }
}

impl From<NetEvent> for EventSet {
    fn from(event: NetEvent) -> Self {
        Self::only(event)
    }
}

impl BitOr for NetEvent {
    type Output = EventSet;

    fn bitor(self, rhs: Self) -> EventSet {
        EventSet::only(self).with(rhs)
    }
}

impl BitOr<NetEvent> for EventSet {
    type Output = Self;

    fn bitor(self, rhs: NetEvent) -> Self {
        self.with(rhs)
    }
}

impl fmt::Debug for EventSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// ── NotificationBus ───────────────────────────────────────────

/// Event-flag group shared by reference between producer and consumer
/// tasks.  Construct one per system and hand out `Arc`s.
pub struct NotificationBus {
    bits: Mutex<u32>,
    cond: Condvar,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    pub const fn new() -> Self {
        Self {
            bits: Mutex::new(0),
            cond: Condvar::new(),
        }
    }

    /// Set `event` and wake every waiter.  Never blocks beyond the internal
    /// lock; setting an already-set flag is a no-op for waiters.
    pub fn set(&self, event: NetEvent) {
        let mut bits = self.lock();
        *bits |= event.mask();
        drop(bits);
        self.cond.notify_all();
    }

    /// Clear every flag in `events`.
    pub fn clear(&self, events: EventSet) {
        *self.lock() &= !events.bits();
    }

    /// Currently set flags, without waiting or consuming.
    pub fn snapshot(&self) -> EventSet {
        EventSet(*self.lock())
    }

    /// Block until at least one flag in `wanted` is set, or `timeout`
    /// elapses (`None` waits forever).
    ///
    /// Returns the subset of `wanted` that was observed, or empty on timeout.
    /// With `consume`, the observed flags are cleared before the lock is
    /// released, so a later waiter only sees them again after a producer
    /// sets them anew.
    pub fn wait_any(&self, wanted: EventSet, consume: bool, timeout: Option<Duration>) -> EventSet {
        let mask = wanted.bits();
        if mask == 0 {
            return EventSet::EMPTY;
        }

        let guard = self.lock();
        let mut bits = match timeout {
            None => self
                .cond
                .wait_while(guard, |bits| *bits & mask == 0)
                .unwrap_or_else(PoisonError::into_inner),
            Some(t) => {
                self.cond
                    .wait_timeout_while(guard, t, |bits| *bits & mask == 0)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0
            }
        };

        let observed = *bits & mask;
        if consume {
            *bits &= !observed;
        }
        EventSet(observed)
    }

    fn lock(&self) -> MutexGuard<'_, u32> {
        self.bits.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────
