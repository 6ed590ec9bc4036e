//! Host-supplied hooks into the controller loop.
//!
//! Grounded on `original_source/src/Domo/Domo.h`'s `DomoManager` typedefs
//! (`ActivityLoopFn`, `WatchdogFn`) — function pointers there, traits here
//! so the controller can be wired against a test double without a vtable of
//! raw `fn` pointers. [`crate::pipeline::Route`] and
//! [`crate::pipeline::SomethingChanged`] cover the other two original
//! typedefs (`RouteFn`, `SomethingChangedFn`).

use crate::buffer::Buffer;
use crate::watchdog::WatchdogStatus;

/// Invoked once per `Update` cycle with full access to the buffer, for any
/// host-side logic layered on top of the raw coupling engine (alarm rules,
/// scheduling, derived points). Named `activityLoop` in the original.
pub trait ActivityLoop {
    fn activity_loop(&mut self, buffer: &mut Buffer);
}

/// Invoked whenever [`crate::watchdog::CallbackTimings::check`] reports an
/// unhealthy status.
pub trait WatchdogObserver {
    fn on_watchdog(&mut self, status: &WatchdogStatus);
}
