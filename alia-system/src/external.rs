// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::time::Instant;

use alia_timer::{ExternalInterface, Tick};

/// The default host integration: uses the steady clock, directly
/// re-invokes the scheduler, and executes async updates synchronously. A
/// real host embedding alia in an actual event loop or windowing toolkit
/// supplies its own [`ExternalInterface`] instead; this one exists so
/// [`crate::System::new`] and tests don't need one.
pub struct SyncExternalInterface {
    epoch: Instant,
}

impl SyncExternalInterface {
    pub fn new() -> SyncExternalInterface {
        SyncExternalInterface { epoch: Instant::now() }
    }
}

impl Default for SyncExternalInterface {
    fn default() -> SyncExternalInterface {
        SyncExternalInterface::new()
    }
}

impl ExternalInterface for SyncExternalInterface {
    fn get_tick_count(&self) -> Tick {
        Tick(self.epoch.elapsed().as_millis() as u32)
    }

    fn schedule_animation_refresh(&self) {
        // No event loop of our own to nudge. A host driving `System`
        // directly (as the tests do) is expected to call
        // `refresh_system` again on its own schedule.
        log::trace!("animation refresh requested");
    }

    fn schedule_timer_event(&self, time: Tick) {
        log::trace!("timer event requested for tick {}", time.0);
    }

    fn schedule_asynchronous_update(&self, thunk: Box<dyn FnOnce()>) {
        thunk();
    }
}
