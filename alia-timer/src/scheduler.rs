// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! The pending-timer-request queue behind [`crate::Timer`] (//! "Timer & async scheduler").

use alia_routing::ComponentHandle;

use crate::tick::Tick;

struct TimerRequest {
    target: ComponentHandle,
    trigger: Tick,
    frame_issued: u64,
}

/// One running system's worth of pending timer requests. `alia-system`'s
/// dispatch loop owns a `TimerQueue` and calls [`TimerQueue::issue_ready`]
/// whenever the host's scheduled timer event fires; [`crate::Timer::start`]
/// is what populates it.
pub struct TimerQueue {
    requests: Vec<TimerRequest>,
    frame: u64,
}

impl TimerQueue {
    pub fn new() -> TimerQueue {
        TimerQueue {
            requests: Vec::new(),
            frame: 0,
        }
    }

    /// Replaces any existing request for `target` with a new one due at
    /// `trigger`. A container only ever has one outstanding request at a
    /// time from a given call site's `Timer`.
    pub fn schedule(&mut self, target: &ComponentHandle, trigger: Tick) {
        self.unschedule(target);
        self.requests.push(TimerRequest {
                target: target.clone(),
                trigger,
                frame_issued: self.frame,
        });
    }

    pub fn unschedule(&mut self, target: &ComponentHandle) {
        self.requests.retain(|r| !r.target.same_container(target));
    }

    /// The earliest trigger tick among all pending requests, if any —
    /// what the dispatch loop passes to
    /// [`crate::ExternalInterface::schedule_timer_event`].
    pub fn next_trigger(&self) -> Option<Tick> {
        self.requests.iter().map(|r| r.trigger).min()
    }

    /// Delivers every request due at or before `now`.
    ///
    /// Starts a new frame, then repeatedly pops and delivers the
    /// earliest-triggering request issued strictly before this frame,
    /// stopping once none qualify. A request a callback schedules
    /// *during* this same pass carries the new frame number, so it can
    /// never be redelivered within the same pass.
    pub fn issue_ready(&mut self, now: Tick, mut deliver: impl FnMut(&ComponentHandle)) {
        self.frame += 1;
        let this_frame = self.frame;
        loop {
            let next_index = self
            .requests
            .iter()
            .enumerate()
            .filter(|(_, r)| r.frame_issued < this_frame && r.trigger <= now)
            .min_by_key(|(_, r)| r.trigger)
            .map(|(index, _)| index);
            let Some(index) = next_index else { break };
            let request = self.requests.remove(index);
            deliver(&request.target);
        }
    }
}

impl Default for TimerQueue {
    fn default() -> TimerQueue {
        TimerQueue::new()
    }
}
