// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

/// Runtime knobs for a [`crate::System`], in the style of this workspace's
/// other plain-data configuration structs: small, `Copy`, built with
/// [`Default`] plus chained setters rather than a builder object.
#[derive(Clone, Copy, Debug)]
pub struct SystemOptions {
    /// How many refresh passes [`crate::System::refresh_system`] will run
    /// back to back, chasing a dirty root, before giving up and logging a
    /// warning ("a hard bound to catch cycles").
    pub max_refresh_passes: u32,
    /// The tick interval new animation timers default to when a caller
    /// doesn't specify one of their own.
    pub default_animation_tick_interval: u32,
    /// Whether named-block garbage collection runs during a refresh
    /// traversal.
    pub gc_enabled: bool,
    /// Whether unvisited `Cached` nodes are cleared during a refresh
    /// traversal.
    pub cache_clear_enabled: bool,
}

impl Default for SystemOptions {
    fn default() -> SystemOptions {
        SystemOptions {
            max_refresh_passes: 64,
            default_animation_tick_interval: 16,
            gc_enabled: true,
            cache_clear_enabled: true,
        }
    }
}

impl SystemOptions {
    pub fn with_max_refresh_passes(mut self, max_refresh_passes: u32) -> SystemOptions {
        self.max_refresh_passes = max_refresh_passes;
        self
    }

    pub fn with_default_animation_tick_interval(mut self, interval: u32) -> SystemOptions {
        self.default_animation_tick_interval = interval;
        self
    }

    pub fn with_gc_enabled(mut self, enabled: bool) -> SystemOptions {
        self.gc_enabled = enabled;
        self
    }

    pub fn with_cache_clear_enabled(mut self, enabled: bool) -> SystemOptions {
        self.cache_clear_enabled = enabled;
        self
    }
}
