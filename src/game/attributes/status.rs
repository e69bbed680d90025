// Transient status conditions attached to a character

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Independent boolean conditions queried by state and combat gates.
    ///
    /// Inserting a flag that is already present is a no-op.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct StatusFlags: u8 {
        const STAGGERED    = 1 << 0;
        const IFRAMES      = 1 << 1;
        const BLOCKING     = 1 << 2;
        const BLOCK_BROKEN = 1 << 3;
    }
}

/// Serializable name for a single status flag (used in attack data)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Staggered,
    IFrames,
    Blocking,
    BlockBroken,
}

impl StatusKind {
    pub fn flag(self) -> StatusFlags {
        match self {
            Self::Staggered => StatusFlags::STAGGERED,
            Self::IFrames => StatusFlags::IFRAMES,
            Self::Blocking => StatusFlags::BLOCKING,
            Self::BlockBroken => StatusFlags::BLOCK_BROKEN,
        }
    }
}

/// Status flags plus expiry timers for the timed ones
#[derive(Debug, Clone, Default)]
pub struct Status {
    flags: StatusFlags,
    timers: Vec<(StatusFlags, f32)>,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(&self) -> StatusFlags {
        self.flags
    }

    pub fn has(&self, flag: StatusFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Add an untimed flag. Any pending timer for it is cancelled.
    pub fn add(&mut self, flag: StatusFlags) {
        self.flags.insert(flag);
        self.timers.retain(|(timed, _)| !flag.contains(*timed));
    }

    /// Add a flag that clears itself after `duration` seconds. An existing
    /// timer is only ever extended, never shortened; an untimed flag that is
    /// already present stays untimed.
    pub fn add_timed(&mut self, flag: StatusFlags, duration: f32) {
        if duration <= 0.0 {
            return;
        }
        if self.flags.contains(flag) && !self.timers.iter().any(|(timed, _)| *timed == flag) {
            return;
        }

        self.flags.insert(flag);
        match self.timers.iter_mut().find(|(timed, _)| *timed == flag) {
            Some((_, remaining)) => *remaining = remaining.max(duration),
            None => self.timers.push((flag, duration)),
        }
    }

    /// Remove a flag and its timer
    pub fn remove(&mut self, flag: StatusFlags) {
        self.flags.remove(flag);
        self.timers.retain(|(timed, _)| !flag.contains(*timed));
    }

    pub fn clear(&mut self) {
        self.flags = StatusFlags::empty();
        self.timers.clear();
    }

    /// Advance timers, removing expired flags. Returns the flags that expired.
    pub fn tick(&mut self, dt: f32) -> StatusFlags {
        let mut expired = StatusFlags::empty();
        for (flag, remaining) in &mut self.timers {
            *remaining -= dt;
            if *remaining <= 0.0 {
                expired.insert(*flag);
            }
        }
        if !expired.is_empty() {
            self.timers.retain(|(_, remaining)| *remaining > 0.0);
            self.flags.remove(expired);
        }
        expired
    }
}
