/// Fixed timestep driver for the simulation
///
/// The host reports how much time passed since the last frame; the loop
/// turns that into a whole number of fixed simulation ticks. It never reads
/// the wall clock, so the same frame times always yield the same ticks.

/// Target simulation rate (60 ticks per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Maximum number of simulation ticks per frame to prevent spiral of death
const MAX_STEPS_PER_FRAME: u32 = 5;

/// Game loop timing state
#[derive(Debug, Clone)]
pub struct GameLoop {
    /// Time not yet consumed by a fixed tick
    accumulator: f32,

    /// Length of one tick (seconds)
    timestep: f32,

    /// Whether the simulation is paused
    paused: bool,

    /// Total frames reported
    frame_count: u64,

    /// Total ticks handed out
    update_count: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self::with_timestep(FIXED_TIMESTEP)
    }

    /// Create a loop with a custom tick length
    pub fn with_timestep(timestep: f32) -> Self {
        Self {
            accumulator: 0.0,
            timestep: if timestep > 0.0 { timestep } else { FIXED_TIMESTEP },
            paused: false,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Report a frame of `frame_time` seconds, returns the number of ticks to run
    pub fn advance(&mut self, frame_time: f32) -> u32 {
        self.frame_count += 1;

        if self.paused || frame_time <= 0.0 {
            return 0;
        }

        self.accumulator += frame_time;

        let mut steps = 0;
        while self.accumulator >= self.timestep && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.timestep;
            steps += 1;
        }

        // Drop the backlog we refused to simulate
        if steps == MAX_STEPS_PER_FRAME && self.accumulator >= self.timestep {
            log::warn!(
                "Simulation falling behind, dropping {:.3}s",
                self.accumulator
            );
            self.accumulator %= self.timestep;
        }

        self.update_count += steps as u64;
        steps
    }

    /// Length of one tick (seconds)
    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    /// Fraction of a tick left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.timestep
    }

    /// Simulated time so far (seconds)
    pub fn simulated_time(&self) -> f32 {
        self.update_count as f32 * self.timestep
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent update burst
            self.accumulator = 0.0;
            log::info!("Simulation resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}
