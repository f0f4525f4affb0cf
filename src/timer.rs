// src/timer.rs
//! Frame timer

use std::time::Instant;

/// Time sample taken once per frame
#[derive(Debug, Clone, Copy, Default)]
pub struct State {
    /// Seconds since the previous update
    pub elapsed: f32,
    /// Seconds since the timer was created
    pub total_elapsed: f32,
}

pub struct Timer {
    start: Instant,
    last: Instant,
}

impl Timer {
    pub fn new() -> Self {
        let now = Instant::now();
        Timer { start: now, last: now }
    }

    pub fn update(&mut self) -> State {
        let now = Instant::now();
        let state = State {
            elapsed: (now - self.last).as_secs_f32(),
            total_elapsed: (now - self.start).as_secs_f32(),
        };
        self.last = now;
        state
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_is_non_negative_and_total_accumulates() {
        let mut timer = Timer::new();
        let first = timer.update();
        let second = timer.update();

        assert!(first.elapsed >= 0.0);
        assert!(second.elapsed >= 0.0);
        assert!(second.total_elapsed >= first.total_elapsed);
    }
}
