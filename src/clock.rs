/// Single-threaded frame scheduling.
///
/// One callback per frame; the callback decides whether another frame is
/// scheduled.  Stopping is the only form of cancellation: a frame that has
/// started always runs to completion.

use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Clamp a raw frame delta (milliseconds) into `[0, max_ms]` so a stall never
/// turns into one huge integration step.
pub fn clamp_delta(raw_ms: f32, max_ms: f32) -> f32 {
    if raw_ms.is_nan() {
        return 0.0;
    }
    raw_ms.min(max_ms).max(0.0)
}

#[derive(Clone, Debug)]
pub struct Ticker {
    frame: Duration,
    max_delta_ms: f32,
    frames_run: u64,
}

impl Ticker {
    pub fn new(frame: Duration, max_delta_ms: f32) -> Self {
        Ticker {
            frame,
            max_delta_ms,
            frames_run: 0,
        }
    }

    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    /// Call `step` once per frame with the clamped delta since the previous
    /// frame until it returns `LoopControl::Stop` or an error.
    pub fn run<E, F>(&mut self, mut step: F) -> Result<(), E>
    where
        F: FnMut(f32) -> Result<LoopControl, E>,
    {
        let mut last = Instant::now();
        loop {
            let frame_start = Instant::now();
            let raw_ms = frame_start.duration_since(last).as_secs_f32() * 1000.0;
            last = frame_start;

            self.frames_run += 1;
            if step(clamp_delta(raw_ms, self.max_delta_ms))? == LoopControl::Stop {
                return Ok(());
            }

            let elapsed = frame_start.elapsed();
            if elapsed < self.frame {
                thread::sleep(self.frame - elapsed);
            }
        }
    }
}
