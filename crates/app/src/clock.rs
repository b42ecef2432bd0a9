use std::time::{Duration, Instant};

use fireworks_core::FrameClock;

/// Wall-clock frame pacing. Sleeps until the next frame deadline; if a tick
/// overruns, the schedule restarts from now instead of bursting to catch up.
#[derive(Debug)]
pub struct PacedClock {
    start: Instant,
    frame: Duration,
    next_deadline: Instant,
}

impl PacedClock {
    pub fn start(fps: u32) -> Self {
        let start = Instant::now();
        let frame = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
        Self {
            start,
            frame,
            next_deadline: start + frame,
        }
    }
}

impl FrameClock for PacedClock {
    fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    fn wait_for_next_tick(&mut self) {
        let now = Instant::now();
        if now < self.next_deadline {
            std::thread::sleep(self.next_deadline - now);
            self.next_deadline += self.frame;
        } else {
            self.next_deadline = now + self.frame;
        }
    }
}
