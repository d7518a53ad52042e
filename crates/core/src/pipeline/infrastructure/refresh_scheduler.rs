use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::pipeline::scheduler::CycleScheduler;

/// Wall-clock scheduler that paces cycles toward a target rate.
///
/// Each tick starts `1/fps` after the previous one started; a tick that
/// overruns its slot is followed immediately, with no attempt to catch up on
/// lost time. Ticks never overlap because the loop is single-threaded.
pub struct RefreshScheduler {
    interval: Duration,
    max_ticks: Option<u64>,
    stop: Option<Arc<AtomicBool>>,
}

impl RefreshScheduler {
    /// `fps` at or below zero disables pacing and runs ticks back to back.
    /// `max_ticks` bounds the run; `stop` is polled before every tick.
    pub fn new(fps: f64, max_ticks: Option<u64>, stop: Option<Arc<AtomicBool>>) -> Self {
        let interval = if fps > 0.0 {
            Duration::from_secs_f64(1.0 / fps)
        } else {
            Duration::ZERO
        };
        Self {
            interval,
            max_ticks,
            stop,
        }
    }
}

impl CycleScheduler for RefreshScheduler {
    fn run(&mut self, tick: &mut dyn FnMut() -> bool) {
        let mut ticks = 0u64;
        loop {
            if let Some(stop) = &self.stop {
                if stop.load(Ordering::SeqCst) {
                    return;
                }
            }

            let started = Instant::now();
            if !tick() {
                return;
            }

            ticks += 1;
            if let Some(max) = self.max_ticks {
                if ticks >= max {
                    return;
                }
            }

            if let Some(remaining) = self.interval.checked_sub(started.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }
}
