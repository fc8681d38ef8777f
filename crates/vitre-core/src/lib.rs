// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]
use std::time::Instant;

pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}

/// Frame-rate bookkeeping for the once-per-second rate log.
///
/// Counts frames into one-second windows; `tick` reports the count when a
/// window closes and starts the next one.
pub struct FpsCounter {
    frames: u32,
    window_start: Instant,
}

impl FpsCounter {
    pub fn new() -> Self {
        FpsCounter {
            frames: 0,
            window_start: Instant::now(),
        }
    }

    pub fn frame(&mut self) {
        self.frames = self.frames.saturating_add(1);
    }

    pub fn tick(&mut self) -> Option<u32> {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> Option<u32> {
        if now.duration_since(self.window_start).as_secs_f32() >= 1.0 {
            let count = self.frames;
            self.frames = 0;
            self.window_start = now;
            Some(count)
        } else {
            None
        }
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn no_report_inside_the_window() {
        let mut fps = FpsCounter::new();
        let start = fps.window_start;
        fps.frame();
        fps.frame();
        assert_eq!(fps.tick_at(start + Duration::from_millis(400)), None);
    }

    #[test]
    fn reports_and_resets_after_one_second() {
        let mut fps = FpsCounter::new();
        let start = fps.window_start;
        for _ in 0..60 {
            fps.frame();
        }
        assert_eq!(fps.tick_at(start + Duration::from_millis(1100)), Some(60));
        // Window restarted: nothing counted yet, nothing to report.
        assert_eq!(fps.tick_at(start + Duration::from_millis(1500)), None);
        fps.frame();
        assert_eq!(fps.tick_at(start + Duration::from_millis(2200)), Some(1));
    }

    #[test]
    fn empty_window_reports_zero() {
        let mut fps = FpsCounter::new();
        let start = fps.window_start;
        assert_eq!(fps.tick_at(start + Duration::from_secs(2)), Some(0));
    }
}
