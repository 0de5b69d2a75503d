//! Frame driver: time source, per-frame parameter snapshot and FPS statistics.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::params::{ColorParameters, WaveParameters};

/// Where frame time comes from
#[derive(Debug, Clone)]
pub enum FrameClock {
    /// Seconds elapsed since the clock was created
    WallClock { start: Instant },

    /// `frame / fps`, advancing one frame per rendered frame (recording)
    Fixed { fps: u32, frame: u64 },
}

impl FrameClock {
    pub fn wall_clock() -> Self {
        Self::WallClock {
            start: Instant::now(),
        }
    }

    pub fn fixed(fps: u32) -> Self {
        Self::Fixed {
            fps: fps.max(1),
            frame: 0,
        }
    }

    /// Time for the frame about to be rendered; never decreases
    ///
    /// A fixed clock keeps returning the same time until `advance` is called, so a
    /// frame that fails to render is retried at the same instant.
    pub fn now(&self) -> f32 {
        match self {
            Self::WallClock { start } => start.elapsed().as_secs_f32(),
            Self::Fixed { fps, frame } => (*frame as f64 / *fps as f64) as f32,
        }
    }

    /// Move a fixed clock to its next frame; no-op on the wall clock
    pub fn advance(&mut self) {
        if let Self::Fixed { frame, .. } = self {
            *frame += 1;
        }
    }
}

/// Everything one frame reads, captured by value before any GPU work
///
/// Panel edits made while a frame is in flight land in the live parameters and only
/// show up in the next snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    pub time_s: f32,
    pub wave: WaveParameters,
    pub color: ColorParameters,
}

impl FrameSnapshot {
    pub fn capture(time_s: f32, wave: &WaveParameters, color: &ColorParameters) -> Self {
        Self {
            time_s,
            wave: *wave,
            color: *color,
        }
    }
}

/// Rolling frame-time window, logged once per second
pub struct FpsTracker {
    frame_times: VecDeque<Duration>,
    last_frame: Instant,
    last_report: Instant,
}

impl FpsTracker {
    const WINDOW: usize = 60;

    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            frame_times: VecDeque::with_capacity(Self::WINDOW),
            last_frame: now,
            last_report: now,
        }
    }

    pub fn record_frame(&mut self) {
        let now = Instant::now();
        self.push(now - self.last_frame);
        self.last_frame = now;

        if now - self.last_report > Duration::from_secs(1) {
            log::debug!("FPS: {:.1}", self.current_fps());
            self.last_report = now;
        }
    }

    fn push(&mut self, frame_time: Duration) {
        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > Self::WINDOW {
            self.frame_times.pop_front();
        }
    }

    pub fn current_fps(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        let total: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total.as_secs_f32() / self.frame_times.len() as f32;

        if avg_frame_time > 0.0 {
            1.0 / avg_frame_time
        } else {
            0.0
        }
    }
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self::new()
    }
}
