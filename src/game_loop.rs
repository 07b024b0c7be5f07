use std::time::{Duration, Instant};

use crate::session::Session;

/// Measures the time between frames and feeds it to the session.
///
/// The clock only runs while the session does. When the session is paused,
/// idle or over, the previous frame time is forgotten, so the first frame
/// after resuming contributes no elapsed time.
#[derive(Debug, Default)]
pub struct GameLoop {
    last_frame: Option<Instant>,
}

impl GameLoop {
    pub fn new() -> Self {
        GameLoop::default()
    }

    pub fn reset(&mut self) {
        self.last_frame = None;
    }

    /// Runs one frame and returns the time credited to the session.
    pub fn frame(&mut self, session: &mut Session, now: Instant) -> Duration {
        if !session.is_running() {
            self.last_frame = None;
            return Duration::ZERO;
        }
        let delta = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_frame = Some(now);
        session.advance(delta);
        delta
    }
}
