use std::time::Duration;

pub const TIMER_MODE_SECONDS: u32 = 600;
const PERIOD: Duration = Duration::from_secs(1);

/// Identifies one scheduled ticker. Handles are never reused, so a firing
/// that carries an old handle can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Ticker {
    handle: TaskHandle,
    carry: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fired {
    /// The handle was not the live ticker.
    Stale,
    Ticked { remaining: u32 },
    Expired,
}

/// Seconds left in a timed round plus the one-second ticker that counts them
/// down. At most one ticker is outstanding; scheduling replaces it.
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u32,
    ticker: Option<Ticker>,
    next_id: u64,
}

impl Default for Countdown {
    fn default() -> Self {
        Countdown::new(TIMER_MODE_SECONDS)
    }
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Countdown {
            remaining: seconds,
            ticker: None,
            next_id: 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn reset(&mut self, seconds: u32) {
        self.remaining = seconds;
    }

    pub fn handle(&self) -> Option<TaskHandle> {
        self.ticker.map(|t| t.handle)
    }

    #[cfg(test)]
    pub(crate) fn is_scheduled(&self) -> bool {
        self.ticker.is_some()
    }

    /// Starts a fresh ticker, cancelling any previous one. A partial second
    /// accumulated by the old ticker is discarded.
    pub fn schedule(&mut self) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        self.ticker = Some(Ticker {
            handle,
            carry: Duration::ZERO,
        });
        handle
    }

    pub fn cancel(&mut self) {
        self.ticker = None;
    }

    /// Feeds elapsed real time to the live ticker and returns how many
    /// one-second firings are now due.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        let Some(ticker) = self.ticker.as_mut() else {
            return 0;
        };
        ticker.carry += dt;
        let mut due = 0;
        while ticker.carry >= PERIOD {
            ticker.carry -= PERIOD;
            due += 1;
        }
        due
    }

    /// Applies one firing of the ticker identified by `handle`.
    pub fn fire(&mut self, handle: TaskHandle) -> Fired {
        if self.handle() != Some(handle) {
            return Fired::Stale;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.ticker = None;
            Fired::Expired
        } else {
            Fired::Ticked {
                remaining: self.remaining,
            }
        }
    }
}

/// Formats seconds as `MM:SS`.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
