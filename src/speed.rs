use std::fmt;
use std::time::Duration;

use clap::ValueEnum;

/// Difficulty presets, each a fixed gravity interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Speed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl Speed {
    pub const ALL: [Speed; 3] = [Speed::Slow, Speed::Normal, Speed::Fast];

    pub fn drop_interval(self) -> Duration {
        match self {
            Speed::Slow => Duration::from_millis(1200),
            Speed::Normal => Duration::from_millis(600),
            Speed::Fast => Duration::from_millis(200),
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Speed::Slow => "slow",
            Speed::Normal => "normal",
            Speed::Fast => "fast",
        };
        f.write_str(name)
    }
}
