use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Env, Target};

use crate::board::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::speed::Speed;
use crate::store::FileStore;

const LOG_FILE_NAME: &str = "blockfall.log";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Number of columns on the board
    #[arg(long, default_value_t = DEFAULT_WIDTH as u16, value_parser = clap::value_parser!(u16).range(4..=40))]
    pub columns: u16,
    /// Number of lines on the board
    #[arg(long, default_value_t = DEFAULT_HEIGHT as u16, value_parser = clap::value_parser!(u16).range(4..=40))]
    pub lines: u16,
    /// Gravity preset
    #[arg(long, value_enum, default_value_t = Speed::Normal)]
    pub speed: Speed,
    /// Start straight into a ten minute timed round
    #[arg(long)]
    pub timer: bool,
    /// Seed for the piece generator
    #[arg(long)]
    pub seed: Option<u64>,
    /// Directory for the high-score table
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Log file, defaults to blockfall.log in the data directory
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn board_size(&self) -> (usize, usize) {
        (self.columns as usize, self.lines as usize)
    }

    pub fn store(&self) -> Result<FileStore> {
        match &self.data_dir {
            Some(dir) => Ok(FileStore::new(dir)),
            None => FileStore::in_project_dir().context("could not resolve the data directory"),
        }
    }

    pub fn log_path(&self, data_dir: &Path) -> PathBuf {
        match &self.log_file {
            Some(path) => path.clone(),
            None => data_dir.join(LOG_FILE_NAME),
        }
    }

    /// Sets up `env_logger`, honouring `RUST_LOG` and defaulting to `warn`.
    /// Output always goes to a file since the terminal belongs to the game.
    pub fn init_logging(&self, data_dir: &Path) -> Result<()> {
        let path = self.log_path(data_dir);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("could not create {}", parent.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("could not open log file {}", path.display()))?;
        env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
            .target(Target::Pipe(Box::new(file)))
            .try_init()
            .context("logger already initialised")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_board() {
        let args = Args::parse_from(["blockfall"]);
        assert_eq!(args.board_size(), (10, 20));
        assert_eq!(args.speed, Speed::Normal);
        assert!(!args.timer);
    }

    #[test]
    fn parses_speed_and_rejects_tiny_boards() {
        let args = Args::parse_from(["blockfall", "--speed", "fast", "--timer", "--seed", "3"]);
        assert_eq!(args.speed, Speed::Fast);
        assert!(args.timer);
        assert_eq!(args.seed, Some(3));
        assert!(Args::try_parse_from(["blockfall", "--columns", "2"]).is_err());
    }

    #[test]
    fn log_file_defaults_to_the_data_dir() {
        let data = Path::new("/tmp/blockfall-data");
        let args = Args::parse_from(["blockfall"]);
        assert_eq!(args.log_path(data), data.join("blockfall.log"));

        let args = Args::parse_from(["blockfall", "--log-file", "/tmp/run.log"]);
        assert_eq!(args.log_path(data), PathBuf::from("/tmp/run.log"));
    }
}
