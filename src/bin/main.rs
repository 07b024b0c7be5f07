use std::io;

use anyhow::Result;
use blockfall::app::App;
use blockfall::config::Args;
use clap::Parser;
use crossterm::{cursor, execute, terminal};
use log::info;

fn main() -> Result<()> {
    let args = Args::parse();
    let store = args.store()?;
    args.init_logging(store.dir())?;
    info!("high scores stored in {}", store.dir().display());

    // Load the high scores while the terminal is still in cooked mode.
    let mut app = App::new(&args, store);
    let mut stdout = io::stdout();

    // Setup terminal
    terminal::enable_raw_mode()?;
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let result = app.run(&mut stdout);

    // Cleanup terminal
    execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}
