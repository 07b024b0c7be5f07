//! Falling-block puzzle engine with a crossterm front end.
//!
//! The engine half (`board`, `piece`, `player`, `speed`, `countdown`,
//! `session`, `game_loop`, `leaderboard`, `store`) has no terminal
//! dependency and is driven entirely through [`session::Session`]. The front
//! end half (`app`, `input`, `render`, `config`) wires it to a terminal.

pub mod app;
pub mod board;
pub mod config;
pub mod countdown;
pub mod error;
pub mod game_loop;
pub mod input;
pub mod leaderboard;
pub mod piece;
pub mod player;
pub mod render;
pub mod session;
pub mod speed;
pub mod store;

pub use board::Board;
pub use leaderboard::{Entry, Leaderboard};
pub use piece::{PieceKind, Shape};
pub use session::{Session, SessionEvent, State};
pub use speed::Speed;
