//! Game session: the state machine that ties the board, the falling piece,
//! gravity, scoring and the optional round timer together.
//!
//! ```text
//! Idle --start--> Running <--toggle_pause--> Paused
//!                    |                          |
//!                    +--------> GameOver <------+
//! ```
//!
//! `start` is accepted from every state and always begins a fresh round.
//! Inputs that do not apply to the current state are ignored.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::board::Board;
use crate::countdown::{Countdown, Fired, TaskHandle, TIMER_MODE_SECONDS};
use crate::piece::Shape;
use crate::player::{ActivePiece, DropOutcome, Player};
use crate::speed::Speed;

pub const POINTS_PER_ROW: u32 = 10;
pub const PAUSE_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Notifications for the score/UI layer, drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ScoreChanged(u32),
    RowsCleared(usize),
    CountdownChanged(u32),
    GameOver { score: u32 },
}

/// Read-only view handed to the renderer.
#[derive(Debug)]
pub struct Snapshot<'a> {
    pub board: &'a Board,
    pub active: Option<&'a ActivePiece>,
    pub next: Option<Shape>,
    pub score: u32,
    pub state: State,
    pub speed: Speed,
    /// Seconds left when playing a timed round.
    pub countdown: Option<u32>,
}

pub struct Session {
    board: Board,
    player: Player,
    state: State,
    score: u32,
    speed: Speed,
    drop_counter: Duration,
    timer_mode: bool,
    countdown: Countdown,
    last_toggle: Option<Instant>,
    ended: bool,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(width: usize, height: usize, seed: Option<u64>) -> Self {
        Session {
            board: Board::new(width, height),
            player: Player::new(seed),
            state: State::Idle,
            score: 0,
            speed: Speed::default(),
            drop_counter: Duration::ZERO,
            timer_mode: false,
            countdown: Countdown::default(),
            last_toggle: None,
            ended: false,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.player.active()
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn drop_interval(&self) -> Duration {
        self.speed.drop_interval()
    }

    pub fn countdown_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    /// Handle of the live countdown ticker, if one is scheduled.
    pub fn countdown_handle(&self) -> Option<TaskHandle> {
        self.countdown.handle()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            board: &self.board,
            active: self.player.active(),
            next: self.player.next().map(Shape::new),
            score: self.score,
            state: self.state,
            speed: self.speed,
            countdown: self.timer_mode.then(|| self.countdown.remaining()),
        }
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Changes gravity from the next frame on. The accumulated drop time is
    /// kept.
    pub fn set_speed(&mut self, speed: Speed) {
        debug!("speed set to {speed}");
        self.speed = speed;
    }

    /// Begins a fresh round. Everything from the previous round, including a
    /// pending countdown ticker, is discarded before the first piece spawns.
    pub fn start(&mut self) {
        self.countdown.cancel();
        self.board.clear();
        self.player.reset();
        self.score = 0;
        self.drop_counter = Duration::ZERO;
        self.ended = false;
        self.state = State::Running;
        self.events.push(SessionEvent::ScoreChanged(0));

        if self.timer_mode {
            self.countdown.reset(TIMER_MODE_SECONDS);
            self.countdown.schedule();
            self.events
                .push(SessionEvent::CountdownChanged(TIMER_MODE_SECONDS));
        }
        info!(
            "round started: speed={} timer_mode={}",
            self.speed, self.timer_mode
        );

        if !self.player.spawn(&self.board) {
            self.end();
        }
    }

    pub fn start_timer_mode(&mut self) {
        self.timer_mode = true;
        self.start();
    }

    /// Flips between running and paused. Requests arriving within
    /// [`PAUSE_DEBOUNCE`] of the last accepted one are dropped. Returns
    /// whether the state changed.
    pub fn toggle_pause(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_toggle {
            if now.saturating_duration_since(last) < PAUSE_DEBOUNCE {
                return false;
            }
        }
        self.last_toggle = Some(now);

        match self.state {
            State::Running => {
                self.state = State::Paused;
                self.countdown.cancel();
                debug!("paused");
                true
            }
            State::Paused => {
                self.state = State::Running;
                if self.timer_mode {
                    self.countdown.schedule();
                }
                debug!("resumed");
                true
            }
            State::Idle | State::GameOver => {
                debug!("pause ignored in {:?}", self.state);
                false
            }
        }
    }

    pub fn resume(&mut self, now: Instant) -> bool {
        self.state == State::Paused && self.toggle_pause(now)
    }

    pub fn move_left(&mut self) -> bool {
        self.is_running() && self.player.move_by(&self.board, -1)
    }

    pub fn move_right(&mut self) -> bool {
        self.is_running() && self.player.move_by(&self.board, 1)
    }

    pub fn rotate(&mut self) -> bool {
        self.is_running() && self.player.rotate(&self.board)
    }

    pub fn soft_drop(&mut self) {
        if !self.is_running() {
            return;
        }
        match self.player.soft_drop(&mut self.board) {
            DropOutcome::Moved => self.drop_counter = Duration::ZERO,
            DropOutcome::Locked { cleared, topped_out } => {
                self.drop_counter = Duration::ZERO;
                if cleared > 0 {
                    self.score += POINTS_PER_ROW * cleared as u32;
                    debug!("cleared {cleared} rows, score {}", self.score);
                    self.events.push(SessionEvent::RowsCleared(cleared));
                    self.events.push(SessionEvent::ScoreChanged(self.score));
                }
                if topped_out {
                    self.end();
                }
            }
            DropOutcome::Idle => {}
        }
    }

    /// Gravity. Accumulates frame time and drops the piece one row once the
    /// accumulator exceeds the drop interval.
    pub fn on_tick(&mut self, delta: Duration) {
        if !self.is_running() {
            return;
        }
        self.drop_counter += delta;
        if self.drop_counter > self.drop_interval() {
            self.soft_drop();
        }
    }

    /// Feeds real time to the countdown ticker and applies each second that
    /// has fully elapsed.
    pub fn advance_countdown(&mut self, delta: Duration) {
        let due = self.countdown.advance(delta);
        for _ in 0..due {
            let Some(handle) = self.countdown.handle() else {
                break;
            };
            self.countdown_fired(handle);
        }
    }

    /// Applies one ticker firing. Firings from a cancelled or replaced ticker
    /// are ignored.
    pub fn countdown_fired(&mut self, handle: TaskHandle) {
        match self.countdown.fire(handle) {
            Fired::Stale => debug!("stale countdown tick ignored"),
            Fired::Ticked { remaining } => {
                self.events.push(SessionEvent::CountdownChanged(remaining));
            }
            Fired::Expired => {
                self.events.push(SessionEvent::CountdownChanged(0));
                info!("time is up");
                self.end();
            }
        }
    }

    /// One frame's worth of time: countdown first, then gravity.
    pub fn advance(&mut self, delta: Duration) {
        self.advance_countdown(delta);
        self.on_tick(delta);
    }

    /// Finishes the round. Runs at most once per round, whatever triggered it.
    pub fn end(&mut self) {
        if self.ended || !matches!(self.state, State::Running | State::Paused) {
            return;
        }
        self.ended = true;
        self.state = State::GameOver;
        self.countdown.cancel();
        self.timer_mode = false;
        self.player.clear_active();
        info!("game over, final score {}", self.score);
        self.events.push(SessionEvent::GameOver { score: self.score });
    }
}
