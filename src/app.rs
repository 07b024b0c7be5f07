use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::KeyEvent;
use log::{info, warn};

use crate::config::Args;
use crate::game_loop::GameLoop;
use crate::input::{collect_keys, map_key, map_prompt_key, Command, PromptKey};
use crate::leaderboard::{Entry, Leaderboard};
use crate::render::{self, Hud};
use crate::session::{Session, SessionEvent};
use crate::store::KeyValueStore;

const FRAME: Duration = Duration::from_millis(16);
const STATUS_TTL: Duration = Duration::from_secs(2);
const MAX_NAME_LEN: usize = 16;

struct NamePrompt {
    score: u32,
    name: String,
}

/// Terminal front end: routes keys to the session, runs frames, records
/// high scores and draws.
pub struct App<S> {
    session: Session,
    leaderboard: Leaderboard<S>,
    game_loop: GameLoop,
    prompt: Option<NamePrompt>,
    status: Option<(String, Instant)>,
    /// Set once the running round has passed the best recorded score.
    celebrated: bool,
    should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(args: &Args, store: S) -> Self {
        let (width, height) = args.board_size();
        let mut session = Session::new(width, height, args.seed);
        session.set_speed(args.speed);
        if args.timer {
            session.start_timer_mode();
        }
        App {
            session,
            leaderboard: Leaderboard::load(store),
            game_loop: GameLoop::new(),
            prompt: None,
            status: None,
            celebrated: false,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn leaderboard(&self) -> &Leaderboard<S> {
        &self.leaderboard
    }

    pub fn is_prompting(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn run<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        while !self.should_quit {
            for key in collect_keys()? {
                self.handle_key(&key, Instant::now());
            }
            self.game_loop.frame(&mut self.session, Instant::now());
            self.process_events();
            self.expire_status();
            self.draw(writer)?;
            std::thread::sleep(FRAME);
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: &KeyEvent, now: Instant) {
        if self.prompt.is_some() {
            if let Some(key) = map_prompt_key(key) {
                self.handle_prompt(key);
            }
            return;
        }
        if let Some(command) = map_key(key) {
            self.apply(command, now);
        }
    }

    pub fn apply(&mut self, command: Command, now: Instant) {
        let s = &mut self.session;
        match command {
            Command::Left => {
                s.move_left();
            }
            Command::Right => {
                s.move_right();
            }
            Command::Rotate => {
                s.rotate();
            }
            Command::SoftDrop => s.soft_drop(),
            Command::TogglePause => {
                s.toggle_pause(now);
            }
            Command::Resume => {
                s.resume(now);
            }
            Command::Start if !s.is_running() => {
                self.game_loop.reset();
                s.start();
            }
            Command::StartTimer if !s.is_running() => {
                self.game_loop.reset();
                s.start_timer_mode();
            }
            Command::Start | Command::StartTimer => {}
            Command::SetSpeed(speed) => s.set_speed(speed),
            Command::Quit => self.should_quit = true,
        }
        self.process_events();
    }

    fn handle_prompt(&mut self, key: PromptKey) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match key {
            PromptKey::Char(ch) if prompt.name.chars().count() < MAX_NAME_LEN => prompt.name.push(ch),
            PromptKey::Char(_) => {}
            PromptKey::Backspace => {
                prompt.name.pop();
            }
            PromptKey::Commit => {
                if let Some(prompt) = self.prompt.take() {
                    self.record(&prompt.name, prompt.score);
                }
            }
            PromptKey::Skip => self.prompt = None,
        }
    }

    fn record(&mut self, name: &str, score: u32) {
        match self.leaderboard.submit(Entry::new(name, score)) {
            Ok(Some(rank)) => self.set_status(format!("Saved as #{}", rank + 1)),
            Ok(None) => {}
            Err(e) => {
                warn!("could not save high score: {e}");
                self.set_status(format!("Save failed: {e}"));
            }
        }
    }

    fn process_events(&mut self) {
        for event in self.session.drain_events() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::ScoreChanged(0) => self.celebrated = false,
            SessionEvent::ScoreChanged(score) => {
                let best = self.leaderboard.entries().first().map(|e| e.score);
                if !self.celebrated && best.is_some_and(|best| score > best) {
                    self.celebrated = true;
                    self.set_status("New high score!".to_owned());
                }
            }
            SessionEvent::RowsCleared(1) => self.set_status("Cleared 1 row".to_owned()),
            SessionEvent::RowsCleared(n) => self.set_status(format!("Cleared {n} rows")),
            SessionEvent::CountdownChanged(60) => self.set_status("One minute left".to_owned()),
            SessionEvent::CountdownChanged(_) => {}
            SessionEvent::GameOver { score } => {
                if self.leaderboard.qualifies(score) {
                    info!("score {score} qualifies for the table");
                    self.prompt = Some(NamePrompt {
                        score,
                        name: String::new(),
                    });
                }
            }
        }
    }

    fn set_status(&mut self, msg: String) {
        self.status = Some((msg, Instant::now()));
    }

    fn expire_status(&mut self) {
        if let Some((_, at)) = &self.status {
            if at.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let hud = Hud {
            leaderboard: self.leaderboard.entries(),
            name_prompt: self.prompt.as_ref().map(|p| p.name.as_str()),
            status: self.status.as_ref().map(|(msg, _)| msg.as_str()),
        };
        render::draw(writer, &self.session.snapshot(), &hud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::State;
    use crate::store::MemoryStore;
    use clap::Parser;
    use crossterm::event::{KeyCode, KeyEventKind, KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> App<MemoryStore> {
        App::new(&Args::parse_from(["blockfall", "--seed", "8"]), MemoryStore::default())
    }

    #[test]
    fn game_over_prompts_for_name_and_records_it() {
        let mut app = app();
        let now = Instant::now();
        app.apply(Command::Start, now);
        assert_eq!(app.session().state(), State::Running);
        app.session.end();
        app.process_events();
        assert!(app.is_prompting());

        for ch in "zed".chars() {
            app.handle_key(&press(KeyCode::Char(ch)), now);
        }
        app.handle_key(&press(KeyCode::Backspace), now);
        app.handle_key(&press(KeyCode::Enter), now);

        assert!(!app.is_prompting());
        assert_eq!(app.leaderboard().entries()[0].name, "ze");
        assert_eq!(app.leaderboard().entries()[0].score, 0);
    }

    #[test]
    fn start_is_ignored_mid_round() {
        let mut app = app();
        let now = Instant::now();
        app.apply(Command::Start, now);
        app.apply(Command::SoftDrop, now);
        let y = app.session().active().unwrap().y;
        app.apply(Command::Start, now);
        assert_eq!(app.session().active().unwrap().y, y);
    }

    fn status(app: &App<MemoryStore>) -> Option<&str> {
        app.status.as_ref().map(|(msg, _)| msg.as_str())
    }

    #[test]
    fn cleared_rows_and_last_minute_show_a_status() {
        let mut app = app();
        app.handle_event(SessionEvent::RowsCleared(2));
        assert_eq!(status(&app), Some("Cleared 2 rows"));
        app.handle_event(SessionEvent::RowsCleared(1));
        assert_eq!(status(&app), Some("Cleared 1 row"));

        app.status = None;
        app.handle_event(SessionEvent::CountdownChanged(61));
        assert_eq!(status(&app), None);
        app.handle_event(SessionEvent::CountdownChanged(60));
        assert_eq!(status(&app), Some("One minute left"));
    }

    #[test]
    fn beating_the_best_score_is_announced_once_per_round() {
        let mut app = app();
        app.leaderboard
            .submit(Entry::dated("ada", 20, "2024-01-01".to_owned()))
            .unwrap();

        app.handle_event(SessionEvent::ScoreChanged(0));
        app.handle_event(SessionEvent::ScoreChanged(20));
        assert_eq!(status(&app), None);
        app.handle_event(SessionEvent::ScoreChanged(30));
        assert_eq!(status(&app), Some("New high score!"));

        app.status = None;
        app.handle_event(SessionEvent::ScoreChanged(40));
        assert_eq!(status(&app), None);

        app.handle_event(SessionEvent::ScoreChanged(0));
        app.handle_event(SessionEvent::ScoreChanged(30));
        assert_eq!(status(&app), Some("New high score!"));
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let mut app = app();
        app.handle_key(&press(KeyCode::Char('q')), Instant::now());
        assert!(app.should_quit());
    }
}
