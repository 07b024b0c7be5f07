use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

use crate::speed::Speed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Left,
    Right,
    SoftDrop,
    Rotate,
    TogglePause,
    Resume,
    Start,
    StartTimer,
    SetSpeed(Speed),
    Quit,
}

/// Keys while typing a name for the high-score table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKey {
    Char(char),
    Backspace,
    Commit,
    Skip,
}

/// Drains pending key events without blocking the frame.
pub fn collect_keys() -> anyhow::Result<Vec<KeyEvent>> {
    let mut out = Vec::new();
    while event::poll(Duration::from_millis(1))? {
        if let Event::Key(key) = event::read()? {
            out.push(key);
            if out.len() >= 32 {
                break;
            }
        }
    }
    Ok(out)
}

pub fn map_key(key: &KeyEvent) -> Option<Command> {
    let pressed = key.kind == KeyEventKind::Press;
    let held = matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat);
    match key.code {
        KeyCode::Left if held => Some(Command::Left),
        KeyCode::Right if held => Some(Command::Right),
        KeyCode::Down if held => Some(Command::SoftDrop),
        KeyCode::Up if pressed => Some(Command::Rotate),
        KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') if pressed => {
            Some(Command::TogglePause)
        }
        KeyCode::Char('r') | KeyCode::Char('R') if pressed => Some(Command::Resume),
        KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char('N') if pressed => Some(Command::Start),
        KeyCode::Char('t') | KeyCode::Char('T') if pressed => Some(Command::StartTimer),
        KeyCode::Char('1') if pressed => Some(Command::SetSpeed(Speed::Slow)),
        KeyCode::Char('2') if pressed => Some(Command::SetSpeed(Speed::Normal)),
        KeyCode::Char('3') if pressed => Some(Command::SetSpeed(Speed::Fast)),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc if pressed => Some(Command::Quit),
        _ => None,
    }
}

pub fn map_prompt_key(key: &KeyEvent) -> Option<PromptKey> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    match key.code {
        KeyCode::Enter => Some(PromptKey::Commit),
        KeyCode::Esc => Some(PromptKey::Skip),
        KeyCode::Backspace => Some(PromptKey::Backspace),
        KeyCode::Char(ch) if !ch.is_control() => Some(PromptKey::Char(ch)),
        _ => None,
    }
}
