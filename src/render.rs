use std::io::{self, Write};

use crossterm::{cursor, queue, style, terminal};

use crate::countdown::format_clock;
use crate::leaderboard::Entry;
use crate::piece::{color_of, Color};
use crate::session::{Snapshot, State};
use crate::speed::Speed;

const BOARD_TOP: u16 = 1;
const BOARD_LEFT: u16 = 1;
const PREVIEW_CELLS: u16 = 4;

/// Front-end state layered over the session snapshot.
pub struct Hud<'a> {
    pub leaderboard: &'a [Entry],
    /// Name typed so far when a high score is being recorded.
    pub name_prompt: Option<&'a str>,
    pub status: Option<&'a str>,
}

fn rgb(Color(r, g, b): Color) -> style::Color {
    style::Color::Rgb { r, g, b }
}

fn draw_block<W: Write>(w: &mut W, x: isize, y: isize, color: Color) -> io::Result<()> {
    queue!(
        w,
        cursor::MoveTo((BOARD_LEFT as isize + 1 + x * 2) as u16, (BOARD_TOP as isize + y) as u16),
        style::SetForegroundColor(rgb(color)),
        style::Print("██")
    )
}

fn centered<W: Write>(w: &mut W, width: usize, row: u16, msg: &str, color: style::Color) -> io::Result<()> {
    let x = BOARD_LEFT + 1 + (width * 2).saturating_sub(msg.chars().count()) as u16 / 2;
    queue!(w, cursor::MoveTo(x, row), style::SetForegroundColor(color), style::Print(msg))
}

pub fn draw<W: Write>(w: &mut W, snap: &Snapshot<'_>, hud: &Hud<'_>) -> io::Result<()> {
    let width = snap.board.width();
    let height = snap.board.height();
    queue!(w, cursor::Hide, terminal::Clear(terminal::ClearType::All))?;

    queue!(
        w,
        cursor::MoveTo(BOARD_LEFT, BOARD_TOP - 1),
        style::SetForegroundColor(style::Color::White),
        style::Print(format!("╔{}╗", "═".repeat(width * 2)))
    )?;
    for y in 0..height {
        queue!(w, cursor::MoveTo(BOARD_LEFT, BOARD_TOP + y as u16), style::Print("║"))?;
        for x in 0..width {
            let bg = if (x + y) % 2 == 0 { "·" } else { " " };
            queue!(w, style::SetForegroundColor(style::Color::DarkGrey), style::Print(bg.repeat(2)))?;
        }
        queue!(w, style::SetForegroundColor(style::Color::White), style::Print("║"))?;
    }
    queue!(
        w,
        cursor::MoveTo(BOARD_LEFT, BOARD_TOP + height as u16),
        style::Print(format!("╚{}╝", "═".repeat(width * 2)))
    )?;

    for (y, row) in snap.board.rows().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            if let Some(color) = color_of(cell) {
                draw_block(w, x as isize, y as isize, color)?;
            }
        }
    }
    if let Some(piece) = snap.active {
        for (x, y, cell) in piece.blocks().filter(|&(_, y, _)| y >= 0) {
            if let Some(color) = color_of(cell) {
                draw_block(w, x, y, color)?;
            }
        }
    }

    draw_panel(w, snap, hud, (width * 2 + 5) as u16)?;

    let mid = BOARD_TOP + (height / 2) as u16;
    match snap.state {
        State::Idle => {
            centered(w, width, mid - 1, "BLOCKFALL", style::Color::Yellow)?;
            centered(w, width, mid + 1, "Enter: play", style::Color::White)?;
            centered(w, width, mid + 2, "T: timed round", style::Color::White)?;
        }
        State::Paused => {
            centered(w, width, mid, "PAUSED", style::Color::Cyan)?;
            centered(w, width, mid + 1, "R: resume", style::Color::White)?;
        }
        State::GameOver => {
            centered(w, width, mid - 2, "GAME OVER", style::Color::Red)?;
            centered(w, width, mid - 1, &format!("Score {}", snap.score), style::Color::White)?;
            match hud.name_prompt {
                Some(name) => {
                    centered(w, width, mid + 1, "New high score!", style::Color::Yellow)?;
                    centered(w, width, mid + 2, &format!("Name: {name}_"), style::Color::White)?;
                }
                None => {
                    centered(w, width, mid + 1, "Enter: restart", style::Color::White)?;
                    centered(w, width, mid + 2, "T: timed round", style::Color::White)?;
                }
            }
        }
        State::Running => {}
    }

    if let Some(msg) = hud.status {
        centered(w, width, BOARD_TOP + height as u16 + 1, msg, style::Color::Green)?;
    }

    w.flush()
}

fn draw_panel<W: Write>(w: &mut W, snap: &Snapshot<'_>, hud: &Hud<'_>, panel_x: u16) -> io::Result<()> {
    queue!(w, cursor::MoveTo(panel_x, 1), style::SetForegroundColor(style::Color::White), style::Print("Score"))?;
    queue!(
        w,
        cursor::MoveTo(panel_x, 2),
        style::SetForegroundColor(style::Color::Yellow),
        style::Print(format!("{:0>8}", snap.score))
    )?;

    if let Some(secs) = snap.countdown {
        queue!(
            w,
            cursor::MoveTo(panel_x + 12, 1),
            style::SetForegroundColor(style::Color::White),
            style::Print("Time")
        )?;
        let color = if secs <= 30 { style::Color::Red } else { style::Color::Yellow };
        queue!(
            w,
            cursor::MoveTo(panel_x + 12, 2),
            style::SetForegroundColor(color),
            style::Print(format_clock(secs))
        )?;
    }

    queue!(w, cursor::MoveTo(panel_x, 4), style::SetForegroundColor(style::Color::White), style::Print("Next"))?;
    if let Some(next) = &snap.next {
        let off_x = (PREVIEW_CELLS.saturating_sub(next.width() as u16)) / 2;
        let off_y = (PREVIEW_CELLS.saturating_sub(next.height() as u16)) / 2;
        for (dx, dy, cell) in next.blocks() {
            if let Some(color) = color_of(cell) {
                queue!(
                    w,
                    cursor::MoveTo(panel_x + (off_x + dx as u16) * 2, 5 + off_y + dy as u16),
                    style::SetForegroundColor(rgb(color)),
                    style::Print("██")
                )?;
            }
        }
    }

    queue!(w, cursor::MoveTo(panel_x, 10), style::SetForegroundColor(style::Color::White), style::Print("Speed"))?;
    let mut x = panel_x;
    for (i, speed) in Speed::ALL.iter().enumerate() {
        let label = format!("{}:{speed}", i + 1);
        let color = if *speed == snap.speed { style::Color::Yellow } else { style::Color::DarkGrey };
        queue!(w, cursor::MoveTo(x, 11), style::SetForegroundColor(color), style::Print(&label))?;
        x += label.len() as u16 + 1;
    }

    queue!(w, cursor::MoveTo(panel_x, 13), style::SetForegroundColor(style::Color::White), style::Print("High Scores"))?;
    if hud.leaderboard.is_empty() {
        queue!(w, cursor::MoveTo(panel_x, 14), style::SetForegroundColor(style::Color::DarkGrey), style::Print("none yet"))?;
    }
    for (rank, entry) in hud.leaderboard.iter().enumerate() {
        queue!(
            w,
            cursor::MoveTo(panel_x, 14 + rank as u16),
            style::SetForegroundColor(style::Color::White),
            style::Print(format!("#{} {} - {}  {}", rank + 1, entry.name, entry.score, entry.date))
        )?;
    }

    let controls_y = 18;
    queue!(w, cursor::MoveTo(panel_x, controls_y), style::SetForegroundColor(style::Color::White), style::Print("Controls"))?;
    queue!(w, cursor::MoveTo(panel_x, controls_y + 1), style::Print("←/→: Move"))?;
    queue!(w, cursor::MoveTo(panel_x, controls_y + 2), style::Print("  ↑: Rotate"))?;
    queue!(w, cursor::MoveTo(panel_x, controls_y + 3), style::Print("  ↓: Soft Drop"))?;
    queue!(w, cursor::MoveTo(panel_x, controls_y + 4), style::Print("Spc: Pause"))?;
    queue!(w, cursor::MoveTo(panel_x, controls_y + 5), style::Print("  Q: Quit"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    #[test]
    fn draws_every_state_into_a_buffer() {
        let entries = vec![Entry::dated("ada", 40, "2024-05-01".to_owned())];
        let mut session = Session::new(10, 20, Some(4));
        let hud = Hud { leaderboard: &entries, name_prompt: None, status: Some("saved") };

        let mut out = Vec::new();
        draw(&mut out, &session.snapshot(), &hud).unwrap();
        assert!(String::from_utf8_lossy(&out).contains("BLOCKFALL"));

        session.start_timer_mode();
        let mut out = Vec::new();
        draw(&mut out, &session.snapshot(), &hud).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("10:00"));
        assert!(text.contains("#1 ada - 40"));

        session.end();
        let prompt = Hud { leaderboard: &entries, name_prompt: Some("bo"), status: None };
        let mut out = Vec::new();
        draw(&mut out, &session.snapshot(), &prompt).unwrap();
        assert!(String::from_utf8_lossy(&out).contains("Name: bo_"));
    }
}
