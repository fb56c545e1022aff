/// Shooter rendering.  The whole arena is on screen; there is no camera.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use side_scroller::shooter::{RaiderKind, ShooterState, ShooterStatus};

use super::{draw_banner, result_lines, View};

const C_STAR: Color = Color::DarkGrey;
const C_SHIP: Color = Color::Green;
const C_SHOT: Color = Color::Yellow;
const C_RAIDER_NORMAL: Color = Color::DarkYellow;
const C_RAIDER_FAST: Color = Color::Red;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

pub fn render<W: Write>(
    out: &mut W,
    state: &ShooterState,
    best: u32,
    (cols, rows): (u16, u16),
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let view = View::new(cols, rows, state.width, state.height, 0.0);

    out.queue(style::SetForegroundColor(C_STAR))?;
    for star in &state.stars {
        if let Some((c, r)) = view.cell(star.x, star.y) {
            out.queue(cursor::MoveTo(c, r))?;
            out.queue(Print(if star.size > 2.0 { "+" } else { "." }))?;
        }
    }

    for particle in &state.particles {
        // Sparks cool from yellow to dark red as they burn out.
        let color = match particle.life * 3 / particle.max_life.max(1) {
            2 => Color::Yellow,
            1 => Color::DarkYellow,
            _ => Color::DarkRed,
        };
        if let Some((c, r)) = view.cell(particle.x, particle.y) {
            out.queue(cursor::MoveTo(c, r))?;
            out.queue(style::SetForegroundColor(color))?;
            out.queue(Print("*"))?;
        }
    }

    for shot in &state.shots {
        view.fill(out, &shot.rect, '─', C_SHOT)?;
    }

    for raider in &state.raiders {
        let color = match raider.kind {
            RaiderKind::Normal => C_RAIDER_NORMAL,
            RaiderKind::Fast => C_RAIDER_FAST,
        };
        view.fill(out, &raider.rect, '◄', color)?;
    }

    if state.status == ShooterStatus::Running {
        view.fill(out, &state.player, '►', C_SHIP)?;
    }

    // HUD
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}  Hi:{:>6}", state.score, best.max(state.score))))?;
    let lives = format!("Lives:{}", "♥".repeat(state.lives as usize));
    out.queue(cursor::MoveTo(
        cols.saturating_sub(lives.chars().count() as u16 + 1),
        0,
    ))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives))?;

    out.queue(cursor::MoveTo(1, view.bottom_row()))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("Arrows / WASD : Move   SPACE : Fire   R : Restart   Q : Menu"))?;

    if state.status == ShooterStatus::GameOver {
        draw_banner(out, cols, rows, &result_lines("GAME  OVER", state.score, best))?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}
