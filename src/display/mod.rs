/// Rendering layer: all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; world units are scaled down to
/// terminal cells and drawn relative to the camera.

pub mod shooter;

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use side_scroller::config::{DamagePolicy, Variant};
use side_scroller::entities::{GameState, GameStatus, PlatformKind};
use side_scroller::geometry::Rect;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_COINS: Color = Color::DarkYellow;
const C_GROUND: Color = Color::DarkGreen;
const C_LEDGE: Color = Color::DarkYellow;
const C_COIN: Color = Color::Yellow;
const C_ENEMY: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_GOAL: Color = Color::Magenta;
const C_NOTICE: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

/// Rows reserved above (HUD) and below (hint) the play area.
const HUD_ROWS: u16 = 1;
const HINT_ROWS: u16 = 1;

// ── World → cell mapping ──────────────────────────────────────────────────────

/// Maps a `viewport_width × viewport_height` window of the world onto the
/// terminal's play rows.
pub(crate) struct View {
    cols: u16,
    rows: u16,
    scale_x: f32,
    scale_y: f32,
    offset_x: f32,
}

impl View {
    pub(crate) fn new(cols: u16, rows: u16, world_w: f32, world_h: f32, offset_x: f32) -> Self {
        let rows = rows.saturating_sub(HUD_ROWS + HINT_ROWS).max(1);
        let cols = cols.max(1);
        View {
            cols,
            rows,
            scale_x: world_w / cols as f32,
            scale_y: world_h / rows as f32,
            offset_x,
        }
    }

    fn col(&self, x: f32) -> f32 {
        (x - self.offset_x) / self.scale_x
    }

    fn row(&self, y: f32) -> f32 {
        y / self.scale_y
    }

    /// Terminal cell containing a world point, if on screen.
    pub(crate) fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let (c, r) = (self.col(x).floor(), self.row(y).floor());
        if c < 0.0 || r < 0.0 || c >= self.cols as f32 || r >= self.rows as f32 {
            return None;
        }
        Some((c as u16, r as u16 + HUD_ROWS))
    }

    /// Fill every cell a rectangle touches.  Small rectangles still get one cell.
    pub(crate) fn fill<W: Write>(
        &self,
        out: &mut W,
        rect: &Rect,
        glyph: char,
        color: Color,
    ) -> std::io::Result<()> {
        let c0 = self.col(rect.x).floor().max(0.0);
        let c1 = self.col(rect.right()).ceil().min(self.cols as f32);
        let r0 = self.row(rect.y).floor().max(0.0);
        let r1 = self.row(rect.bottom()).ceil().min(self.rows as f32);
        if c1 <= c0 || r1 <= r0 {
            return Ok(());
        }

        let (c0, c1, r0, r1) = (c0 as u16, c1 as u16, r0 as u16, r1 as u16);
        let line: String = std::iter::repeat(glyph).take((c1 - c0) as usize).collect();

        out.queue(style::SetForegroundColor(color))?;
        for row in r0..r1 {
            out.queue(cursor::MoveTo(c0, row + HUD_ROWS))?;
            out.queue(Print(&line))?;
        }
        Ok(())
    }

    pub(crate) fn bottom_row(&self) -> u16 {
        self.rows + HUD_ROWS
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete platformer frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    variant: Variant,
    best: u32,
    (cols, rows): (u16, u16),
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let view = View::new(
        cols,
        rows,
        state.rules.viewport_width,
        state.rules.viewport_height,
        state.camera.x,
    );

    draw_world(out, &view, state)?;
    draw_hud(out, state, variant, best, cols)?;
    draw_notice(out, state, cols)?;
    draw_controls_hint(out, &view)?;

    match state.session.status {
        GameStatus::Ready => draw_banner(out, cols, rows, &title_lines(variant))?,
        GameStatus::GameOver => {
            draw_banner(out, cols, rows, &result_lines("GAME  OVER", state.session.score, best))?
        }
        GameStatus::LevelComplete => draw_banner(
            out,
            cols,
            rows,
            &result_lines("LEVEL CLEAR", state.session.score, best),
        )?,
        GameStatus::Running => {}
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── World ─────────────────────────────────────────────────────────────────────

fn draw_world<W: Write>(out: &mut W, view: &View, state: &GameState) -> std::io::Result<()> {
    for platform in state.world.platforms() {
        let (glyph, color) = match platform.kind {
            PlatformKind::Ground => ('▓', C_GROUND),
            PlatformKind::Ledge => ('█', C_LEDGE),
        };
        view.fill(out, &platform.rect, glyph, color)?;
    }

    if let Some(goal) = &state.world.layout().goal {
        view.fill(out, goal, '▌', C_GOAL)?;
    }

    out.queue(style::SetForegroundColor(C_COIN))?;
    for coin in state.world.coins.iter().filter(|c| !c.collected) {
        let r = &coin.rect;
        if let Some((c, row)) = view.cell(r.x + r.width / 2.0, r.y + r.height / 2.0) {
            out.queue(cursor::MoveTo(c, row))?;
            out.queue(Print("o"))?;
        }
    }

    for enemy in state.world.enemies.iter().filter(|e| e.alive) {
        view.fill(out, &enemy.rect, '▒', C_ENEMY)?;
    }

    view.fill(out, &state.player.rect(), '█', C_PLAYER)?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    state: &GameState,
    variant: Variant,
    best: u32,
    cols: u16,
) -> std::io::Result<()> {
    let s = &state.session;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    if best > 0 {
        out.queue(Print(format!("Score:{:>6}  Hi:{:>6}", s.score, best)))?;
    } else {
        out.queue(Print(format!("Score:{:>6}", s.score)))?;
    }

    let tag = format!("[ {} ]", variant.label().to_uppercase());
    out.queue(cursor::MoveTo((cols / 2).saturating_sub(tag.len() as u16 / 2), 0))?;
    out.queue(style::SetForegroundColor(Color::Green))?;
    out.queue(Print(&tag))?;

    let coins = format!("Coins:{:>3} ", s.coins);
    let lives = match state.rules.damage {
        DamagePolicy::Lives => format!("Lives:{}", "♥".repeat(s.lives as usize)),
        DamagePolicy::Checkpoint => String::new(),
    };
    let width = (coins.chars().count() + lives.chars().count()) as u16;
    out.queue(cursor::MoveTo(cols.saturating_sub(width + 1), 0))?;
    out.queue(style::SetForegroundColor(C_HUD_COINS))?;
    out.queue(Print(&coins))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives))?;
    Ok(())
}

fn draw_notice<W: Write>(out: &mut W, state: &GameState, cols: u16) -> std::io::Result<()> {
    if let Some(notice) = &state.session.notice {
        let col = (cols / 2).saturating_sub(notice.text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, HUD_ROWS + 1))?;
        out.queue(style::SetForegroundColor(C_NOTICE))?;
        out.queue(Print(&notice.text))?;
    }
    Ok(())
}

fn draw_controls_hint<W: Write>(out: &mut W, view: &View) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.bottom_row()))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE / W / ↑ : Jump   R : Restart   Q : Menu"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn title_lines(variant: Variant) -> Vec<(String, Color)> {
    vec![
        ("╔════════════════════╗".to_string(), Color::Cyan),
        (format!("║ {:^18} ║", variant.label().to_uppercase()), Color::Cyan),
        ("╚════════════════════╝".to_string(), Color::Cyan),
        ("SPACE / ENTER - Start".to_string(), Color::White),
    ]
}

pub(crate) fn result_lines(title: &str, score: u32, best: u32) -> Vec<(String, Color)> {
    let new_best = score >= best && score > 0;
    let best_line = if new_best {
        format!("★ NEW BEST: {:>6} ★", score)
    } else {
        format!("Best Score:  {:>6}", best.max(score))
    };
    vec![
        ("╔════════════════════╗".to_string(), Color::Red),
        (format!("║ {:^18} ║", title), Color::Red),
        ("╚════════════════════╝".to_string(), Color::Red),
        (format!("Final Score: {:>6}", score), Color::Yellow),
        (best_line, if new_best { Color::Yellow } else { Color::DarkGrey }),
        ("R - Play Again  Q - Menu".to_string(), Color::White),
    ]
}

/// Centred block of lines in the middle of the screen.
pub(crate) fn draw_banner<W: Write>(
    out: &mut W,
    cols: u16,
    rows: u16,
    lines: &[(String, Color)],
) -> std::io::Result<()> {
    let cx = cols / 2;
    let start_row = (rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (text, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(text))?;
    }
    Ok(())
}
