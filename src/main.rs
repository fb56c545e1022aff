mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;

use side_scroller::clock::{LoopControl, Ticker};
use side_scroller::compute::{advance, init_state, restart, start};
use side_scroller::config::{Settings, Variant};
use side_scroller::entities::{GameState, GameStatus, InputState};
use side_scroller::events::GameEvent;
use side_scroller::scores::{Mode, ScoreStore, Scoreboard};
use side_scroller::shooter::{self, ShooterEvent, ShooterInput};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

const LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a')];
const RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d')];
const UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w')];
const DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s')];
const JUMP: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Up, KeyCode::Char('w')];
const FIRE: &[KeyCode] = &[KeyCode::Char(' ')];

// ── Keyboard state ────────────────────────────────────────────────────────────

/// One-shot commands recognised while a round is on screen.
enum Command {
    Menu,
    Exit,
    Restart,
}

/// Maps each held key → the frame it was last seen (press or repeat), plus
/// the keys that went down during the current frame.
///
/// * Keyboard-enhancement terminals send `Release` and keys are dropped at once.
/// * Classic terminals only send `Press`; keys expire after `HOLD_WINDOW`
///   frames of silence.
#[derive(Default)]
struct KeyTracker {
    key_frame: HashMap<KeyCode, u64>,
    pressed: Vec<KeyCode>,
    frame: u64,
}

fn normalise(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

impl KeyTracker {
    /// Drain all pending input events (non-blocking).
    fn poll(&mut self, rx: &mpsc::Receiver<Event>) -> Option<Command> {
        self.frame += 1;
        self.pressed.clear();
        let mut command = None;

        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            let code = normalise(code);
            match kind {
                KeyEventKind::Press => {
                    self.key_frame.insert(code, self.frame);
                    self.pressed.push(code);
                    match code {
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            command = Some(Command::Exit);
                        }
                        KeyCode::Char('q') | KeyCode::Esc => command = Some(Command::Menu),
                        KeyCode::Char('r') => command = command.or(Some(Command::Restart)),
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    self.key_frame.insert(code, self.frame);
                }
                KeyEventKind::Release => {
                    self.key_frame.remove(&code);
                }
            }
        }
        command
    }

    fn held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|k| {
            self.key_frame
                .get(k)
                .map(|&last| self.frame.saturating_sub(last) <= HOLD_WINDOW)
                .unwrap_or(false)
        })
    }

    fn pressed(&self, keys: &[KeyCode]) -> bool {
        self.pressed.iter().any(|k| keys.contains(k))
    }
}

// ── Logging & scores ──────────────────────────────────────────────────────────

/// The terminal is in raw alternate-screen mode, so logs go to a file.  If it
/// cannot be created the game runs without logging.
fn init_logging(path: PathBuf) {
    let Ok(file) = File::create(&path) else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    log::info!("logging to {}", path.display());
}

/// Keep a new best score.  A failed write is logged and otherwise ignored.
fn record_score(store: &ScoreStore, board: &mut Scoreboard, mode: Mode, score: u32) {
    if !board.record(mode, score) {
        return;
    }
    log::info!("new best for {:?}: {}", mode, score);
    if let Err(err) = store.save(board) {
        log::warn!("could not save scores to {}: {}", store.path().display(), err);
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(Mode),
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    board: &Scoreboard,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  SIDE  SCROLLER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(16), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select a game:"))?;

    let options: &[(&str, &str, Color, &str, Mode)] = &[
        ("1", "Classic   ", Color::Green, "sliding stops, 3 lives", Mode::Platformer(Variant::Classic)),
        ("2", "Checkpoint", Color::Yellow, "long course, reach the flag", Mode::Platformer(Variant::Checkpoint)),
        ("3", "Shooter   ", Color::Red, "blast the raiders", Mode::Shooter),
    ];

    for (i, (key, label, color, desc, mode)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(16), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(label))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" — {:<28} best {:>6}", desc, board.best(*mode))))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(16), cy + 4))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        let Ok(ev) = rx.recv() else {
            return Ok(MenuResult::Quit); // input thread gone
        };
        if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = ev {
            match normalise(code) {
                KeyCode::Char('1') => return Ok(MenuResult::Start(Mode::Platformer(Variant::Classic))),
                KeyCode::Char('2') => {
                    return Ok(MenuResult::Start(Mode::Platformer(Variant::Checkpoint)))
                }
                KeyCode::Char('3') => return Ok(MenuResult::Start(Mode::Shooter)),
                KeyCode::Char('q') | KeyCode::Esc => return Ok(MenuResult::Quit),
                _ => {}
            }
        }
    }
}

// ── Platformer loop ───────────────────────────────────────────────────────────

fn round_over(status: GameStatus) -> bool {
    matches!(status, GameStatus::GameOver | GameStatus::LevelComplete)
}

/// Returns `true` → quit program,  `false` → back to menu.
fn platformer_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    variant: Variant,
    state: &mut GameState,
    store: &ScoreStore,
    board: &mut Scoreboard,
) -> std::io::Result<bool> {
    let mode = Mode::Platformer(variant);
    let mut keys = KeyTracker::default();
    let mut ticker = Ticker::new(FRAME, state.rules.max_frame_ms);
    let mut exit = false;

    ticker.run(|dt| -> std::io::Result<LoopControl> {
        match keys.poll(rx) {
            Some(Command::Exit) => {
                exit = true;
                return Ok(LoopControl::Stop);
            }
            Some(Command::Menu) => return Ok(LoopControl::Stop),
            Some(Command::Restart) if round_over(state.session.status) => {
                *state = restart(state);
            }
            _ => {}
        }

        let input = InputState {
            left: keys.held(LEFT),
            right: keys.held(RIGHT),
            jump: keys.pressed(JUMP),
        };

        if state.session.status == GameStatus::Ready {
            if input.jump || keys.pressed(&[KeyCode::Enter]) {
                *state = start(state);
            }
        } else {
            *state = advance(state, &input, dt);
        }

        for event in &state.events {
            match event {
                GameEvent::GameOver { score } | GameEvent::LevelComplete { score } => {
                    log::info!("{} round ended: {:?}", variant.label(), event);
                    record_score(store, board, mode, *score);
                }
                other => log::debug!("{:?}", other),
            }
        }

        display::render(out, state, variant, board.best(mode), terminal::size()?)?;
        Ok(LoopControl::Continue)
    })?;

    // Leaving mid-run still counts toward the best score.
    record_score(store, board, mode, state.session.score);
    Ok(exit)
}

// ── Shooter loop ──────────────────────────────────────────────────────────────

fn shooter_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    store: &ScoreStore,
    board: &mut Scoreboard,
) -> std::io::Result<bool> {
    let mut rng = thread_rng();
    let mut state = shooter::compute::init_state(
        shooter::ARENA_WIDTH,
        shooter::ARENA_HEIGHT,
        &mut rng,
    );
    let mut keys = KeyTracker::default();
    let mut ticker = Ticker::new(FRAME, 32.0);
    let mut exit = false;

    ticker.run(|_dt| -> std::io::Result<LoopControl> {
        match keys.poll(rx) {
            Some(Command::Exit) => {
                exit = true;
                return Ok(LoopControl::Stop);
            }
            Some(Command::Menu) => return Ok(LoopControl::Stop),
            Some(Command::Restart) => {
                record_score(store, board, Mode::Shooter, state.score);
                state = shooter::compute::restart(&state);
            }
            None => {}
        }

        let input = ShooterInput {
            up: keys.held(UP),
            down: keys.held(DOWN),
            left: keys.held(LEFT),
            right: keys.held(RIGHT),
            fire: keys.held(FIRE),
        };
        state = shooter::compute::tick(&state, &input, &mut rng);

        for event in &state.events {
            if let ShooterEvent::GameOver { score } = event {
                log::info!("shooter round ended with score {}", score);
                record_score(store, board, Mode::Shooter, *score);
            }
        }
        display::shooter::render(out, &state, board.best(Mode::Shooter), terminal::size()?)?;
        Ok(LoopControl::Continue)
    })?;

    record_score(store, board, Mode::Shooter, state.score);
    Ok(exit)
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    let settings = Settings::from_env();
    init_logging(
        settings
            .as_ref()
            .ok()
            .and_then(|s| s.log_file.clone())
            .unwrap_or_else(|| PathBuf::from("side_scroller.log")),
    );
    let settings = settings.unwrap_or_else(|err| {
        log::warn!("ignoring settings file: {}", err);
        Settings::default()
    });

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &settings);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(err) = &result {
        log::error!("terminal error: {}", err);
    }
    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    settings: &Settings,
) -> std::io::Result<()> {
    let store = ScoreStore::new(
        settings
            .scores_file
            .clone()
            .unwrap_or_else(ScoreStore::default_path),
    );
    let mut board = store.load().unwrap_or_else(|err| {
        log::warn!("could not read scores from {}: {}", store.path().display(), err);
        Scoreboard::default()
    });

    loop {
        let quit = match show_menu(out, rx, &board)? {
            MenuResult::Quit => break,
            MenuResult::Start(Mode::Shooter) => {
                log::info!("starting shooter");
                shooter_loop(out, rx, &store, &mut board)?
            }
            MenuResult::Start(Mode::Platformer(variant)) => {
                let layout = settings.layout_for(variant).unwrap_or_else(|err| {
                    log::warn!("using built-in {} level: {}", variant.label(), err);
                    variant.layout()
                });
                log::info!("starting {} platformer", variant.label());
                let mut state = init_state(settings.rules_for(variant), layout);
                platformer_loop(out, rx, variant, &mut state, &store, &mut board)?
            }
        };

        if quit {
            break;
        }
        // Otherwise loop back to the menu
    }
    Ok(())
}
