/// Platformer entity and session types: pure data, no logic.

use serde::{Deserialize, Serialize};

use crate::config::Rules;
use crate::events::GameEvent;
use crate::geometry::{Rect, Vec2};
use crate::level::EntityRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// Built and drawn, waiting for the player to start.
    Ready,
    Running,
    GameOver,
    LevelComplete,
}

/// Key state sampled once per frame by the input collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    /// True on the frame the jump key went down.
    pub jump: bool,
}

// ── Static geometry ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    Ground,
    Ledge,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

// ── Dynamic entities ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
    pub grounded: bool,
    /// Position before this frame's integration; decides collision sides.
    pub prev_x: f32,
    pub prev_y: f32,
}

impl Player {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Player {
            x,
            y,
            width,
            height,
            vx: 0.0,
            vy: 0.0,
            grounded: false,
            prev_x: x,
            prev_y: y,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn prev_bottom(&self) -> f32 {
        self.prev_y + self.height
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Coin {
    pub rect: Rect,
    pub collected: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub rect: Rect,
    pub speed: f32,
    /// +1.0 walks right, -1.0 walks left.
    pub direction: f32,
    pub min_x: f32,
    pub max_x: f32,
    pub alive: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Camera {
    pub x: f32,
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Short-lived message for the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub text: String,
    pub remaining_ms: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub score: u32,
    pub lives: u32,
    pub coins: u32,
    pub status: GameStatus,
    /// Where the player reappears after damage.
    pub respawn: Vec2,
    pub notice: Option<Notice>,
}

/// The entire platformer state.  Cloneable so `advance` can return a new
/// copy without mutating the caller's value.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub rules: Rules,
    pub world: EntityRegistry,
    pub player: Player,
    pub camera: Camera,
    pub session: Session,
    /// Events raised by the most recent `advance`, oldest first.
    pub events: Vec<GameEvent>,
    pub frame: u64,
    pub elapsed_ms: f32,
}
