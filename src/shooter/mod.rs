/// Horizontally scrolling shooter: entity types.
///
/// Positions are world units in a fixed arena; velocities are per frame.
/// Logic lives in `compute`.

pub mod compute;

use crate::geometry::Rect;

pub const ARENA_WIDTH: f32 = 1000.0;
pub const ARENA_HEIGHT: f32 = 600.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaiderKind {
    Normal,
    Fast,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShooterStatus {
    Running,
    GameOver,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShooterInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shot {
    pub rect: Rect,
    pub speed: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Raider {
    pub rect: Rect,
    pub speed: f32,
    pub kind: RaiderKind,
}

/// One spark of an explosion; fades out over `max_life` frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShooterEvent {
    Fired,
    RaiderDestroyed { points: u32 },
    PlayerHit { lives: u32 },
    GameOver { score: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShooterState {
    pub player: Rect,
    pub shots: Vec<Shot>,
    pub raiders: Vec<Raider>,
    pub particles: Vec<Particle>,
    pub stars: Vec<Star>,
    pub score: u32,
    pub lives: u32,
    pub status: ShooterStatus,
    /// Fire key state last frame; a shot needs a fresh press.
    pub trigger_held: bool,
    pub events: Vec<ShooterEvent>,
    pub frame: u64,
    pub width: f32,
    pub height: f32,
}
