/// Notifications pushed to the UI after each mutating step.

use crate::geometry::Vec2;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Started,
    CoinCollected { index: usize, coins: u32 },
    EnemyStomped { index: usize },
    PlayerHurt { lives: u32 },
    Respawned { at: Vec2 },
    CheckpointReached { at: Vec2 },
    GameOver { score: u32 },
    LevelComplete { score: u32 },
}

impl GameEvent {
    /// HUD text and display time for events that show a notice.
    pub fn notice(&self) -> Option<(&'static str, f32)> {
        match self {
            GameEvent::Started => Some(("Good luck!", 1500.0)),
            GameEvent::CoinCollected { .. } => Some(("Coin!", 800.0)),
            GameEvent::EnemyStomped { .. } => Some(("Nice stomp!", 1000.0)),
            GameEvent::PlayerHurt { .. } => Some(("Ouch! Try again!", 1400.0)),
            GameEvent::CheckpointReached { .. } => Some(("Checkpoint!", 1200.0)),
            GameEvent::LevelComplete { .. } => Some(("You reached the flag!", 4000.0)),
            GameEvent::GameOver { .. } => Some(("Game over", 4000.0)),
            GameEvent::Respawned { .. } => None,
        }
    }
}
