/// Tunable rules for the platformer and the on-disk settings file.
///
/// Each `Variant` ships a preset `Rules` value.  A settings file may replace
/// either preset wholesale; replacements are validated before use.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::level::LevelLayout;

/// Environment variable naming the JSON settings file.
pub const SETTINGS_ENV: &str = "SIDE_SCROLLER_CONFIG";

// ── Policies ──────────────────────────────────────────────────────────────────

/// How held direction keys translate into horizontal velocity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HorizontalControl {
    /// Velocity is multiplied by `factor` on frames with no direction held,
    /// so the player slides to a stop.
    Friction { factor: f32 },
    /// Velocity is recomputed from the keys every frame: instant stops.
    Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CameraFollow {
    /// Jump straight to the clamped follow target.
    Snap,
    /// Close `factor` of the remaining distance each frame.
    Smooth { factor: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamagePolicy {
    /// Lose a life and respawn at the level spawn; zero lives ends the session.
    Lives,
    /// Respawn at the last checkpoint reached; lives are never consumed.
    Checkpoint,
}

/// Bonus scoring for horizontal progress.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceScore {
    pub per_unit: f32,
    pub per_coin: u32,
}

// ── Rules ─────────────────────────────────────────────────────────────────────

/// Per-frame physics constants.  Velocities are in world units per frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Physics {
    pub gravity: f32,
    pub horizontal: HorizontalControl,
    pub player_speed: f32,
    pub jump_power: f32,
    /// Vertical velocity given to the player after a stomp (negative = up).
    pub stomp_bounce: f32,
    /// Falling this far below `world_bottom` counts as damage.
    pub fall_margin: f32,
    /// Vertical window around an enemy's feet searched for supporting ground.
    pub ground_probe: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    pub physics: Physics,
    pub camera: CameraFollow,
    /// Fraction of the viewport kept to the left of the player.
    pub follow_fraction: f32,
    pub damage: DamagePolicy,
    pub starting_lives: u32,
    pub coin_score: u32,
    pub stomp_score: u32,
    pub distance_score: Option<DistanceScore>,
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Upper bound applied to the frame delta before it reaches the step.
    pub max_frame_ms: f32,
}

impl Rules {
    /// Friction-based movement, snap camera, three lives.
    pub fn classic() -> Self {
        Rules {
            physics: Physics {
                gravity: 0.8,
                horizontal: HorizontalControl::Friction { factor: 0.9 },
                player_speed: 5.0,
                jump_power: 15.0,
                stomp_bounce: -5.0,
                fall_margin: 300.0,
                ground_probe: 5.0,
            },
            camera: CameraFollow::Snap,
            follow_fraction: 0.5,
            damage: DamagePolicy::Lives,
            starting_lives: 3,
            coin_score: 100,
            stomp_score: 200,
            distance_score: None,
            viewport_width: 800.0,
            viewport_height: 400.0,
            max_frame_ms: 32.0,
        }
    }

    /// Instant movement, smoothed camera, checkpoint respawns.
    pub fn checkpoint() -> Self {
        Rules {
            physics: Physics {
                gravity: 0.65,
                horizontal: HorizontalControl::Instant,
                player_speed: 4.0,
                jump_power: 13.0,
                stomp_bounce: -10.0,
                fall_margin: 300.0,
                ground_probe: 5.0,
            },
            camera: CameraFollow::Smooth { factor: 0.12 },
            follow_fraction: 0.35,
            damage: DamagePolicy::Checkpoint,
            starting_lives: 3,
            coin_score: 100,
            stomp_score: 200,
            distance_score: Some(DistanceScore {
                per_unit: 0.5,
                per_coin: 200,
            }),
            viewport_width: 960.0,
            viewport_height: 540.0,
            max_frame_ms: 32.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bad = |msg: &str| Err(ConfigError::InvalidRules(msg.to_string()));
        let p = &self.physics;
        if !(p.gravity > 0.0) {
            return bad("gravity must be positive");
        }
        if let HorizontalControl::Friction { factor } = p.horizontal {
            if !(factor > 0.0 && factor < 1.0) {
                return bad("friction factor must lie in (0, 1)");
            }
        }
        if let CameraFollow::Smooth { factor } = self.camera {
            if !(factor > 0.0 && factor <= 1.0) {
                return bad("camera smoothing factor must lie in (0, 1]");
            }
        }
        if !(0.0..=1.0).contains(&self.follow_fraction) {
            return bad("follow_fraction must lie in [0, 1]");
        }
        if p.player_speed <= 0.0 || p.jump_power <= 0.0 {
            return bad("player speed and jump power must be positive");
        }
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return bad("viewport must have a positive size");
        }
        if !(self.max_frame_ms > 0.0) {
            return bad("max_frame_ms must be positive");
        }
        if self.starting_lives == 0 {
            return bad("starting_lives must be at least 1");
        }
        Ok(())
    }
}

// ── Variants ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Classic,
    Checkpoint,
}

impl Variant {
    pub fn label(&self) -> &'static str {
        match self {
            Variant::Classic => "Classic",
            Variant::Checkpoint => "Checkpoint",
        }
    }

    pub fn rules(&self) -> Rules {
        match self {
            Variant::Classic => Rules::classic(),
            Variant::Checkpoint => Rules::checkpoint(),
        }
    }

    pub fn layout(&self) -> LevelLayout {
        match self {
            Variant::Classic => LevelLayout::classic(),
            Variant::Checkpoint => LevelLayout::checkpoint(),
        }
    }
}

// ── Settings file ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_file: Option<PathBuf>,
    pub scores_file: Option<PathBuf>,
    pub classic_rules: Option<Rules>,
    pub checkpoint_rules: Option<Rules>,
    pub classic_level: Option<PathBuf>,
    pub checkpoint_level: Option<PathBuf>,
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(text)?;
        for rules in [&settings.classic_rules, &settings.checkpoint_rules]
            .into_iter()
            .flatten()
        {
            rules.validate()?;
        }
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read_file(path)?;
        Self::from_json(&text)
    }

    /// Settings named by `SIDE_SCROLLER_CONFIG`, or defaults when it is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(SETTINGS_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Settings::default()),
        }
    }

    pub fn rules_for(&self, variant: Variant) -> Rules {
        let custom = match variant {
            Variant::Classic => self.classic_rules,
            Variant::Checkpoint => self.checkpoint_rules,
        };
        custom.unwrap_or_else(|| variant.rules())
    }

    /// The level file configured for `variant`, or its built-in layout.
    pub fn layout_for(&self, variant: Variant) -> Result<LevelLayout, ConfigError> {
        let path = match variant {
            Variant::Classic => &self.classic_level,
            Variant::Checkpoint => &self.checkpoint_level,
        };
        match path {
            Some(path) => LevelLayout::from_json(&read_file(path)?),
            None => Ok(variant.layout()),
        }
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
