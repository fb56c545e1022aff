/// Level authoring tables and the entity registry built from them.
///
/// A `LevelLayout` is immutable once loaded.  The registry shares it behind an
/// `Rc` and owns only the mutable copies: coins and enemies.  `reset` rebuilds
/// those from the layout, so platforms can never drift during a session.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::entities::{Coin, Enemy, Platform, PlatformKind};
use crate::error::ConfigError;
use crate::geometry::{Rect, Vec2};

// ── Authoring types ───────────────────────────────────────────────────────────

/// Upper bound on the coins a single row may expand to.
pub const MAX_ROW_COINS: usize = 1000;

/// A horizontal run of coins from `start` to `end` inclusive, `step` apart.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoinRow {
    pub start: f32,
    pub end: f32,
    pub step: f32,
    pub y: f32,
    pub size: f32,
}

impl CoinRow {
    /// Coins the row expands to, or 0 for a row with no valid span.
    pub fn count(&self) -> usize {
        if !(self.step > 0.0) {
            return 0;
        }
        let span = (self.end - self.start) / self.step;
        if !(span >= 0.0) || !span.is_finite() {
            return 0;
        }
        span.floor() as usize + 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub rect: Rect,
    pub min_x: f32,
    pub max_x: f32,
    pub speed: f32,
    pub direction: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub width: f32,
    /// Lowest visible world y; the fall-off check measures from here.
    pub world_bottom: f32,
    /// Player spawn position and size.
    pub spawn: Rect,
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub coins: Vec<Rect>,
    #[serde(default)]
    pub coin_rows: Vec<CoinRow>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    /// Standing positions recorded as respawn points once passed.
    #[serde(default)]
    pub checkpoints: Vec<Vec2>,
    #[serde(default)]
    pub goal: Option<Rect>,
}

fn ledge(x: f32, y: f32, width: f32, height: f32) -> Platform {
    Platform {
        rect: Rect::new(x, y, width, height),
        kind: PlatformKind::Ledge,
    }
}

fn ground(x: f32, y: f32, width: f32, height: f32) -> Platform {
    Platform {
        rect: Rect::new(x, y, width, height),
        kind: PlatformKind::Ground,
    }
}

impl LevelLayout {
    /// Short 2000-unit course with a continuous floor and loose coins.
    pub fn classic() -> Self {
        const FLOOR: f32 = 360.0;

        let mut platforms = vec![ground(0.0, FLOOR, 2000.0, 40.0)];
        for (x, y) in [
            (200.0, 300.0),
            (400.0, 250.0),
            (600.0, 200.0),
            (850.0, 300.0),
            (1050.0, 250.0),
            (1250.0, 200.0),
            (1450.0, 150.0),
            (1650.0, 300.0),
        ] {
            platforms.push(ledge(x, y, 150.0, 20.0));
        }

        let coins = [
            (250.0, 260.0),
            (450.0, 210.0),
            (650.0, 160.0),
            (900.0, 260.0),
            (1100.0, 210.0),
            (1300.0, 160.0),
            (1500.0, 110.0),
            (1700.0, 260.0),
        ]
        .into_iter()
        .map(|(x, y)| Rect::new(x, y, 20.0, 20.0))
        .collect();

        let enemies = [500.0, 900.0, 1300.0, 1600.0]
            .into_iter()
            .map(|x| EnemySpawn {
                rect: Rect::new(x, FLOOR - 30.0, 30.0, 30.0),
                min_x: 0.0,
                max_x: 2000.0,
                speed: 2.0,
                direction: -1.0,
            })
            .collect();

        LevelLayout {
            width: 2000.0,
            world_bottom: 400.0,
            spawn: Rect::new(100.0, 300.0, 30.0, 40.0),
            platforms,
            coins,
            coin_rows: Vec::new(),
            enemies,
            checkpoints: Vec::new(),
            goal: None,
        }
    }

    /// Long 5200-unit course with coin rows, patrolling enemies,
    /// checkpoints and a goal flag at the far end.
    pub fn checkpoint() -> Self {
        const FLOOR: f32 = 460.0;
        const LENGTH: f32 = 5200.0;

        let mut platforms = vec![ground(-400.0, FLOOR, LENGTH + 800.0, 80.0)];
        for (x, rise, width) in [
            (420.0, 140.0, 160.0),
            (780.0, 200.0, 120.0),
            (1040.0, 120.0, 180.0),
            (1480.0, 160.0, 140.0),
            (1880.0, 220.0, 120.0),
            (2200.0, 260.0, 140.0),
            (2560.0, 140.0, 280.0),
            (3040.0, 220.0, 200.0),
            (3400.0, 180.0, 120.0),
            (3720.0, 240.0, 160.0),
            (4060.0, 160.0, 180.0),
            (4440.0, 200.0, 160.0),
        ] {
            platforms.push(ledge(x, FLOOR - rise, width, 24.0));
        }

        let coin_rows = [
            (360.0, 520.0, 180.0),
            (760.0, 880.0, 240.0),
            (1180.0, 1360.0, 180.0),
            (2040.0, 2320.0, 300.0),
            (2680.0, 2880.0, 190.0),
            (3120.0, 3320.0, 260.0),
            (3580.0, 3800.0, 300.0),
            (4200.0, 4400.0, 220.0),
        ]
        .into_iter()
        .map(|(start, end, rise)| CoinRow {
            start,
            end,
            step: 40.0,
            y: FLOOR - rise,
            size: 24.0,
        })
        .collect();

        let enemies = [
            (680.0, 640.0, 820.0, 1.2, 1.0),
            (1620.0, 1580.0, 1760.0, 1.4, -1.0),
            (2480.0, 2440.0, 2640.0, 1.3, 1.0),
            (3320.0, 3280.0, 3480.0, 1.5, 1.0),
            (4120.0, 4080.0, 4280.0, 1.35, -1.0),
        ]
        .into_iter()
        .map(|(x, min_x, max_x, speed, direction)| EnemySpawn {
            rect: Rect::new(x, FLOOR - 36.0, 36.0, 36.0),
            min_x,
            max_x,
            speed,
            direction,
        })
        .collect();

        LevelLayout {
            width: LENGTH,
            world_bottom: 540.0,
            spawn: Rect::new(120.0, FLOOR - 48.0, 32.0, 48.0),
            platforms,
            coins: Vec::new(),
            coin_rows,
            enemies,
            checkpoints: vec![
                Vec2::new(1300.0, FLOOR - 48.0),
                Vec2::new(2300.0, FLOOR - 48.0),
                Vec2::new(3600.0, FLOOR - 48.0),
            ],
            goal: Some(Rect::new(LENGTH - 160.0, FLOOR - 160.0, 20.0, 160.0)),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let layout: LevelLayout = serde_json::from_str(text)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bad = |msg: String| Err(ConfigError::InvalidLayout(msg));
        let sized = |r: &Rect| r.width > 0.0 && r.height > 0.0;

        if !(self.width > 0.0) {
            return bad("level width must be positive".into());
        }
        if !sized(&self.spawn) {
            return bad("player spawn must have a positive size".into());
        }
        if let Some(i) = self.platforms.iter().position(|p| !sized(&p.rect)) {
            return bad(format!("platform {i} has a non-positive size"));
        }
        if let Some(i) = self.coins.iter().position(|c| !sized(c)) {
            return bad(format!("coin {i} has a non-positive size"));
        }
        for (i, row) in self.coin_rows.iter().enumerate() {
            let finite = [row.start, row.end, row.step, row.y, row.size]
                .iter()
                .all(|v| v.is_finite());
            if !finite || !(row.step > 0.0) || row.end < row.start || !(row.size > 0.0) {
                return bad(format!("coin row {i} needs start <= end and positive step/size"));
            }
            if row.count() > MAX_ROW_COINS {
                return bad(format!("coin row {i} expands to more than {MAX_ROW_COINS} coins"));
            }
        }
        for (i, e) in self.enemies.iter().enumerate() {
            if !sized(&e.rect) || e.speed < 0.0 {
                return bad(format!("enemy {i} needs a positive size and non-negative speed"));
            }
            if e.direction != 1.0 && e.direction != -1.0 {
                return bad(format!("enemy {i} direction must be 1 or -1"));
            }
            if e.min_x + e.rect.width > e.max_x {
                return bad(format!("enemy {i} patrol range is narrower than the enemy"));
            }
        }
        if let Some(goal) = &self.goal {
            if !sized(goal) {
                return bad("goal must have a positive size".into());
            }
        }
        Ok(())
    }

    /// Loose coins followed by every coin row, in authoring order.
    pub fn build_coins(&self) -> Vec<Coin> {
        let mut coins: Vec<Coin> = self
            .coins
            .iter()
            .map(|&rect| Coin { rect, collected: false })
            .collect();
        for row in &self.coin_rows {
            coins.extend((0..row.count().min(MAX_ROW_COINS)).map(|i| Coin {
                rect: Rect::new(row.start + i as f32 * row.step, row.y, row.size, row.size),
                collected: false,
            }));
        }
        coins
    }

    pub fn build_enemies(&self) -> Vec<Enemy> {
        self.enemies
            .iter()
            .map(|s| Enemy {
                rect: s.rect,
                speed: s.speed,
                direction: s.direction,
                min_x: s.min_x,
                max_x: s.max_x,
                alive: true,
            })
            .collect()
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Authoritative layout plus the live coins and enemies derived from it.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityRegistry {
    layout: Rc<LevelLayout>,
    pub coins: Vec<Coin>,
    pub enemies: Vec<Enemy>,
}

impl EntityRegistry {
    pub fn new(layout: LevelLayout) -> Self {
        let layout = Rc::new(layout);
        EntityRegistry {
            coins: layout.build_coins(),
            enemies: layout.build_enemies(),
            layout,
        }
    }

    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.layout.platforms
    }

    /// Live enemies alongside the (read-only) platforms they walk on.
    pub fn enemies_with_platforms(&mut self) -> (&[Platform], &mut [Enemy]) {
        (&self.layout.platforms, &mut self.enemies)
    }

    /// Every coin uncollected; every enemy alive at its start position and
    /// facing its start direction.
    pub fn reset(&mut self) {
        self.coins = self.layout.build_coins();
        self.enemies = self.layout.build_enemies();
        log::debug!(
            "registry reset: {} coins, {} enemies",
            self.coins.len(),
            self.enemies.len()
        );
    }
}
