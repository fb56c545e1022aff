/// Shooter game logic.
///
/// Same shape as the platformer: functions take the current state and return
/// a new one.  All randomness comes through the injected `Rng`, so a seeded
/// generator makes every run reproducible.

use rand::Rng;

use super::{
    Particle, Raider, RaiderKind, ShooterEvent, ShooterInput, ShooterState, ShooterStatus, Shot,
    Star,
};
use crate::geometry::{clamp, Rect};

pub const PLAYER_SPEED: f32 = 5.0;
pub const SHOT_SPEED: f32 = 8.0;
pub const RAIDER_SPEED: f32 = 3.0;
pub const SPAWN_CHANCE: f64 = 0.02;
pub const STARTING_LIVES: u32 = 3;
const STAR_COUNT: usize = 100;
const SPARKS_PER_EXPLOSION: usize = 10;
const SPARK_LIFE: u32 = 30;

fn points_for(kind: RaiderKind) -> u32 {
    match kind {
        RaiderKind::Normal => 10,
        RaiderKind::Fast => 20,
    }
}

fn spawn_rect(height: f32) -> Rect {
    Rect::new(50.0, height / 2.0, 40.0, 30.0)
}

// ── Constructors ─────────────────────────────────────────────────────────────

pub fn init_state(width: f32, height: f32, rng: &mut impl Rng) -> ShooterState {
    let stars = (0..STAR_COUNT)
        .map(|_| Star {
            x: rng.gen_range(0.0..width),
            y: rng.gen_range(0.0..height),
            size: rng.gen_range(1.0..3.0),
            speed: rng.gen_range(1.0..3.0),
        })
        .collect();

    ShooterState {
        player: spawn_rect(height),
        shots: Vec::new(),
        raiders: Vec::new(),
        particles: Vec::new(),
        stars,
        score: 0,
        lives: STARTING_LIVES,
        status: ShooterStatus::Running,
        trigger_held: false,
        events: Vec::new(),
        frame: 0,
        width,
        height,
    }
}

/// Fresh round in the same arena; the star field carries over.
pub fn restart(state: &ShooterState) -> ShooterState {
    ShooterState {
        player: spawn_rect(state.height),
        shots: Vec::new(),
        raiders: Vec::new(),
        particles: Vec::new(),
        score: 0,
        lives: STARTING_LIVES,
        status: ShooterStatus::Running,
        trigger_held: false,
        events: Vec::new(),
        frame: 0,
        ..state.clone()
    }
}

// ── Input-driven transitions (pure) ─────────────────────────────────────────

pub fn move_player(state: &ShooterState, input: &ShooterInput) -> ShooterState {
    let mut player = state.player;
    if input.up {
        player.y -= PLAYER_SPEED;
    }
    if input.down {
        player.y += PLAYER_SPEED;
    }
    if input.left {
        player.x -= PLAYER_SPEED;
    }
    if input.right {
        player.x += PLAYER_SPEED;
    }
    player.x = clamp(player.x, 0.0, state.width - player.width);
    player.y = clamp(player.y, 0.0, state.height - player.height);

    ShooterState {
        player,
        ..state.clone()
    }
}

/// One shot per press: holding the trigger does not auto-fire.
pub fn pull_trigger(state: &ShooterState, fire: bool) -> ShooterState {
    let mut next = state.clone();
    if fire && !state.trigger_held {
        let p = &state.player;
        next.shots.push(Shot {
            rect: Rect::new(p.right(), p.y + p.height / 2.0, 10.0, 4.0),
            speed: SHOT_SPEED,
        });
        next.events.push(ShooterEvent::Fired);
    }
    next.trigger_held = fire;
    next
}

// ── Per-frame tick ──────────────────────────────────────────────────────────

fn explode(particles: &mut Vec<Particle>, x: f32, y: f32, rng: &mut impl Rng) {
    for _ in 0..SPARKS_PER_EXPLOSION {
        particles.push(Particle {
            x,
            y,
            vx: rng.gen_range(-4.0..4.0),
            vy: rng.gen_range(-4.0..4.0),
            life: SPARK_LIFE,
            max_life: SPARK_LIFE,
            size: rng.gen_range(2.0..5.0),
        });
    }
}

fn centre(r: &Rect) -> (f32, f32) {
    (r.x + r.width / 2.0, r.y + r.height / 2.0)
}

/// Advance one frame.  Once the round is over the arena is frozen and the
/// returned state carries no events.
pub fn tick(state: &ShooterState, input: &ShooterInput, rng: &mut impl Rng) -> ShooterState {
    if state.status == ShooterStatus::GameOver {
        return ShooterState {
            events: Vec::new(),
            ..state.clone()
        };
    }

    let mut next = ShooterState {
        events: Vec::new(),
        frame: state.frame + 1,
        ..state.clone()
    };

    // ── 1. Player ────────────────────────────────────────────────────────────
    next = move_player(&next, input);
    next = pull_trigger(&next, input.fire);

    // ── 2. Spawn ─────────────────────────────────────────────────────────────
    if rng.gen_bool(SPAWN_CHANCE) {
        let kind = if rng.gen_bool(0.3) {
            RaiderKind::Fast
        } else {
            RaiderKind::Normal
        };
        next.raiders.push(Raider {
            rect: Rect::new(next.width, rng.gen_range(0.0..(next.height - 40.0)), 35.0, 25.0),
            speed: RAIDER_SPEED + rng.gen_range(0.0..2.0),
            kind,
        });
    }

    // ── 3. Shots, raiders, particles, stars ──────────────────────────────────
    let width = next.width;
    next.shots = next
        .shots
        .into_iter()
        .map(|s| Shot {
            rect: Rect { x: s.rect.x + s.speed, ..s.rect },
            ..s
        })
        .filter(|s| s.rect.x <= width)
        .collect();

    next.raiders = next
        .raiders
        .into_iter()
        .map(|r| Raider {
            rect: Rect { x: r.rect.x - r.speed, ..r.rect },
            ..r
        })
        .filter(|r| r.rect.right() >= 0.0)
        .collect();

    next.particles = next
        .particles
        .into_iter()
        .filter_map(|p| {
            let life = p.life.saturating_sub(1);
            (life > 0).then(|| Particle {
                x: p.x + p.vx,
                y: p.y + p.vy,
                life,
                ..p
            })
        })
        .collect();

    let height = next.height;
    for star in &mut next.stars {
        star.x -= star.speed;
        if star.x < 0.0 {
            star.x = width;
            star.y = rng.gen_range(0.0..height);
        }
    }

    // ── 4. Collision: shots ↔ raiders ────────────────────────────────────────
    let mut downed: Vec<usize> = Vec::new();
    let mut spent: Vec<usize> = Vec::new();
    for (si, shot) in next.shots.iter().enumerate() {
        let hit = next
            .raiders
            .iter()
            .enumerate()
            .find(|(ri, r)| !downed.contains(ri) && shot.rect.overlaps(&r.rect));
        if let Some((ri, _)) = hit {
            downed.push(ri);
            spent.push(si);
        }
    }

    for &ri in &downed {
        let raider = &next.raiders[ri];
        let points = points_for(raider.kind);
        let (x, y) = centre(&raider.rect);
        explode(&mut next.particles, x, y, rng);
        next.score += points;
        next.events.push(ShooterEvent::RaiderDestroyed { points });
    }
    next.raiders = next
        .raiders
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !downed.contains(i))
        .map(|(_, r)| r)
        .collect();
    next.shots = next
        .shots
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !spent.contains(i))
        .map(|(_, s)| s)
        .collect();

    // ── 5. Collision: raider ↔ player (one hit per frame) ────────────────────
    if let Some(ri) = next.raiders.iter().position(|r| r.rect.overlaps(&next.player)) {
        let raider = next.raiders.remove(ri);
        let (rx, ry) = centre(&raider.rect);
        let (px, py) = centre(&next.player);
        explode(&mut next.particles, rx, ry, rng);
        explode(&mut next.particles, px, py, rng);

        next.lives = next.lives.saturating_sub(1);
        next.events.push(ShooterEvent::PlayerHit { lives: next.lives });

        if next.lives == 0 {
            next.status = ShooterStatus::GameOver;
            next.events.push(ShooterEvent::GameOver { score: next.score });
            log::debug!("shooter round over with score {}", next.score);
        } else {
            next.player = spawn_rect(next.height);
        }
    }

    next
}
