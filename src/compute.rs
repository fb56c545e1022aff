/// Pure platformer logic.
///
/// `advance` takes the current `GameState` by reference and returns the next
/// one.  Every stage of the step is public and works on `&mut` parts of a
/// cloned state, so each stage can be driven on its own.

use crate::clock::clamp_delta;
use crate::config::{CameraFollow, DamagePolicy, HorizontalControl, Physics, Rules};
use crate::entities::{
    Camera, Enemy, GameState, GameStatus, InputState, Notice, Platform, Player, Session,
};
use crate::events::GameEvent;
use crate::geometry::{clamp, Rect, Vec2};
use crate::level::{EntityRegistry, LevelLayout};

// ── Constructors ─────────────────────────────────────────────────────────────

fn fresh_state(rules: Rules, world: EntityRegistry) -> GameState {
    let spawn = world.layout().spawn;
    GameState {
        rules,
        player: Player::new(spawn.x, spawn.y, spawn.width, spawn.height),
        camera: Camera::default(),
        session: Session {
            score: 0,
            lives: rules.starting_lives,
            coins: 0,
            status: GameStatus::Ready,
            respawn: Vec2::new(spawn.x, spawn.y),
            notice: None,
        },
        events: Vec::new(),
        frame: 0,
        elapsed_ms: 0.0,
        world,
    }
}

/// Build the session for a layout.  The result is `Ready`; call `start`.
pub fn init_state(rules: Rules, layout: LevelLayout) -> GameState {
    fresh_state(rules, EntityRegistry::new(layout))
}

/// `Ready → Running`.  Any other status is returned unchanged.
pub fn start(state: &GameState) -> GameState {
    let mut next = state.clone();
    if next.session.status == GameStatus::Ready {
        next.session.status = GameStatus::Running;
        next.events.clear();
        emit(&mut next.events, &mut next.session, GameEvent::Started);
        log::info!("session started");
    }
    next
}

/// Rebuild coins and enemies from the layout and return to `Ready` with a
/// fresh session.  Applying it twice gives the same state as applying it once.
pub fn restart(state: &GameState) -> GameState {
    let mut world = state.world.clone();
    world.reset();
    log::info!("session restarted (previous score {})", state.session.score);
    fresh_state(state.rules, world)
}

// ── Per-frame step ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame.  Unless the session is `Running`
/// nothing moves and only the previous frame's events are dropped.  Physics
/// constants are per frame; `dt_ms` only drives timers.
pub fn advance(state: &GameState, input: &InputState, dt_ms: f32) -> GameState {
    if state.session.status != GameStatus::Running {
        return GameState {
            events: Vec::new(),
            ..state.clone()
        };
    }

    let dt = clamp_delta(dt_ms, state.rules.max_frame_ms);
    let mut next = state.clone();
    next.events.clear();
    next.frame += 1;
    next.elapsed_ms += dt;
    tick_notice(&mut next.session, dt);

    let physics = next.rules.physics;

    // ── 1-3. Input, gravity, integration ─────────────────────────────────────
    apply_input(&mut next.player, input, &physics);
    apply_gravity(&mut next.player, physics.gravity);
    integrate(&mut next.player);

    // ── 4. Platforms ─────────────────────────────────────────────────────────
    resolve_platform_collisions(&mut next.player, next.world.platforms());
    record_checkpoint(&mut next);

    // ── 5. Coins ─────────────────────────────────────────────────────────────
    collect_coins(&mut next);

    // ── 6. Enemies ───────────────────────────────────────────────────────────
    if update_enemies(&mut next) {
        take_damage(&mut next);
    }
    if next.session.status != GameStatus::Running {
        return next;
    }

    // ── 7. World bounds, scoring, goal ───────────────────────────────────────
    check_level_bounds(&mut next);
    if next.session.status != GameStatus::Running {
        return next;
    }
    apply_distance_score(&mut next);
    reach_goal(&mut next);

    // ── 8. Camera ────────────────────────────────────────────────────────────
    let level_width = next.world.layout().width;
    update_camera(&mut next.camera, next.player.x, &next.rules, level_width);

    next
}

fn emit(events: &mut Vec<GameEvent>, session: &mut Session, event: GameEvent) {
    if let Some((text, duration)) = event.notice() {
        session.notice = Some(Notice {
            text: text.to_string(),
            remaining_ms: duration,
        });
    }
    events.push(event);
}

pub fn tick_notice(session: &mut Session, dt_ms: f32) {
    if let Some(notice) = &mut session.notice {
        notice.remaining_ms -= dt_ms;
        if notice.remaining_ms <= 0.0 {
            session.notice = None;
        }
    }
}

// ── Movement ─────────────────────────────────────────────────────────────────

/// Horizontal velocity from the keys, plus a jump if the player ended the
/// previous frame on the ground.
pub fn apply_input(player: &mut Player, input: &InputState, physics: &Physics) {
    match physics.horizontal {
        HorizontalControl::Instant => {
            player.vx = 0.0;
            if input.left {
                player.vx -= physics.player_speed;
            }
            if input.right {
                player.vx += physics.player_speed;
            }
        }
        HorizontalControl::Friction { factor } => {
            if input.left {
                player.vx = -physics.player_speed;
            } else if input.right {
                player.vx = physics.player_speed;
            } else {
                player.vx *= factor;
                if player.vx.abs() < 0.01 {
                    player.vx = 0.0;
                }
            }
        }
    }

    if input.jump && player.grounded {
        player.vy = -physics.jump_power;
        player.grounded = false;
    }
}

pub fn apply_gravity(player: &mut Player, gravity: f32) {
    player.vy += gravity;
}

/// Record the pre-move position, then move by the current velocity.
pub fn integrate(player: &mut Player) {
    player.prev_x = player.x;
    player.prev_y = player.y;
    player.x += player.vx;
    player.y += player.vy;
}

// ── Collision ────────────────────────────────────────────────────────────────

/// Push the player out of every overlapping platform, in array order.
///
/// The side is chosen from the previous position so a deep one-frame
/// penetration still resolves to the face that was actually crossed.  At most
/// one branch fires per platform; `grounded` is set only by a landing.
pub fn resolve_platform_collisions(player: &mut Player, platforms: &[Platform]) {
    player.grounded = false;

    for platform in platforms {
        let p = &platform.rect;
        if !player.rect().overlaps(p) {
            continue;
        }

        let prev_top = player.prev_y;
        let prev_bottom = player.prev_y + player.height;
        let prev_left = player.prev_x;
        let prev_right = player.prev_x + player.width;

        if prev_bottom <= p.y && player.vy >= 0.0 {
            player.y = p.y - player.height;
            player.vy = 0.0;
            player.grounded = true;
        } else if prev_top >= p.bottom() && player.vy < 0.0 {
            player.y = p.bottom();
            player.vy = 0.0;
        } else if prev_right <= p.x && player.vx > 0.0 {
            player.x = p.x - player.width;
        } else if prev_left >= p.right() && player.vx < 0.0 {
            player.x = p.right();
        }
    }
}

/// Any platform whose top lies within `tolerance` of the body's feet and
/// which overlaps it horizontally.
pub fn has_support(body: &Rect, platforms: &[Platform], tolerance: f32) -> bool {
    let feet = body.bottom();
    platforms.iter().any(|p| {
        body.x < p.rect.right() && body.right() > p.rect.x && (feet - p.rect.y).abs() <= tolerance
    })
}

// ── Collectibles ─────────────────────────────────────────────────────────────

pub fn collect_coins(state: &mut GameState) {
    let player = state.player.rect();
    let coin_score = state.rules.coin_score;

    for (index, coin) in state.world.coins.iter_mut().enumerate() {
        if coin.collected || !coin.rect.overlaps(&player) {
            continue;
        }
        coin.collected = true;
        state.session.coins += 1;
        state.session.score += coin_score;
        let coins = state.session.coins;
        emit(
            &mut state.events,
            &mut state.session,
            GameEvent::CoinCollected { index, coins },
        );
    }
}

// ── Enemies ──────────────────────────────────────────────────────────────────

/// Walk one step, turning at the patrol bounds or at a ledge edge.
pub fn patrol(enemy: &mut Enemy, platforms: &[Platform], probe: f32) {
    enemy.rect.x += enemy.direction * enemy.speed;

    let max_left = enemy.max_x - enemy.rect.width;
    if enemy.rect.x < enemy.min_x || enemy.rect.x > max_left {
        enemy.direction = -enemy.direction;
        enemy.rect.x = clamp(enemy.rect.x, enemy.min_x, max_left);
    } else if !has_support(&enemy.rect, platforms, probe) {
        enemy.direction = -enemy.direction;
    }
}

/// Move every live enemy and resolve its contact with the player.
///
/// Returns `true` if the player was hurt.  Only the first harmful contact in
/// a frame counts; later enemies still move but are not tested.
pub fn update_enemies(state: &mut GameState) -> bool {
    let physics = state.rules.physics;
    let stomp_score = state.rules.stomp_score;
    let player = state.player.rect();
    let prev_bottom = state.player.prev_bottom();
    let descending = state.player.vy > 0.0;
    let mut hurt = false;

    let (platforms, enemies) = state.world.enemies_with_platforms();
    for (index, enemy) in enemies.iter_mut().enumerate() {
        if !enemy.alive {
            continue;
        }
        patrol(enemy, platforms, physics.ground_probe);

        if hurt || !enemy.rect.overlaps(&player) {
            continue;
        }

        if prev_bottom <= enemy.rect.y && descending {
            enemy.alive = false;
            state.player.vy = physics.stomp_bounce;
            state.session.score += stomp_score;
            emit(
                &mut state.events,
                &mut state.session,
                GameEvent::EnemyStomped { index },
            );
        } else {
            hurt = true;
        }
    }
    hurt
}

/// Apply the damage policy: lose a life or fall back to the last checkpoint.
pub fn take_damage(state: &mut GameState) {
    if state.rules.damage == DamagePolicy::Lives {
        state.session.lives = state.session.lives.saturating_sub(1);
    }
    let lives = state.session.lives;
    emit(
        &mut state.events,
        &mut state.session,
        GameEvent::PlayerHurt { lives },
    );

    if lives == 0 {
        state.session.status = GameStatus::GameOver;
        let score = state.session.score;
        emit(
            &mut state.events,
            &mut state.session,
            GameEvent::GameOver { score },
        );
        log::debug!("game over at frame {} with score {}", state.frame, score);
        return;
    }
    respawn(state);
}

/// Put the player back at the respawn point at rest and recentre the camera.
pub fn respawn(state: &mut GameState) {
    let at = state.session.respawn;
    let (width, height) = (state.player.width, state.player.height);
    state.player = Player::new(at.x, at.y, width, height);

    let level_width = state.world.layout().width;
    let rules = state.rules;
    let max_x = (level_width - rules.viewport_width).max(0.0);
    state.camera.x = clamp(at.x - rules.viewport_width * rules.follow_fraction, 0.0, max_x);

    state.events.push(GameEvent::Respawned { at });
}

// ── Level bounds, checkpoints, goal ──────────────────────────────────────────

/// Falling far below the world counts as damage; x is kept inside the level.
pub fn check_level_bounds(state: &mut GameState) {
    let layout = state.world.layout();
    let fell_off = state.player.y > layout.world_bottom + state.rules.physics.fall_margin;
    let max_x = (layout.width - state.player.width).max(0.0);

    if fell_off {
        take_damage(state);
    }
    state.player.x = clamp(state.player.x, 0.0, max_x);
}

/// Under the checkpoint policy, a grounded player passing a checkpoint moves
/// the respawn point there.  Checkpoints never move backwards.
pub fn record_checkpoint(state: &mut GameState) {
    if state.rules.damage != DamagePolicy::Checkpoint || !state.player.grounded {
        return;
    }
    let current = state.session.respawn.x;
    let player_x = state.player.x;
    let reached = state
        .world
        .layout()
        .checkpoints
        .iter()
        .filter(|cp| cp.x > current && cp.x <= player_x)
        .fold(None, |best: Option<Vec2>, cp| match best {
            Some(b) if b.x >= cp.x => Some(b),
            _ => Some(*cp),
        });

    if let Some(at) = reached {
        state.session.respawn = at;
        emit(
            &mut state.events,
            &mut state.session,
            GameEvent::CheckpointReached { at },
        );
    }
}

/// Score never drops: progress only raises it.
pub fn apply_distance_score(state: &mut GameState) {
    if let Some(distance) = state.rules.distance_score {
        let progress = (state.player.x.max(0.0) * distance.per_unit).floor() as u32;
        let candidate = progress + state.session.coins * distance.per_coin;
        state.session.score = state.session.score.max(candidate);
    }
}

pub fn reach_goal(state: &mut GameState) {
    let Some(goal) = state.world.layout().goal else {
        return;
    };
    if !state.player.rect().touches(&goal) {
        return;
    }
    state.session.status = GameStatus::LevelComplete;
    let score = state.session.score;
    emit(
        &mut state.events,
        &mut state.session,
        GameEvent::LevelComplete { score },
    );
    log::debug!("level complete at frame {} with score {}", state.frame, score);
}

// ── Camera ───────────────────────────────────────────────────────────────────

/// Follow the player, keeping the offset in `[0, level_width - viewport]`.
pub fn update_camera(camera: &mut Camera, player_x: f32, rules: &Rules, level_width: f32) {
    let max_x = (level_width - rules.viewport_width).max(0.0);
    let target = player_x - rules.viewport_width * rules.follow_fraction;
    let x = match rules.camera {
        CameraFollow::Snap => target,
        CameraFollow::Smooth { factor } => camera.x + (target - camera.x) * factor,
    };
    camera.x = clamp(x, 0.0, max_x);
}
