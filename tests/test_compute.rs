use side_scroller::compute::*;
use side_scroller::config::{DamagePolicy, Rules};
use side_scroller::entities::*;
use side_scroller::events::GameEvent;
use side_scroller::geometry::{Rect, Vec2};
use side_scroller::level::{EnemySpawn, LevelLayout};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn ground(x: f32, y: f32, width: f32, height: f32) -> Platform {
    Platform {
        rect: Rect::new(x, y, width, height),
        kind: PlatformKind::Ground,
    }
}

fn walker(x: f32, y: f32, speed: f32) -> EnemySpawn {
    EnemySpawn {
        rect: Rect::new(x, y, 30.0, 30.0),
        min_x: 0.0,
        max_x: 2000.0,
        speed,
        direction: 1.0,
    }
}

/// 2000-wide level; the player stands on a floor at y=360 unless
/// `platforms` is empty.
fn layout(spawn: Rect, platforms: Vec<Platform>, enemies: Vec<EnemySpawn>) -> LevelLayout {
    LevelLayout {
        width: 2000.0,
        world_bottom: 400.0,
        spawn,
        platforms,
        coins: Vec::new(),
        coin_rows: Vec::new(),
        enemies,
        checkpoints: Vec::new(),
        goal: None,
    }
}

fn floor_level(enemies: Vec<EnemySpawn>) -> LevelLayout {
    layout(
        Rect::new(100.0, 320.0, 30.0, 40.0),
        vec![ground(0.0, 360.0, 2000.0, 40.0)],
        enemies,
    )
}

fn running(rules: Rules, layout: LevelLayout) -> GameState {
    start(&init_state(rules, layout))
}

const IDLE: InputState = InputState {
    left: false,
    right: false,
    jump: false,
};

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[test]
fn init_state_is_ready_at_spawn() {
    let s = init_state(Rules::classic(), LevelLayout::classic());
    assert_eq!(s.session.status, GameStatus::Ready);
    assert_eq!(s.session.lives, 3);
    assert_eq!(s.session.score, 0);
    assert_eq!((s.player.x, s.player.y), (100.0, 300.0));
    assert_eq!(s.camera.x, 0.0);
    assert_eq!(s.world.coins.len(), 8);
    assert_eq!(s.world.enemies.len(), 4);
}

#[test]
fn advance_is_noop_before_start() {
    let s = init_state(Rules::classic(), LevelLayout::classic());
    assert_eq!(advance(&s, &IDLE, 16.0), s);
}

#[test]
fn start_runs_and_announces() {
    let s = running(Rules::classic(), LevelLayout::classic());
    assert_eq!(s.session.status, GameStatus::Running);
    assert_eq!(s.events, vec![GameEvent::Started]);
    assert_eq!(s.session.notice.as_ref().map(|n| n.text.as_str()), Some("Good luck!"));
}

#[test]
fn start_ignores_running_session() {
    let s = running(Rules::classic(), LevelLayout::classic());
    let s = advance(&s, &IDLE, 16.0);
    assert_eq!(start(&s), s);
}

#[test]
fn restart_twice_equals_restart_once() {
    let mut s = running(Rules::classic(), LevelLayout::classic());
    for _ in 0..30 {
        s = advance(&s, &InputState { right: true, ..IDLE }, 16.0);
    }
    s.world.coins[0].collected = true;
    s.world.enemies[1].alive = false;
    s.session.score = 900;

    let once = restart(&s);
    let twice = restart(&once);
    assert_eq!(once, twice);
    assert_eq!(once.session.status, GameStatus::Ready);
    assert_eq!(once.session.score, 0);
    assert!(once.world.coins.iter().all(|c| !c.collected));
    assert!(once.world.enemies.iter().all(|e| e.alive));
    assert_eq!(once, init_state(Rules::classic(), LevelLayout::classic()));
}

#[test]
fn advance_does_not_mutate_previous_state() {
    let s = running(Rules::classic(), LevelLayout::classic());
    let before = s.clone();
    let _ = advance(&s, &InputState { right: true, ..IDLE }, 16.0);
    assert_eq!(s, before);
}

// ── Gravity & integration ─────────────────────────────────────────────────────

#[test]
fn gravity_on_empty_level() {
    let s = running(
        Rules::classic(),
        layout(Rect::new(100.0, 100.0, 30.0, 40.0), Vec::new(), Vec::new()),
    );
    let s = advance(&s, &IDLE, 16.0);
    assert!(approx(s.player.vy, 0.8));
    assert!(approx(s.player.y, 100.8));
    assert_eq!(s.player.prev_y, 100.0);
    assert!(!s.player.grounded);
}

#[test]
fn frame_delta_is_clamped_for_timers() {
    let s = running(Rules::classic(), floor_level(Vec::new()));
    let s = advance(&s, &IDLE, 1000.0);
    assert_eq!(s.frame, 1);
    assert!(approx(s.elapsed_ms, 32.0));
    // Physics is per frame: a huge delta does not scale the step.
    assert!(approx(s.player.y, 320.0));
}

#[test]
fn standing_player_stays_grounded() {
    let mut s = running(Rules::classic(), floor_level(Vec::new()));
    for _ in 0..10 {
        s = advance(&s, &IDLE, 16.0);
        assert!(s.player.grounded);
        assert!(approx(s.player.y, 320.0));
        assert_eq!(s.player.vy, 0.0);
    }
}

#[test]
fn jump_leaves_ground_and_clears_grounded() {
    let s = running(Rules::classic(), floor_level(Vec::new()));
    let s = advance(&s, &IDLE, 16.0);
    assert!(s.player.grounded);

    let s = advance(&s, &InputState { jump: true, ..IDLE }, 16.0);
    assert!(!s.player.grounded);
    assert!(approx(s.player.vy, -15.0 + 0.8));
    assert!(s.player.y < 320.0);
}

#[test]
fn walking_off_a_ledge_clears_grounded() {
    let s = running(
        Rules::classic(),
        layout(
            Rect::new(100.0, 320.0, 30.0, 40.0),
            vec![ground(0.0, 360.0, 150.0, 40.0)],
            Vec::new(),
        ),
    );
    let walk = InputState { right: true, ..IDLE };

    let mut s = s;
    for _ in 0..9 {
        s = advance(&s, &walk, 16.0);
        assert!(s.player.grounded);
    }
    assert_eq!(s.player.x, 145.0);

    s = advance(&s, &walk, 16.0);
    assert_eq!(s.player.x, 150.0);
    assert!(!s.player.grounded);
    assert!(s.player.vy > 0.0);
}

#[test]
fn no_jump_in_mid_air() {
    let s = running(
        Rules::classic(),
        layout(Rect::new(100.0, 100.0, 30.0, 40.0), Vec::new(), Vec::new()),
    );
    let s = advance(&s, &InputState { jump: true, ..IDLE }, 16.0);
    assert!(approx(s.player.vy, 0.8));
}

// ── Horizontal control ────────────────────────────────────────────────────────

#[test]
fn friction_slides_to_a_stop() {
    let physics = Rules::classic().physics;
    let mut p = Player::new(0.0, 0.0, 30.0, 40.0);
    p.vx = 5.0;
    apply_input(&mut p, &IDLE, &physics);
    assert!(approx(p.vx, 4.5));

    p.vx = 0.005;
    apply_input(&mut p, &IDLE, &physics);
    assert_eq!(p.vx, 0.0);
}

#[test]
fn friction_left_takes_priority() {
    let physics = Rules::classic().physics;
    let mut p = Player::new(0.0, 0.0, 30.0, 40.0);
    apply_input(&mut p, &InputState { left: true, right: true, jump: false }, &physics);
    assert_eq!(p.vx, -5.0);
}

#[test]
fn instant_control_stops_at_once() {
    let physics = Rules::checkpoint().physics;
    let mut p = Player::new(0.0, 0.0, 32.0, 48.0);
    apply_input(&mut p, &InputState { right: true, ..IDLE }, &physics);
    assert_eq!(p.vx, 4.0);
    apply_input(&mut p, &IDLE, &physics);
    assert_eq!(p.vx, 0.0);
    apply_input(&mut p, &InputState { left: true, right: true, jump: false }, &physics);
    assert_eq!(p.vx, 0.0);
}

// ── Platform collisions ───────────────────────────────────────────────────────

#[test]
fn landing_snaps_to_platform_top() {
    let platforms = [ground(80.0, 330.0, 100.0, 20.0)];
    let mut p = Player::new(100.0, 300.0, 30.0, 40.0);
    p.prev_y = 290.0;
    p.vy = 5.0;

    resolve_platform_collisions(&mut p, &platforms);
    assert_eq!(p.y, 290.0);
    assert_eq!(p.vy, 0.0);
    assert!(p.grounded);
}

#[test]
fn head_bump_stops_upward_motion() {
    let platforms = [ground(80.0, 200.0, 100.0, 20.0)];
    let mut p = Player::new(100.0, 210.0, 30.0, 40.0);
    p.prev_y = 225.0;
    p.vy = -15.0;

    resolve_platform_collisions(&mut p, &platforms);
    assert_eq!(p.y, 220.0);
    assert_eq!(p.vy, 0.0);
    assert!(!p.grounded);
}

#[test]
fn walking_into_a_wall_pushes_back() {
    let platforms = [ground(200.0, 300.0, 50.0, 100.0)];
    let mut p = Player::new(175.0, 320.0, 30.0, 40.0);
    p.prev_x = 168.0;
    p.vx = 5.0;

    resolve_platform_collisions(&mut p, &platforms);
    assert_eq!(p.x, 170.0);

    let mut p = Player::new(245.0, 320.0, 30.0, 40.0);
    p.prev_x = 252.0;
    p.vx = -5.0;
    resolve_platform_collisions(&mut p, &platforms);
    assert_eq!(p.x, 250.0);
}

#[test]
fn collision_pass_clears_stale_grounded() {
    let platforms = [ground(0.0, 360.0, 2000.0, 40.0)];
    let mut p = Player::new(100.0, 200.0, 30.0, 40.0);
    p.grounded = true;
    resolve_platform_collisions(&mut p, &platforms);
    assert!(!p.grounded);

    p.grounded = true;
    resolve_platform_collisions(&mut p, &[]);
    assert!(!p.grounded);
}

/// A ledge tucked under a wall: each platform is resolved on its own, in
/// array order, so the outcome depends on which comes first.
#[test]
fn overlapping_platforms_resolve_in_array_order() {
    let ledge = ground(120.0, 320.0, 20.0, 20.0);
    let wall = ground(120.0, 250.0, 20.0, 70.0);
    let falling = || {
        let mut p = Player::new(92.0, 285.0, 30.0, 40.0);
        p.prev_x = 85.0;
        p.prev_y = 278.0;
        p.vx = 7.0;
        p.vy = 7.0;
        p
    };

    // Land first, then get pushed off the ledge: still flagged grounded.
    let mut p = falling();
    resolve_platform_collisions(&mut p, &[ledge, wall]);
    assert_eq!((p.x, p.y), (90.0, 280.0));
    assert!(p.grounded);
    assert_eq!(p.vy, 0.0);

    // Pushed back first: the ledge no longer overlaps, so no landing.
    let mut p = falling();
    resolve_platform_collisions(&mut p, &[wall, ledge]);
    assert_eq!((p.x, p.y), (90.0, 285.0));
    assert!(!p.grounded);
    assert_eq!(p.vy, 7.0);
}

#[test]
fn edge_contact_is_not_a_collision() {
    let platforms = [ground(130.0, 300.0, 50.0, 50.0)];
    let mut p = Player::new(100.0, 300.0, 30.0, 40.0);
    p.vx = 1.0;
    resolve_platform_collisions(&mut p, &platforms);
    assert_eq!(p.x, 100.0);
    assert!(!p.grounded);
}

// ── Coins ─────────────────────────────────────────────────────────────────────

#[test]
fn coin_is_collected_once() {
    let mut level = floor_level(Vec::new());
    level.coins = vec![Rect::new(105.0, 330.0, 20.0, 20.0)];
    let s = running(Rules::classic(), level);

    let s = advance(&s, &IDLE, 16.0);
    assert!(s.world.coins[0].collected);
    assert_eq!(s.session.coins, 1);
    assert_eq!(s.session.score, 100);
    assert!(s.events.contains(&GameEvent::CoinCollected { index: 0, coins: 1 }));

    let s = advance(&s, &IDLE, 16.0);
    assert_eq!(s.session.coins, 1);
    assert_eq!(s.session.score, 100);
    assert!(s.events.is_empty());
}

// ── Enemies ───────────────────────────────────────────────────────────────────

fn stomp_setup() -> GameState {
    let mut s = running(Rules::classic(), floor_level(vec![walker(200.0, 330.0, 0.0)]));
    s.player = Player::new(200.0, 300.0, 30.0, 40.0);
    s.player.prev_y = 288.0;
    s.player.vy = 3.0;
    s.events.clear();
    s
}

#[test]
fn stomp_defeats_enemy_and_bounces() {
    let mut s = stomp_setup();
    let hurt = update_enemies(&mut s);

    assert!(!hurt);
    assert!(!s.world.enemies[0].alive);
    assert_eq!(s.player.vy, Rules::classic().physics.stomp_bounce);
    assert_eq!(s.session.score, 200);
    assert_eq!(s.events, vec![GameEvent::EnemyStomped { index: 0 }]);
}

#[test]
fn falling_onto_a_walker_stomps_it() {
    let mut s = running(Rules::classic(), floor_level(vec![walker(200.0, 330.0, 0.0)]));
    s.player = Player::new(200.0, 288.0, 30.0, 40.0);
    s.player.vy = 2.2;

    let s = advance(&s, &IDLE, 16.0);
    assert!(!s.world.enemies[0].alive);
    assert!(!s.player.grounded);
    assert_eq!(s.player.vy, Rules::classic().physics.stomp_bounce);
    assert_eq!(s.session.score, 200);
    assert_eq!(s.session.lives, 3);
    assert_eq!(s.events, vec![GameEvent::EnemyStomped { index: 0 }]);
}

#[test]
fn dead_enemy_never_moves_or_hurts() {
    let mut s = stomp_setup();
    s.world.enemies[0].speed = 2.0;
    update_enemies(&mut s);
    let resting = s.world.enemies[0].rect;

    s.player = Player::new(200.0, 320.0, 30.0, 40.0);
    for _ in 0..5 {
        assert!(!update_enemies(&mut s));
    }
    assert_eq!(s.world.enemies[0].rect, resting);
}

#[test]
fn side_contact_hurts_the_player() {
    let mut s = running(Rules::classic(), floor_level(vec![walker(120.0, 330.0, 0.0)]));
    s = advance(&s, &IDLE, 16.0);

    assert_eq!(s.session.lives, 2);
    assert!(s.events.contains(&GameEvent::PlayerHurt { lives: 2 }));
    assert!(s.events.contains(&GameEvent::Respawned { at: Vec2::new(100.0, 320.0) }));
    assert_eq!(s.session.status, GameStatus::Running);
}

#[test]
fn two_enemies_cost_one_life_per_frame() {
    let mut s = running(
        Rules::classic(),
        floor_level(vec![walker(120.0, 330.0, 0.0), walker(90.0, 330.0, 0.0)]),
    );
    s = advance(&s, &IDLE, 16.0);
    assert_eq!(s.session.lives, 2);
}

#[test]
fn last_life_ends_the_session() {
    let mut rules = Rules::classic();
    rules.starting_lives = 1;
    let s = running(rules, floor_level(vec![walker(120.0, 330.0, 0.0)]));

    let s = advance(&s, &IDLE, 16.0);
    assert_eq!(s.session.lives, 0);
    assert_eq!(s.session.status, GameStatus::GameOver);
    assert!(s.events.contains(&GameEvent::GameOver { score: 0 }));

    let mut frozen = s.clone();
    for _ in 0..60 {
        frozen = advance(&frozen, &InputState { right: true, ..IDLE }, 16.0);
        assert!(frozen.events.is_empty());
    }
    assert_eq!(frozen, GameState { events: Vec::new(), ..s.clone() });

    let again = restart(&s);
    assert_eq!(again.session.status, GameStatus::Ready);
    assert_eq!(again.session.lives, 1);
}

#[test]
fn patrol_turns_at_range_end() {
    let platforms = [ground(0.0, 360.0, 2000.0, 40.0)];
    let mut e = Enemy {
        rect: Rect::new(1969.0, 330.0, 30.0, 30.0),
        speed: 2.0,
        direction: 1.0,
        min_x: 0.0,
        max_x: 2000.0,
        alive: true,
    };
    patrol(&mut e, &platforms, 5.0);
    assert_eq!(e.direction, -1.0);
    assert_eq!(e.rect.x, 1970.0);

    patrol(&mut e, &platforms, 5.0);
    assert_eq!(e.rect.x, 1968.0);
}

#[test]
fn patrol_turns_at_ledge_edge() {
    let platforms = [ground(200.0, 300.0, 150.0, 20.0)];
    let mut e = Enemy {
        rect: Rect::new(348.0, 270.0, 30.0, 30.0),
        speed: 2.0,
        direction: 1.0,
        min_x: 0.0,
        max_x: 2000.0,
        alive: true,
    };
    patrol(&mut e, &platforms, 5.0);
    assert_eq!(e.rect.x, 350.0);
    assert_eq!(e.direction, -1.0);
}

// ── Level bounds ──────────────────────────────────────────────────────────────

#[test]
fn falling_off_the_world_costs_a_life() {
    let mut s = running(Rules::classic(), floor_level(Vec::new()));
    s.player.x = 500.0;
    s.player.y = 720.0;
    check_level_bounds(&mut s);

    assert_eq!(s.session.lives, 2);
    assert_eq!((s.player.x, s.player.y), (100.0, 320.0));
    assert_eq!(s.player.vy, 0.0);
}

#[test]
fn player_is_kept_inside_level() {
    let mut s = running(Rules::classic(), floor_level(Vec::new()));
    s.player.x = -40.0;
    check_level_bounds(&mut s);
    assert_eq!(s.player.x, 0.0);

    s.player.x = 2100.0;
    check_level_bounds(&mut s);
    assert_eq!(s.player.x, 1970.0);
}

// ── Checkpoints, distance, goal ───────────────────────────────────────────────

fn checkpoint_level() -> LevelLayout {
    LevelLayout {
        width: 3000.0,
        world_bottom: 540.0,
        spawn: Rect::new(120.0, 412.0, 32.0, 48.0),
        platforms: vec![ground(0.0, 460.0, 3000.0, 80.0)],
        coins: Vec::new(),
        coin_rows: Vec::new(),
        enemies: Vec::new(),
        checkpoints: vec![Vec2::new(300.0, 412.0), Vec2::new(900.0, 412.0)],
        goal: Some(Rect::new(2900.0, 300.0, 20.0, 160.0)),
    }
}

#[test]
fn checkpoint_moves_respawn_without_costing_lives() {
    let mut s = running(Rules::checkpoint(), checkpoint_level());
    s.player = Player::new(350.0, 412.0, 32.0, 48.0);
    s = advance(&s, &IDLE, 16.0);

    let cp = Vec2::new(300.0, 412.0);
    assert_eq!(s.session.respawn, cp);
    assert!(s.events.contains(&GameEvent::CheckpointReached { at: cp }));

    take_damage(&mut s);
    assert_eq!(s.rules.damage, DamagePolicy::Checkpoint);
    assert_eq!(s.session.lives, 3);
    assert_eq!(s.session.status, GameStatus::Running);
    assert_eq!((s.player.x, s.player.y), (300.0, 412.0));
}

#[test]
fn checkpoints_never_move_backwards() {
    let mut s = running(Rules::checkpoint(), checkpoint_level());
    s.player = Player::new(1000.0, 412.0, 32.0, 48.0);
    s = advance(&s, &IDLE, 16.0);
    assert_eq!(s.session.respawn, Vec2::new(900.0, 412.0));

    s.player = Player::new(350.0, 412.0, 32.0, 48.0);
    s = advance(&s, &IDLE, 16.0);
    assert_eq!(s.session.respawn, Vec2::new(900.0, 412.0));
}

#[test]
fn checkpoints_ignored_under_lives_policy() {
    let mut s = running(Rules::classic(), checkpoint_level());
    s.player = Player::new(350.0, 412.0, 32.0, 48.0);
    s = advance(&s, &IDLE, 16.0);
    assert_eq!(s.session.respawn, Vec2::new(120.0, 412.0));
}

#[test]
fn distance_score_never_decreases() {
    let mut s = running(Rules::checkpoint(), checkpoint_level());
    s.player.x = 1000.0;
    apply_distance_score(&mut s);
    assert_eq!(s.session.score, 500);

    s.player.x = 200.0;
    apply_distance_score(&mut s);
    assert_eq!(s.session.score, 500);

    s.session.coins = 2;
    apply_distance_score(&mut s);
    assert_eq!(s.session.score, 500);
    s.player.x = 1000.0;
    apply_distance_score(&mut s);
    assert_eq!(s.session.score, 900);
}

#[test]
fn touching_the_goal_completes_the_level() {
    let mut s = running(Rules::checkpoint(), checkpoint_level());
    s.player = Player::new(2870.0, 412.0, 32.0, 48.0);
    s = advance(&s, &InputState { right: true, ..IDLE }, 16.0);

    assert_eq!(s.session.status, GameStatus::LevelComplete);
    assert!(s
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::LevelComplete { .. })));
    let after = advance(&s, &IDLE, 16.0);
    assert!(after.events.is_empty());
    assert_eq!(after.player, s.player);
    assert_eq!(after.session, s.session);
}

// ── Camera ────────────────────────────────────────────────────────────────────

#[test]
fn snap_camera_stays_inside_level() {
    let rules = Rules::classic();
    let mut cam = Camera::default();

    update_camera(&mut cam, 50.0, &rules, 2000.0);
    assert_eq!(cam.x, 0.0);

    update_camera(&mut cam, 1000.0, &rules, 2000.0);
    assert_eq!(cam.x, 600.0);

    update_camera(&mut cam, 1990.0, &rules, 2000.0);
    assert_eq!(cam.x, 1200.0);
}

#[test]
fn camera_pinned_on_narrow_level() {
    let mut cam = Camera { x: 50.0 };
    update_camera(&mut cam, 400.0, &Rules::classic(), 500.0);
    assert_eq!(cam.x, 0.0);
}

#[test]
fn smooth_camera_eases_toward_target() {
    let rules = Rules::checkpoint();
    let mut cam = Camera::default();
    update_camera(&mut cam, 1000.0, &rules, 5200.0);
    // target = 1000 - 960 * 0.35 = 664
    assert!(approx(cam.x, 664.0 * 0.12));
}

#[test]
fn camera_invariant_holds_over_a_run() {
    let mut s = running(Rules::classic(), LevelLayout::classic());
    let max = 2000.0 - s.rules.viewport_width;
    for _ in 0..600 {
        s = advance(&s, &InputState { right: true, ..IDLE }, 16.0);
        if s.session.status != GameStatus::Running {
            break;
        }
        assert!(s.camera.x >= 0.0 && s.camera.x <= max);
    }
}

// ── Notices ───────────────────────────────────────────────────────────────────

#[test]
fn notice_expires() {
    let mut session = running(Rules::classic(), LevelLayout::classic()).session;
    tick_notice(&mut session, 1000.0);
    assert!(session.notice.is_some());
    tick_notice(&mut session, 500.0);
    assert!(session.notice.is_none());
}
