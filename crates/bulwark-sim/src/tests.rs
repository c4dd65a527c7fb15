//! Tests for the entity models, the per-frame systems and the game engine.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use glam::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use bulwark_core::commands::InputFrame;
use bulwark_core::constants::*;
use bulwark_core::datapack::*;
use bulwark_core::enums::*;
use bulwark_core::events::GameEvent;
use bulwark_core::motion::angle_between;
use bulwark_core::types::{GridSize, TilePos};

use crate::biome::Biome;
use crate::camera::Camera;
use crate::catalog::{Catalog, ObjBehavior, ObjMeta, ProjectileMeta};
use crate::cheats::{CheatBuffer, CheatCode};
use crate::economy::{Cursor, CursorUpgrade};
use crate::enemy::Enemy;
use crate::engine::{Game, GameConfig, HoverTarget};
use crate::map::Map;
use crate::object::{Object, ObjectEvent};
use crate::projectile::Projectile;
use crate::systems;
use crate::wave::{Wave, WaveEnemy};

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(7)
}

fn catalog() -> Catalog {
    Catalog::builtin().unwrap()
}

fn rock(hp: i32) -> Arc<ObjMeta> {
    Arc::new(
        ObjMeta::new("rock", "Rock", (1, 1))
            .with_hp(hp)
            .with_tags(&["rock"]),
    )
}

fn empty_map(width: i32, height: i32) -> Map {
    Map::new(GridSize::new(width, height), Vec::new(), Biome::barren())
}

fn zombie_at(pos: DVec2, castle: DVec2) -> Enemy {
    Enemy::new(EnemyKind::Zombie, pos, castle, None)
}

/// A 12×12 game with nothing but the castle on the map and no wave coming.
fn clear_game(starting_wood: u32) -> Game {
    let config = GameConfig {
        map_size: GridSize::new(12, 12),
        castle_pos: TilePos::new(8, 8),
        starting_wood,
        first_wave_timeout: 1000.0,
        viewport: DVec2::new(640.0, 480.0),
        ..Default::default()
    };
    let mut game = Game::with_builtin(config).unwrap();
    let castle = game.castle();
    let others: Vec<_> = game
        .map()
        .objects
        .iter()
        .map(|obj| obj.id)
        .filter(|id| *id != castle)
        .collect();
    game.map_mut().remove_objects(&others);
    game
}

fn screen_of(game: &Game, tile: TilePos) -> DVec2 {
    game.camera().map_to_screen(tile.center())
}

fn held_at(pointer: DVec2) -> InputFrame {
    InputFrame {
        pointer,
        left_held: true,
        ..Default::default()
    }
}

// ---- Objects ----

#[test]
fn test_object_delete_emitted_exactly_once() {
    let mut rng = rng();
    let mut obj = Object::new(rock(3), TilePos::new(0, 0), &mut rng);

    obj.damage(2);
    assert_eq!(obj.hp, 1);
    assert!(obj.update(0.1, &[], &mut rng).is_empty());

    let mut last_hp = obj.hp;
    for _ in 0..3 {
        obj.damage(2);
        assert!(obj.hp <= last_hp, "HP must never increase");
        last_hp = obj.hp;
    }

    let events = obj.update(0.1, &[], &mut rng);
    let deletes = events
        .iter()
        .filter(|e| matches!(e, ObjectEvent::Delete))
        .count();
    assert_eq!(deletes, 1);
    assert!(obj.is_destroyed());
    assert!(obj.update(0.1, &[], &mut rng).is_empty());
}

#[test]
fn test_object_damage_kicks() {
    let mut rng = rng();
    let mut obj = Object::new(rock(10), TilePos::new(0, 0), &mut rng);
    obj.damage(1);
    assert_eq!(obj.wobble.magnitude, OBJECT_HIT_KICK);

    obj.update(0.5, &[], &mut rng);
    assert!((obj.wobble.magnitude - (OBJECT_HIT_KICK - 0.5)).abs() < 1e-12);
}

#[test]
fn test_multi_tile_footprint() {
    let mut rng = rng();
    let meta = Arc::new(ObjMeta::new("pine", "Pine", (1, 2)));
    let obj = Object::new(meta, TilePos::new(3, 4), &mut rng);
    assert!(obj.occupies(TilePos::new(3, 4)));
    assert!(obj.occupies(TilePos::new(3, 5)));
    assert!(!obj.occupies(TilePos::new(4, 4)));
    assert_eq!(obj.center(), DVec2::new(3.5, 5.0));
}

#[test]
fn test_tower_targets_first_enemy_in_list_order() {
    let mut rng = rng();
    let catalog = catalog();
    let mut tower = Object::new(
        catalog.object("small_tower").unwrap(),
        TilePos::new(5, 5),
        &mut rng,
    );
    let castle = DVec2::new(20.0, 20.0);
    let far = zombie_at(DVec2::new(5.5, 7.5), castle);
    let near = zombie_at(DVec2::new(6.5, 5.5), castle);
    let enemies = vec![far, near];

    let events = tower.update(1.5, &enemies, &mut rng);
    let shots: Vec<&Projectile> = events
        .iter()
        .filter_map(|e| match e {
            ObjectEvent::SpawnProjectile(p) => Some(p),
            ObjectEvent::Delete => None,
        })
        .collect();
    assert_eq!(shots.len(), 1);

    let expected = angle_between(DVec2::new(5.5, 5.5), DVec2::new(5.5, 7.5)) + FRAC_PI_2;
    assert!((shots[0].motion.deg - expected).abs() < 1e-12);
    assert!(shots[0].phase_through.contains(&"tower".to_owned()));
    assert!(shots[0].phase_through.contains(&"player".to_owned()));
    assert_eq!(tower.wobble.magnitude, TOWER_RECOIL_KICK);
}

#[test]
fn test_tower_range_is_circular() {
    let mut rng = rng();
    let catalog = catalog();
    let mut tower = Object::new(
        catalog.object("small_tower").unwrap(),
        TilePos::new(5, 5),
        &mut rng,
    );
    // Inside the 3-tile bounding square, outside the circle.
    let corner = zombie_at(DVec2::new(8.0, 8.0), DVec2::ZERO);
    let events = tower.update(1.5, &[corner], &mut rng);
    assert!(events.is_empty());
}

#[test]
fn test_landmine_triggers_once_with_rolled_damage() {
    let mut rng = rng();
    let catalog = catalog();
    let mut mine = Object::new(
        catalog.object("landmine").unwrap(),
        TilePos::new(3, 3),
        &mut rng,
    );
    let enemies = vec![zombie_at(DVec2::new(3.5, 3.5), DVec2::new(10.0, 10.0))];

    let events = mine.update(0.1, &enemies, &mut rng);
    assert!(matches!(events[0], ObjectEvent::Delete));
    let ObjectEvent::SpawnProjectile(blast) = &events[1] else {
        panic!("landmine should emit an explosion");
    };
    assert!(blast.destroy_everything);
    assert!((25..=50).contains(&blast.damage));
    assert_eq!(events.len(), 2);

    assert!(mine.update(0.1, &enemies, &mut rng).is_empty());
}

#[test]
fn test_landmine_explosion_hits_enemy_despite_short_lifetime() {
    let mut rng = rng();
    let catalog = catalog();
    let mut map = empty_map(8, 8);
    map.add_object(Object::new(
        catalog.object("landmine").unwrap(),
        TilePos::new(3, 3),
        &mut rng,
    ));
    map.add_enemy(zombie_at(DVec2::new(3.5, 3.5), DVec2::new(7.5, 7.5)));

    let removed = systems::objects::run(&mut map, 0.1, &mut rng);
    assert_eq!(removed.len(), 1);
    assert_eq!(map.projectiles.len(), 1);

    systems::projectiles::run(&mut map, 0.1);
    assert!(map.projectiles[0].deletable);
    assert!(!map.projectiles[0].spent);

    systems::enemies::run(&mut map, 0.1);
    let dead = systems::cleanup::run(&mut map);
    assert_eq!(dead.len(), 1);
    assert!(dead[0].hp <= 0);
    assert!(map.projectiles.is_empty());
}

// ---- Projectiles ----

#[test]
fn test_projectile_walkable_only_hit_when_destroying_everything() {
    let mut rng = rng();
    let grass = Arc::new(ObjMeta::new("grass", "Grass", (1, 1)).with_hp(5).walkable());
    let meta = Arc::new(ProjectileMeta::new("blast", 0.0, 3, 1.0));
    let mut objects = vec![Object::new(grass, TilePos::new(0, 0), &mut rng)];

    let mut normal = Projectile::new(Arc::clone(&meta), DVec2::splat(0.5), 0.0);
    normal.update(0.1, &mut objects);
    assert_eq!(objects[0].hp, 5);
    assert!(!normal.spent);

    let mut area = Projectile::new(meta, DVec2::splat(0.5), 0.0).destroying_everything();
    area.update(0.1, &mut objects);
    assert_eq!(objects[0].hp, 2);
    assert!(area.spent);
    assert!(area.deletable);
}

#[test]
fn test_projectile_damages_exactly_one_target() {
    let mut rng = rng();
    let meta = Arc::new(ProjectileMeta::new("bolt", 0.0, 1, 1.0).with_size(2.0, 2.0));
    let mut objects = vec![
        Object::new(rock(5), TilePos::new(0, 0), &mut rng),
        Object::new(rock(5), TilePos::new(1, 0), &mut rng),
    ];

    let mut p = Projectile::new(meta, DVec2::new(1.0, 0.5), 0.0);
    p.update(0.1, &mut objects);
    p.update(0.1, &mut objects);
    assert_eq!(objects[0].hp, 4);
    assert_eq!(objects[1].hp, 5);
}

#[test]
fn test_projectile_phases_through_ignored_tags() {
    let mut rng = rng();
    let wall = Arc::new(
        ObjMeta::new("wall", "Wall", (1, 1))
            .with_hp(5)
            .with_tags(&["wall"]),
    );
    let meta = Arc::new(ProjectileMeta::new("arrow", 0.0, 1, 1.0));
    let mut objects = vec![Object::new(wall, TilePos::new(0, 0), &mut rng)];

    let mut p = Projectile::new(meta, DVec2::splat(0.5), 0.0).ignoring(["wall".to_owned()]);
    p.update(0.1, &mut objects);
    assert_eq!(objects[0].hp, 5);
    assert!(!p.spent);
}

#[test]
fn test_projectile_expires() {
    let meta = Arc::new(ProjectileMeta::new("arrow", 1.0, 1, 0.3));
    let mut p = Projectile::new(meta, DVec2::ZERO, 0.0);
    p.update(0.2, &mut []);
    assert!(!p.deletable);
    p.update(0.2, &mut []);
    assert!(p.deletable);
    assert_eq!(p.opacity(), 0.0);
}

// ---- Enemies ----

#[test]
fn test_enemy_bounce_state_machine() {
    let mut rng = rng();
    let mut objects = vec![Object::new(rock(100), TilePos::new(3, 2), &mut rng)];
    let mut enemy = zombie_at(DVec2::new(2.8, 2.5), DVec2::new(10.5, 2.5));
    let dt = 0.05;

    enemy.update(dt, &mut objects, &mut []);
    assert_eq!(enemy.collided, Some(objects[0].id));
    assert_eq!(objects[0].hp, 99);

    let mut flipped = false;
    for _ in 0..100 {
        let (speed, deg) = (enemy.motion.speed, enemy.motion.deg);
        enemy.update(dt, &mut objects, &mut []);
        if enemy.collided.is_some() {
            assert!(enemy.motion.speed < speed, "speed must decay while bounced");
            assert_eq!(enemy.motion.deg, deg);
        } else {
            assert!(enemy.motion.speed <= 0.0);
            assert!((enemy.motion.deg - deg - PI).abs() < 1e-9);
            flipped = true;
            break;
        }
    }
    assert!(flipped, "bounce never ended");
    assert_eq!(objects[0].hp, 99, "bounced object is not hit again");
}

#[test]
fn test_enemy_clock_paused_while_bounced() {
    let mut rng = rng();
    let catalog = catalog();
    let mut objects = vec![Object::new(rock(100), TilePos::new(3, 2), &mut rng)];
    let mut witch = catalog.enemy(EnemyKind::Witch, DVec2::new(2.8, 2.5), DVec2::new(10.5, 2.5));
    let dt = 0.05;

    // The clock starts expired: aim, fire, then hit the rock.
    let shots = witch.update(dt, &mut objects, &mut []);
    assert_eq!(shots.len(), 1);
    assert!(witch.collided.is_some());
    let paused = witch.clock_timer;
    assert_eq!(paused, witch.stats().clock);

    let mut bounced_frames = 0;
    while witch.collided.is_some() {
        let shots = witch.update(dt, &mut objects, &mut []);
        assert!(shots.is_empty());
        assert_eq!(witch.clock_timer, paused);
        bounced_frames += 1;
        assert!(bounced_frames < 100, "bounce never ended");
    }
    assert!(bounced_frames > 1);

    witch.update(dt, &mut objects, &mut []);
    assert!(witch.clock_timer < paused);
}

#[test]
fn test_enemy_bounces_away_from_obstacle() {
    let mut rng = rng();
    let mut objects = vec![Object::new(rock(100), TilePos::new(3, 2), &mut rng)];
    let mut enemy = zombie_at(DVec2::new(2.8, 2.5), DVec2::new(10.5, 2.5));

    enemy.update(0.05, &mut objects, &mut []);
    let x = enemy.pos().x;
    enemy.update(0.05, &mut objects, &mut []);
    assert!(enemy.pos().x < x);
}

#[test]
fn test_enemy_phase_through_tags() {
    let mut rng = rng();
    let tree = Arc::new(
        ObjMeta::new("tree", "Tree", (1, 1))
            .with_hp(10)
            .with_tags(&["tree"]),
    );
    let castle = DVec2::new(10.5, 2.5);

    let mut objects = vec![Object::new(Arc::clone(&tree), TilePos::new(3, 2), &mut rng)];
    let mut skeleton = Enemy::new(EnemyKind::Skeleton, DVec2::new(3.5, 2.5), castle, None);
    skeleton.update(0.05, &mut objects, &mut []);
    assert_eq!(skeleton.collided, None);
    assert_eq!(objects[0].hp, 10);

    let mut zombie = zombie_at(DVec2::new(3.5, 2.5), castle);
    zombie.update(0.05, &mut objects, &mut []);
    assert!(zombie.collided.is_some());
    assert_eq!(objects[0].hp, 9);
}

#[test]
fn test_cloud_phases_through_everything() {
    let mut rng = rng();
    let mut objects = vec![Object::new(rock(10), TilePos::new(3, 2), &mut rng)];
    let mut cloud = Enemy::new(
        EnemyKind::Cloud,
        DVec2::new(3.5, 2.5),
        DVec2::new(10.5, 2.5),
        None,
    );
    cloud.update(0.05, &mut objects, &mut []);
    assert_eq!(cloud.collided, None);
    assert_eq!(objects[0].hp, 10);
}

#[test]
fn test_enemy_shots_do_not_hurt_enemies() {
    let meta = Arc::new(ProjectileMeta::new("orb", 0.0, 3, 5.0));
    let pos = DVec2::new(2.5, 2.5);
    let mut enemy = zombie_at(pos, DVec2::new(10.0, 10.0));
    let mut projectiles = vec![
        Projectile::new(Arc::clone(&meta), pos, 0.0).from_enemy(),
        Projectile::new(meta, pos, 0.0),
    ];

    enemy.update(0.01, &mut [], &mut projectiles);
    assert_eq!(enemy.hp, 4);
    assert!(!projectiles[0].spent);
    assert!(projectiles[1].spent);
}

#[test]
fn test_enemy_attacks_on_clock() {
    let catalog = catalog();
    let castle = DVec2::new(10.0, 10.0);
    let mut witch = catalog.enemy(EnemyKind::Witch, DVec2::new(1.0, 1.0), castle);
    let shots = witch.update(0.01, &mut [], &mut []);
    assert_eq!(shots.len(), 1);
    assert!(shots[0].from_enemy);

    let mut cloud = catalog.enemy(EnemyKind::Cloud, DVec2::new(1.0, 1.0), castle);
    assert_eq!(cloud.update(0.01, &mut [], &mut []).len(), 4);

    let mut poop = catalog.enemy(EnemyKind::Poop, DVec2::new(1.0, 1.0), castle);
    let stink = poop.update(0.01, &mut [], &mut []);
    assert!(stink[0].destroy_everything);

    // The clock was reset; nothing until it expires again.
    assert!(witch.update(0.01, &mut [], &mut []).is_empty());
}

#[test]
fn test_water_halves_enemy_speed() {
    let start = TilePos::new(2, 2);
    let castle = DVec2::new(9.5, 2.5);

    let mut dry = empty_map(10, 10);
    dry.add_enemy(zombie_at(start.center(), castle));
    let mut wet = Map::new(GridSize::new(10, 10), vec![start], Biome::barren());
    wet.add_enemy(zombie_at(start.center(), castle));

    systems::enemies::run(&mut dry, 0.1);
    systems::enemies::run(&mut wet, 0.1);

    let dry_moved = dry.enemies[0].pos().distance(start.center());
    let wet_moved = wet.enemies[0].pos().distance(start.center());
    assert!((wet_moved - dry_moved * WATER_TIME_SCALE).abs() < 1e-12);
}

// ---- Waves ----

#[test]
fn test_wave_escalation_is_monotonic_and_capped() {
    let mut rng = rng();
    let mut entry = WaveEnemy::new(EnemyKind::Zombie, 2, 3, 10, (1, 3));

    for _ in 0..30 {
        let before = entry.amount;
        entry.next_wave(&mut rng);
        if entry.wave <= entry.starting_wave {
            assert_eq!(entry.amount, before);
        }
        assert!(entry.amount >= before);
        assert!(entry.amount <= entry.max_amount);
    }
    assert_eq!(entry.amount, 10);
}

#[test]
fn test_spawn_list_only_includes_started_enemies() {
    let mut rng = rng();
    let mut wave = Wave::new(vec![
        WaveEnemy::new(EnemyKind::Zombie, 1, 3, 30, (0, 0)),
        WaveEnemy::new(EnemyKind::Skeleton, 2, 2, 20, (0, 0)),
    ]);

    wave.next_wave(&mut rng);
    let first = wave.get_spawn_list(&mut rng);
    assert_eq!(first, vec![EnemyKind::Zombie; 3]);

    wave.next_wave(&mut rng);
    let second = wave.get_spawn_list(&mut rng);
    assert_eq!(second.len(), 5);
    assert_eq!(
        second.iter().filter(|k| **k == EnemyKind::Skeleton).count(),
        2
    );
}

#[test]
fn test_wave_director_cycle() {
    let mut rng = rng();
    let catalog = catalog();
    let mut map = empty_map(6, 6);
    let wave = Wave::new(vec![WaveEnemy::new(EnemyKind::Zombie, 1, 2, 2, (0, 0))]);
    let mut director = systems::waves::WaveDirector::new(wave, 1.0);
    let castle = DVec2::new(3.0, 3.0);

    let events = systems::waves::run(&mut director, &mut map, &catalog, castle, 0.5, &mut rng);
    assert!(events.is_empty());

    let events = systems::waves::run(&mut director, &mut map, &catalog, castle, 0.5, &mut rng);
    assert_eq!(events, vec![GameEvent::WaveStarted { wave: 1, enemies: 2 }]);

    for _ in 0..10 {
        systems::waves::run(&mut director, &mut map, &catalog, castle, 1.5, &mut rng);
    }
    assert_eq!(map.enemies.len(), 2);
    assert!(director.spawn_list.is_empty());
    let edges = map.edge_tiles();
    assert!(map
        .enemies
        .iter()
        .all(|e| edges.contains(&TilePos::containing(e.pos()))));

    map.enemies.clear();
    let events = systems::waves::run(&mut director, &mut map, &catalog, castle, 0.1, &mut rng);
    assert_eq!(events, vec![GameEvent::WaveCleared { wave: 1 }]);
    assert_eq!(
        director.phase,
        WavePhase::Intermission {
            timeout: WAVE_RESET_TIMEOUT
        }
    );
}

// ---- Economy ----

#[test]
fn test_cursor_thresholds_apply_exactly_once() {
    let mut cursor = Cursor::new(vec![
        CursorUpgrade {
            kills: 2,
            damage: 1,
            cooldown: 0.0,
        },
        CursorUpgrade {
            kills: 4,
            damage: 2,
            cooldown: 0.5,
        },
    ]);

    assert_eq!(cursor.next_upgrade().map(|u| u.kills), Some(2));
    assert!(!cursor.kill());
    assert!(cursor.kill());
    assert_eq!(cursor.damage, CURSOR_BASE_DAMAGE + 1);
    assert_eq!(cursor.next_upgrade().map(|u| u.kills), Some(4));
    assert!(!cursor.kill());
    assert_eq!(cursor.damage, CURSOR_BASE_DAMAGE + 1);
    assert!(cursor.kill());
    assert_eq!(cursor.damage, CURSOR_BASE_DAMAGE + 3);
    assert_eq!(cursor.cooldown, CURSOR_BASE_COOLDOWN - 0.5);

    assert!(cursor.next_upgrade().is_none());

    for _ in 0..20 {
        assert!(!cursor.kill());
    }
    assert_eq!(cursor.level, 2);
    assert_eq!(cursor.damage, CURSOR_BASE_DAMAGE + 3);
}

#[test]
fn test_cursor_cooldown_floor() {
    let mut cursor = Cursor::new(vec![CursorUpgrade {
        kills: 1,
        damage: 0,
        cooldown: 5.0,
    }]);
    cursor.kill();
    assert_eq!(cursor.cooldown, CURSOR_MIN_COOLDOWN);

    cursor.trigger();
    assert!(!cursor.ready());
    cursor.update(1.0);
    assert!(cursor.ready());
}

#[test]
fn test_limited_builder_exhausts() {
    let catalog = catalog();
    let mut shop = crate::economy::Shop::new(catalog.shop().to_vec(), 0, 100);
    let index = catalog
        .shop()
        .iter()
        .position(|o| o.template.key == "landmine")
        .unwrap();
    let mut builder = shop.start_building(index).unwrap();
    assert_eq!(builder.remaining, Some(3));

    for _ in 0..3 {
        assert!(builder.placed(&mut shop));
    }
    assert!(builder.exhausted());
    assert!(!builder.placeable(&shop));
    assert!(!builder.placed(&mut shop));
    assert_eq!(shop.crystals, 100 - 3 * 4);
}

// ---- Map ----

#[test]
fn test_can_place_checks_bounds_occupancy_and_water() {
    let mut rng = rng();
    let mut map = Map::new(
        GridSize::new(5, 5),
        vec![TilePos::new(0, 4)],
        Biome::barren(),
    );
    map.add_object(Object::new(rock(1), TilePos::new(2, 2), &mut rng));
    let tall = ObjMeta::new("pine", "Pine", (1, 2));

    assert!(map.can_place(&tall, TilePos::new(1, 1)));
    assert!(!map.can_place(&tall, TilePos::new(2, 1)));
    assert!(!map.can_place(&tall, TilePos::new(0, 3)));
    assert!(!map.can_place(&tall, TilePos::new(4, 4)));
    assert!(!map.can_place(&tall, TilePos::new(-1, 0)));
}

#[test]
fn test_occupancy_rebuilt_on_removal() {
    let mut rng = rng();
    let mut map = empty_map(5, 5);
    let id = map.add_object(Object::new(rock(1), TilePos::new(1, 1), &mut rng));
    assert!(map.is_occupied(TilePos::new(1, 1)));
    map.remove_objects(&[id]);
    assert!(!map.is_occupied(TilePos::new(1, 1)));
}

#[test]
fn test_edge_tiles_ring() {
    let map = empty_map(5, 4);
    let edges = map.edge_tiles();
    assert_eq!(edges.len(), 14);
    for tile in &edges {
        assert!(tile.x == 0 || tile.y == 0 || tile.x == 4 || tile.y == 3);
    }
    let mut unique = edges.clone();
    unique.sort_by_key(|t| (t.x, t.y));
    unique.dedup();
    assert_eq!(unique.len(), edges.len());
}

#[test]
fn test_spawn_tile_accepts_occupied_after_retries() {
    let mut rng = rng();
    let mut map = empty_map(3, 3);
    for tile in map.edge_tiles() {
        map.add_object(Object::new(rock(1), tile, &mut rng));
    }
    let tile = map.random_spawn_tile(&mut rng).unwrap();
    assert!(map.is_occupied(tile));
}

#[test]
fn test_populate_skips_water() {
    let mut rng = rng();
    let grass = Arc::new(ObjMeta::new("grass", "Grass", (1, 1)).walkable());
    let biome = Biome::new(vec![(grass, 1.0)], 0.0, 0.0).unwrap();
    let mut map = Map::new(GridSize::new(3, 3), vec![TilePos::new(1, 1)], biome);

    assert_eq!(map.populate_empty(1.0, &mut rng), 8);
    assert!(map.object_at(TilePos::new(1, 1)).is_none());
    let delays: Vec<f64> = map.objects.iter().map(|o| o.intro.delay).collect();
    assert_eq!(delays[0], 0.0);
    assert!((delays[1] - INTRO_STAGGER_SECS).abs() < 1e-12);
    assert!(delays.windows(2).all(|w| w[0] < w[1]));
}

// ---- Catalog ----

#[test]
fn test_catalog_unknown_projectile() {
    let mut pack = Datapack::builtin().unwrap();
    pack.objects.get_mut("small_tower").unwrap().behavior = Some(BehaviorDef::Tower {
        range: 3.0,
        projectile: "ballista".to_owned(),
        ignore_tags: Vec::new(),
    });
    let err = Catalog::from_datapack(&pack).unwrap_err();
    assert!(matches!(err, DatapackError::UnknownProjectile(ref key) if key == "ballista"));
}

#[test]
fn test_catalog_unknown_shop_object() {
    let mut pack = Datapack::builtin().unwrap();
    pack.shop.push(ShopOfferDef {
        object: "moat".to_owned(),
        wood: 1,
        crystals: 0,
        limit: None,
    });
    let err = Catalog::from_datapack(&pack).unwrap_err();
    assert!(matches!(err, DatapackError::UnknownShopObject(_)));
}

#[test]
fn test_catalog_unknown_biome_object() {
    let mut pack = Datapack::builtin().unwrap();
    pack.biomes.get_mut("default").unwrap().objects.push(BiomeEntryDef {
        object: "cactus".to_owned(),
        weight: 1.0,
    });
    let err = Catalog::from_datapack(&pack).unwrap_err();
    assert!(matches!(err, DatapackError::UnknownObject(_)));
}

#[test]
fn test_catalog_rejects_zero_weights() {
    let mut pack = Datapack::builtin().unwrap();
    for entry in &mut pack.biomes.get_mut("rocky").unwrap().objects {
        entry.weight = 0.0;
    }
    let err = Catalog::from_datapack(&pack).unwrap_err();
    assert!(matches!(err, DatapackError::InvalidWeights(ref key) if key == "rocky"));
}

#[test]
fn test_catalog_rejects_unsorted_cursor_upgrades() {
    let mut pack = Datapack::builtin().unwrap();
    pack.waves
        .get_mut("default")
        .unwrap()
        .cursor_upgrades
        .swap(0, 1);
    let err = Catalog::from_datapack(&pack).unwrap_err();
    assert!(matches!(err, DatapackError::UnsortedCursorUpgrades(_)));
}

#[test]
fn test_catalog_unknown_enemy_falls_back_to_zombie() {
    let mut pack = Datapack::builtin().unwrap();
    pack.waves.get_mut("default").unwrap().enemies[1].enemy = "dragon".to_owned();
    let preset = Catalog::from_datapack(&pack)
        .unwrap()
        .wave_preset("default")
        .unwrap();
    assert_eq!(preset.enemies[1].kind, EnemyKind::Zombie);
}

#[test]
fn test_catalog_footprint_defaults_to_full_rect() {
    let catalog = catalog();
    let large = catalog.object("large_tower").unwrap();
    assert_eq!(large.tiles.len(), 4);
    assert!(matches!(
        catalog.object("drawbridge"),
        Err(DatapackError::UnknownObject(_))
    ));
}

#[test]
fn test_catalog_lookups() {
    let catalog = catalog();
    let arrow = catalog.projectile("arrow").unwrap();
    assert!(arrow.rotate);
    assert_eq!(arrow.damage, 1);

    let wave = catalog.wave("hard").unwrap();
    assert_eq!(wave.number, 0);
    assert_eq!(wave.enemies.len(), 5);
    assert!(matches!(
        catalog.wave("nightmare"),
        Err(DatapackError::UnknownWavePreset(_))
    ));
}

#[test]
fn test_hand_built_tower_template() {
    let mut rng = rng();
    let bolt = Arc::new(ProjectileMeta::new("bolt", 5.0, 4, 1.0));
    let meta = Arc::new(
        ObjMeta::new("ballista", "Ballista", (1, 1))
            .with_images(&["ballista.png"])
            .with_tags(&["tower"])
            .with_hp(12)
            .sellable()
            .clickable()
            .with_yields(6, 1)
            .with_behavior(
                0.5,
                ObjBehavior::Tower {
                    range: 2.0,
                    projectile: bolt,
                    ignore_tags: vec!["wall".to_owned()],
                },
            ),
    );
    assert!(meta.player_sell && meta.player_damage);
    assert_eq!((meta.wood, meta.crystals), (6, 1));

    let mut tower = Object::new(meta, TilePos::new(0, 0), &mut rng);
    assert_eq!(tower.image, "ballista.png");
    let enemies = vec![zombie_at(DVec2::new(1.5, 0.5), DVec2::new(9.0, 9.0))];
    assert!(tower.update(0.25, &enemies, &mut rng).is_empty());
    let events = tower.update(0.25, &enemies, &mut rng);
    let ObjectEvent::SpawnProjectile(shot) = &events[0] else {
        panic!("tower should fire once its clock expires");
    };
    assert_eq!(shot.damage, 4);
    assert!(shot.phase_through.contains(&"wall".to_owned()));
}

// ---- Camera & cheats ----

#[test]
fn test_camera_centers_map() {
    let camera = Camera::centered(GridSize::new(10, 10), DVec2::new(640.0, 480.0));
    assert_eq!(camera.offset, DVec2::new(160.0, 80.0));
    assert_eq!(camera.screen_to_map(DVec2::new(160.0, 80.0)), DVec2::ZERO);
    assert_eq!(camera.map_to_screen(DVec2::new(1.0, 1.0)), DVec2::new(192.0, 112.0));
}

#[test]
fn test_camera_zoom_keeps_anchor() {
    let mut camera = Camera::centered(GridSize::new(10, 10), DVec2::new(640.0, 480.0));
    let anchor = DVec2::new(400.0, 300.0);
    let pinned = camera.screen_to_map(anchor);

    camera.zoom_at(3.0, anchor);
    assert!((camera.zoom - (1.0 + 3.0 * ZOOM_STEP)).abs() < 1e-12);
    assert!(camera.screen_to_map(anchor).distance(pinned) < 1e-9);

    camera.zoom_at(100.0, anchor);
    assert_eq!(camera.zoom, ZOOM_MAX);
    camera.zoom_at(-100.0, anchor);
    assert_eq!(camera.zoom, ZOOM_MIN);
}

#[test]
fn test_camera_middle_drag() {
    let mut camera = Camera::centered(GridSize::new(10, 10), DVec2::new(640.0, 480.0));
    let start = camera.offset;
    camera.drag(DVec2::new(100.0, 100.0), true);
    camera.drag(DVec2::new(130.0, 90.0), true);
    camera.drag(DVec2::new(500.0, 500.0), false);
    assert_eq!(camera.offset, start + DVec2::new(30.0, -10.0));
}

#[test]
fn test_cheat_buffer_matches_suffix() {
    let mut buffer = CheatBuffer::default();
    let mut found = None;
    for ch in "xyzqqqqqqqqqqqqqqshinies".chars() {
        if let Some(code) = buffer.push(ch) {
            found = Some(code);
        }
    }
    assert_eq!(found, Some(CheatCode::Shinies));

    for ch in "smit".chars() {
        assert_eq!(buffer.push(ch), None);
    }
    assert_eq!(buffer.push('e'), Some(CheatCode::Smite));
}

// ---- Game ----

#[test]
fn test_game_new_validates_layout() {
    let pack = Datapack::builtin().unwrap();
    let empty = GameConfig {
        map_size: GridSize::new(0, 10),
        ..Default::default()
    };
    assert!(matches!(
        Game::new(empty, &pack).err(),
        Some(DatapackError::InvalidMapSize { .. })
    ));

    let outside = GameConfig {
        map_size: GridSize::new(10, 10),
        castle_pos: TilePos::new(8, 8),
        ..Default::default()
    };
    assert!(matches!(
        Game::new(outside, &pack).err(),
        Some(DatapackError::CastleOutOfBounds { x: 8, y: 8 })
    ));

    let swamp = GameConfig {
        biome: "swamp".to_owned(),
        ..Default::default()
    };
    assert!(matches!(
        Game::new(swamp, &pack).err(),
        Some(DatapackError::UnknownBiome(_))
    ));
}

#[test]
fn test_game_places_castle() {
    let game = Game::with_builtin(GameConfig::default()).unwrap();
    let castle = game.map().object(game.castle()).unwrap();
    assert_eq!(castle.hp, CASTLE_HP);
    assert_eq!(castle.meta.size, CASTLE_SIZE);
    assert!(castle.tags.contains(&"castle".to_owned()));
    assert!(game.map().objects.len() > 1, "biome should populate the map");
}

#[test]
fn test_determinism_same_seed() {
    let config = GameConfig {
        seed: 12345,
        first_wave_timeout: 2.0,
        ..Default::default()
    };
    let mut game_a = Game::with_builtin(config.clone()).unwrap();
    let mut game_b = Game::with_builtin(config).unwrap();
    let idle = InputFrame::default();

    for _ in 0..600 {
        let events_a = game_a.update(1.0 / 30.0, &idle);
        let events_b = game_b.update(1.0 / 30.0, &idle);
        assert_eq!(events_a, events_b);

        let json_a = serde_json::to_string(&game_a.snapshot()).unwrap();
        let json_b = serde_json::to_string(&game_b.snapshot()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
    assert!(game_a.director().wave.number >= 1);
}

#[test]
fn test_determinism_different_seeds() {
    let game_a = Game::with_builtin(GameConfig {
        seed: 111,
        ..Default::default()
    })
    .unwrap();
    let game_b = Game::with_builtin(GameConfig {
        seed: 222,
        ..Default::default()
    })
    .unwrap();

    let json_a = serde_json::to_string(&game_a.snapshot()).unwrap();
    let json_b = serde_json::to_string(&game_b.snapshot()).unwrap();
    assert_ne!(json_a, json_b, "Different seeds should populate differently");
}

#[test]
fn test_click_harvests_object() {
    let mut game = clear_game(0);
    let mut rng = rng();
    let tree = game.catalog().object("tree").unwrap();
    let tile = TilePos::new(2, 2);
    game.map_mut().add_object(Object::new(tree, tile, &mut rng));
    let at = screen_of(&game, tile);

    game.update(0.5, &InputFrame::click_at(at));
    assert_eq!(game.map().object_at(tile).unwrap().hp, 2);

    // Still cooling down: the click only wobbles the tree.
    game.update(0.5, &InputFrame::click_at(at));
    assert_eq!(game.map().object_at(tile).unwrap().hp, 2);

    game.update(0.5, &InputFrame::click_at(at));
    assert_eq!(game.map().object_at(tile).unwrap().hp, 1);
    game.update(0.5, &InputFrame::idle_at(at));

    let events = game.update(0.5, &InputFrame::click_at(at));
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::ObjectHarvested { wood: 2, .. }
    )));
    assert_eq!(game.shop().wood, 2);
    assert!(game.map().object_at(tile).is_none());
}

#[test]
fn test_click_kill_credits_reward_and_kill() {
    let mut game = clear_game(0);
    let tile = TilePos::new(2, 2);
    let id = game.spawn_enemy(EnemyKind::Zombie, tile);
    game.map_mut().enemy_mut(id).unwrap().hp = 1;

    let events = game.update(0.1, &InputFrame::click_at(screen_of(&game, tile)));
    assert!(events.contains(&GameEvent::EnemyKilled {
        kind: EnemyKind::Zombie,
        reward: 1
    }));
    assert!(game.map().enemies.is_empty());
    assert_eq!(game.cursor().kills, 1);
    assert_eq!(game.shop().crystals, 1);
    assert_eq!(game.kills_display().target(), 1.0);
}

#[test]
fn test_builder_places_and_rejects() {
    let mut game = clear_game(12);
    game.update(0.1, &InputFrame::typing("1"));
    assert_eq!(game.builder().unwrap().template.key, "wooden_wall");

    let tile = TilePos::new(2, 2);
    let events = game.update(0.1, &InputFrame::click_at(screen_of(&game, tile)));
    assert!(events.iter().any(|e| matches!(e, GameEvent::ObjectPlaced { .. })));
    assert_eq!(game.shop().wood, 7);
    assert_eq!(game.map().object_at(tile).unwrap().meta.key, "wooden_wall");

    // Occupied by the castle: rejected without charge.
    let events = game.update(0.1, &InputFrame::click_at(screen_of(&game, TilePos::new(9, 9))));
    assert!(events.is_empty());
    assert_eq!(game.shop().wood, 7);

    let cancel = InputFrame {
        right_pressed: true,
        ..Default::default()
    };
    game.update(0.1, &cancel);
    assert!(game.builder().is_none());
}

#[test]
fn test_hold_to_sell_refunds() {
    let mut game = clear_game(5);
    let mut rng = rng();
    let wall = game.catalog().object("wooden_wall").unwrap();
    let tile = TilePos::new(3, 3);
    game.map_mut().add_object(Object::new(wall, tile, &mut rng));
    let at = screen_of(&game, tile);

    game.update(0.5, &InputFrame::click_at(at));
    assert!(game.map().object_at(tile).is_some());
    assert_eq!(game.snapshot().hud.sell_progress, 0.5);

    let events = game.update(0.5, &held_at(at));
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::ObjectSold { wood: 3, .. }
    )));
    assert!(game.map().object_at(tile).is_none());
    assert_eq!(game.shop().wood, 8);
}

#[test]
fn test_placing_last_limited_item_does_not_start_a_sell() {
    let mut game = clear_game(0);
    game.shop_mut().add_crystals(100);
    game.update(0.1, &InputFrame::typing("6"));
    assert_eq!(game.builder().unwrap().template.key, "landmine");

    let tiles = [TilePos::new(0, 0), TilePos::new(1, 0), TilePos::new(2, 0)];
    for tile in tiles {
        game.update(1.0 / 60.0, &InputFrame::click_at(screen_of(&game, tile)));
    }
    assert!(game.builder().is_none(), "limit of three reached");
    assert_eq!(game.shop().crystals, 88);

    let last = screen_of(&game, tiles[2]);
    for _ in 0..70 {
        let events = game.update(1.0 / 60.0, &held_at(last));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::ObjectSold { .. })));
    }
    assert!(game.sell_hold().is_none());
    assert!(game.map().object_at(tiles[2]).is_some());

    // A fresh press on the same mine sells it.
    game.update(0.1, &InputFrame::idle_at(last));
    game.update(0.6, &held_at(last));
    let events = game.update(0.6, &held_at(last));
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::ObjectSold { crystals: 1, .. }
    )));
    assert!(game.map().object_at(tiles[2]).is_none());
}

#[test]
fn test_sell_resets_when_released() {
    let mut game = clear_game(0);
    let mut rng = rng();
    let wall = game.catalog().object("wooden_wall").unwrap();
    let tile = TilePos::new(3, 3);
    game.map_mut().add_object(Object::new(wall, tile, &mut rng));
    let at = screen_of(&game, tile);

    game.update(0.6, &held_at(at));
    game.update(0.1, &InputFrame::idle_at(at));
    game.update(0.6, &held_at(at));
    assert!(game.map().object_at(tile).is_some());
}

#[test]
fn test_castle_is_not_clickable_or_sellable() {
    let mut game = clear_game(0);
    let at = screen_of(&game, TilePos::new(9, 9));
    for _ in 0..10 {
        game.update(0.5, &held_at(at));
    }
    let castle = game.map().object(game.castle()).unwrap();
    assert_eq!(castle.hp, CASTLE_HP);
}

#[test]
fn test_escape_toggles_pause() {
    let mut game = clear_game(0);
    let escape = InputFrame {
        keys_down: vec![Key::Escape],
        ..Default::default()
    };

    let events = game.update(0.1, &escape);
    assert_eq!(events, vec![GameEvent::Paused]);
    assert_eq!(game.phase(), GamePhase::Paused);
    let frozen = game.time();

    game.update(0.1, &InputFrame::default());
    assert_eq!(game.time().frame, frozen.frame);

    let events = game.update(0.1, &escape);
    assert_eq!(events, vec![GameEvent::Resumed]);
    assert_eq!(game.time().frame, frozen.frame + 1);
}

#[test]
fn test_space_skips_intermission() {
    let mut game = clear_game(0);
    let space = InputFrame {
        keys_down: vec![Key::Space],
        ..Default::default()
    };
    let events = game.update(0.1, &space);
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::WaveStarted { wave: 1, .. })));
    assert!(game.director().is_active());
}

#[test]
fn test_currency_cheats() {
    let mut game = clear_game(0);
    let events = game.update(0.1, &InputFrame::typing("gimmewood"));
    assert_eq!(
        events,
        vec![GameEvent::CheatActivated {
            code: "gimmewood".to_owned()
        }]
    );
    assert_eq!(game.shop().wood, CHEAT_CURRENCY_GRANT);

    game.update(0.1, &InputFrame::typing("shinies"));
    assert_eq!(game.shop().crystals, CHEAT_CURRENCY_GRANT);
}

#[test]
fn test_smite_kills_without_reward() {
    let mut game = clear_game(0);
    for x in 0..3 {
        game.spawn_enemy(EnemyKind::Zombie, TilePos::new(x, 0));
    }
    let events = game.update(0.1, &InputFrame::typing("smite"));
    assert!(game.map().enemies.is_empty());
    assert_eq!(game.cursor().kills, 0);
    assert_eq!(game.shop().crystals, 0);
    assert!(!events
        .iter()
        .any(|e| matches!(e, GameEvent::EnemyKilled { .. })));
}

#[test]
fn test_castle_destruction_ends_run() {
    let mut game = clear_game(0);
    let castle = game.castle();
    game.map_mut().object_mut(castle).unwrap().damage(CASTLE_HP);

    let events = game.update(0.1, &InputFrame::default());
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::RunEnded { .. })));
    assert_eq!(game.phase(), GamePhase::GameOver);

    let frozen = game.time();
    game.update(0.1, &InputFrame::default());
    assert_eq!(game.time().frame, frozen.frame);
}

#[test]
fn test_hover_prefers_enemy_and_fades_in() {
    let mut game = clear_game(0);
    let mut rng = rng();
    let tile = TilePos::new(2, 2);
    let grass = game.catalog().object("grass").unwrap();
    game.map_mut().add_object(Object::new(grass, tile, &mut rng));
    let at = screen_of(&game, tile);

    game.update(0.1, &InputFrame::idle_at(at));
    let hover = game.hover().unwrap();
    assert!(matches!(hover.target, HoverTarget::Object(_)));
    assert_eq!(hover.fade, 0.0);

    game.update(0.1, &InputFrame::idle_at(at));
    assert!((game.hover().unwrap().fade - 0.1 * POPUP_FADE_RATE).abs() < 1e-12);

    let id = game.spawn_enemy(EnemyKind::Witch, tile);
    game.update(0.01, &InputFrame::idle_at(at));
    assert_eq!(game.hover().unwrap().target, HoverTarget::Enemy(id));
    let view = game.snapshot().hover.unwrap();
    assert_eq!(view.kind, HoverKind::Enemy);
    assert!(view.subtitle.is_some());
}

#[test]
fn test_snapshot_reports_builder_preview() {
    let mut game = clear_game(0);
    game.update(0.1, &InputFrame::typing("3"));
    game.update(0.1, &InputFrame::idle_at(screen_of(&game, TilePos::new(1, 1))));

    let builder = game.snapshot().builder.unwrap();
    assert_eq!(builder.name, "Small Tower");
    assert_eq!(builder.tile, Some(TilePos::new(1, 1)));
    assert!(!builder.placeable, "cannot afford with an empty wallet");
}

#[test]
fn test_snapshot_reports_next_cursor_upgrade() {
    let game = clear_game(0);
    let hud = game.snapshot().hud;
    assert_eq!(hud.cursor_level, 0);
    assert_eq!(hud.next_upgrade_kills, Some(10));
}
