//! Game engine: the per-frame orchestrator.
//!
//! `Game` owns the map, the wave director and the economy, turns each
//! [`InputFrame`] into intents, runs the systems in a fixed order and
//! produces [`GameSnapshot`]s. Completely headless: no renderer, no window,
//! no wall clock.

use std::sync::Arc;

use glam::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use bulwark_core::commands::InputFrame;
use bulwark_core::constants::*;
use bulwark_core::datapack::{Datapack, DatapackError};
use bulwark_core::enums::{EnemyKind, GamePhase, Key};
use bulwark_core::events::{GameEvent, RunSummary};
use bulwark_core::smooth::SValue;
use bulwark_core::state::GameSnapshot;
use bulwark_core::types::{GridSize, SimTime, TilePos};

use crate::camera::Camera;
use crate::catalog::{Catalog, ObjMeta};
use crate::cheats::{CheatBuffer, CheatCode};
use crate::economy::{Builder, Cursor, Shop};
use crate::enemy::{Enemy, EnemyId};
use crate::map::Map;
use crate::object::{Object, ObjectId};
use crate::systems;
use crate::systems::waves::WaveDirector;
use crate::wave::Wave;

/// Configuration for starting a new game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// RNG seed for determinism. Same seed = same game.
    pub seed: u64,
    pub map_size: GridSize,
    /// Top-left tile of the castle.
    pub castle_pos: TilePos,
    /// Biome key in the datapack.
    pub biome: String,
    /// Wave preset key in the datapack.
    pub wave_preset: String,
    pub starting_wood: u32,
    pub starting_crystals: u32,
    /// Impassable water tiles of the map layout.
    pub water: Vec<TilePos>,
    /// Intermission before the first wave (seconds).
    pub first_wave_timeout: f64,
    /// Screen size in pixels, used to center the camera.
    pub viewport: DVec2,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            map_size: GridSize::new(25, 25),
            castle_pos: TilePos::new(11, 11),
            biome: "default".to_owned(),
            wave_preset: "default".to_owned(),
            starting_wood: 0,
            starting_crystals: 0,
            water: Vec::new(),
            first_wave_timeout: FIRST_WAVE_TIMEOUT,
            viewport: DVec2::new(1280.0, 720.0),
        }
    }
}

/// What the hover popup points at. Revalidated every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    Object(ObjectId),
    Enemy(EnemyId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hover {
    pub target: HoverTarget,
    /// Linear fade-in key, 0.0 to 1.0.
    pub fade: f64,
}

/// Progress of a hold-to-sell on one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SellHold {
    pub target: ObjectId,
    pub held: f64,
}

/// A running game session.
pub struct Game {
    catalog: Catalog,
    map: Map,
    director: WaveDirector,
    cursor: Cursor,
    shop: Shop,
    builder: Option<Builder>,
    camera: Camera,
    cheats: CheatBuffer,
    hover: Option<Hover>,
    sell: Option<SellHold>,
    /// The primary button went down on a click that did something; no sell
    /// hold starts until it is released.
    press_consumed: bool,
    /// Pointer position in map space.
    pointer: DVec2,
    kills_display: SValue,
    castle: ObjectId,
    castle_center: DVec2,
    phase: GamePhase,
    time: SimTime,
    rng: ChaCha8Rng,
}

impl Game {
    /// Create a game from `pack`, failing on any dangling datapack key or a
    /// layout the castle does not fit in.
    pub fn new(config: GameConfig, pack: &Datapack) -> Result<Self, DatapackError> {
        let size = config.map_size;
        if size.width <= 0 || size.height <= 0 {
            return Err(DatapackError::InvalidMapSize {
                width: size.width,
                height: size.height,
            });
        }

        let castle_meta = Arc::new(ObjMeta::castle());
        if !castle_meta
            .footprint(config.castle_pos)
            .all(|tile| size.contains(tile))
        {
            return Err(DatapackError::CastleOutOfBounds {
                x: config.castle_pos.x,
                y: config.castle_pos.y,
            });
        }

        let catalog = Catalog::from_datapack(pack)?;
        let biome = catalog.biome(&config.biome)?;
        let preset = catalog.wave_preset(&config.wave_preset)?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut map = Map::new(size, config.water, biome);

        let castle_obj = Object::new(castle_meta, config.castle_pos, &mut rng);
        let castle_center = castle_obj.center();
        let castle = map.add_object(castle_obj);
        map.populate_empty(1.0, &mut rng);

        let shop = Shop::new(
            catalog.shop().to_vec(),
            config.starting_wood,
            config.starting_crystals,
        );

        Ok(Self {
            director: WaveDirector::new(Wave::new(preset.enemies), config.first_wave_timeout),
            cursor: Cursor::new(preset.cursor_upgrades),
            shop,
            builder: None,
            camera: Camera::centered(size, config.viewport),
            cheats: CheatBuffer::default(),
            hover: None,
            sell: None,
            press_consumed: false,
            pointer: DVec2::splat(-1.0),
            kills_display: SValue::new(0.0, COUNTER_SMOOTHNESS, 0),
            castle,
            castle_center,
            phase: GamePhase::Running,
            time: SimTime::default(),
            rng,
            catalog,
            map,
        })
    }

    /// Create a game from the datapack shipped with the game.
    pub fn with_builtin(config: GameConfig) -> Result<Self, DatapackError> {
        Self::new(config, &Datapack::builtin()?)
    }

    /// Advance one frame of `dt` seconds and return what happened.
    pub fn update(&mut self, dt: f64, input: &InputFrame) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.process_input(dt, input, &mut events);

        if self.phase == GamePhase::Running {
            self.run_systems(dt, &mut events);
            self.time.advance(dt);
        }

        events
    }

    /// Drawable state of the current frame.
    pub fn snapshot(&self) -> GameSnapshot {
        systems::snapshot::build_snapshot(self)
    }

    /// Final statistics handed to the scene manager.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            kills: self.cursor.kills,
            wave: self.director.wave.number,
            wood: self.shop.wood,
            crystals: self.shop.crystals,
            cursor_level: self.cursor.level,
            elapsed_secs: self.time.elapsed_secs,
        }
    }

    /// Pause a running game. Returns `false` if it was not running.
    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.phase = GamePhase::Paused;
        true
    }

    /// Resume a paused game. Returns `false` if it was not paused.
    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.phase = GamePhase::Running;
        true
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    pub fn director(&self) -> &WaveDirector {
        &self.director
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn shop(&self) -> &Shop {
        &self.shop
    }

    pub fn shop_mut(&mut self) -> &mut Shop {
        &mut self.shop
    }

    pub fn builder(&self) -> Option<&Builder> {
        self.builder.as_ref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn hover(&self) -> Option<Hover> {
        self.hover
    }

    pub fn sell_hold(&self) -> Option<SellHold> {
        self.sell
    }

    pub fn kills_display(&self) -> &SValue {
        &self.kills_display
    }

    pub fn pointer(&self) -> DVec2 {
        self.pointer
    }

    /// Id of the castle object.
    pub fn castle(&self) -> ObjectId {
        self.castle
    }

    pub fn castle_center(&self) -> DVec2 {
        self.castle_center
    }

    /// Spawn an enemy of `kind` at the center of `tile`.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, tile: TilePos) -> EnemyId {
        let enemy: Enemy = self.catalog.enemy(kind, tile.center(), self.castle_center);
        self.map.add_enemy(enemy)
    }

    /// Open a placement transaction for shop offer `index`.
    pub fn select_offer(&mut self, index: usize) -> bool {
        self.builder = self.shop.start_building(index);
        self.builder.is_some()
    }

    fn process_input(&mut self, dt: f64, input: &InputFrame, events: &mut Vec<GameEvent>) {
        if self.phase == GamePhase::GameOver {
            return;
        }

        self.camera.drag(input.pointer, input.middle_held);
        self.camera.zoom_at(input.wheel, input.pointer);
        let pan = held_pan_direction(input);
        if pan != DVec2::ZERO {
            self.camera.pan(-pan * CAMERA_PAN_SPEED * dt);
        }
        self.pointer = self.camera.screen_to_map(input.pointer);

        if input.key_down(Key::Escape) && self.builder.take().is_none() {
            if self.pause() {
                events.push(GameEvent::Paused);
            } else if self.resume() {
                events.push(GameEvent::Resumed);
            }
        }

        self.update_hover(dt);

        if self.phase != GamePhase::Running {
            self.sell = None;
            self.press_consumed = false;
            return;
        }

        if input.key_down(Key::Space) {
            self.director.skip_intermission();
        }

        for key in &input.keys_down {
            let Key::Char(ch) = *key else {
                continue;
            };
            match ch.to_digit(10) {
                Some(digit) if digit > 0 => {
                    self.select_offer(digit as usize - 1);
                }
                Some(_) => {}
                None => {
                    if let Some(code) = self.cheats.push(ch) {
                        self.apply_cheat(code, events);
                    }
                }
            }
        }

        if input.right_pressed {
            self.builder = None;
        }

        if input.left_pressed {
            self.press_consumed = self.click(events);
        }
        if !input.left_held {
            self.press_consumed = false;
        }

        self.update_sell(input.left_held && !self.press_consumed, dt, events);
    }

    /// Resolve a primary click. Returns `true` if it placed, hit or harvested.
    fn click(&mut self, events: &mut Vec<GameEvent>) -> bool {
        let tile = TilePos::containing(self.pointer);

        if self.builder.is_some() {
            self.place(tile, events);
            return true;
        }

        if let Some(id) = self.map.enemy_at_point(self.pointer).map(|e| e.id) {
            if self.cursor.ready() {
                let damage = self.cursor.damage;
                if let Some(enemy) = self.map.enemy_mut(id) {
                    enemy.damage(damage);
                }
                self.cursor.trigger();
            }
            return true;
        }

        let Some(id) = self
            .map
            .object_at(tile)
            .filter(|obj| obj.meta.player_damage)
            .map(|obj| obj.id)
        else {
            return false;
        };

        let ready = self.cursor.ready();
        let damage = self.cursor.damage;
        let Some(obj) = self.map.object_mut(id) else {
            return false;
        };

        if !ready {
            obj.kick(OBJECT_BLOCKED_KICK);
            return true;
        }

        obj.damage(damage);
        self.cursor.trigger();

        if obj.is_destroyed() {
            let (wood, crystals) = (obj.meta.wood, obj.meta.crystals);
            let event = GameEvent::ObjectHarvested {
                name: obj.meta.name.clone(),
                tile: obj.pos,
                wood,
                crystals,
            };
            self.shop.add_wood(wood);
            self.shop.add_crystals(crystals);
            events.push(event);
        }
        true
    }

    fn place(&mut self, tile: TilePos, events: &mut Vec<GameEvent>) {
        let Some(builder) = self.builder.as_mut() else {
            return;
        };

        if !self.map.can_place(&builder.template, tile) || !builder.placed(&mut self.shop) {
            log::debug!(
                "Rejected placement of `{}` at ({}, {})",
                builder.template.key,
                tile.x,
                tile.y
            );
            return;
        }

        let obj = Object::new(Arc::clone(&builder.template), tile, &mut self.rng);
        let name = builder.template.name.clone();
        let exhausted = builder.exhausted();
        self.map.add_object(obj);
        events.push(GameEvent::ObjectPlaced { name, tile });

        if exhausted {
            self.builder = None;
        }
    }

    fn update_sell(&mut self, held: bool, dt: f64, events: &mut Vec<GameEvent>) {
        if !held || self.builder.is_some() {
            self.sell = None;
            return;
        }

        let tile = TilePos::containing(self.pointer);
        let Some(target) = self
            .map
            .object_at(tile)
            .filter(|obj| obj.meta.player_sell)
            .map(|obj| obj.id)
        else {
            self.sell = None;
            return;
        };

        let held = match self.sell {
            Some(hold) if hold.target == target => hold.held + dt,
            _ => dt,
        };
        if held < SELL_HOLD_SECS {
            self.sell = Some(SellHold { target, held });
            return;
        }

        self.sell = None;
        let Some(obj) = self.map.object(target) else {
            return;
        };
        let (wood, crystals) = (obj.meta.wood, obj.meta.crystals);
        let event = GameEvent::ObjectSold {
            name: obj.meta.name.clone(),
            tile: obj.pos,
            wood,
            crystals,
        };
        self.map.remove_objects(&[target]);
        self.shop.add_wood(wood);
        self.shop.add_crystals(crystals);
        events.push(event);
    }

    fn update_hover(&mut self, dt: f64) {
        let target = self
            .map
            .enemy_at_point(self.pointer)
            .map(|enemy| HoverTarget::Enemy(enemy.id))
            .or_else(|| {
                self.map
                    .object_at(TilePos::containing(self.pointer))
                    .map(|obj| HoverTarget::Object(obj.id))
            });

        self.hover = target.map(|target| {
            let fade = match self.hover {
                Some(hover) if hover.target == target => {
                    (hover.fade + dt * POPUP_FADE_RATE).min(1.0)
                }
                _ => 0.0,
            };
            Hover { target, fade }
        });
    }

    fn apply_cheat(&mut self, code: CheatCode, events: &mut Vec<GameEvent>) {
        log::info!("Cheat `{}` activated", code.word());
        match code {
            CheatCode::GimmeWood => self.shop.add_wood(CHEAT_CURRENCY_GRANT),
            CheatCode::Shinies => self.shop.add_crystals(CHEAT_CURRENCY_GRANT),
            CheatCode::NextWave => {
                self.director.skip_intermission();
            }
            CheatCode::Smite => {
                for enemy in &mut self.map.enemies {
                    enemy.deletable = true;
                }
            }
        }
        events.push(GameEvent::CheatActivated {
            code: code.word().to_owned(),
        });
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64, events: &mut Vec<GameEvent>) {
        // 1. Waves (intermission, spawning, clears)
        events.extend(systems::waves::run(
            &mut self.director,
            &mut self.map,
            &self.catalog,
            self.castle_center,
            dt,
            &mut self.rng,
        ));

        // 2. Objects (clocks, deletions)
        let removed = systems::objects::run(&mut self.map, dt, &mut self.rng);
        if removed.contains(&self.castle) {
            self.end_run(events);
            return;
        }

        // 3. Projectiles
        systems::projectiles::run(&mut self.map, dt);

        // 4. Enemies
        systems::enemies::run(&mut self.map, dt);

        // 5. Cleanup and kill credit
        for enemy in systems::cleanup::run(&mut self.map) {
            if enemy.hp <= 0 {
                self.credit_kill(&enemy, events);
            }
        }

        // 6. Cosmetic and cooldown state
        self.cursor.update(dt);
        self.shop.update_displays(dt);
        self.kills_display.update(dt);
    }

    fn credit_kill(&mut self, enemy: &Enemy, events: &mut Vec<GameEvent>) {
        self.shop.add_crystals(enemy.reward);
        events.push(GameEvent::EnemyKilled {
            kind: enemy.kind,
            reward: enemy.reward,
        });

        if self.cursor.kill() {
            log::info!(
                "Cursor upgraded to level {} at {} kills",
                self.cursor.level,
                self.cursor.kills
            );
            events.push(GameEvent::CursorUpgraded {
                level: self.cursor.level,
            });
        }
        self.kills_display.set(self.cursor.kills as f64);
    }

    fn end_run(&mut self, events: &mut Vec<GameEvent>) {
        self.phase = GamePhase::GameOver;
        self.builder = None;
        self.sell = None;

        let summary = self.summary();
        log::info!(
            "Castle destroyed on wave {} after {:.1}s with {} kills",
            summary.wave,
            summary.elapsed_secs,
            summary.kills
        );
        events.push(GameEvent::RunEnded { summary });
    }
}

/// Unit direction of the held pan keys (WASD or arrows).
fn held_pan_direction(input: &InputFrame) -> DVec2 {
    let mut dir = DVec2::ZERO;
    if input.key_held(Key::Left) || input.key_held(Key::Char('a')) {
        dir.x -= 1.0;
    }
    if input.key_held(Key::Right) || input.key_held(Key::Char('d')) {
        dir.x += 1.0;
    }
    if input.key_held(Key::Up) || input.key_held(Key::Char('w')) {
        dir.y -= 1.0;
    }
    if input.key_held(Key::Down) || input.key_held(Key::Char('s')) {
        dir.y += 1.0;
    }
    dir.normalize_or_zero()
}
