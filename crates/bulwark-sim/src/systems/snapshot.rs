//! Snapshot system: builds a complete GameSnapshot from the game state.
//!
//! Read-only: it never modifies the game.

use glam::DVec2;

use bulwark_core::constants::SELL_HOLD_SECS;
use bulwark_core::enums::HoverKind;
use bulwark_core::state::*;
use bulwark_core::types::TilePos;

use crate::anim::ease_out_quint;
use crate::engine::{Game, Hover, HoverTarget};
use crate::map::Map;

/// Build a complete GameSnapshot from the current game state.
pub fn build_snapshot(game: &Game) -> GameSnapshot {
    let map = game.map();

    GameSnapshot {
        time: game.time(),
        phase: game.phase(),
        objects: build_objects(map),
        enemies: build_enemies(map),
        projectiles: build_projectiles(map),
        hud: build_hud(game),
        hover: game.hover().and_then(|hover| build_hover(map, hover)),
        builder: build_builder(game),
        camera: game.camera().view(),
    }
}

fn build_objects(map: &Map) -> Vec<ObjectView> {
    map.objects
        .iter()
        .map(|obj| ObjectView {
            id: obj.id.0,
            name: obj.meta.name.clone(),
            sprite: obj.image.clone(),
            tile: obj.pos,
            size: obj.meta.size,
            intro: obj.intro.visible_progress(),
            wobble: obj.wobble.magnitude,
            wobble_phase: obj.wobble.phase,
            hp: obj.hp,
            max_hp: obj.max_hp(),
        })
        .collect()
}

fn build_enemies(map: &Map) -> Vec<EnemyView> {
    map.enemies
        .iter()
        .map(|enemy| {
            let stats = enemy.stats();
            EnemyView {
                kind: enemy.kind,
                name: stats.name.to_owned(),
                sprite: stats.sprite.to_owned(),
                pos: enemy.pos(),
                size: DVec2::splat(stats.size),
                flip: enemy.flip(),
                wobble: enemy.wobble.magnitude,
                wobble_phase: enemy.wobble.phase,
                hp: enemy.hp,
                max_hp: enemy.max_hp,
            }
        })
        .collect()
}

fn build_projectiles(map: &Map) -> Vec<ProjectileView> {
    map.projectiles
        .iter()
        .map(|p| ProjectileView {
            sprite: p.meta.image.clone(),
            pos: p.pos(),
            size: p.meta.size,
            rotation: p.rotation(),
            opacity: p.opacity(),
        })
        .collect()
}

fn build_hud(game: &Game) -> HudView {
    let director = game.director();
    let cursor = game.cursor();
    let shop = game.shop();

    HudView {
        wave: director.wave.number,
        wave_phase: Some(director.phase),
        enemies_remaining: (director.spawn_list.len() + game.map().enemies.len()) as u32,
        wood: shop.wood_display.value(),
        crystals: shop.crystals_display.value(),
        kills: game.kills_display().value(),
        cursor_level: cursor.level,
        cursor_damage: cursor.damage,
        next_upgrade_kills: cursor.next_upgrade().map(|upgrade| upgrade.kills),
        cursor_cooldown: cursor.cooldown_fraction(),
        sell_progress: game
            .sell_hold()
            .map(|hold| (hold.held / SELL_HOLD_SECS).clamp(0.0, 1.0))
            .unwrap_or(0.0),
    }
}

/// Resolve the hover handle; a target pruned since the last frame yields no popup.
fn build_hover(map: &Map, hover: Hover) -> Option<HoverView> {
    let fade = ease_out_quint(hover.fade);
    match hover.target {
        HoverTarget::Object(id) => map.object(id).map(|obj| HoverView {
            kind: HoverKind::Object,
            name: obj.meta.name.clone(),
            subtitle: None,
            hp: obj.hp,
            max_hp: obj.max_hp(),
            fade,
        }),
        HoverTarget::Enemy(id) => map.enemy(id).map(|enemy| HoverView {
            kind: HoverKind::Enemy,
            name: enemy.stats().name.to_owned(),
            subtitle: Some(enemy.stats().character.to_owned()),
            hp: enemy.hp,
            max_hp: enemy.max_hp,
            fade,
        }),
    }
}

fn build_builder(game: &Game) -> Option<BuilderView> {
    let builder = game.builder()?;
    let map = game.map();
    let tile = TilePos::containing(game.pointer());
    let on_map = map.size.contains(tile);

    Some(BuilderView {
        name: builder.template.name.clone(),
        sprite: builder.template.images.first().cloned().unwrap_or_default(),
        tile: on_map.then_some(tile),
        size: builder.template.size,
        placeable: on_map
            && map.can_place(&builder.template, tile)
            && builder.placeable(game.shop()),
        remaining: builder.remaining,
    })
}
