//! Per-frame simulation tick
//!
//! Fixed order each frame: host input, risers, match start, contacts, then
//! the win condition. Eliminations therefore always compare against this
//! frame's lava height.

use glam::Vec3;

use super::collision::{below_hazard, clamp_above_hazard, touching};
use super::state::{ActorId, ActorKind, Match, MatchEvent, MatchState};

/// Host input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Positions reported by host physics since the last tick
    pub moves: Vec<(ActorId, Vec3)>,
    /// Player slots that pressed a button this frame
    pub joins: Vec<u32>,
    /// Main menu "play" (Intro -> Game)
    pub start_game: bool,
    /// Results screen "ok" (PostGame -> Intro)
    pub confirm: bool,
    /// Debug tweak of the rise rate
    pub rise_nudge: f32,
}

/// Advance the match by `dt` seconds of unscaled time
pub fn tick(game: &mut Match, input: &TickInput, dt: f32) {
    let dt = dt.max(0.0);

    match game.state() {
        MatchState::Intro if input.start_game => {
            game.set_state(MatchState::Game);
        }
        MatchState::PostGame if input.confirm => {
            game.set_state(MatchState::Intro);
        }
        _ => {}
    }

    if game.state() != MatchState::Game {
        return;
    }

    game.time_ticks += 1;

    for &(id, pos) in &input.moves {
        game.set_actor_position(id, pos);
    }
    for &player_index in &input.joins {
        game.join_player(player_index);
    }
    if input.rise_nudge != 0.0 {
        game.nudge_rise_rate(input.rise_nudge);
    }

    // Hazard time follows slow-motion; the countdown below does not
    let scaled_dt = dt * game.time_scale.scale();

    update_risers(game, scaled_dt);
    update_match_start(game);
    update_hazard_contacts(game);
    update_worm_contacts(game);
    update_worm_transforms(game, scaled_dt);

    game.evaluate_survivors(dt);

    // Ensure deterministic ordering
    game.registry.normalize_order();
}

/// One rate, computed once, applied to lava and camera alike
fn update_risers(game: &mut Match, dt: f32) {
    let lone_survivor_y = if game.is_match_started() {
        game.registry.sole_survivor().map(|a| a.pos.y)
    } else {
        None
    };
    let camera_height = game.camera_height();
    let rate = game.difficulty.evaluate(camera_height, lone_survivor_y, dt);
    game.risers.advance(rate, dt);
    game.rise_rate = rate;
}

/// The lava starts once someone climbs out of the start section
fn update_match_start(game: &mut Match) {
    if game.is_match_started() {
        return;
    }
    let layout = game.layout();
    let climbed = game
        .registry
        .players()
        .any(|a| layout.section_index_at(a.pos.y).is_some_and(|i| i >= 1));
    if climbed {
        game.start_match();
    }
}

fn update_hazard_contacts(game: &mut Match) {
    let hazard = game.hazard_height();

    let burned: Vec<ActorId> = game
        .registry
        .players()
        .filter(|a| below_hazard(a.pos, hazard))
        .map(|a| a.id)
        .collect();
    for id in burned {
        game.eliminate(id);
    }

    // Worms ride the lava surface and wrap across the start section walls
    let mut moved: Vec<(ActorId, Vec3)> = Vec::new();
    for worm in game.registry.worms() {
        let mut pos = clamp_above_hazard(worm.pos, hazard);
        pos.x = game.layout().wrap_x(pos.x);
        if pos != worm.pos {
            moved.push((worm.id, pos));
        }
    }
    for (id, position) in moved {
        game.set_actor_position(id, position);
        game.emit(MatchEvent::ActorRepositioned { id, position });
    }
}

fn update_worm_contacts(game: &mut Match) {
    let radius = game.settings().worm_contact_radius;

    let hunters: Vec<(ActorId, Vec3)> = game
        .registry
        .worms()
        .filter(|w| !w.is_transforming())
        .map(|w| (w.id, w.pos))
        .collect();

    for (worm, worm_pos) in hunters {
        let target = game
            .registry
            .players()
            .find(|p| touching(p.pos, worm_pos, radius))
            .map(|p| p.id);
        if let Some(player) = target {
            game.launch_player(player, worm);
        }
    }
}

fn update_worm_transforms(game: &mut Match, dt: f32) {
    let mut finished: Vec<ActorId> = Vec::new();
    for actor in game.registry.iter_mut() {
        if let ActorKind::Worm {
            transform_remaining: Some(remaining),
        } = &mut actor.kind
        {
            *remaining -= dt;
            if *remaining <= 0.0 {
                finished.push(actor.id);
            }
        }
    }
    for id in finished {
        game.revive(id);
    }
}
