//! Gum Lava entry point
//!
//! Runs a headless match with scripted bots: every player climbs at its own
//! pace until the lava catches up. Pass a settings JSON path to override tuning.

use glam::Vec3;
use gum_lava::consts::*;
use gum_lava::platform::{LogPresenter, flush};
use gum_lava::sim::{ActorId, Match, MatchState, SectionDatabase, TickInput, tick};
use gum_lava::{MatchSettings, SettingsError};

/// Frame time the demo host pretends to render at
const HOST_FRAME: f32 = 1.0 / 45.0;
/// Give up after this much simulated time
const DEMO_TIMEOUT: f32 = 600.0;

/// Scripted local players
struct Bots {
    speeds: Vec<f32>,
}

impl Bots {
    fn new(count: u32) -> Self {
        // Each bot is a little slower than the previous one
        let speeds = (0..count).map(|i| 1.2 - i as f32 * 0.25).collect();
        Self { speeds }
    }

    fn drive(&self, game: &Match, dt: f32) -> Vec<(ActorId, Vec3)> {
        game.registry()
            .players()
            .filter_map(|actor| {
                let speed = *self.speeds.get(actor.player_index as usize)?;
                Some((actor.id, actor.pos + Vec3::Y * speed * dt))
            })
            .collect()
    }
}

fn load_settings() -> Result<MatchSettings, SettingsError> {
    match std::env::args().nth(1) {
        Some(path) => MatchSettings::load(path),
        None => Ok(MatchSettings::default()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Gum Lava (headless) starting...");

    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let database = match SectionDatabase::builtin() {
        Ok(database) => database,
        Err(e) => {
            log::error!("Bad section database: {}", e);
            std::process::exit(1);
        }
    };
    let players = settings.max_players;
    let mut game = match Match::new(settings, database) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Failed to create match: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Match created with seed: {}", game.settings().seed);

    let bots = Bots::new(players);
    let mut presenter = LogPresenter;
    let mut input = TickInput {
        start_game: true,
        joins: (0..players).collect(),
        ..Default::default()
    };

    let mut accumulator = 0.0;
    let mut elapsed = 0.0;
    while game.state() != MatchState::PostGame && elapsed < DEMO_TIMEOUT {
        accumulator += HOST_FRAME;
        elapsed += HOST_FRAME;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            input.moves = bots.drive(&game, SIM_DT);
            tick(&mut game, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.start_game = false;
            input.joins.clear();
        }

        if let Some(banner) = game.countdown_display() {
            log::debug!("{}", banner);
        }
        flush(&mut game, &mut presenter);
    }

    log::info!(
        "Simulated {} gameplay ticks ({:.1}s)",
        game.time_ticks,
        game.time_ticks as f32 * SIM_DT
    );
    match game.result() {
        Some(result) => println!("{}", result.message()),
        None => println!("Match still running after {:.0}s", elapsed),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web hosts drive `gum_lava::sim` directly
}
