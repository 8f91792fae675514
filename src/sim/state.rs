//! Match state and core simulation types
//!
//! `Match` is the single owner of the actor registry, both risers, the level
//! generator and the win countdown. Side effects for the host are queued as
//! `MatchEvent`s and drained once per frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::countdown::WinCountdown;
use super::curve::DifficultyEvaluator;
use super::layout::{LayoutError, LevelGenerator, LevelLayout, SectionDatabase};
use super::riser::{RiseRate, Risers};
use super::time::TimeScaleStack;
use crate::settings::{MatchSettings, SettingsError};

#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Top-level flow of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchState {
    /// Before startup; nothing shown
    #[default]
    None,
    /// Main menu with title music
    Intro,
    /// Level built, players joining or racing the lava
    Game,
    /// Results screen
    PostGame,
}

/// UI pages the host toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Page {
    MainMenu,
    CountdownTimer,
    PostGame,
}

/// Music tracks the host plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Music {
    Title,
    Game,
    End,
}

/// Stable actor handle, never reused within a `Match`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActorKind {
    /// Alive and climbing
    Player,
    /// Eliminated; swims on the lava hunting players
    Worm {
        /// Seconds until the worm turns back into a player
        transform_remaining: Option<f32>,
    },
}

/// A participant owned by the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub player_index: u32,
    pub pos: Vec3,
    pub yaw: f32,
    pub kind: ActorKind,
}

impl Actor {
    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Player
    }

    pub fn is_worm(&self) -> bool {
        matches!(self.kind, ActorKind::Worm { .. })
    }

    pub fn is_transforming(&self) -> bool {
        matches!(
            self.kind,
            ActorKind::Worm {
                transform_remaining: Some(_)
            }
        )
    }
}

/// Arena of live actors, sorted by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorRegistry {
    actors: Vec<Actor>,
    next_id: u32,
}

impl ActorRegistry {
    pub fn spawn(&mut self, player_index: u32, kind: ActorKind, pos: Vec3, yaw: f32) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        self.actors.push(Actor {
            id,
            player_index,
            pos,
            yaw,
            kind,
        });
        id
    }

    pub fn despawn(&mut self, id: ActorId) -> Option<Actor> {
        let index = self.actors.iter().position(|a| a.id == id)?;
        Some(self.actors.remove(index))
    }

    /// Remove everything, returning the ids in order
    pub fn clear(&mut self) -> Vec<ActorId> {
        self.actors.drain(..).map(|a| a.id).collect()
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn players(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter().filter(|a| a.is_player())
    }

    pub fn worms(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter().filter(|a| a.is_worm())
    }

    /// Players still in the race
    pub fn live_count(&self) -> usize {
        self.players().count()
    }

    /// The only remaining player, if exactly one is left
    pub fn sole_survivor(&self) -> Option<&Actor> {
        let mut players = self.players();
        match (players.next(), players.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    pub fn any_transforming(&self) -> bool {
        self.actors.iter().any(Actor::is_transforming)
    }

    pub fn has_player_index(&self, player_index: u32) -> bool {
        self.actors.iter().any(|a| a.player_index == player_index)
    }

    /// Ensure actors are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.actors.sort_by_key(|a| a.id);
    }
}

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Winner(u32),
    NoSurvivors,
}

impl MatchResult {
    pub fn winner(&self) -> Option<u32> {
        match self {
            MatchResult::Winner(index) => Some(*index),
            MatchResult::NoSurvivors => None,
        }
    }

    /// Results-screen headline (players are numbered from 1)
    pub fn message(&self) -> String {
        match self {
            MatchResult::Winner(index) => {
                format!("Player {} was the last player standing!", index + 1)
            }
            MatchResult::NoSurvivors => "No players survived!".to_string(),
        }
    }
}

/// Side effects for the host, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    StateChanged { from: MatchState, to: MatchState },
    ShowPage(Page),
    HidePage(Page),
    PlayMusic(Music),
    StopMusic(Music),
    LevelGenerated(LevelLayout),
    LevelDestroyed,
    ActorSpawned {
        id: ActorId,
        player_index: u32,
        kind: ActorKind,
        position: Vec3,
        yaw: f32,
    },
    ActorTransformed {
        id: ActorId,
        kind: ActorKind,
        position: Vec3,
    },
    /// The simulation moved an actor (lava clamp, side wrap)
    ActorRepositioned { id: ActorId, position: Vec3 },
    ActorDespawned { id: ActorId },
    PlayerLaunched { id: ActorId, by: ActorId },
    MatchStarted,
    CountdownStarted { winner: u32 },
    CountdownReset,
    MatchFinished(MatchResult),
}

/// Complete match simulation
#[derive(Debug, Clone)]
pub struct Match {
    settings: MatchSettings,
    state: MatchState,
    pub(crate) registry: ActorRegistry,
    pub(crate) risers: Risers,
    pub(crate) difficulty: DifficultyEvaluator,
    pub(crate) countdown: WinCountdown,
    pub(crate) level: LevelGenerator,
    /// Keyed slow-motion / pause overrides for the hazard
    pub time_scale: TimeScaleStack,
    spawning_open: bool,
    match_started: bool,
    result: Option<MatchResult>,
    pub(crate) rise_rate: RiseRate,
    /// Eliminations/revivals since the last survivor evaluation
    pending_elimination: bool,
    pending_revival: bool,
    last_live_count: usize,
    events: Vec<MatchEvent>,
    /// Gameplay ticks simulated so far (Game state only)
    pub time_ticks: u64,
}

impl Match {
    /// Validate inputs and enter `settings.initial_state`
    pub fn new(settings: MatchSettings, database: SectionDatabase) -> Result<Self, MatchError> {
        settings.validate()?;
        let level = LevelGenerator::new(database, settings.seed)?;

        let mut game = Self {
            risers: Risers::new(settings.hazard_origin, settings.camera_origin),
            difficulty: DifficultyEvaluator::new(settings.difficulty.clone(), settings.catch_up),
            countdown: WinCountdown::new(settings.countdown_duration),
            level,
            settings,
            state: MatchState::None,
            registry: ActorRegistry::default(),
            time_scale: TimeScaleStack::new(),
            spawning_open: false,
            match_started: false,
            result: None,
            rise_rate: RiseRate::ZERO,
            pending_elimination: false,
            pending_revival: false,
            last_live_count: 0,
            events: Vec::new(),
            time_ticks: 0,
        };

        let initial = game.settings.initial_state;
        game.set_state(initial);
        Ok(game)
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    pub fn risers(&self) -> &Risers {
        &self.risers
    }

    pub fn countdown(&self) -> &WinCountdown {
        &self.countdown
    }

    pub fn layout(&self) -> &LevelLayout {
        self.level.layout()
    }

    pub fn result(&self) -> Option<MatchResult> {
        self.result
    }

    pub fn hazard_height(&self) -> f32 {
        self.risers.hazard_height()
    }

    pub fn camera_height(&self) -> f32 {
        self.risers.camera_height()
    }

    /// Rate applied to both risers on the last tick
    pub fn rise_rate(&self) -> RiseRate {
        self.rise_rate
    }

    /// Current lone-survivor boost on top of the curve
    pub fn catch_up(&self) -> f32 {
        self.difficulty.catch_up()
    }

    pub fn is_spawning_open(&self) -> bool {
        self.spawning_open
    }

    pub fn is_match_started(&self) -> bool {
        self.match_started
    }

    pub fn actor_position(&self, id: ActorId) -> Option<Vec3> {
        self.registry.get(id).map(|a| a.pos)
    }

    /// Host physics reports where an actor ended up. Unknown ids are ignored.
    pub fn set_actor_position(&mut self, id: ActorId, pos: Vec3) -> bool {
        match self.registry.get_mut(id) {
            Some(actor) => {
                actor.pos = pos;
                true
            }
            None => false,
        }
    }

    /// Countdown banner text, e.g. "Player 2 victory in 7"
    pub fn countdown_display(&self) -> Option<String> {
        let winner = self.countdown.winner()?;
        let remaining = self.countdown.remaining()?;
        Some(format!("Player {} victory in {}", winner + 1, remaining as u32))
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    /// Hand queued side effects to the host
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: MatchEvent) {
        self.events.push(event);
    }

    /// Debug control for the rise rate (applies to both risers)
    pub fn nudge_rise_rate(&mut self, delta: f32) {
        let camera_height = self.camera_height();
        self.difficulty.nudge(delta, camera_height);
    }

    /// Switch state. Self-transitions are rejected with no side effects.
    pub fn set_state(&mut self, new_state: MatchState) -> bool {
        if new_state == self.state {
            return false;
        }

        let old_state = self.state;
        log::info!("Match state {:?} -> {:?}", old_state, new_state);
        self.on_exit(old_state);
        self.on_enter(new_state);
        self.state = new_state;
        self.emit(MatchEvent::StateChanged {
            from: old_state,
            to: new_state,
        });
        true
    }

    fn on_enter(&mut self, state: MatchState) {
        match state {
            MatchState::None => {}
            MatchState::Intro => {
                self.emit(MatchEvent::ShowPage(Page::MainMenu));
                self.emit(MatchEvent::PlayMusic(Music::Title));
            }
            MatchState::Game => {
                self.despawn_all();
                self.destroy_level();
                let generated = self
                    .level
                    .generate(self.settings.section_count)
                    .map(LevelLayout::clone);
                match generated {
                    Ok(layout) => self.emit(MatchEvent::LevelGenerated(layout)),
                    Err(e) => log::error!("Level generation failed: {}", e),
                }
                self.reset_risers();
                self.difficulty.reset();
                self.countdown.cancel();
                self.result = None;
                self.spawning_open = true;
                self.match_started = false;
                self.pending_elimination = false;
                self.pending_revival = false;
                self.last_live_count = 0;
                self.emit(MatchEvent::PlayMusic(Music::Game));
            }
            MatchState::PostGame => {
                self.despawn_all();
                self.destroy_level();
                let result = *self.result.get_or_insert(MatchResult::NoSurvivors);
                log::info!("{}", result.message());
                self.emit(MatchEvent::ShowPage(Page::PostGame));
                self.emit(MatchEvent::PlayMusic(Music::End));
            }
        }
    }

    fn on_exit(&mut self, state: MatchState) {
        match state {
            MatchState::None => {}
            MatchState::Intro => {
                self.emit(MatchEvent::HidePage(Page::MainMenu));
                self.emit(MatchEvent::StopMusic(Music::Title));
            }
            MatchState::Game => {
                self.risers.stop_rising();
                if self.countdown.winner().is_some() {
                    self.countdown.cancel();
                    self.emit(MatchEvent::HidePage(Page::CountdownTimer));
                }
                self.spawning_open = false;
                self.emit(MatchEvent::StopMusic(Music::Game));
            }
            MatchState::PostGame => {
                self.reset_risers();
                self.emit(MatchEvent::HidePage(Page::PostGame));
                self.emit(MatchEvent::StopMusic(Music::End));
            }
        }
    }

    fn reset_risers(&mut self) {
        self.risers.reset(self.settings.hazard_origin, self.settings.camera_origin);
        self.rise_rate = RiseRate::ZERO;
    }

    fn despawn_all(&mut self) {
        for id in self.registry.clear() {
            self.emit(MatchEvent::ActorDespawned { id });
        }
    }

    fn destroy_level(&mut self) {
        if !self.level.layout().is_empty() {
            self.level.destroy();
            self.emit(MatchEvent::LevelDestroyed);
        }
    }

    /// Bring a player in at a free spawn point.
    ///
    /// Only while spawning is open, once per player index.
    pub fn join_player(&mut self, player_index: u32) -> Option<ActorId> {
        if self.state != MatchState::Game || !self.spawning_open {
            return None;
        }
        if player_index >= self.settings.max_players {
            let max = self.settings.max_players;
            log::warn!("Ignoring join from player {} (max {})", player_index, max);
            return None;
        }
        if self.registry.has_player_index(player_index) {
            return None;
        }
        let Some(spawn) = self.level.pick_spawn_point() else {
            log::warn!("No spawn point left for player {}", player_index);
            return None;
        };

        let id = self
            .registry
            .spawn(player_index, ActorKind::Player, spawn.position, spawn.yaw);
        log::info!("Player {} joined as {:?}", player_index, id);
        self.emit(MatchEvent::ActorSpawned {
            id,
            player_index,
            kind: ActorKind::Player,
            position: spawn.position,
            yaw: spawn.yaw,
        });
        Some(id)
    }

    /// Close joining and set the lava going
    pub(crate) fn start_match(&mut self) {
        if self.match_started {
            return;
        }
        self.match_started = true;
        self.spawning_open = false;
        self.risers.start_rising();
        self.last_live_count = self.registry.live_count();
        log::info!("Match started with {} players", self.last_live_count);
        self.emit(MatchEvent::MatchStarted);

        // Someone already fell in before the lava started
        if self.registry.worms().next().is_some() {
            if let Some(winner) = self.registry.sole_survivor().map(|a| a.player_index) {
                self.arm_countdown(winner);
            }
        }
    }

    /// Start the countdown from full duration for `winner`
    fn arm_countdown(&mut self, winner: u32) {
        let was_inactive = self.countdown.winner().is_none();
        self.countdown.begin(winner);
        log::info!("Player {} is the last one standing", winner);
        if was_inactive {
            self.emit(MatchEvent::ShowPage(Page::CountdownTimer));
        }
        self.emit(MatchEvent::CountdownStarted { winner });
    }

    /// Turn a player into a worm floating on the lava
    pub fn eliminate(&mut self, id: ActorId) -> bool {
        let hazard = self.hazard_height();
        let Some(actor) = self.registry.get_mut(id) else {
            return false;
        };
        if !actor.is_player() {
            return false;
        }

        actor.kind = ActorKind::Worm {
            transform_remaining: None,
        };
        actor.pos.y = hazard;
        let (kind, position, player_index) = (actor.kind, actor.pos, actor.player_index);
        self.pending_elimination = true;
        log::info!("Player {} eliminated", player_index);
        self.emit(MatchEvent::ActorTransformed { id, kind, position });
        true
    }

    /// A worm caught a player: the player is knocked out and the worm starts
    /// turning back into a player.
    pub fn launch_player(&mut self, player: ActorId, worm: ActorId) -> bool {
        let worm_ready = self
            .registry
            .get(worm)
            .is_some_and(|w| w.is_worm() && !w.is_transforming());
        if !worm_ready || !self.eliminate(player) {
            return false;
        }

        let duration = self.settings.worm_transform_duration;
        if let Some(actor) = self.registry.get_mut(worm) {
            actor.kind = ActorKind::Worm {
                transform_remaining: Some(duration),
            };
        }
        self.emit(MatchEvent::PlayerLaunched {
            id: player,
            by: worm,
        });
        true
    }

    /// A worm finished transforming and rejoins the race
    pub fn revive(&mut self, id: ActorId) -> bool {
        let Some(actor) = self.registry.get_mut(id) else {
            return false;
        };
        if !actor.is_worm() {
            return false;
        }

        actor.kind = ActorKind::Player;
        let (position, player_index) = (actor.pos, actor.player_index);
        self.pending_revival = true;
        log::info!("Player {} is back in the race", player_index);
        self.emit(MatchEvent::ActorTransformed {
            id,
            kind: ActorKind::Player,
            position,
        });
        true
    }

    /// Record the result and move to the results screen
    pub fn finish(&mut self, result: MatchResult) {
        if self.state != MatchState::Game {
            return;
        }
        self.result = Some(result);
        self.emit(MatchEvent::MatchFinished(result));
        self.set_state(MatchState::PostGame);
    }

    /// Apply this tick's eliminations and revivals to the win condition,
    /// then run the countdown on unscaled `dt`.
    ///
    /// The countdown arms when the live count drops or climbs to exactly one,
    /// compared with the previous evaluation.
    pub(crate) fn evaluate_survivors(&mut self, dt: f32) {
        let eliminated = std::mem::take(&mut self.pending_elimination);
        let revived = std::mem::take(&mut self.pending_revival);
        if self.state != MatchState::Game {
            return;
        }

        let live = self.registry.live_count();

        if revived && self.countdown.is_counting() {
            self.countdown.restart();
            self.emit(MatchEvent::CountdownReset);
        }

        if !self.match_started {
            // Before the lava starts only a total wipe-out decides anything
            if eliminated && live == 0 && !self.registry.any_transforming() {
                self.finish(MatchResult::NoSurvivors);
                return;
            }
            self.last_live_count = live;
            return;
        }

        if eliminated || revived {
            match live {
                0 if self.registry.any_transforming() => {
                    log::debug!("No players left, waiting on a transforming worm");
                }
                0 => {
                    // Zero survivors beats any countdown in flight
                    self.finish(MatchResult::NoSurvivors);
                    return;
                }
                1 => {
                    let sole = self.registry.sole_survivor().map(|a| a.player_index);
                    if let Some(winner) = sole {
                        let entered = self.last_live_count != 1;
                        let new_leader = !self.countdown.is_counting()
                            || self.countdown.winner() != Some(winner);
                        if entered || new_leader {
                            self.arm_countdown(winner);
                        }
                    }
                }
                _ => {}
            }
        }
        self.last_live_count = live;

        if let Some(winner) = self.countdown.tick(dt, live == 1) {
            self.finish(MatchResult::Winner(winner));
        }
    }

    /// Number of players alive at the last survivor evaluation
    pub fn last_live_count(&self) -> usize {
        self.last_live_count
    }
}
