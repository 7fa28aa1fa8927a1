//! Game shell
//!
//! Owns the controller and the persistence adapter. Frame deltas go
//! through a fixed-timestep accumulator; high scores, auto-save and theme
//! choice are handled here so the controller stays storage-free.

use crate::config::GameConfig;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::error::GameError;
use crate::persistence::Persistence;
use crate::physics::PhysicsWorld;
use crate::platform::KeyValueStore;
use crate::sim::{BodyView, Controller, GameEvent, GamePhase, TickInput};
use crate::theme::{DEFAULT_THEME, ThemeCatalog, Tier};

pub struct Game<W: PhysicsWorld, S: KeyValueStore> {
    controller: Controller<W>,
    persistence: Persistence<S>,
    accumulator: f32,
    /// Seconds until the next auto-save attempt
    auto_save_timer: f32,
    high_score: u64,
    /// Input gathered since the last tick
    input: TickInput,
}

impl<W: PhysicsWorld, S: KeyValueStore> Game<W, S> {
    /// Open storage, apply the saved theme and start a fresh run
    pub fn new(
        world: W,
        store: S,
        catalog: ThemeCatalog,
        config: GameConfig,
        seed: u64,
    ) -> Result<Self, GameError> {
        let persistence = Persistence::open(store)?;

        let theme = match persistence.current_theme() {
            Ok(theme) if catalog.contains(&theme) => theme,
            Ok(theme) => {
                log::warn!("Stored theme '{}' unknown, using {}", theme, DEFAULT_THEME);
                DEFAULT_THEME.to_string()
            }
            Err(e) => {
                log::warn!("{}", e);
                DEFAULT_THEME.to_string()
            }
        };
        let high_score = persistence.high_score().unwrap_or_else(|e| {
            log::warn!("{}", e);
            0
        });

        let auto_save_timer = config.auto_save_interval;
        let controller = Controller::new(world, catalog, &theme, config, seed)?;
        log::info!("Game initialized with seed: {}", seed);

        Ok(Self {
            controller,
            persistence,
            accumulator: 0.0,
            auto_save_timer,
            high_score,
            input: TickInput::default(),
        })
    }

    pub fn controller(&self) -> &Controller<W> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<W> {
        &mut self.controller
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut Persistence<S> {
        &mut self.persistence
    }

    pub fn score(&self) -> u64 {
        self.controller.score()
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn phase(&self) -> GamePhase {
        self.controller.phase()
    }

    pub fn next_tier(&self) -> Option<&Tier> {
        self.controller.next_tier()
    }

    pub fn bodies(&self) -> Vec<BodyView> {
        self.controller.bodies()
    }

    // === Input ===

    pub fn aim(&mut self, x: f32) {
        self.input.aim_x = Some(x);
    }

    pub fn drop(&mut self) {
        self.input.drop = true;
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause = !self.input.pause;
    }

    /// Advance by a frame delta, returning the events it produced
    pub fn update(&mut self, dt: f32) -> Vec<GameEvent> {
        let dt = dt.min(MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.input.clone();
            if let Err(e) = self.controller.tick(&input, SIM_DT) {
                log::error!("Tick failed: {}", e);
            }
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input = TickInput::default();

            self.advance_auto_save(SIM_DT);
        }

        let events = self.controller.drain_events();
        for event in &events {
            self.handle_event(event);
        }
        events
    }

    fn handle_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Merged { .. } => {
                let score = self.controller.score();
                self.record_high_score(score);
            }
            GameEvent::GameOver { score } => {
                self.record_high_score(*score);
                if let Err(e) = self.persistence.clear() {
                    log::warn!("{}", e);
                }
            }
            _ => {}
        }
    }

    fn record_high_score(&mut self, score: u64) {
        match self.persistence.save_high_score(score) {
            Ok(true) => {
                log::info!("New high score: {}", score);
                self.high_score = score;
            }
            Ok(false) => {}
            Err(e) => {
                log::warn!("{}", e);
                self.high_score = self.high_score.max(score);
            }
        }
    }

    fn advance_auto_save(&mut self, dt: f32) {
        self.auto_save_timer -= dt;
        if self.auto_save_timer > 0.0 {
            return;
        }
        self.auto_save_timer += self.controller.config().auto_save_interval;
        if self.controller.can_auto_save() {
            self.save_game();
        } else {
            log::debug!("Auto-save skipped ({:?})", self.controller.phase());
        }
    }

    // === Save / load ===

    /// Save the running game; false when over or the store refused it
    pub fn save_game(&mut self) -> bool {
        if self.controller.session().is_game_over() {
            return false;
        }
        let snapshot = self.controller.snapshot();
        match self.persistence.save(&snapshot) {
            Ok(()) => {
                log::info!("Game saved (score {})", snapshot.score);
                true
            }
            Err(e) => {
                log::error!("{}", e);
                false
            }
        }
    }

    /// Resume the saved game, or start a new one when there is none
    pub fn load_game(&mut self) -> bool {
        let snapshot = match self.persistence.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                log::info!("No saved game, starting fresh");
                self.start_fresh();
                return false;
            }
            Err(e) => {
                log::warn!("{}", e);
                self.start_fresh();
                return false;
            }
        };

        if let Err(e) = self.controller.restore(&snapshot) {
            log::warn!("Restore failed: {}", e);
            self.start_fresh();
            return false;
        }
        self.reset_clock();
        log::info!("Loaded saved game (score {})", snapshot.score);
        true
    }

    /// Drop the saved game and start over
    pub fn new_game(&mut self) {
        if let Err(e) = self.persistence.clear() {
            log::warn!("{}", e);
        }
        self.start_fresh();
    }

    fn start_fresh(&mut self) {
        if let Err(e) = self.controller.new_game() {
            log::error!("{}", e);
        }
        self.reset_clock();
    }

    fn reset_clock(&mut self) {
        self.accumulator = 0.0;
        self.input = TickInput::default();
        self.auto_save_timer = self.controller.config().auto_save_interval;
    }

    /// Switch theme and remember the choice
    pub fn set_theme(&mut self, theme: &str) -> Result<(), GameError> {
        self.controller.set_theme(theme)?;
        if let Err(e) = self.persistence.set_current_theme(theme) {
            log::warn!("{}", e);
        }
        Ok(())
    }
}
