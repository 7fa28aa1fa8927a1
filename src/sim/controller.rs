//! Drop/merge controller
//!
//! Owns the spawn → aim → drop → settle → merge cycle on top of a
//! [`PhysicsWorld`]. Everything runs on the caller's fixed tick; the settle
//! timers are countdowns advanced by the same `dt`.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::settle::{SettleDetector, SettleOutcome};
use super::state::{BodyView, Disc, GameEvent, GamePhase, Session};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::persistence::{SavedBody, Snapshot};
use crate::physics::{BodyId, BodyKind, BodyState, ContactStart, PhysicsWorld};
use crate::theme::{ThemeCatalog, Tier};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Aim position along the drop line (from pointer/touch x)
    pub aim_x: Option<f32>,
    /// Release the held disc
    pub drop: bool,
    /// Pause toggle
    pub pause: bool,
}

pub struct Controller<W: PhysicsWorld> {
    config: GameConfig,
    catalog: ThemeCatalog,
    theme: String,
    world: W,
    rng: Pcg32,
    session: Session,
    discs: BTreeMap<BodyId, Disc>,
    /// The kinematic disc following the aim
    held: Option<BodyId>,
    /// Disc released by the current drop, exempt from the game-over check
    /// until the drop settles
    in_flight: Option<BodyId>,
    aim_x: f32,
    settle: SettleDetector,
    events: Vec<GameEvent>,
}

impl<W: PhysicsWorld> Controller<W> {
    /// Create a controller and start a fresh run
    pub fn new(
        world: W,
        catalog: ThemeCatalog,
        theme: &str,
        config: GameConfig,
        seed: u64,
    ) -> Result<Self, GameError> {
        if !catalog.contains(theme) {
            return Err(GameError::InvalidTheme(theme.to_string()));
        }
        let mut controller = Self {
            aim_x: config.center_x(),
            settle: SettleDetector::new(config.settle),
            config,
            catalog,
            theme: theme.to_string(),
            world,
            rng: Pcg32::seed_from_u64(seed),
            session: Session::default(),
            discs: BTreeMap::new(),
            held: None,
            in_flight: None,
            events: Vec::new(),
        };
        controller.new_game()?;
        Ok(controller)
    }

    // === Accessors ===

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn score(&self) -> u64 {
        self.session.score
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn next_tier(&self) -> Option<&Tier> {
        self.session.next_tier.as_ref()
    }

    pub fn held(&self) -> Option<BodyId> {
        self.held
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Number of tracked discs, held disc included
    pub fn disc_count(&self) -> usize {
        self.discs.values().filter(|d| !d.consumed).count()
    }

    /// Tier of a tracked disc
    pub fn disc_tier(&self, id: BodyId) -> Option<Tier> {
        let disc = self.discs.get(&id)?;
        self.tier(disc.level)
    }

    /// Auto-save only sees a consistent body list while aiming
    pub fn can_auto_save(&self) -> bool {
        self.session.phase == GamePhase::Aiming
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn tier(&self, level: u8) -> Option<Tier> {
        self.catalog
            .tier_by_level(&self.theme, level)
            .ok()
            .flatten()
            .cloned()
    }

    fn roll_starter(&mut self) -> Result<Tier, GameError> {
        self.catalog
            .random_starter_tier(Some(&self.theme), &mut self.rng)
            .cloned()
    }

    fn drop_line(&self) -> f32 {
        self.config.drop_zone_height
    }

    fn is_resting(&self, body: &BodyState) -> bool {
        body.vel.y.abs() < self.config.settle.speed_epsilon
    }

    /// Live discs with their physics state, excluding the held disc
    fn free_discs(&self) -> impl Iterator<Item = (BodyId, BodyState)> + '_ {
        self.discs
            .iter()
            .filter(move |(id, disc)| !disc.consumed && Some(**id) != self.held)
            .filter_map(move |(id, _)| {
                let body = self.world.body(*id)?;
                (body.kind == BodyKind::Dynamic).then_some((*id, body))
            })
    }

    // === Lifecycle ===

    /// Wipe the world and start a new run
    pub fn new_game(&mut self) -> Result<(), GameError> {
        self.reset();
        log::info!("New game (theme: {})", self.theme);
        self.spawn()?;
        Ok(())
    }

    fn reset(&mut self) {
        self.world.clear();
        self.discs.clear();
        self.held = None;
        self.in_flight = None;
        self.settle.cancel();
        self.session = Session::default();
        self.aim_x = self.config.center_x();
    }

    /// Switch theme; existing discs keep their level and take the new look
    pub fn set_theme(&mut self, theme: &str) -> Result<(), GameError> {
        if !self.catalog.contains(theme) {
            return Err(GameError::InvalidTheme(theme.to_string()));
        }
        self.theme = theme.to_string();
        if let Some(next) = &self.session.next_tier {
            self.session.next_tier = self.tier(next.level);
        }
        log::info!("Theme changed to {}", theme);
        Ok(())
    }

    /// Place a new held disc on the drop line
    ///
    /// No-op (returns `None`) while a disc is held or outside `Aiming`.
    pub fn spawn(&mut self) -> Result<Option<BodyId>, GameError> {
        if self.held.is_some() || self.session.phase != GamePhase::Aiming {
            return Ok(None);
        }

        self.cleanup_drop_zone();

        let tier = match self.session.next_tier.take() {
            Some(tier) => tier,
            None => self.roll_starter()?,
        };
        let id = self.place_held(&tier);
        self.session.next_tier = Some(self.roll_starter()?);
        Ok(Some(id))
    }

    fn place_held(&mut self, tier: &Tier) -> BodyId {
        let radius = tier.radius();
        let x = self.config.clamp_drop_x(self.aim_x, radius);
        let y = self.drop_line();
        let id = self
            .world
            .create_disc(Vec2::new(x, y), radius, BodyKind::Kinematic);
        self.discs.insert(id, Disc::new(tier.level));
        self.held = Some(id);

        log::debug!("Spawned {} at x={:.1}", tier.symbol, x);
        self.events.push(GameEvent::Spawned {
            id,
            level: tier.level,
        });
        id
    }

    /// Move the held disc along the drop line
    pub fn aim(&mut self, x: f32) {
        if self.session.phase != GamePhase::Aiming {
            return;
        }
        self.aim_x = x;
        if let Some(id) = self.held {
            if let Some(body) = self.world.body(id) {
                let x = self.config.clamp_drop_x(x, body.radius);
                let y = self.drop_line();
                self.world.set_position(id, Vec2::new(x, y));
            }
        }
        self.cleanup_drop_zone();
    }

    /// Release the held disc; ignored unless aiming with a disc in hand
    pub fn drop(&mut self) -> bool {
        if self.session.phase != GamePhase::Aiming {
            return false;
        }
        let Some(id) = self.held.take() else {
            return false;
        };
        self.world.set_kind(id, BodyKind::Dynamic);
        self.in_flight = Some(id);
        self.session.phase = GamePhase::Dropping;
        self.settle.arm();
        log::debug!("Dropped {:?}", id);
        self.events.push(GameEvent::Dropped { id });
        true
    }

    pub fn toggle_pause(&mut self) {
        match self.session.phase {
            GamePhase::Aiming | GamePhase::Dropping => {
                self.session.resume_phase = Some(self.session.phase);
                self.session.phase = GamePhase::Paused;
            }
            GamePhase::Paused => {
                self.session.phase = self
                    .session
                    .resume_phase
                    .take()
                    .unwrap_or(GamePhase::Aiming);
            }
            GamePhase::GameOver => {}
        }
    }

    /// Advance the game by one fixed timestep
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Result<(), GameError> {
        if input.pause {
            self.toggle_pause();
        }

        // Don't tick if paused or game over
        match self.session.phase {
            GamePhase::Paused | GamePhase::GameOver => return Ok(()),
            _ => {}
        }

        if let Some(x) = input.aim_x {
            self.aim(x);
        }
        if input.drop {
            self.drop();
        }

        let contacts = self.world.step();
        self.resolve_merges(&contacts)?;

        if self.session.phase == GamePhase::Dropping {
            let outcome = {
                let settle = &mut self.settle;
                let epsilon = self.config.settle.speed_epsilon;
                let band = self.config.drop_zone_height;
                let discs = &self.discs;
                let world = &self.world;
                let held = self.held;
                settle.update(dt, || {
                    discs
                        .iter()
                        .filter(|(id, d)| !d.consumed && Some(**id) != held)
                        .filter_map(|(id, _)| world.body(*id))
                        .filter(|b| b.kind == BodyKind::Dynamic && b.pos.y <= band + b.radius)
                        .all(|b| b.vel.y.abs() < epsilon)
                })
            };
            match outcome {
                SettleOutcome::Pending => {}
                SettleOutcome::Settled => return self.finish_drop(false),
                SettleOutcome::TimedOut => return self.finish_drop(true),
            }
        }

        if self.check_game_over() {
            self.end_game();
        }
        Ok(())
    }

    /// Dropping → Aiming (or GameOver) once the pile is still
    fn finish_drop(&mut self, timed_out: bool) -> Result<(), GameError> {
        if self.session.phase != GamePhase::Dropping {
            return Ok(());
        }
        self.in_flight = None;
        if timed_out {
            log::debug!("Settle timed out, forcing next spawn");
        }
        self.events.push(GameEvent::Settled { timed_out });

        if self.check_game_over() {
            self.end_game();
            return Ok(());
        }
        self.session.phase = GamePhase::Aiming;
        self.spawn()?;
        Ok(())
    }

    /// True when a resting disc sits at or above the drop line
    pub fn check_game_over(&self) -> bool {
        let line = self.drop_line();
        self.free_discs()
            .filter(|(id, _)| Some(*id) != self.in_flight)
            .any(|(_, body)| body.pos.y <= line && self.is_resting(&body))
    }

    fn end_game(&mut self) {
        if self.session.phase == GamePhase::GameOver {
            return;
        }
        self.session.phase = GamePhase::GameOver;
        self.session.resume_phase = None;
        self.settle.cancel();
        log::info!("Game over, score {}", self.session.score);
        self.events.push(GameEvent::GameOver {
            score: self.session.score,
        });
    }

    /// Remove resting discs parked in the spawn band just under the drop line
    fn cleanup_drop_zone(&mut self) {
        let line = self.drop_line();
        let orphans: Vec<BodyId> = self
            .free_discs()
            .filter(|(id, _)| Some(*id) != self.in_flight)
            .filter(|(_, body)| {
                body.pos.y > line && body.pos.y <= line + body.radius && self.is_resting(body)
            })
            .map(|(id, _)| id)
            .collect();

        for id in orphans {
            self.world.remove(id);
            self.discs.remove(&id);
            log::debug!("Removed orphan {:?} from drop zone", id);
            self.events.push(GameEvent::OrphanRemoved { id });
        }
    }

    // === Merging ===

    fn resolve_merges(&mut self, contacts: &[ContactStart]) -> Result<(), GameError> {
        for contact in contacts {
            self.try_merge(contact.a, contact.b)?;
        }
        self.discs.retain(|_, disc| !disc.consumed);
        Ok(())
    }

    /// Merge two touching discs of equal tier into one of the next tier
    ///
    /// Returns the new disc, or `None` when the pair does not qualify.
    fn try_merge(&mut self, a: BodyId, b: BodyId) -> Result<Option<BodyId>, GameError> {
        if a == b || Some(a) == self.held || Some(b) == self.held {
            return Ok(None);
        }
        let (Some(disc_a), Some(disc_b)) = (self.discs.get(&a), self.discs.get(&b)) else {
            return Ok(None);
        };
        // Either side may already belong to a merge from this same step
        if disc_a.consumed || disc_b.consumed || disc_a.level != disc_b.level {
            return Ok(None);
        }
        let level = disc_a.level;

        let (Some(body_a), Some(body_b)) = (self.world.body(a), self.world.body(b)) else {
            return Ok(None);
        };
        if body_a.kind != BodyKind::Dynamic || body_b.kind != BodyKind::Dynamic {
            return Ok(None);
        }
        let reach = body_a.radius + body_b.radius + self.config.merge_threshold;
        if body_a.pos.distance(body_b.pos) > reach {
            return Ok(None);
        }

        let Some(tier) = self.tier(level) else {
            return Ok(None);
        };
        let Some(next) = self.catalog.next_tier(&self.theme, &tier)?.cloned() else {
            return Ok(None);
        };

        for id in [a, b] {
            if let Some(disc) = self.discs.get_mut(&id) {
                disc.consumed = true;
            }
            self.world.remove(id);
        }

        let pos = (body_a.pos + body_b.pos) / 2.0;
        let created = self
            .world
            .create_disc(pos, next.radius(), BodyKind::Dynamic);
        self.discs.insert(created, Disc::new(next.level));

        if self.in_flight == Some(a) || self.in_flight == Some(b) {
            self.in_flight = Some(created);
        }

        self.session.score += next.points;
        self.session.merges += 1;
        log::debug!(
            "Merged {} + {} -> {} (+{})",
            tier.symbol,
            tier.symbol,
            next.symbol,
            next.points
        );
        self.events.push(GameEvent::Merged {
            consumed: [a, b],
            created,
            level: next.level,
            points: next.points,
            pos,
        });
        Ok(Some(created))
    }

    // === Snapshots ===

    /// Score, preview tier and every free disc
    pub fn snapshot(&self) -> Snapshot {
        let bodies = self
            .discs
            .iter()
            .filter(|(id, disc)| !disc.consumed && Some(**id) != self.held)
            .filter_map(|(id, disc)| {
                let body = self.world.body(*id)?;
                let tier = self.tier(disc.level)?;
                Some(SavedBody {
                    x: body.pos.x,
                    y: body.pos.y,
                    tier,
                })
            })
            .collect();

        Snapshot {
            score: self.session.score,
            next_tier: self.session.next_tier.clone(),
            held_tier: self.held.and_then(|id| self.disc_tier(id)),
            bodies,
            timestamp: 0.0,
            theme: self.theme.clone(),
        }
    }

    /// Rebuild a run from a snapshot; bodies come back at rest
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), GameError> {
        if self.catalog.contains(&snapshot.theme) {
            self.theme = snapshot.theme.clone();
        } else {
            log::warn!(
                "Saved theme '{}' unknown, keeping '{}'",
                snapshot.theme,
                self.theme
            );
        }

        self.reset();
        self.session.score = snapshot.score;
        self.session.next_tier = snapshot
            .next_tier
            .as_ref()
            .and_then(|saved| self.saved_tier(saved, "next"));

        if snapshot.bodies.len() > self.config.max_bodies {
            log::warn!(
                "Snapshot has {} bodies, restoring first {}",
                snapshot.bodies.len(),
                self.config.max_bodies
            );
        }
        for saved in snapshot.bodies.iter().take(self.config.max_bodies) {
            let Some(tier) = self.saved_tier(&saved.tier, "body") else {
                continue;
            };
            let id = self.world.create_disc(
                Vec2::new(saved.x, saved.y),
                tier.radius(),
                BodyKind::Dynamic,
            );
            self.discs.insert(id, Disc::new(tier.level));
        }

        log::info!(
            "Restored game: score {}, {} bodies",
            self.session.score,
            self.discs.len()
        );

        // Bring back the disc that was in hand without consuming the preview
        let held = match snapshot
            .held_tier
            .as_ref()
            .and_then(|saved| self.saved_tier(saved, "held"))
        {
            Some(tier) => tier,
            None => self.roll_starter()?,
        };
        self.place_held(&held);
        if self.session.next_tier.is_none() {
            self.session.next_tier = Some(self.roll_starter()?);
        }
        Ok(())
    }

    /// Resolve a saved tier against the active ladder by level
    fn saved_tier(&self, saved: &Tier, what: &str) -> Option<Tier> {
        let tier = self.tier(saved.level);
        if tier.is_none() {
            log::warn!(
                "Skipping saved {} tier '{}': level {} not in theme '{}'",
                what,
                saved.symbol,
                saved.level,
                self.theme
            );
        }
        tier
    }

    /// Discs for drawing, held disc included
    pub fn bodies(&self) -> Vec<BodyView> {
        self.discs
            .iter()
            .filter(|(_, disc)| !disc.consumed)
            .filter_map(|(id, disc)| {
                let body = self.world.body(*id)?;
                let tier = self.tier(disc.level)?;
                Some(BodyView {
                    id: id.0,
                    x: body.pos.x,
                    y: body.pos.y,
                    angle: body.angle,
                    radius: body.radius,
                    tier,
                    held: Some(*id) == self.held,
                })
            })
            .collect()
    }
}
