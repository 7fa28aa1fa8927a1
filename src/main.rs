//! Emoji Drop entry point
//!
//! The browser build starts from `web::init`; natively this runs a
//! headless auto-play session and logs how it went.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Emoji Drop (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or_else(emoji_drop::platform::random_seed);

    if let Err(e) = autoplay::run(seed) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::init, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use emoji_drop::consts::SIM_DT;
    use emoji_drop::physics::RapierWorld;
    use emoji_drop::platform::MemoryStore;
    use emoji_drop::sim::{GameEvent, GamePhase};
    use emoji_drop::{Game, GameConfig, GameError, ThemeCatalog, format_score};

    /// Simulated seconds before the run is cut off
    const TIME_LIMIT: f32 = 600.0;
    /// Pause between spawn and release, like a player lining up a shot
    const AIM_DELAY: f32 = 0.4;

    pub fn run(seed: u64) -> Result<(), GameError> {
        let config = GameConfig::default();
        let world = RapierWorld::new(&config);
        let mut game = Game::new(
            world,
            MemoryStore::new(),
            ThemeCatalog::builtin(),
            config.clone(),
            seed,
        )?;
        let mut rng = Pcg32::seed_from_u64(seed ^ 0x5eed);

        let mut elapsed = 0.0;
        let mut aim_timer = AIM_DELAY;
        let mut drops = 0u32;
        let mut best_level = 0u8;

        while elapsed < TIME_LIMIT && game.phase() != GamePhase::GameOver {
            if game.phase() == GamePhase::Aiming && game.controller().held().is_some() {
                aim_timer -= SIM_DT;
                if aim_timer <= 0.0 {
                    let margin = config.wall_thickness;
                    game.aim(rng.random_range(margin..config.canvas_width - margin));
                    game.drop();
                    aim_timer = AIM_DELAY;
                }
            }

            for event in game.update(SIM_DT) {
                match event {
                    GameEvent::Dropped { .. } => drops += 1,
                    GameEvent::Merged { level, points, .. } => {
                        best_level = best_level.max(level);
                        log::debug!("Merge into level {} (+{})", level, points);
                    }
                    GameEvent::Settled { timed_out: true } => {
                        log::debug!("Drop {} timed out while settling", drops);
                    }
                    _ => {}
                }
            }
            elapsed += SIM_DT;
        }

        let outcome = if game.phase() == GamePhase::GameOver {
            "game over"
        } else {
            "time limit"
        };
        log::info!(
            "Finished ({}) after {:.0}s: score {}, {} drops, {} merges, best level {}",
            outcome,
            elapsed,
            format_score(game.score()),
            drops,
            game.controller().session().merges,
            best_level
        );
        Ok(())
    }
}
