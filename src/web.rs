//! Browser bindings
//!
//! A thin `wasm-bindgen` facade over [`Game`]. The JS shell owns the
//! canvas, the animation frame loop and pointer input; it calls `tick`
//! once per frame and draws `bodiesJson`.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::format_score;
use crate::game::Game;
use crate::physics::RapierWorld;
use crate::platform::{self, LocalStore};
use crate::sim::GameEvent;
use crate::theme::ThemeCatalog;

/// Install panic hook and console logger
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already installed".into());
    }
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Theme entry for the picker
#[derive(Serialize)]
struct JsTheme {
    key: &'static str,
    name: &'static str,
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game<RapierWorld, LocalStore>,
}

#[wasm_bindgen]
impl WebGame {
    /// Create a game; `config_json` overrides individual defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WebGame, JsValue> {
        let config = match config_json {
            Some(json) => GameConfig::from_json(&json).map_err(js_err)?,
            None => GameConfig::default(),
        };
        let store = LocalStore::open().map_err(js_err)?;
        let world = RapierWorld::new(&config);
        let seed = platform::random_seed();
        let game =
            Game::new(world, store, ThemeCatalog::builtin(), config, seed).map_err(js_err)?;
        log::info!("Emoji Drop running!");
        Ok(WebGame { game })
    }

    pub fn aim(&mut self, x: f32) {
        self.game.aim(x);
    }

    #[wasm_bindgen(js_name = drop)]
    pub fn release(&mut self) {
        self.game.drop();
    }

    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&mut self) {
        self.game.toggle_pause();
    }

    /// Advance by the frame delta (seconds); returns merges this frame
    pub fn tick(&mut self, dt: f32) -> u32 {
        self.game
            .update(dt)
            .iter()
            .filter(|e| matches!(e, GameEvent::Merged { .. }))
            .count() as u32
    }

    /// Every disc as JSON: `[{id, x, y, angle, radius, tier, held}]`
    #[wasm_bindgen(js_name = bodiesJson)]
    pub fn bodies_json(&self) -> String {
        serde_json::to_string(&self.game.bodies()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn score(&self) -> f64 {
        self.game.score() as f64
    }

    #[wasm_bindgen(js_name = highScore)]
    pub fn high_score(&self) -> f64 {
        self.game.high_score() as f64
    }

    #[wasm_bindgen(js_name = scoreText)]
    pub fn score_text(&self) -> String {
        format_score(self.game.score())
    }

    /// Preview symbol for the next spawn
    #[wasm_bindgen(js_name = nextSymbol)]
    pub fn next_symbol(&self) -> Option<String> {
        self.game.next_tier().map(|t| t.symbol.clone())
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.game.phase())
    }

    #[wasm_bindgen(js_name = saveGame)]
    pub fn save_game(&mut self) -> bool {
        self.game.save_game()
    }

    #[wasm_bindgen(js_name = loadGame)]
    pub fn load_game(&mut self) -> bool {
        self.game.load_game()
    }

    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) {
        self.game.new_game();
    }

    pub fn theme(&self) -> String {
        self.game.controller().theme().to_string()
    }

    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&mut self, theme: &str) -> Result<(), JsValue> {
        self.game.set_theme(theme).map_err(js_err)
    }

    /// Available themes as JSON: `[{key, name}]`
    pub fn themes(&self) -> String {
        let catalog = self.game.controller().catalog();
        let themes: Vec<JsTheme> = catalog
            .list_themes()
            .into_iter()
            .filter_map(|key| {
                let name = catalog.theme_display_name(key).ok()?;
                Some(JsTheme { key, name })
            })
            .collect();
        serde_json::to_string(&themes).unwrap_or_else(|_| "[]".to_string())
    }
}
