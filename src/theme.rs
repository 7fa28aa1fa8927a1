//! Theme catalog
//!
//! Each theme is an ordered ladder of tiers. Merging two discs of one tier
//! produces the next tier up; the last tier never merges.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Theme used when nothing has been chosen yet
pub const DEFAULT_THEME: &str = "fantasy";

/// Number of lowest levels a fresh disc can be drawn from
const STARTER_LEVELS: u8 = 2;

/// A rank in the merge ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub symbol: String,
    /// Visual diameter in pixels
    pub size: f32,
    /// 1-based ordinal in the ladder
    pub level: u8,
    /// Score awarded when this tier is produced by a merge
    pub points: u64,
}

impl Tier {
    fn new(symbol: &str, size: f32, level: u8, points: u64) -> Self {
        Self {
            symbol: symbol.to_string(),
            size,
            level,
            points,
        }
    }

    /// Collision radius
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    /// Lookup key ("fantasy")
    pub key: &'static str,
    /// Display name ("Fantasy")
    pub name: &'static str,
    pub tiers: Vec<Tier>,
}

impl Theme {
    fn with_symbols(key: &'static str, name: &'static str, symbols: [&str; 4]) -> Self {
        const SIZES: [f32; 4] = [40.0, 50.0, 60.0, 70.0];
        const POINTS: [u64; 4] = [10, 20, 40, 80];
        let tiers = symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| Tier::new(symbol, SIZES[i], i as u8 + 1, POINTS[i]))
            .collect();
        Self { key, name, tiers }
    }
}

/// Static mapping of theme name → tier ladder
#[derive(Debug, Clone)]
pub struct ThemeCatalog {
    themes: Vec<Theme>,
}

impl Default for ThemeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ThemeCatalog {
    /// The four shipped themes
    pub fn builtin() -> Self {
        Self {
            themes: vec![
                Theme::with_symbols("fantasy", "Fantasy", ["🧙‍♂️", "🧝‍♀️", "🦄", "🐉"]),
                Theme::with_symbols("sports", "Sports", ["⚽", "🏀", "🏈", "⚾"]),
                Theme::with_symbols("food", "Food", ["🍇", "🍎", "🍊", "🍉"]),
                Theme::with_symbols("travel", "Travel", ["🚗", "🚲", "✈️", "🚀"]),
            ],
        }
    }

    /// Build a catalog from explicit themes
    pub fn from_themes(themes: Vec<Theme>) -> Self {
        Self { themes }
    }

    /// Theme keys in declaration order
    pub fn list_themes(&self) -> Vec<&'static str> {
        self.themes.iter().map(|t| t.key).collect()
    }

    pub fn contains(&self, theme: &str) -> bool {
        self.themes.iter().any(|t| t.key == theme)
    }

    fn theme(&self, theme: &str) -> Result<&Theme, GameError> {
        self.themes
            .iter()
            .find(|t| t.key == theme)
            .ok_or_else(|| GameError::InvalidTheme(theme.to_string()))
    }

    pub fn theme_display_name(&self, theme: &str) -> Result<&'static str, GameError> {
        Ok(self.theme(theme)?.name)
    }

    /// Ordered tiers of a theme
    pub fn tiers(&self, theme: &str) -> Result<&[Tier], GameError> {
        Ok(&self.theme(theme)?.tiers)
    }

    /// The tier a merge of two `tier` discs produces, `None` at the top
    pub fn next_tier(&self, theme: &str, tier: &Tier) -> Result<Option<&Tier>, GameError> {
        match tier.level.checked_add(1) {
            Some(level) => self.tier_by_level(theme, level),
            None => self.tiers(theme).map(|_| None),
        }
    }

    pub fn tier_by_level(&self, theme: &str, level: u8) -> Result<Option<&Tier>, GameError> {
        Ok(self.tiers(theme)?.iter().find(|t| t.level == level))
    }

    pub fn tier_by_symbol(&self, theme: &str, symbol: &str) -> Result<Option<&Tier>, GameError> {
        Ok(self.tiers(theme)?.iter().find(|t| t.symbol == symbol))
    }

    /// Uniform pick among the two lowest levels
    ///
    /// With no theme chosen yet the default theme is used; an unknown name
    /// is still an error.
    pub fn random_starter_tier<R: Rng + ?Sized>(
        &self,
        theme: Option<&str>,
        rng: &mut R,
    ) -> Result<&Tier, GameError> {
        let tiers = self.tiers(theme.unwrap_or(DEFAULT_THEME))?;
        let starters: Vec<&Tier> = tiers.iter().filter(|t| t.level <= STARTER_LEVELS).collect();
        if starters.is_empty() {
            return Err(GameError::InvalidTheme(
                theme.unwrap_or(DEFAULT_THEME).to_string(),
            ));
        }
        Ok(starters[rng.random_range(0..starters.len())])
    }
}
