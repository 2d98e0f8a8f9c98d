//! Power-up kinds and the recipe classification policy
//!
//! Every recipe maps to exactly one power-up; durations and factors are
//! fixed lookup tables, never derived from recipe content.

use crate::recipes::RecipeRecord;

/// The closed set of timed power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    /// Absorbs exactly one collision, then is consumed
    Shield,
    /// Speeds up the scroll (and with it, score accrual)
    Boost,
    /// Slows the scroll down
    Slow,
    /// Multiplies score accrual
    Multiplier,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Shield,
        PowerUpKind::Boost,
        PowerUpKind::Slow,
        PowerUpKind::Multiplier,
    ];

    /// Fixed effect duration
    pub fn duration_ms(self) -> u32 {
        match self {
            PowerUpKind::Shield => 12_000,
            PowerUpKind::Boost => 6_000,
            PowerUpKind::Slow => 6_000,
            PowerUpKind::Multiplier => 10_000,
        }
    }

    /// Duration on the simulation clock
    pub fn duration_secs(self) -> f32 {
        self.duration_ms() as f32 / 1000.0
    }

    /// Effect magnitude: scroll-speed multiplier for Boost/Slow, score
    /// multiplier for Multiplier. Shield has no magnitude.
    pub fn factor(self) -> f32 {
        match self {
            PowerUpKind::Shield => 1.0,
            PowerUpKind::Boost => 1.35,
            PowerUpKind::Slow => 0.7,
            PowerUpKind::Multiplier => 2.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::Shield => "Shield",
            PowerUpKind::Boost => "Boost",
            PowerUpKind::Slow => "Slow",
            PowerUpKind::Multiplier => "Multiplier",
        }
    }
}

/// Map a recipe to the power-up it grants.
///
/// Case-insensitive substring match over category, then region. Total: an
/// unmatched recipe still grants `Multiplier`.
pub fn classify(recipe: &RecipeRecord) -> PowerUpKind {
    let category = recipe.category.as_deref().unwrap_or("").to_lowercase();
    let region = recipe.region.as_deref().unwrap_or("").to_lowercase();

    if category.contains("seafood") {
        return PowerUpKind::Slow;
    }
    if category.contains("chicken") {
        return PowerUpKind::Boost;
    }
    if category.contains("beef") || category.contains("pork") || category.contains("lamb") {
        return PowerUpKind::Shield;
    }
    if region.contains("italian") || region.contains("mexican") {
        return PowerUpKind::Multiplier;
    }
    PowerUpKind::Multiplier
}
