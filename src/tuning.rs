//! Data-driven gameplay balance
//!
//! Every balance value the simulation reads lives in one serde struct, so a
//! tweak is a config edit rather than a code change. Persisted separately
//! from recipe data in LocalStorage.

use serde::{Deserialize, Serialize};

/// Gameplay balance values
///
/// Speeds are road pixels per second; gaps are seconds between spawns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Scroll speed at the start of a run
    pub base_speed: f32,
    /// Speed added per second survived
    pub speed_ramp: f32,
    /// Score per pixel scrolled
    pub score_rate: f32,

    /// Seconds between obstacle spawns at the start of a run
    pub obstacle_gap_base: f32,
    /// Lower bound the obstacle gap shrinks toward
    pub obstacle_gap_min: f32,
    /// Gap shrink per second survived
    pub obstacle_gap_ramp: f32,

    /// Seconds between collectible spawns at the start of a run
    pub collectible_gap_base: f32,
    /// Lower bound the collectible gap shrinks toward
    pub collectible_gap_min: f32,
    /// Gap shrink per second survived (gentler than obstacles)
    pub collectible_gap_ramp: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: 260.0,
            speed_ramp: 10.0,
            score_rate: 0.05,

            obstacle_gap_base: 1.1,
            obstacle_gap_min: 0.45,
            obstacle_gap_ramp: 0.01,

            collectible_gap_base: 4.5,
            collectible_gap_min: 2.0,
            collectible_gap_ramp: 0.005,
        }
    }
}

impl Tuning {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "lane_kitchen:tuning:v1";

    /// Load tuning from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(tuning) = serde_json::from_str(&json) {
                    log::info!("Loaded tuning overrides from LocalStorage");
                    return tuning;
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Save tuning to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Tuning saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_coherent() {
        let t = Tuning::default();
        assert!(t.base_speed > 0.0);
        assert!(t.obstacle_gap_min < t.obstacle_gap_base);
        assert!(t.collectible_gap_min < t.collectible_gap_base);
        // Collectibles ramp slower than obstacles
        assert!(t.collectible_gap_ramp < t.obstacle_gap_ramp);
    }

    #[test]
    fn test_serde_round_trip_and_partial_config() {
        let t = Tuning::default();
        let json = serde_json::to_string(&t).unwrap();
        let back: Tuning = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);

        // Partial overrides fall back to defaults for missing fields
        let partial: Tuning = serde_json::from_str(r#"{"base_speed": 300.0}"#).unwrap();
        assert_eq!(partial.base_speed, 300.0);
        assert_eq!(partial.speed_ramp, Tuning::default().speed_ramp);
    }
}
