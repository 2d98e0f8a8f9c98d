//! Persistent recipe cache
//!
//! LocalStorage-backed, versioned keys: one envelope for the full list plus
//! one entry per recipe id for offline detail lookup. Reads tolerate missing
//! or corrupt entries; writes are best-effort and never fail the caller.

use serde::{Deserialize, Serialize};

use crate::recipes::RecipeRecord;

/// Key for the cached list envelope
#[allow(dead_code)]
const KEY_LIST: &str = "lane_kitchen:recipes:list:v1";
/// Prefix for individual recipes, keyed by id
#[allow(dead_code)]
const KEY_BY_ID_PREFIX: &str = "lane_kitchen:recipes:by_id:v1:";

/// Envelope for the cached recipe list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRecipeList {
    /// Unix timestamp (ms) of the last successful refresh
    pub updated_at: f64,
    pub recipes: Vec<RecipeRecord>,
}

#[cfg(target_arch = "wasm32")]
fn storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

/// Load the cached recipe list (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn load_cached_recipes() -> Option<CachedRecipeList> {
    let storage = storage()?;
    let json = storage.get_item(KEY_LIST).ok()??;
    match serde_json::from_str::<CachedRecipeList>(&json) {
        Ok(list) => {
            log::info!("Loaded {} cached recipes", list.recipes.len());
            Some(list)
        }
        Err(err) => {
            log::warn!("Recipe cache unreadable, ignoring: {err}");
            None
        }
    }
}

/// Save the recipe list and its per-id entries (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn save_cached_recipes(recipes: &[RecipeRecord], updated_at: f64) {
    let Some(storage) = storage() else {
        return;
    };

    let list = CachedRecipeList {
        updated_at,
        recipes: recipes.to_vec(),
    };
    if let Ok(json) = serde_json::to_string(&list) {
        let _ = storage.set_item(KEY_LIST, &json);
    }

    // Per-id entries for offline lookup of a single recipe
    for recipe in recipes {
        if let Ok(json) = serde_json::to_string(recipe) {
            let _ = storage.set_item(&format!("{KEY_BY_ID_PREFIX}{}", recipe.id), &json);
        }
    }
    log::info!("Cached {} recipes", recipes.len());
}

/// Look up a single cached recipe by id (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn load_cached_recipe_by_id(id: &str) -> Option<RecipeRecord> {
    let storage = storage()?;
    let json = storage.get_item(&format!("{KEY_BY_ID_PREFIX}{id}")).ok()??;
    serde_json::from_str(&json).ok()
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn load_cached_recipes() -> Option<CachedRecipeList> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_cached_recipes(_recipes: &[RecipeRecord], _updated_at: f64) {
    // No-op for native
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_cached_recipe_by_id(_id: &str) -> Option<RecipeRecord> {
    None
}
