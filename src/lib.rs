//! Lane Kitchen - a three-lane recipe-runner arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lane geometry, spawning, collisions, run state)
//! - `clock`: Frame clock abstraction over the host display loop
//! - `recipes`: Recipe provider collaborator (ordered records, retry, cache fallback)
//! - `persistence`: LocalStorage recipe cache
//! - `tuning`: Data-driven gameplay balance

pub mod clock;
pub mod persistence;
pub mod recipes;
pub mod sim;
pub mod tuning;

pub use recipes::{RecipeProvider, RecipeRecord};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Number of parallel lanes on the road
    pub const LANE_COUNT: usize = 3;
    /// The car starts in the middle lane
    pub const START_LANE: usize = LANE_COUNT / 2;

    /// Road sizing (responsive): width = min(screen_width * ROAD_WIDTH_RATIO, ROAD_MAX_WIDTH)
    pub const ROAD_WIDTH_RATIO: f32 = 0.92;
    pub const ROAD_MAX_WIDTH: f32 = 440.0;

    /// Car footprint in road pixels
    pub const CAR_WIDTH: f32 = 42.0;
    pub const CAR_HEIGHT: f32 = 72.0;
    /// Distance of the car's top edge from the road's far edge
    pub const CAR_CLEARANCE: f32 = 170.0;

    /// Obstacle footprint
    pub const OBSTACLE_WIDTH: f32 = 44.0;
    pub const OBSTACLE_HEIGHT: f32 = 44.0;

    /// Collectible recipe items are square
    pub const RECIPE_ITEM_SIZE: f32 = 48.0;

    /// Entities spawn this far above the road's near edge
    pub const SPAWN_LEAD: f32 = 10.0;
    /// Entities are dropped once past the far edge by this margin
    pub const DESPAWN_MARGIN: f32 = 80.0;

    /// Maximum elapsed time reported per frame, in seconds. Bounds
    /// integration error after a stall (tab hidden, app backgrounded).
    pub const MAX_FRAME_DT: f32 = 0.05;
}
