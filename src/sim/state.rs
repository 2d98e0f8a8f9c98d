//! Run state and core simulation types
//!
//! A `RunState` owns everything mutable about one play session: phase, car
//! lane, entities, effect timers, spawn cadences, RNG and score. All clocks
//! here are simulation time (seconds survived), never wall clock, so a run
//! is fully reproducible from its seed and the sequence of `advance` calls.

use std::rc::Rc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::geometry::{Rect, Road};
use super::powerup::PowerUpKind;
use crate::consts::*;
use crate::recipes::RecipeRecord;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Created but not started
    Idle,
    /// Active gameplay
    Running,
    /// Frozen; `advance` is a no-op
    Paused,
    /// Terminal crash state
    Ended,
}

/// A falling hazard
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: u32,
    pub lane: usize,
    /// Top edge, grows downward
    pub y: f32,
}

/// A falling recipe item
#[derive(Debug, Clone)]
pub struct Collectible {
    pub id: u32,
    pub lane: usize,
    pub y: f32,
    /// Captured at spawn time; survives provider refreshes
    pub recipe: Rc<RecipeRecord>,
}

/// Timed power-up effects, one expiry slot per kind
///
/// Expiries are simulation-clock timestamps (seconds survived), so effects
/// freeze while the run is paused.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActiveEffects {
    shield_until: Option<f32>,
    boost_until: Option<f32>,
    slow_until: Option<f32>,
    multiplier_until: Option<f32>,
}

impl ActiveEffects {
    fn slot(&self, kind: PowerUpKind) -> Option<f32> {
        match kind {
            PowerUpKind::Shield => self.shield_until,
            PowerUpKind::Boost => self.boost_until,
            PowerUpKind::Slow => self.slow_until,
            PowerUpKind::Multiplier => self.multiplier_until,
        }
    }

    fn slot_mut(&mut self, kind: PowerUpKind) -> &mut Option<f32> {
        match kind {
            PowerUpKind::Shield => &mut self.shield_until,
            PowerUpKind::Boost => &mut self.boost_until,
            PowerUpKind::Slow => &mut self.slow_until,
            PowerUpKind::Multiplier => &mut self.multiplier_until,
        }
    }

    pub fn is_active(&self, kind: PowerUpKind, now: f32) -> bool {
        self.slot(kind).is_some_and(|until| until > now)
    }

    pub fn expiry(&self, kind: PowerUpKind) -> Option<f32> {
        self.slot(kind)
    }

    /// Set or refresh a kind's expiry. Re-collecting resets, never stacks.
    pub fn activate(&mut self, kind: PowerUpKind, until: f32) {
        *self.slot_mut(kind) = Some(until);
    }

    /// Remove a kind outright (a consumed shield)
    pub fn clear(&mut self, kind: PowerUpKind) {
        *self.slot_mut(kind) = None;
    }

    /// Drop every effect whose expiry has passed
    pub fn expire(&mut self, now: f32) {
        for kind in PowerUpKind::ALL {
            if self.slot(kind).is_some_and(|until| until <= now) {
                self.clear(kind);
            }
        }
    }

    /// Kinds currently in effect, for the HUD
    pub fn active_kinds(&self, now: f32) -> Vec<PowerUpKind> {
        PowerUpKind::ALL
            .into_iter()
            .filter(|&kind| self.is_active(kind, now))
            .collect()
    }
}

/// Things that happened during a tick, drained by the shell
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A recipe item was caught and its power-up applied
    Collected {
        recipe: Rc<RecipeRecord>,
        kind: PowerUpKind,
    },
    /// A shield absorbed a collision that would have ended the run
    ShieldSaved,
    /// Terminal crash; carries the integer-floored final score.
    /// Emitted exactly once per run.
    Ended { score: u64 },
}

/// Complete state of one play session
#[derive(Debug)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub road: Road,
    pub tuning: Tuning,
    pub(crate) rng: Pcg32,
    pub(crate) phase: RunPhase,
    pub(crate) car_lane: usize,
    pub(crate) score: f32,
    pub(crate) elapsed: f32,
    pub(crate) obstacles: Vec<Obstacle>,
    pub(crate) collectibles: Vec<Collectible>,
    pub(crate) effects: ActiveEffects,
    pub(crate) obstacle_spawn_accum: f32,
    pub(crate) collectible_spawn_accum: f32,
    events: Vec<RunEvent>,
    next_id: u32,
}

impl RunState {
    /// Create a fresh, not-yet-started run
    pub fn new(seed: u64, road: Road, tuning: Tuning) -> Self {
        Self {
            seed,
            road,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            phase: RunPhase::Idle,
            car_lane: START_LANE,
            score: 0.0,
            elapsed: 0.0,
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            effects: ActiveEffects::default(),
            obstacle_spawn_accum: 0.0,
            collectible_spawn_accum: 0.0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn car_lane(&self) -> usize {
        self.car_lane
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    /// Seconds survived
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    pub fn effects(&self) -> &ActiveEffects {
        &self.effects
    }

    /// Integer score for the end-of-run hand-off
    pub fn final_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    /// Begin (or restart) a run. Only legal from `Idle` or `Ended`.
    pub fn start(&mut self) {
        match self.phase {
            RunPhase::Idle | RunPhase::Ended => {}
            _ => return,
        }
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.phase = RunPhase::Running;
        self.car_lane = START_LANE;
        self.score = 0.0;
        self.elapsed = 0.0;
        self.obstacles.clear();
        self.collectibles.clear();
        self.effects = ActiveEffects::default();
        self.obstacle_spawn_accum = 0.0;
        self.collectible_spawn_accum = 0.0;
        self.events.clear();
        self.next_id = 1;
        log::info!("Run started (seed {})", self.seed);
    }

    /// Freeze the run. Flag-only; nothing else moves.
    pub fn pause(&mut self) {
        if self.phase == RunPhase::Running {
            self.phase = RunPhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == RunPhase::Paused {
            self.phase = RunPhase::Running;
        }
    }

    /// Shift one lane toward the road's left edge. No wraparound: a press at
    /// the boundary lane is a silent no-op. Legal in any non-`Ended` phase.
    pub fn move_left(&mut self) {
        if self.phase == RunPhase::Ended {
            return;
        }
        self.car_lane = self.car_lane.saturating_sub(1);
    }

    /// Shift one lane toward the road's right edge, clamped
    pub fn move_right(&mut self) {
        if self.phase == RunPhase::Ended {
            return;
        }
        self.car_lane = (self.car_lane + 1).min(self.road.lanes - 1);
    }

    /// The car's top edge sits a fixed clearance above the road's far edge
    pub fn car_y(&self) -> f32 {
        self.road.height - CAR_CLEARANCE
    }

    pub fn car_rect(&self) -> Rect {
        self.road
            .entity_rect(self.car_lane, self.car_y(), Vec2::new(CAR_WIDTH, CAR_HEIGHT))
    }

    /// Allocate a new entity ID
    pub(crate) fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn push_event(&mut self, event: RunEvent) {
        self.events.push(event);
    }

    /// Drain events accumulated since the last call
    pub fn take_events(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.events)
    }
}
