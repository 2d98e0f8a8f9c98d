//! Per-frame run advancement
//!
//! The whole game fits in one pass: accumulate time, ramp the scroll speed,
//! accrue score, run both spawn cadences, integrate entity positions, and
//! resolve collisions against the car. A fatal collision abandons the rest
//! of the tick so presentation sees the run exactly as it stood at impact.

use std::rc::Rc;

use glam::Vec2;
use rand::Rng;

use super::powerup::{self, PowerUpKind};
use super::state::{Collectible, Obstacle, RunEvent, RunPhase, RunState};
use crate::consts::*;
use crate::recipes::RecipeRecord;

/// Advance the run by one frame.
///
/// No-op unless the run is `Running`; a negative `dt` is treated as zero.
/// `recipes` is the provider's current collection — it may change between
/// ticks without disturbing collectibles already on the road, and an empty
/// collection merely suppresses collectible spawning.
pub fn advance(state: &mut RunState, recipes: &[Rc<RecipeRecord>], dt: f32) {
    if state.phase != RunPhase::Running {
        return;
    }
    let dt = dt.max(0.0);

    // Time survived
    state.elapsed += dt;
    let now = state.elapsed;

    // Scroll speed ramps with time survived, then Slow/Boost scale it
    let speed = base_speed(state) * speed_factor(state);

    // Score accrues with distance scrolled
    let multiplier = if state.effects.is_active(PowerUpKind::Multiplier, now) {
        PowerUpKind::Multiplier.factor()
    } else {
        1.0
    };
    state.score += speed * dt * state.tuning.score_rate * multiplier;

    spawn_entities(state, recipes, dt);

    // Integrate positions and cull entities past the far edge
    let far_edge = state.road.height + DESPAWN_MARGIN;
    for obstacle in &mut state.obstacles {
        obstacle.y += speed * dt;
    }
    state.obstacles.retain(|o| o.y <= far_edge);
    for item in &mut state.collectibles {
        item.y += speed * dt;
    }
    state.collectibles.retain(|c| c.y <= far_edge);

    let car = state.car_rect();
    let obstacle_size = Vec2::new(OBSTACLE_WIDTH, OBSTACLE_HEIGHT);
    let item_size = Vec2::splat(RECIPE_ITEM_SIZE);

    // Obstacles vs car
    let mut i = 0;
    while i < state.obstacles.len() {
        let rect = state
            .road
            .entity_rect(state.obstacles[i].lane, state.obstacles[i].y, obstacle_size);
        if rect.overlaps(&car) {
            if state.effects.is_active(PowerUpKind::Shield, now) {
                // The shield absorbs exactly one hit
                state.effects.clear(PowerUpKind::Shield);
                state.obstacles.remove(i);
                state.push_event(RunEvent::ShieldSaved);
                log::info!("Shield absorbed a collision");
                continue;
            }
            // Fatal. Freeze the run as it stood at impact and discard the
            // remainder of this tick.
            state.phase = RunPhase::Ended;
            let score = state.final_score();
            state.push_event(RunEvent::Ended { score });
            log::info!("Run ended after {:.1}s, score {}", state.elapsed, score);
            return;
        }
        i += 1;
    }

    // Collectibles vs car
    let mut i = 0;
    while i < state.collectibles.len() {
        let rect = state
            .road
            .entity_rect(state.collectibles[i].lane, state.collectibles[i].y, item_size);
        if rect.overlaps(&car) {
            let item = state.collectibles.remove(i);
            let kind = powerup::classify(&item.recipe);
            state.effects.activate(kind, now + kind.duration_secs());
            state.push_event(RunEvent::Collected {
                recipe: item.recipe,
                kind,
            });
            continue;
        }
        i += 1;
    }

    state.effects.expire(now);
}

/// Baseline scroll speed: linear ramp over time survived, floored at the base
fn base_speed(state: &RunState) -> f32 {
    let t = &state.tuning;
    t.base_speed + state.elapsed * t.speed_ramp
}

/// Speed-affecting effect scaling. Slow takes precedence over Boost while
/// both are active.
fn speed_factor(state: &RunState) -> f32 {
    let now = state.elapsed;
    if state.effects.is_active(PowerUpKind::Slow, now) {
        PowerUpKind::Slow.factor()
    } else if state.effects.is_active(PowerUpKind::Boost, now) {
        PowerUpKind::Boost.factor()
    } else {
        1.0
    }
}

/// Run both spawn accumulators against their shrinking thresholds
fn spawn_entities(state: &mut RunState, recipes: &[Rc<RecipeRecord>], dt: f32) {
    let t = state.tuning;

    state.obstacle_spawn_accum += dt;
    state.collectible_spawn_accum += dt;

    let obstacle_gap =
        (t.obstacle_gap_base - state.elapsed * t.obstacle_gap_ramp).max(t.obstacle_gap_min);
    if state.obstacle_spawn_accum >= obstacle_gap {
        state.obstacle_spawn_accum = 0.0;
        let lane = state.rng.random_range(0..state.road.lanes);
        let id = state.next_entity_id();
        let y = state.road.spawn_y(OBSTACLE_HEIGHT);
        state.obstacles.push(Obstacle { id, lane, y });
    }

    // Collectibles wait until the provider has something to hand out; the
    // accumulator keeps counting so the first item drops promptly once
    // records arrive.
    let collectible_gap =
        (t.collectible_gap_base - state.elapsed * t.collectible_gap_ramp).max(t.collectible_gap_min);
    if !recipes.is_empty() && state.collectible_spawn_accum >= collectible_gap {
        state.collectible_spawn_accum = 0.0;
        let lane = state.rng.random_range(0..state.road.lanes);
        let recipe = recipes[state.rng.random_range(0..recipes.len())].clone();
        let id = state.next_entity_id();
        let y = state.road.spawn_y(RECIPE_ITEM_SIZE);
        state.collectibles.push(Collectible {
            id,
            lane,
            y,
            recipe,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Road;
    use crate::tuning::Tuning;

    fn test_road() -> Road {
        Road::new(0.0, 300.0, 800.0, LANE_COUNT)
    }

    /// Tuning with spawning pushed out of reach, so tests stage entities
    /// themselves
    fn quiet_tuning() -> Tuning {
        Tuning {
            obstacle_gap_base: 1.0e9,
            obstacle_gap_min: 1.0e9,
            collectible_gap_base: 1.0e9,
            collectible_gap_min: 1.0e9,
            ..Tuning::default()
        }
    }

    fn quiet_run(seed: u64) -> RunState {
        let mut state = RunState::new(seed, test_road(), quiet_tuning());
        state.start();
        state
    }

    fn recipe(category: Option<&str>, region: Option<&str>) -> Rc<RecipeRecord> {
        Rc::new(RecipeRecord {
            id: "52772".to_string(),
            name: "Teriyaki Chicken Casserole".to_string(),
            category: category.map(str::to_string),
            region: region.map(str::to_string),
            thumbnail: None,
            instructions: None,
        })
    }

    /// An obstacle top position guaranteed to overlap the car's rect
    fn overlapping_y(state: &RunState) -> f32 {
        state.car_y() + 10.0
    }

    fn stage_obstacle(state: &mut RunState, lane: usize, y: f32) {
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle { id, lane, y });
    }

    fn stage_collectible(state: &mut RunState, lane: usize, y: f32, recipe: Rc<RecipeRecord>) {
        let id = state.next_entity_id();
        state.collectibles.push(Collectible {
            id,
            lane,
            y,
            recipe,
        });
    }

    #[test]
    fn test_fifty_seconds_without_spawns_stays_running() {
        let mut state = quiet_run(1);
        for _ in 0..50 {
            advance(&mut state, &[], 1.0);
        }
        assert_eq!(state.phase(), RunPhase::Running);
        assert!((state.elapsed() - 50.0).abs() < 1e-3);
        assert!(state.score() > 0.0);
    }

    #[test]
    fn test_advance_is_noop_while_paused_or_idle() {
        let mut state = quiet_run(2);
        stage_obstacle(&mut state, 0, 100.0);
        advance(&mut state, &[], 0.5);
        let score = state.score();
        let elapsed = state.elapsed();
        let y = state.obstacles()[0].y;

        state.pause();
        for _ in 0..20 {
            advance(&mut state, &[], 1.0);
        }
        assert_eq!(state.score(), score);
        assert_eq!(state.elapsed(), elapsed);
        assert_eq!(state.obstacles()[0].y, y);

        let mut idle = RunState::new(3, test_road(), quiet_tuning());
        advance(&mut idle, &[], 1.0);
        assert_eq!(idle.phase(), RunPhase::Idle);
        assert_eq!(idle.elapsed(), 0.0);
    }

    #[test]
    fn test_negative_dt_is_treated_as_zero() {
        let mut state = quiet_run(4);
        advance(&mut state, &[], -1.0);
        assert_eq!(state.elapsed(), 0.0);
        assert_eq!(state.score(), 0.0);
        assert_eq!(state.phase(), RunPhase::Running);
    }

    #[test]
    fn test_score_is_monotonic_and_tracks_speed() {
        let mut state = quiet_run(5);
        let mut last = 0.0;
        let mut deltas = Vec::new();
        for _ in 0..10 {
            advance(&mut state, &[], 1.0);
            assert!(state.score() >= last);
            deltas.push(state.score() - last);
            last = state.score();
        }
        // The speed ramp means later ticks score more than earlier ones
        assert!(deltas.last().unwrap() > deltas.first().unwrap());
    }

    #[test]
    fn test_boost_scores_faster_and_slow_scores_slower() {
        let mut plain = quiet_run(6);
        let mut boosted = quiet_run(6);
        let mut slowed = quiet_run(6);
        boosted.effects.activate(PowerUpKind::Boost, 100.0);
        slowed.effects.activate(PowerUpKind::Slow, 100.0);

        advance(&mut plain, &[], 1.0);
        advance(&mut boosted, &[], 1.0);
        advance(&mut slowed, &[], 1.0);

        assert!(boosted.score() > plain.score());
        assert!(slowed.score() < plain.score());
    }

    #[test]
    fn test_slow_takes_precedence_over_boost() {
        let mut both = quiet_run(7);
        both.effects.activate(PowerUpKind::Boost, 100.0);
        both.effects.activate(PowerUpKind::Slow, 100.0);
        assert_eq!(speed_factor(&both), PowerUpKind::Slow.factor());
    }

    #[test]
    fn test_multiplier_scales_score_accrual() {
        let mut plain = quiet_run(8);
        let mut multiplied = quiet_run(8);
        multiplied.effects.activate(PowerUpKind::Multiplier, 100.0);

        advance(&mut plain, &[], 1.0);
        advance(&mut multiplied, &[], 1.0);
        let ratio = multiplied.score() / plain.score();
        assert!((ratio - PowerUpKind::Multiplier.factor()).abs() < 1e-3);
    }

    #[test]
    fn test_entities_fall_and_despawn_past_far_edge() {
        let mut state = quiet_run(9);
        stage_obstacle(&mut state, 0, 0.0);
        advance(&mut state, &[], 0.1);
        assert!(state.obstacles()[0].y > 0.0);

        // Plenty of time for the obstacle to clear the track
        for _ in 0..200 {
            advance(&mut state, &[], 0.05);
        }
        assert!(state.obstacles().is_empty());
    }

    #[test]
    fn test_crash_without_shield_ends_run() {
        let mut state = quiet_run(10);
        advance(&mut state, &[], 0.5);
        let lane = state.car_lane();
        let y = overlapping_y(&state);
        stage_obstacle(&mut state, lane, y);

        let score_before = state.score();
        advance(&mut state, &[], 0.0);
        assert_eq!(state.phase(), RunPhase::Ended);
        // dt 0 accrues nothing: the crash-tick score is handed off as-is
        assert_eq!(state.score(), score_before);

        let events = state.take_events();
        assert!(matches!(
            events.as_slice(),
            [RunEvent::Ended { score }] if *score == score_before.floor() as u64
        ));

        // Terminal: nothing moves afterwards, and Ended never fires again
        advance(&mut state, &[], 1.0);
        state.move_left();
        assert_eq!(state.elapsed(), 0.5);
        assert_eq!(state.car_lane(), lane);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_obstacle_falls_into_car_and_ends_run() {
        let mut state = quiet_run(18);
        let lane = state.car_lane();
        stage_obstacle(&mut state, lane, 0.0);

        let mut last_score = 0.0;
        for _ in 0..600 {
            if state.phase() != RunPhase::Running {
                break;
            }
            last_score = state.score();
            advance(&mut state, &[], 1.0 / 60.0);
        }

        assert_eq!(state.phase(), RunPhase::Ended);
        // The crash-tick score is what gets handed off
        assert!(state.score() >= last_score);
        assert_eq!(state.final_score(), state.score().floor() as u64);
        // The fatal obstacle is retained for the crash presentation
        assert_eq!(state.obstacles().len(), 1);
    }

    #[test]
    fn test_crash_in_other_lane_is_harmless() {
        let mut state = quiet_run(11);
        let other = (state.car_lane() + 1) % LANE_COUNT;
        let y = overlapping_y(&state);
        stage_obstacle(&mut state, other, y);
        advance(&mut state, &[], 0.0);
        assert_eq!(state.phase(), RunPhase::Running);
        assert_eq!(state.obstacles().len(), 1);
    }

    #[test]
    fn test_shield_consumes_collision_and_keeps_running() {
        let mut state = quiet_run(12);
        state.effects.activate(PowerUpKind::Shield, 100.0);
        let lane = state.car_lane();
        let y = overlapping_y(&state);
        stage_obstacle(&mut state, lane, y);

        advance(&mut state, &[], 0.0);
        assert_eq!(state.phase(), RunPhase::Running);
        assert!(state.obstacles().is_empty());
        assert!(!state.effects().is_active(PowerUpKind::Shield, state.elapsed()));
        assert!(matches!(
            state.take_events().as_slice(),
            [RunEvent::ShieldSaved]
        ));

        // The next unshielded hit is fatal
        let lane = state.car_lane();
        let y = overlapping_y(&state);
        stage_obstacle(&mut state, lane, y);
        advance(&mut state, &[], 0.0);
        assert_eq!(state.phase(), RunPhase::Ended);
    }

    #[test]
    fn test_collecting_applies_powerup_and_never_ends_run() {
        let mut state = quiet_run(13);
        let lane = state.car_lane();
        let y = overlapping_y(&state);
        stage_collectible(
            &mut state,
            lane,
            y,
            recipe(Some("Seafood"), None),
        );

        advance(&mut state, &[], 0.0);
        assert_eq!(state.phase(), RunPhase::Running);
        assert!(state.collectibles().is_empty());
        assert!(state.effects().is_active(PowerUpKind::Slow, state.elapsed()));

        let events = state.take_events();
        assert!(matches!(
            events.as_slice(),
            [RunEvent::Collected { recipe, kind: PowerUpKind::Slow }]
                if recipe.name == "Teriyaki Chicken Casserole"
        ));
    }

    #[test]
    fn test_recollecting_boost_resets_expiry() {
        let mut state = quiet_run(14);
        let boost = recipe(Some("Chicken"), None);

        let lane = state.car_lane();
        let y = overlapping_y(&state);
        stage_collectible(&mut state, lane, y, boost.clone());
        advance(&mut state, &[], 0.0);
        let first_expiry = state.effects().expiry(PowerUpKind::Boost).unwrap();

        // Collect a second boost two seconds in: the expiry resets to
        // collection time + duration, it does not extend the first one
        advance(&mut state, &[], 2.0);
        let lane = state.car_lane();
        let y = overlapping_y(&state);
        stage_collectible(&mut state, lane, y, boost);
        advance(&mut state, &[], 0.0);
        let second_expiry = state.effects().expiry(PowerUpKind::Boost).unwrap();

        let expected = state.elapsed() + PowerUpKind::Boost.duration_secs();
        assert!((second_expiry - expected).abs() < 1e-3);
        assert!((second_expiry - (first_expiry + 2.0)).abs() < 1e-3);
    }

    #[test]
    fn test_effects_lapse_on_the_sim_clock() {
        let mut state = quiet_run(15);
        let lane = state.car_lane();
        let y = overlapping_y(&state);
        stage_collectible(
            &mut state,
            lane,
            y,
            recipe(Some("Chicken"), None),
        );
        advance(&mut state, &[], 0.0);
        assert!(state.effects().is_active(PowerUpKind::Boost, state.elapsed()));

        // Boost lasts 6 seconds of sim time
        for _ in 0..7 {
            advance(&mut state, &[], 1.0);
        }
        assert!(!state.effects().is_active(PowerUpKind::Boost, state.elapsed()));
    }

    #[test]
    fn test_obstacles_spawn_on_cadence() {
        let mut state = RunState::new(16, test_road(), Tuning::default());
        state.start();
        // Default cadence starts at just over a second
        for _ in 0..30 {
            advance(&mut state, &[], 0.1);
        }
        assert!(!state.obstacles().is_empty());
        for obstacle in state.obstacles() {
            assert!(obstacle.lane < LANE_COUNT);
        }
    }

    #[test]
    fn test_collectibles_need_recipes_to_spawn() {
        // Obstacles off so a crash can't cut the run short
        let tuning = Tuning {
            obstacle_gap_base: 1.0e9,
            obstacle_gap_min: 1.0e9,
            ..Tuning::default()
        };
        let mut starved = RunState::new(17, test_road(), tuning);
        starved.start();
        for _ in 0..120 {
            advance(&mut starved, &[], 0.1);
        }
        assert!(starved.collectibles().is_empty());

        let deck = [recipe(Some("Chicken"), None)];
        let mut fed = RunState::new(17, test_road(), tuning);
        fed.start();
        let mut spawned = false;
        for _ in 0..120 {
            advance(&mut fed, &deck, 0.1);
            spawned |= !fed.collectibles().is_empty();
        }
        assert!(spawned);
    }

    #[test]
    fn test_same_seed_same_run() {
        let deck = [recipe(Some("Seafood"), None), recipe(Some("Beef"), None)];
        let mut a = RunState::new(99999, test_road(), Tuning::default());
        let mut b = RunState::new(99999, test_road(), Tuning::default());
        a.start();
        b.start();

        for i in 0..240 {
            if i == 50 {
                a.move_left();
                b.move_left();
            }
            advance(&mut a, &deck, 1.0 / 60.0);
            advance(&mut b, &deck, 1.0 / 60.0);
        }

        assert_eq!(a.phase(), b.phase());
        assert_eq!(a.score(), b.score());
        assert_eq!(a.obstacles().len(), b.obstacles().len());
        for (oa, ob) in a.obstacles().iter().zip(b.obstacles()) {
            assert_eq!(oa.lane, ob.lane);
            assert_eq!(oa.y, ob.y);
        }
    }
}
