//! Lane Kitchen entry point
//!
//! Thin glue around the simulation core: wires the frame clock, keyboard
//! intents and the recipe provider together on wasm, and runs a scripted
//! headless demo on native (no display loop there).

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;

    use lane_kitchen::clock::FrameClock;
    use lane_kitchen::recipes::RecipeError;
    use lane_kitchen::sim::{Road, RunEvent, RunPhase, RunState, advance};
    use lane_kitchen::{RecipeProvider, Tuning, persistence};

    struct App {
        run: RunState,
        provider: RecipeProvider,
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Lane Kitchen starting...");

        let window = web_sys::window().expect("no window");
        let width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(390.0) as f32;
        let height = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(844.0) as f32;

        let seed = js_sys::Date::now() as u64;
        let tuning = Tuning::load();
        let road = Road::from_screen(width, height);

        let mut provider = RecipeProvider::new();
        if let Some(cached) = persistence::load_cached_recipes() {
            provider.seed(cached.recipes);
        }

        let mut run = RunState::new(seed, road, tuning);
        run.start();

        let app = Rc::new(RefCell::new(App { run, provider }));

        setup_intent_handlers(app.clone());
        setup_auto_pause(app.clone());

        let clock = FrameClock::new();
        let clock_handle = clock.clone();
        let tick_app = app.clone();
        clock.arm(move |dt| {
            let mut app = tick_app.borrow_mut();
            let App { run, provider } = &mut *app;
            advance(run, provider.records(), dt);

            for event in run.take_events() {
                match event {
                    RunEvent::Collected { recipe, kind } => {
                        log::info!("Collected: {} ({})", recipe.name, kind.label());
                    }
                    RunEvent::ShieldSaved => log::info!("Shield saved you!"),
                    RunEvent::Ended { score } => {
                        log::info!("Run over - final score {score}");
                        // One-shot hand-off; the results screen takes it
                        // from here
                        clock_handle.disarm();
                    }
                }
            }

            update_hud(run);
        });

        log::info!("Lane Kitchen running (seed {seed})");
    }

    /// Update HUD text elements in the DOM
    fn update_hud(run: &RunState) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(el) = document.get_element_by_id("hud-score") {
            el.set_text_content(Some(&run.final_score().to_string()));
        }

        if let Some(el) = document.get_element_by_id("hud-effects") {
            let labels: Vec<&str> = run
                .effects()
                .active_kinds(run.elapsed())
                .into_iter()
                .map(|kind| kind.label())
                .collect();
            el.set_text_content(Some(&labels.join(" ")));
        }
    }

    /// Keyboard is the intent source: discrete lane moves and pause toggling
    fn setup_intent_handlers(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut app = app.borrow_mut();
            match event.key().as_str() {
                "ArrowLeft" | "a" | "A" => app.run.move_left(),
                "ArrowRight" | "d" | "D" => app.run.move_right(),
                "Escape" => match app.run.phase() {
                    RunPhase::Running => app.run.pause(),
                    RunPhase::Paused => app.run.resume(),
                    _ => {}
                },
                "Enter" => {
                    if app.run.phase() == RunPhase::Ended {
                        app.run.start();
                    }
                }
                "r" | "R" => {
                    // Reload recipe data; a failed reload keeps serving
                    // whatever we already have
                    let result = app.provider.retry(|| {
                        persistence::load_cached_recipes()
                            .map(|cached| cached.recipes)
                            .ok_or_else(|| RecipeError::Unavailable("no cached recipes".into()))
                    });
                    if let Err(err) = result {
                        log::warn!("Recipe reload failed: {err}");
                    }
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Pause when the tab goes hidden; the player resumes manually
    fn setup_auto_pause(app: Rc<RefCell<App>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut app = app.borrow_mut();
                if app.run.phase() == RunPhase::Running {
                    app.run.pause();
                    log::info!("Auto-paused (tab hidden)");
                }
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Lane Kitchen (native) starting...");
    headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive a deterministic run without a display loop: a scripted dodger that
/// steers toward the lane with the most headroom.
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo() {
    use lane_kitchen::Tuning;
    use lane_kitchen::sim::{Road, RunPhase, RunState, advance};

    let road = Road::from_screen(390.0, 844.0);
    let mut run = RunState::new(42, road, Tuning::default());
    run.start();

    let dt = 1.0 / 60.0;
    let mut frames = 0u32;
    while run.phase() == RunPhase::Running && frames < 60 * 120 {
        if let Some(target) = safest_lane(&run) {
            if target < run.car_lane() {
                run.move_left();
            } else if target > run.car_lane() {
                run.move_right();
            }
        }
        advance(&mut run, &[], dt);
        frames += 1;
    }

    println!(
        "Headless run: {:.1}s survived, final score {}",
        run.elapsed(),
        run.final_score()
    );
}

/// Lane whose nearest approaching obstacle is farthest from the car
#[cfg(not(target_arch = "wasm32"))]
fn safest_lane(run: &lane_kitchen::sim::RunState) -> Option<usize> {
    let car_top = run.car_y();
    let mut best: Option<(usize, f32)> = None;
    for lane in 0..run.road.lanes {
        let headroom = run
            .obstacles()
            .iter()
            .filter(|o| o.lane == lane && o.y < car_top)
            .map(|o| car_top - o.y)
            .fold(f32::INFINITY, f32::min);
        match best {
            Some((_, best_headroom)) if headroom <= best_headroom => {}
            _ => best = Some((lane, headroom)),
        }
    }
    best.map(|(lane, _)| lane)
}
