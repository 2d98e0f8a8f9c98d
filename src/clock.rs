//! Frame clock over the host display loop
//!
//! While armed, the clock invokes its callback once per display refresh with
//! the elapsed wall-clock seconds since the previous invocation, clamped to
//! `MAX_FRAME_DT`. The first invocation after arming reports zero. Disarming
//! is idempotent and guarantees no further invocations once it returns;
//! re-arming resets the baseline, so there is never a synthetic catch-up
//! tick after a stall.
//!
//! The simulation never touches this module: tests drive `advance(dt)`
//! directly with controlled steps.

use crate::consts::MAX_FRAME_DT;

/// Elapsed seconds between two frame timestamps (milliseconds), clamped.
///
/// `None` means there is no baseline yet (first frame after arming), which
/// reports zero. A backwards clock jump also reports zero.
pub fn frame_delta(last_ts: Option<f64>, now_ts: f64) -> f32 {
    match last_ts {
        None => 0.0,
        Some(prev) => (((now_ts - prev) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT),
    }
}

#[cfg(target_arch = "wasm32")]
pub use raf::FrameClock;

#[cfg(target_arch = "wasm32")]
mod raf {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    type TickFn = Box<dyn FnMut(f32)>;

    struct Inner {
        armed: Cell<bool>,
        last_ts: Cell<Option<f64>>,
        raf_id: Cell<Option<i32>>,
        // Kept out of the Cells so the callback may disarm the clock while
        // it is being invoked
        on_tick: RefCell<Option<TickFn>>,
    }

    /// requestAnimationFrame-driven clock handle
    ///
    /// Handles are cheap clones of the same clock, so a tick callback can
    /// capture one and disarm from inside a tick.
    #[derive(Clone)]
    pub struct FrameClock {
        inner: Rc<Inner>,
    }

    impl FrameClock {
        pub fn new() -> Self {
            Self {
                inner: Rc::new(Inner {
                    armed: Cell::new(false),
                    last_ts: Cell::new(None),
                    raf_id: Cell::new(None),
                    on_tick: RefCell::new(None),
                }),
            }
        }

        /// Start ticking `on_tick` once per display refresh. Re-arming
        /// replaces the callback and resets the elapsed-time baseline.
        pub fn arm(&self, on_tick: impl FnMut(f32) + 'static) {
            self.inner.on_tick.replace(Some(Box::new(on_tick)));
            self.inner.last_ts.set(None);
            if !self.inner.armed.replace(true) {
                schedule(self.inner.clone());
            }
        }

        /// Stop ticking. Idempotent; no callback invocation can happen after
        /// this returns.
        pub fn disarm(&self) {
            self.inner.armed.set(false);
            self.inner.last_ts.set(None);
            if let Some(id) = self.inner.raf_id.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(id);
                }
            }
        }

        pub fn is_armed(&self) -> bool {
            self.inner.armed.get()
        }
    }

    impl Default for FrameClock {
        fn default() -> Self {
            Self::new()
        }
    }

    fn schedule(inner: Rc<Inner>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let frame_inner = inner.clone();
        let closure = Closure::once(move |ts: f64| on_frame(frame_inner, ts));
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => inner.raf_id.set(Some(id)),
            Err(_) => log::warn!("requestAnimationFrame unavailable; frame clock stopped"),
        }
        closure.forget();
    }

    fn on_frame(inner: Rc<Inner>, ts: f64) {
        // A disarm that raced the callback wins: no tick is delivered
        if !inner.armed.get() {
            return;
        }
        inner.raf_id.set(None);
        let dt = super::frame_delta(inner.last_ts.get(), ts);
        inner.last_ts.set(Some(ts));

        if let Some(on_tick) = inner.on_tick.borrow_mut().as_mut() {
            on_tick(dt);
        }

        // The callback may have disarmed us
        if inner.armed.get() {
            schedule(inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_reports_zero() {
        assert_eq!(frame_delta(None, 1234.5), 0.0);
    }

    #[test]
    fn test_normal_frame_converts_ms_to_secs() {
        let dt = frame_delta(Some(1000.0), 1016.0);
        assert!((dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_stall_is_clamped() {
        // Five seconds in the background collapses into one bounded step
        let dt = frame_delta(Some(0.0), 5000.0);
        assert_eq!(dt, MAX_FRAME_DT);
    }

    #[test]
    fn test_backwards_clock_reports_zero() {
        assert_eq!(frame_delta(Some(2000.0), 1000.0), 0.0);
    }
}
