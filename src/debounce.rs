/*
 * Mechanical buttons bounce: one press shows up as a burst of edges over a few
 * milliseconds. The debouncer accepts an active level at most once per window
 * and ignores everything else until the window has passed.
 *
 * State lives behind a critical-section mutex, so `accept` may be called from
 * interrupt context as well as from a task. It only needs the current time,
 * which the caller passes in; keeping the clock outside makes it testable.
 */

use core::cell::Cell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};

use crate::config::DEBOUNCE_MS;
use crate::io::Button;

pub struct Debouncer {
    window_ms: u32,
    last_accepted_ms: Mutex<CriticalSectionRawMutex, Cell<Option<u32>>>,
}

impl Debouncer {
    pub const fn new() -> Self {
        Self::with_window(DEBOUNCE_MS)
    }

    pub const fn with_window(window_ms: u32) -> Self {
        Debouncer {
            window_ms,
            last_accepted_ms: Mutex::new(Cell::new(None)),
        }
    }

    /// Returns true when `active` should count as a new press.
    pub fn accept(&self, active: bool, now_ms: u32) -> bool {
        if !active {
            return false;
        }
        self.last_accepted_ms.lock(|last| {
            let accepted = match last.get() {
                None => true,
                // wrapping, so a clock roll-over after ~49 days is harmless
                Some(then) => now_ms.wrapping_sub(then) >= self.window_ms,
            };
            if accepted {
                last.set(Some(now_ms));
            }
            accepted
        })
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

/// A polled button together with its own debouncer.
///
/// Level-triggered: a button that is held down registers again once per
/// debounce window. The controllers only poll while idle, so holding the
/// entry or exit button repeats the action each time the cool-down ends.
pub struct PressDetector<B> {
    button: B,
    debouncer: Debouncer,
}

impl<B: Button> PressDetector<B> {
    pub fn new(button: B) -> Self {
        PressDetector {
            button,
            debouncer: Debouncer::new(),
        }
    }

    pub fn pressed(&mut self, now_ms: u32) -> bool {
        let active = self.button.is_pressed();
        self.debouncer.accept(active, now_ms)
    }
}
