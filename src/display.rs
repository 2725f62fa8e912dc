/*
 * The text display is one device shared by the admission, egress and reset
 * controllers. Access goes through an async mutex with a bounded wait: a
 * controller that cannot get the display in time drops its update instead of
 * stalling. The counter is the source of truth, the display is best effort.
 */

use core::fmt::Write;

use embassy_futures::select::{Either, select};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embassy_time::{Duration, Timer};
use heapless::String;

use crate::config::DISPLAY_LOCK_TIMEOUT;
use crate::error::DisplayBusy;

pub const ENTRY_COMPLETED: &str = "Entry completed";
pub const FULL: &str = "Full";
pub const EXIT_COMPLETED: &str = "Exit completed";
pub const NOBODY_PRESENT: &str = "Nobody present";
pub const RESET_COMPLETED: &str = "Reset completed";

const WELCOME: &str = "Welcome!";
const TITLE: &str = "Occupancy control";

const TEXT_X: u8 = 8;
const MESSAGE_Y: u8 = 10;
const DETAIL_Y: u8 = 30;

/// Drawing primitives of the text display driver.
pub trait TextDisplay {
    fn clear(&mut self);
    fn draw_border(&mut self);
    fn draw_text(&mut self, text: &str, x: u8, y: u8);
    /// Send the frame drawn so far to the device.
    fn flush(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayRequest {
    pub message: &'static str,
    pub occupancy: u8,
}

impl DisplayRequest {
    pub const fn new(message: &'static str, occupancy: u8) -> Self {
        DisplayRequest { message, occupancy }
    }

    fn render(&self, display: &mut impl TextDisplay) {
        let mut line: String<24> = String::new();
        // "Occupants: 255" is the longest possible line and fits
        let _ = write!(line, "Occupants: {}", self.occupancy);

        display.clear();
        display.draw_border();
        display.draw_text(self.message, TEXT_X, MESSAGE_Y);
        display.draw_text(&line, TEXT_X, DETAIL_Y);
        display.flush();
    }
}

pub struct DisplayChannel<D> {
    device: Mutex<CriticalSectionRawMutex, D>,
    timeout: Duration,
}

impl<D: TextDisplay> DisplayChannel<D> {
    pub const fn new(device: D) -> Self {
        Self::with_timeout(device, DISPLAY_LOCK_TIMEOUT)
    }

    pub const fn with_timeout(device: D, timeout: Duration) -> Self {
        DisplayChannel {
            device: Mutex::new(device),
            timeout,
        }
    }

    /// Render `request`, holding the display from clear to flush. Gives up with
    /// `DisplayBusy` if the display is not free within the timeout.
    pub async fn publish(&self, request: DisplayRequest) -> Result<(), DisplayBusy> {
        let mut device = match select(self.device.lock(), Timer::after(self.timeout)).await {
            Either::First(guard) => guard,
            Either::Second(_) => return Err(DisplayBusy),
        };
        request.render(&mut *device);
        Ok(())
    }

    /// Like `publish`, but a dropped update is only logged.
    pub async fn announce(&self, request: DisplayRequest) {
        if let Err(e) = self.publish(request).await {
            warn!("{}: {:?}", request.message, e);
        }
    }

    /// Startup screen, shown once before the controllers start.
    pub async fn welcome(&self) {
        let mut device = self.device.lock().await;
        device.clear();
        device.draw_border();
        device.draw_text(WELCOME, TEXT_X, MESSAGE_Y);
        device.draw_text(TITLE, TEXT_X, DETAIL_Y);
        device.flush();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::io::testing::{Event, Journal};
    use std::string::String;
    use std::vec::Vec;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Draw {
        Clear,
        Border,
        Text(String, u8, u8),
        Flush,
    }

    /// Display double that remembers every call.
    #[derive(Default)]
    pub struct Screen {
        pub calls: Vec<Draw>,
    }

    impl Screen {
        pub fn texts(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Draw::Text(text, _, _) => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn frames(&self) -> usize {
            self.calls.iter().filter(|c| **c == Draw::Flush).count()
        }
    }

    impl TextDisplay for Screen {
        fn clear(&mut self) {
            self.calls.push(Draw::Clear);
        }

        fn draw_border(&mut self) {
            self.calls.push(Draw::Border);
        }

        fn draw_text(&mut self, text: &str, x: u8, y: u8) {
            self.calls.push(Draw::Text(text.into(), x, y));
        }

        fn flush(&mut self) {
            self.calls.push(Draw::Flush);
        }
    }

    /// Display double that writes each flushed frame into a shared journal.
    pub struct JournalScreen {
        journal: Journal,
        lines: Vec<String>,
    }

    impl JournalScreen {
        pub fn new(journal: Journal) -> Self {
            JournalScreen {
                journal,
                lines: Vec::new(),
            }
        }
    }

    impl TextDisplay for JournalScreen {
        fn clear(&mut self) {
            self.lines.clear();
        }

        fn draw_border(&mut self) {}

        fn draw_text(&mut self, text: &str, _x: u8, _y: u8) {
            self.lines.push(text.into());
        }

        fn flush(&mut self) {
            let lines = core::mem::take(&mut self.lines);
            self.journal.borrow_mut().push(Event::Frame(lines));
        }
    }

    impl<D> DisplayChannel<D> {
        pub fn into_device(self) -> D {
            self.device.into_inner()
        }
    }
}
