/*
 * Compile-time configuration. There is no runtime configuration: the venue
 * size and all timings are fixed when the firmware is built.
 */

use embassy_time::Duration;

/// Maximum number of people allowed inside at the same time.
pub const CAPACITY: u8 = 25;

/// Minimum time between two accepted presses of the same physical input.
pub const DEBOUNCE_MS: u32 = 200;

/// Delay after a controller finishes an action before it looks at its button
/// again. Doubles as a second debounce stage for entry and exit.
pub const COOL_DOWN: Duration = Duration::from_millis(300);

/// How often the entry and exit buttons are sampled while idle.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub const STATUS_LIGHT_PERIOD: Duration = Duration::from_millis(200);
pub const MATRIX_PERIOD: Duration = Duration::from_millis(300);

/// Longest a controller waits for the text display before dropping its update.
pub const DISPLAY_LOCK_TIMEOUT: Duration = Duration::from_millis(200);

pub const OUTPUT_QUEUE_DEPTH: usize = 8;

/// Colour of an occupied matrix cell, as (red, green, blue).
pub const MATRIX_COLOR: (u8, u8, u8) = (0, 150, 150);
