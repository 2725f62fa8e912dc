/*
 * Occupancy counter for a capacity-limited room.
 *
 * Two buttons count people in and out, a third (on an interrupt) resets the
 * count. The count is shown on a tri-colour status light, an LED matrix and a
 * text display, with a buzzer for acknowledgements.
 *
 * Everything in this library is board independent and runs on the host for
 * testing. The firmware binary (`src/main.rs`, feature `board`) supplies the
 * drivers and spawns the loops.
 */

#![cfg_attr(not(test), no_std)]

// must come first, the other modules use its macros
mod fmt;

pub mod admission;
pub mod config;
pub mod debounce;
pub mod display;
pub mod egress;
pub mod error;
pub mod feedback;
pub mod io;
pub mod occupancy;
pub mod presenter;
pub mod reset;

pub use error::{DisplayBusy, Refusal};
pub use occupancy::Occupancy;
