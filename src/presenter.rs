/*
 * Feedback presenters: the tri-colour status light and the LED matrix.
 *
 * Both are pure functions of the occupancy snapshot, repainted at a fixed
 * cadence. They never take a lock and never wait on anyone: a stale read only
 * shows up one cycle late, and a status frame that does not fit in the output
 * queue is simply skipped.
 */

use embassy_time::Ticker;

use crate::config::{CAPACITY, MATRIX_COLOR, MATRIX_PERIOD, STATUS_LIGHT_PERIOD};
use crate::io::{OutputCommand, OutputSender};
use crate::occupancy::Occupancy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusColor {
    Empty,
    Normal,
    Warning,
    Full,
}

impl StatusColor {
    pub fn for_occupancy(count: u8, capacity: u8) -> Self {
        match count {
            0 => StatusColor::Empty,
            n if n >= capacity => StatusColor::Full,
            n if n == capacity - 1 => StatusColor::Warning,
            _ => StatusColor::Normal,
        }
    }

    /// Which LEDs are lit, indexed by `Led` ordinal: red, green, blue.
    pub fn lit(self) -> [bool; 3] {
        match self {
            StatusColor::Empty => [false, false, true],
            StatusColor::Normal => [false, true, false],
            StatusColor::Warning => [true, true, false],
            StatusColor::Full => [true, false, false],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

pub const MATRIX_CELLS: usize = CAPACITY as usize;

/// The addressable LED matrix, one cell per slot.
pub trait PixelMatrix {
    fn write_pixel(&mut self, index: usize, color: Rgb);
    /// Push the written pixels out to the LEDs.
    fn show(&mut self);
}

/// Cells below `count` are lit, the rest are dark.
pub fn matrix_frame(count: u8) -> [Rgb; MATRIX_CELLS] {
    let (r, g, b) = MATRIX_COLOR;
    let mut frame = [Rgb::OFF; MATRIX_CELLS];
    for cell in frame.iter_mut().take(count as usize) {
        *cell = Rgb::new(r, g, b);
    }
    frame
}

pub fn paint_matrix(matrix: &mut impl PixelMatrix, count: u8) {
    for (index, color) in matrix_frame(count).into_iter().enumerate() {
        matrix.write_pixel(index, color);
    }
    matrix.show();
}

pub async fn run_status_light(occupancy: &Occupancy, outputs: OutputSender<'_>) -> ! {
    let mut ticker = Ticker::every(STATUS_LIGHT_PERIOD);
    loop {
        let color = StatusColor::for_occupancy(occupancy.current(), occupancy.capacity());
        if outputs.try_send(OutputCommand::Status(color)).is_err() {
            trace!("output queue full, status frame skipped");
        }
        ticker.next().await;
    }
}

pub async fn run_matrix(occupancy: &Occupancy, matrix: &mut impl PixelMatrix) -> ! {
    let mut ticker = Ticker::every(MATRIX_PERIOD);
    loop {
        paint_matrix(matrix, occupancy.current());
        ticker.next().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bands_follow_occupancy() {
        assert_eq!(StatusColor::for_occupancy(0, 25), StatusColor::Empty);
        assert_eq!(StatusColor::for_occupancy(1, 25), StatusColor::Normal);
        assert_eq!(StatusColor::for_occupancy(23, 25), StatusColor::Normal);
        assert_eq!(StatusColor::for_occupancy(24, 25), StatusColor::Warning);
        assert_eq!(StatusColor::for_occupancy(25, 25), StatusColor::Full);
    }

    #[test]
    fn warning_mixes_two_colours_and_full_shows_one() {
        assert_eq!(StatusColor::Warning.lit(), [true, true, false]);
        assert_eq!(StatusColor::Full.lit(), [true, false, false]);
        assert_eq!(StatusColor::Empty.lit(), [false, false, true]);
    }

    #[test]
    fn matrix_lights_one_cell_per_person() {
        let frame = matrix_frame(7);
        let lit = frame.iter().filter(|c| **c != Rgb::OFF).count();
        assert_eq!(lit, 7);
        assert!(frame[..7].iter().all(|c| *c == Rgb::new(0, 150, 150)));
        assert!(frame[7..].iter().all(|c| *c == Rgb::OFF));
    }

    #[test]
    fn matrix_extremes() {
        assert!(matrix_frame(0).iter().all(|c| *c == Rgb::OFF));
        assert!(matrix_frame(CAPACITY).iter().all(|c| *c != Rgb::OFF));
    }

    #[derive(Default)]
    struct Strip {
        pixels: Vec<(usize, Rgb)>,
        shown: usize,
    }

    impl PixelMatrix for Strip {
        fn write_pixel(&mut self, index: usize, color: Rgb) {
            self.pixels.push((index, color));
        }

        fn show(&mut self) {
            self.shown += 1;
        }
    }

    #[test]
    fn paint_writes_every_cell_then_shows() {
        let mut strip = Strip::default();
        paint_matrix(&mut strip, 3);
        assert_eq!(strip.pixels.len(), MATRIX_CELLS);
        assert_eq!(strip.pixels[2], (2, Rgb::new(0, 150, 150)));
        assert_eq!(strip.pixels[3], (3, Rgb::OFF));
        assert_eq!(strip.shown, 1);
    }
}
