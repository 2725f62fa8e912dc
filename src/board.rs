/*
 * Drivers for the DESPI-M02 board (STM32F103VE). This is the only part of the
 * program that is device-specific: it maps the library's small driver traits
 * onto the actual pins and peripherals.
 */

use core::fmt::Write;

use despi_m02_occupancy::display::TextDisplay;
use despi_m02_occupancy::io::{Button, Led, Outputs};
use despi_m02_occupancy::presenter::{MATRIX_CELLS, PixelMatrix, Rgb};
use embassy_stm32::{
    gpio::{Input, Level, Output},
    mode::Blocking,
    spi::Spi,
    usart::UartTx,
};
use enum_ordinalize::Ordinalize;
use heapless::String;

/// Status LEDs, indexed by `Led` ordinal, plus an active buzzer.
pub struct Panel {
    leds: [Output<'static>; Led::VARIANT_COUNT],
    buzzer: Output<'static>,
}

impl Panel {
    pub fn new(leds: [Output<'static>; Led::VARIANT_COUNT], buzzer: Output<'static>) -> Self {
        Panel { leds, buzzer }
    }
}

fn level(on: bool) -> Level {
    if on { Level::High } else { Level::Low }
}

impl Outputs for Panel {
    fn set_led(&mut self, led: Led, on: bool) {
        self.leds[led.ordinal()].set_level(level(on));
    }

    fn set_tone(&mut self, enabled: bool) {
        self.buzzer.set_level(level(enabled));
    }
}

/// Push button to ground with the internal pull-up, so pressed reads low.
pub struct PanelButton(pub Input<'static>);

impl Button for PanelButton {
    fn is_pressed(&mut self) -> bool {
        self.0.is_low()
    }
}

const LINES: usize = 4;
const LINE_PITCH: u8 = 16;

/*
 * The "display" is a serial console on USART1. Text is collected per line
 * (y coordinate divided by the line pitch) and the whole frame is written out
 * on flush, after a clear-screen escape sequence.
 */
pub struct SerialDisplay {
    tx: UartTx<'static, Blocking>,
    lines: [String<32>; LINES],
    border: bool,
}

impl SerialDisplay {
    pub fn new(tx: UartTx<'static, Blocking>) -> Self {
        SerialDisplay {
            tx,
            lines: Default::default(),
            border: false,
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        // nothing sensible to do about a serial error, skip the rest
        let _ = self.tx.blocking_write(bytes);
    }
}

const RULE: &[u8] = b"+------------------------------+\r\n";

impl TextDisplay for SerialDisplay {
    fn clear(&mut self) {
        self.lines.iter_mut().for_each(|line| line.clear());
        self.border = false;
    }

    fn draw_border(&mut self) {
        self.border = true;
    }

    fn draw_text(&mut self, text: &str, x: u8, y: u8) {
        let Some(line) = self.lines.get_mut((y / LINE_PITCH) as usize) else {
            return;
        };
        line.clear();
        let indent = (x / 8) as usize;
        for _ in 0..indent {
            let _ = line.push(' ');
        }
        let _ = line.write_str(text);
    }

    fn flush(&mut self) {
        self.write(b"\x1b[2J\x1b[H");
        if self.border {
            self.write(RULE);
        }
        for line in &self.lines {
            let _ = self.tx.blocking_write(line.as_bytes());
            let _ = self.tx.blocking_write(b"\r\n");
        }
        if self.border {
            self.write(RULE);
        }
    }
}

/*
 * WS2812 pixels fed from SPI MOSI. At 3.2 MHz an SPI nibble lasts 1.25 us, one
 * WS2812 bit: 0b1000 is a zero, 0b1110 a one. Two pixel bits per SPI byte.
 */
pub struct SpiMatrix {
    spi: Spi<'static, Blocking>,
    frame: [Rgb; MATRIX_CELLS],
}

impl SpiMatrix {
    pub fn new(spi: Spi<'static, Blocking>) -> Self {
        SpiMatrix {
            spi,
            frame: [Rgb::OFF; MATRIX_CELLS],
        }
    }
}

fn encode(byte: u8) -> [u8; 4] {
    const ZERO: u8 = 0b1000;
    const ONE: u8 = 0b1110;
    let mut out = [0u8; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let hi = if byte & (0x80 >> (2 * i)) != 0 { ONE } else { ZERO };
        let lo = if byte & (0x40 >> (2 * i)) != 0 { ONE } else { ZERO };
        *slot = (hi << 4) | lo;
    }
    out
}

impl PixelMatrix for SpiMatrix {
    fn write_pixel(&mut self, index: usize, color: Rgb) {
        if let Some(cell) = self.frame.get_mut(index) {
            *cell = color;
        }
    }

    fn show(&mut self) {
        for pixel in self.frame {
            // WS2812 wants green, red, blue
            for byte in [pixel.g, pixel.r, pixel.b] {
                let _ = self.spi.blocking_write(&encode(byte));
            }
        }
        // >50 us low latches the frame
        let _ = self.spi.blocking_write(&[0u8; 24]);
    }
}
