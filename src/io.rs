/*
 * The I/O module for the occupancy counter.
 *
 * The LEDs and the buzzer are shared by every activity: the controllers flash
 * them to acknowledge a button press and the status light repaints them all
 * the time. Rather than sharing the pins, one task owns them and everybody
 * else sends it commands through a channel. The hardware itself hides behind
 * the small traits below so that the rest of the crate does not care which
 * board it runs on.
 */

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, Receiver, Sender},
};
use embassy_time::Instant;
use enum_ordinalize::Ordinalize;

use crate::config::OUTPUT_QUEUE_DEPTH;
use crate::presenter::StatusColor;

#[derive(Ordinalize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum Led {
    Red,
    Green,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputCommand {
    Led(Led, bool),
    Tone(bool),
    Status(StatusColor),
}

/// Digital outputs: the three status LEDs and the buzzer.
pub trait Outputs {
    fn set_led(&mut self, led: Led, on: bool);
    fn set_tone(&mut self, enabled: bool);
}

/// A push button, sampled by polling.
pub trait Button {
    fn is_pressed(&mut self) -> bool;
}

impl OutputCommand {
    pub fn apply(self, outputs: &mut impl Outputs) {
        match self {
            OutputCommand::Led(led, on) => outputs.set_led(led, on),
            OutputCommand::Tone(enabled) => outputs.set_tone(enabled),
            OutputCommand::Status(color) => {
                let lit = color.lit();
                for led in Led::VARIANTS.iter() {
                    outputs.set_led(*led, lit[led.ordinal()]);
                }
            }
        }
    }
}

pub type OutputChannel = Channel<CriticalSectionRawMutex, OutputCommand, OUTPUT_QUEUE_DEPTH>;
pub type OutputSender<'a> = Sender<'a, CriticalSectionRawMutex, OutputCommand, OUTPUT_QUEUE_DEPTH>;
pub type OutputReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, OutputCommand, OUTPUT_QUEUE_DEPTH>;

pub async fn drive_outputs(commands: OutputReceiver<'_>, outputs: &mut impl Outputs) -> ! {
    loop {
        let command = commands.receive().await;
        trace!("output {:?}", command);
        command.apply(outputs);
    }
}

/// Monotonic milliseconds since boot. Wraps after ~49 days.
pub fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use embassy_futures::select::{Either, select};
    use embassy_time::{Duration, Timer};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::string::{String, ToString};
    use std::vec::Vec;

    /// Records what the output task would have done to the pins.
    #[derive(Default, Debug)]
    pub struct PinLog {
        pub leds: [bool; Led::VARIANT_COUNT],
        pub tone: bool,
        pub writes: Vec<OutputCommand>,
    }

    impl Outputs for PinLog {
        fn set_led(&mut self, led: Led, on: bool) {
            self.leds[led.ordinal()] = on;
            self.writes.push(OutputCommand::Led(led, on));
        }

        fn set_tone(&mut self, enabled: bool) {
            self.tone = enabled;
            self.writes.push(OutputCommand::Tone(enabled));
        }
    }

    /// A button the test holds down or lets go of.
    #[derive(Clone, Default)]
    pub struct FakeButton(pub Rc<Cell<bool>>);

    impl FakeButton {
        pub fn hold(&self, pressed: bool) {
            self.0.set(pressed);
        }
    }

    impl Button for FakeButton {
        fn is_pressed(&mut self) -> bool {
            self.0.get()
        }
    }

    /// What a controller did, in the order it did it.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event {
        Output(OutputCommand),
        /// Text lines of one flushed display frame.
        Frame(Vec<String>),
    }

    pub type Journal = Rc<RefCell<Vec<Event>>>;

    pub fn frame(lines: &[&str]) -> Event {
        Event::Frame(lines.iter().map(|line| line.to_string()).collect())
    }

    /// Stands in for the output task: takes commands off the queue into the
    /// journal until `window` has passed.
    pub async fn record_outputs(commands: OutputReceiver<'_>, journal: &Journal, window: Duration) {
        let deadline = Instant::now() + window;
        loop {
            match select(commands.receive(), Timer::at(deadline)).await {
                Either::First(command) => journal.borrow_mut().push(Event::Output(command)),
                Either::Second(()) => break,
            }
        }
    }
}
