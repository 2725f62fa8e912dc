/*
 * Audible and visual acknowledgements played by the controllers. Each one is a
 * pulse repeated a few times: optionally light an LED, sound the buzzer, go
 * quiet, put the LED out and pause.
 */

use embassy_time::{Duration, Timer};

use crate::io::{Led, OutputCommand, OutputSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Acknowledgement {
    Admitted,
    Full,
    Departed,
    Empty,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub led: Option<Led>,
    pub tone_ms: u64,
    pub gap_ms: u64,
    pub repeats: u8,
}

impl Acknowledgement {
    pub fn pulse(self) -> Pulse {
        match self {
            Acknowledgement::Admitted => Pulse {
                led: Some(Led::Green),
                tone_ms: 200,
                gap_ms: 100,
                repeats: 1,
            },
            Acknowledgement::Full => Pulse {
                led: None,
                tone_ms: 100,
                gap_ms: 100,
                repeats: 1,
            },
            Acknowledgement::Departed => Pulse {
                led: Some(Led::Red),
                tone_ms: 100,
                gap_ms: 200,
                repeats: 3,
            },
            Acknowledgement::Empty => Pulse {
                led: None,
                tone_ms: 50,
                gap_ms: 100,
                repeats: 1,
            },
            Acknowledgement::Reset => Pulse {
                led: Some(Led::Blue),
                tone_ms: 2000,
                gap_ms: 0,
                repeats: 1,
            },
        }
    }

    #[cfg(test)]
    pub(crate) fn duration_ms(self) -> u64 {
        let pulse = self.pulse();
        (pulse.tone_ms + pulse.gap_ms) * pulse.repeats as u64
    }

    pub async fn play(self, outputs: &OutputSender<'_>) {
        let pulse = self.pulse();
        for _ in 0..pulse.repeats {
            if let Some(led) = pulse.led {
                outputs.send(OutputCommand::Led(led, true)).await;
            }
            outputs.send(OutputCommand::Tone(true)).await;
            Timer::after(Duration::from_millis(pulse.tone_ms)).await;
            outputs.send(OutputCommand::Tone(false)).await;
            if let Some(led) = pulse.led {
                outputs.send(OutputCommand::Led(led, false)).await;
            }
            Timer::after(Duration::from_millis(pulse.gap_ms)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_is_shorter_than_admission() {
        assert!(Acknowledgement::Full.duration_ms() < Acknowledgement::Admitted.duration_ms());
        assert_ne!(Acknowledgement::Full.pulse(), Acknowledgement::Admitted.pulse());
    }

    #[test]
    fn departure_is_longer_and_multi_pulse() {
        let departed = Acknowledgement::Departed.pulse();
        assert!(departed.repeats > 1);
        assert!(Acknowledgement::Departed.duration_ms() > Acknowledgement::Admitted.duration_ms());
    }

    #[test]
    fn reset_is_the_longest() {
        let reset = Acknowledgement::Reset.duration_ms();
        for other in [
            Acknowledgement::Admitted,
            Acknowledgement::Full,
            Acknowledgement::Departed,
            Acknowledgement::Empty,
        ] {
            assert!(reset > other.duration_ms());
        }
    }

    #[test]
    fn empty_is_a_short_beep_without_light() {
        let empty = Acknowledgement::Empty.pulse();
        assert_eq!(empty.led, None);
        assert_eq!(empty.repeats, 1);
    }
}
