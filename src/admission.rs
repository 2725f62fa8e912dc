use embassy_time::Timer;

use crate::config::{COOL_DOWN, POLL_INTERVAL};
use crate::debounce::PressDetector;
use crate::display::{DisplayChannel, DisplayRequest, ENTRY_COMPLETED, FULL, TextDisplay};
use crate::error::Refusal;
use crate::feedback::Acknowledgement;
use crate::io::{Button, OutputSender, now_ms};
use crate::occupancy::Occupancy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Idle,
    Evaluating,
    Admitting,
    Rejecting,
}

/// Polls the entry button and lets people in while there is room.
pub struct Admission<'a, B> {
    occupancy: &'a Occupancy,
    entry: PressDetector<B>,
    phase: Phase,
}

impl<'a, B: Button> Admission<'a, B> {
    pub fn new(occupancy: &'a Occupancy, entry: B) -> Self {
        Admission {
            occupancy,
            entry: PressDetector::new(entry),
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /*
     * One sample of the entry button. Only looks at the button while idle. On
     * an accepted press the admission is decided and applied right away, and
     * the controller stays in Admitting or Rejecting until `cool_down_done`.
     */
    pub fn poll(&mut self, now_ms: u32) -> Option<Result<u8, Refusal>> {
        if self.phase != Phase::Idle || !self.entry.pressed(now_ms) {
            return None;
        }

        self.phase = Phase::Evaluating;
        let outcome = self.occupancy.admit();
        self.phase = match outcome {
            Ok(_) => Phase::Admitting,
            Err(_) => Phase::Rejecting,
        };
        Some(outcome)
    }

    pub fn cool_down_done(&mut self) {
        self.phase = Phase::Idle;
    }

    pub async fn run<D: TextDisplay>(
        mut self,
        outputs: OutputSender<'_>,
        display: &DisplayChannel<D>,
    ) -> ! {
        loop {
            let Some(outcome) = self.poll(now_ms()) else {
                Timer::after(POLL_INTERVAL).await;
                continue;
            };

            match outcome {
                Ok(count) => {
                    info!("admitted, occupancy {}", count);
                    Acknowledgement::Admitted.play(&outputs).await;
                    display
                        .announce(DisplayRequest::new(ENTRY_COMPLETED, count))
                        .await;
                }
                Err(refusal) => {
                    info!("entry refused: {:?}", refusal);
                    display
                        .announce(DisplayRequest::new(FULL, self.occupancy.current()))
                        .await;
                    Acknowledgement::Full.play(&outputs).await;
                }
            }

            Timer::after(COOL_DOWN).await;
            self.cool_down_done();
        }
    }
}
