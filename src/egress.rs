use embassy_time::Timer;

use crate::config::{COOL_DOWN, POLL_INTERVAL};
use crate::debounce::PressDetector;
use crate::display::{DisplayChannel, DisplayRequest, EXIT_COMPLETED, NOBODY_PRESENT, TextDisplay};
use crate::error::Refusal;
use crate::feedback::Acknowledgement;
use crate::io::{Button, OutputSender, now_ms};
use crate::occupancy::Occupancy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Idle,
    Releasing,
    Empty,
}

/// Polls the exit button and lets people out.
pub struct Egress<'a, B> {
    occupancy: &'a Occupancy,
    exit: PressDetector<B>,
    phase: Phase,
}

impl<'a, B: Button> Egress<'a, B> {
    pub fn new(occupancy: &'a Occupancy, exit: B) -> Self {
        Egress {
            occupancy,
            exit: PressDetector::new(exit),
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn poll(&mut self, now_ms: u32) -> Option<Result<u8, Refusal>> {
        if self.phase != Phase::Idle || !self.exit.pressed(now_ms) {
            return None;
        }

        let outcome = self.occupancy.release();
        self.phase = match outcome {
            Ok(_) => Phase::Releasing,
            Err(_) => Phase::Empty,
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
                    info!("released, occupancy {}", count);
                    Acknowledgement::Departed.play(&outputs).await;
                    display
                        .announce(DisplayRequest::new(EXIT_COMPLETED, count))
                        .await;
                }
                Err(_) => {
                    info!("exit pressed with nobody inside");
                    display.announce(DisplayRequest::new(NOBODY_PRESENT, 0)).await;
                    Acknowledgement::Empty.play(&outputs).await;
                }
            }

            Timer::after(COOL_DOWN).await;
            self.cool_down_done();
        }
    }
}
