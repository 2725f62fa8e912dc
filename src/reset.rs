/*
 * Reset: an interrupt on the reset button wakes a dedicated task that drains
 * the counter to zero.
 *
 * The interrupt side only debounces and raises a single-slot signal; it never
 * blocks. Several edges before the task runs collapse into one wake-up, which
 * is all that matters: "has a reset been asked for since the last drain".
 */

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};

use crate::debounce::Debouncer;
use crate::display::{DisplayChannel, DisplayRequest, RESET_COMPLETED, TextDisplay};
use crate::feedback::Acknowledgement;
use crate::io::OutputSender;
use crate::occupancy::Occupancy;

pub struct ResetLine {
    debouncer: Debouncer,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl ResetLine {
    pub const fn new() -> Self {
        ResetLine {
            debouncer: Debouncer::new(),
            wake: Signal::new(),
        }
    }

    /// Interrupt-context entry point. Returns whether the edge was accepted.
    pub fn on_edge(&self, pressed: bool, now_ms: u32) -> bool {
        if !self.debouncer.accept(pressed, now_ms) {
            return false;
        }
        debug!("reset edge accepted at {} ms", now_ms);
        self.wake.signal(());
        true
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        self.wake.signaled()
    }

    async fn wait(&self) {
        self.wake.wait().await
    }
}

impl Default for ResetLine {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Parked,
    Draining,
    Acknowledging,
}

pub struct ResetController<'a> {
    occupancy: &'a Occupancy,
    line: &'a ResetLine,
    phase: Phase,
}

impl<'a> ResetController<'a> {
    pub fn new(occupancy: &'a Occupancy, line: &'a ResetLine) -> Self {
        ResetController {
            occupancy,
            line,
            phase: Phase::Parked,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Park until the reset line fires, then drain. Returns how many people
    /// were released.
    pub async fn next_reset(&mut self) -> u8 {
        self.phase = Phase::Parked;
        self.line.wait().await;

        self.phase = Phase::Draining;
        let drained = self.occupancy.drain();
        self.phase = Phase::Acknowledging;
        drained
    }

    pub async fn run<D: TextDisplay>(
        mut self,
        outputs: OutputSender<'_>,
        display: &DisplayChannel<D>,
    ) -> ! {
        loop {
            let drained = self.next_reset().await;
            info!("reset, released {}", drained);
            display
                .announce(DisplayRequest::new(RESET_COMPLETED, self.occupancy.current()))
                .await;
            Acknowledgement::Reset.play(&outputs).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CAPACITY;
    use crate::display::testing::JournalScreen;
    use crate::io::testing::{Event, Journal, frame, record_outputs};
    use crate::io::{Led, OutputChannel, OutputCommand};
    use embassy_futures::{block_on, select::select};
    use embassy_time::Duration;

    #[test]
    fn edge_raises_one_pending_reset() {
        let line = ResetLine::new();
        assert!(!line.is_pending());
        assert!(line.on_edge(true, 1_000));
        assert!(line.is_pending());
    }

    #[test]
    fn bouncing_edges_are_filtered() {
        let line = ResetLine::new();
        assert!(line.on_edge(true, 1_000));
        assert!(!line.on_edge(true, 1_020));
        assert!(!line.on_edge(false, 1_300));
    }

    #[test]
    fn wake_drains_to_zero() {
        let occupancy = Occupancy::new();
        for _ in 0..17 {
            occupancy.admit().unwrap();
        }
        let line = ResetLine::new();
        let mut reset = ResetController::new(&occupancy, &line);
        assert_eq!(reset.phase(), Phase::Parked);

        line.on_edge(true, 0);
        assert_eq!(block_on(reset.next_reset()), 17);
        assert_eq!(reset.phase(), Phase::Acknowledging);
        assert_eq!(occupancy.current(), 0);
        assert_eq!(occupancy.available(), CAPACITY as usize);
        assert!(!line.is_pending());
    }

    #[test]
    fn edges_before_the_drain_collapse_into_one() {
        let occupancy = Occupancy::new();
        occupancy.admit().unwrap();
        let line = ResetLine::new();
        let mut reset = ResetController::new(&occupancy, &line);

        line.on_edge(true, 0);
        line.on_edge(true, 500);
        assert_eq!(block_on(reset.next_reset()), 1);
        assert!(!line.is_pending());
    }

    #[test]
    fn repeated_reset_gives_same_end_state() {
        let occupancy = Occupancy::new();
        for _ in 0..5 {
            occupancy.admit().unwrap();
        }
        let line = ResetLine::new();
        let mut reset = ResetController::new(&occupancy, &line);

        line.on_edge(true, 0);
        block_on(reset.next_reset());
        line.on_edge(true, 1_000);
        assert_eq!(block_on(reset.next_reset()), 0);
        assert_eq!(occupancy.current(), 0);
        assert_eq!(occupancy.available(), CAPACITY as usize);
    }

    #[test]
    fn run_announces_reset_then_holds_blue_tone() {
        let occupancy = Occupancy::new();
        for _ in 0..9 {
            occupancy.admit().unwrap();
        }
        let line = ResetLine::new();
        let reset = ResetController::new(&occupancy, &line);
        line.on_edge(true, 0);

        let journal = Journal::default();
        let outputs = OutputChannel::new();
        let display = DisplayChannel::new(JournalScreen::new(journal.clone()));
        // the blue tone lasts two seconds, only its start fits in the window
        block_on(select(
            reset.run(outputs.sender(), &display),
            record_outputs(outputs.receiver(), &journal, Duration::from_millis(100)),
        ));

        assert_eq!(
            journal.take(),
            [
                frame(&["Reset completed", "Occupants: 0"]),
                Event::Output(OutputCommand::Led(Led::Blue, true)),
                Event::Output(OutputCommand::Tone(true)),
            ]
        );
        assert_eq!(occupancy.current(), 0);
        assert_eq!(occupancy.available(), CAPACITY as usize);
        assert!(!line.is_pending());
    }
}
