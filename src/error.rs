use core::fmt;

/// Why the counter refused to move. Neither case is fatal: the controller
/// that asked gives feedback and carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Refusal {
    /// Admission attempted while every slot is taken.
    Full,
    /// Release attempted while nobody is inside.
    Empty,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refusal::Full => write!(f, "capacity exceeded"),
            Refusal::Empty => write!(f, "nobody present"),
        }
    }
}

impl core::error::Error for Refusal {}

/// The text display stayed locked for longer than the allowed wait, so the
/// update was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayBusy;

impl fmt::Display for DisplayBusy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "display busy, update dropped")
    }
}

impl core::error::Error for DisplayBusy {}
