/*
 * The occupancy counter and the admission budget that gates it.
 *
 * The budget is a counting semaphore holding one permit per free slot. An
 * admission takes a permit without waiting, a release or a reset drain hands
 * permits back. Count and budget only ever change together, inside one
 * critical section, so `count + available == capacity` holds whenever anyone
 * else can look. The count itself sits in an atomic so that the renderers can
 * take a snapshot without locking anything.
 */

use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::{
    blocking_mutex::{Mutex, raw::CriticalSectionRawMutex},
    semaphore::{GreedySemaphore, Semaphore},
};

use crate::config::CAPACITY;
use crate::error::Refusal;

type AdmissionBudget = GreedySemaphore<CriticalSectionRawMutex>;

pub struct Occupancy {
    capacity: u8,
    count: AtomicU8,
    budget: AdmissionBudget,
    guard: Mutex<CriticalSectionRawMutex, ()>,
}

impl Occupancy {
    pub const fn new() -> Self {
        Self::with_capacity(CAPACITY)
    }

    pub const fn with_capacity(capacity: u8) -> Self {
        Occupancy {
            capacity,
            count: AtomicU8::new(0),
            budget: AdmissionBudget::new(capacity as usize),
            guard: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> u8 {
        self.capacity
    }

    /// Lock-free snapshot for the renderers. May be one update behind.
    pub fn current(&self) -> u8 {
        self.count.load(Ordering::Relaxed)
    }

    /// Number of free slots left in the admission budget.
    pub fn available(&self) -> usize {
        self.counts().1
    }

    /// Occupancy and free budget, read together so they always add up.
    pub fn counts(&self) -> (u8, usize) {
        self.guard.lock(|_| {
            // Taking every permit and dropping the releaser puts them back.
            let available = self
                .budget
                .try_acquire_all(1)
                .map_or(0, |permits| permits.permits());
            (self.count.load(Ordering::Relaxed), available)
        })
    }

    /// Admit one person. Never waits: a full venue is refused straight away.
    pub fn admit(&self) -> Result<u8, Refusal> {
        self.guard.lock(|_| {
            let count = self.count.load(Ordering::Relaxed);
            if count >= self.capacity {
                return Err(Refusal::Full);
            }
            match self.budget.try_acquire(1) {
                Some(permit) => {
                    permit.disarm();
                    self.count.store(count + 1, Ordering::Relaxed);
                    Ok(count + 1)
                }
                None => Err(Refusal::Full),
            }
        })
    }

    /// Let one person out and hand their slot back to the budget.
    pub fn release(&self) -> Result<u8, Refusal> {
        self.guard.lock(|_| self.release_one())
    }

    /// Force the count to zero, returning every slot to the budget. Each step
    /// is its own critical section, so an admission may slip in between two
    /// steps but never sees count and budget disagree. Returns the number of
    /// people released.
    pub fn drain(&self) -> u8 {
        let mut drained: u8 = 0;
        while self.guard.lock(|_| self.release_one()).is_ok() {
            drained = drained.saturating_add(1);
        }
        drained
    }

    // Caller holds the guard.
    fn release_one(&self) -> Result<u8, Refusal> {
        let count = self.count.load(Ordering::Relaxed);
        if count == 0 {
            return Err(Refusal::Empty);
        }
        self.count.store(count - 1, Ordering::Relaxed);
        self.budget.release(1);
        Ok(count - 1)
    }
}

impl Default for Occupancy {
    fn default() -> Self {
        Self::new()
    }
}
