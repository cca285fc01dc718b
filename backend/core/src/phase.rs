//! Atomic phase tags for operations that must not overlap.
//!
//! A component keeps one [`PhaseCell`] per exclusive activity. Starting the
//! activity swaps the cell from its idle value to a busy value in a single
//! compare-and-swap; the returned [`PhaseGuard`] puts it back to idle when it
//! is dropped, whichever way the operation ends.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::VozError;

/// A small state enum that can live in an [`AtomicU8`].
pub trait PhaseTag: Copy + Eq + fmt::Debug {
    const IDLE: Self;

    fn to_raw(self) -> u8;

    fn from_raw(raw: u8) -> Self;
}

pub struct PhaseCell<P: PhaseTag> {
    raw: AtomicU8,
    _tag: PhantomData<fn() -> P>,
}

impl<P: PhaseTag> PhaseCell<P> {
    pub fn new() -> Self {
        Self {
            raw: AtomicU8::new(P::IDLE.to_raw()),
            _tag: PhantomData,
        }
    }

    pub fn current(&self) -> P {
        P::from_raw(self.raw.load(Ordering::Acquire))
    }

    /// Move from idle to `next`, or fail with [`VozError::Busy`] naming the
    /// phase that is already active.
    pub fn try_enter(&self, next: P) -> Result<PhaseGuard<'_, P>, VozError> {
        self.raw
            .compare_exchange(
                P::IDLE.to_raw(),
                next.to_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| PhaseGuard { cell: self })
            .map_err(|active| VozError::Busy(format!("{:?}", P::from_raw(active)).to_lowercase()))
    }
}

impl<P: PhaseTag> Default for PhaseCell<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PhaseTag> fmt::Debug for PhaseCell<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PhaseCell").field(&self.current()).finish()
    }
}

/// Returns the owning cell to idle on drop.
#[must_use = "dropping the guard immediately releases the phase"]
pub struct PhaseGuard<'a, P: PhaseTag> {
    cell: &'a PhaseCell<P>,
}

impl<P: PhaseTag> Drop for PhaseGuard<'_, P> {
    fn drop(&mut self) {
        self.cell.raw.store(P::IDLE.to_raw(), Ordering::Release);
    }
}
