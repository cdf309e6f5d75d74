//! Cooperative cancellation and progress reporting.
//!
//! A [`FillControl`] is shared between the caller and a running fill
//! operation (typically through an `Arc` when the operation runs on a worker
//! thread). The operation checks [`FillControl::is_cancelled`] between
//! stations and publishes progress; the caller polls
//! [`FillControl::progress_percent`] and may request cancellation at any time.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Progress is stored in hundredths of a percent.
const PROGRESS_SCALE: u32 = 10_000;

/// Shared cancellation flag and progress counter.
#[derive(Debug, Default)]
pub struct FillControl {
    cancelled: AtomicBool,
    progress: AtomicU32,
}

impl FillControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Running operations stop at the next station boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clears the cancellation flag and progress so the control can be reused.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
        self.progress.store(0, Ordering::SeqCst);
    }

    /// Publish progress as `done` of `total` units of work.
    pub fn report(&self, done: usize, total: usize) {
        let value = if total == 0 {
            PROGRESS_SCALE
        } else {
            ((done.min(total) as f64 / total as f64) * PROGRESS_SCALE as f64).round() as u32
        };
        self.progress.store(value, Ordering::Relaxed);
    }

    /// Last published progress in percent, 0.0 to 100.0.
    pub fn progress_percent(&self) -> f64 {
        self.progress.load(Ordering::Relaxed) as f64 * 100.0 / PROGRESS_SCALE as f64
    }
}

/// Result of an operation that may be cancelled part-way.
///
/// `Cancelled` carries whatever partial result had been produced when the
/// cancellation flag was observed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Complete(T),
    Cancelled(T),
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Complete(v) | Outcome::Cancelled(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Outcome::Complete(v) | Outcome::Cancelled(v) => v,
        }
    }

    /// Maps the carried value, keeping the completion status.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Complete(v) => Outcome::Complete(f(v)),
            Outcome::Cancelled(v) => Outcome::Cancelled(f(v)),
        }
    }
}
