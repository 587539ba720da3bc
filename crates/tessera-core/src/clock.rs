//! `Clock` implementations.

use std::sync::atomic::{AtomicI64, Ordering};

use tessera_contracts::time::Timestamp;

use crate::traits::Clock;

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Always returns the same instant.
///
/// Useful for replaying a session and for reproducible hashes in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Starts at a given instant and advances by a fixed step on every read.
///
/// A test double: reading past the representable range panics.
#[derive(Debug)]
pub struct SteppedClock {
    next_millis: AtomicI64,
    step_millis: i64,
}

impl SteppedClock {
    pub fn new(start: Timestamp, step_millis: i64) -> Self {
        Self {
            next_millis: AtomicI64::new(start.timestamp_millis()),
            step_millis,
        }
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> Timestamp {
        let millis = self.next_millis.fetch_add(self.step_millis, Ordering::SeqCst);
        match Timestamp::from_millis(millis) {
            Some(timestamp) => timestamp,
            None => panic!("SteppedClock stepped out of the representable range at {millis} ms"),
        }
    }
}
