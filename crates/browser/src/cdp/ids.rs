//! Request id allocation
//!
//! Ids only need to be unique among in-flight commands on one connection,
//! and a connection carries one command at a time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use super::protocol::RequestId;

pub trait IdAllocator: Send + Sync {
    fn next_id(&self) -> RequestId;
}

/// Wall-clock milliseconds modulo 100 000.
///
/// Two commands issued within the same millisecond get the same id. That
/// is tolerated only because a connection never has two commands in
/// flight; use [`SequentialIds`] where that does not hold.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClockIds;

pub const CLOCK_ID_MODULUS: u64 = 100_000;

impl IdAllocator for ClockIds {
    fn next_id(&self) -> RequestId {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        millis % CLOCK_ID_MODULUS
    }
}

/// Monotonic request ID counter
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn starting_at(first: RequestId) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdAllocator for SequentialIds {
    fn next_id(&self) -> RequestId {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}
