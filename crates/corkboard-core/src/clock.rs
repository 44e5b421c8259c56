//! Timestamps and identifier minting.

use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

// Use web-time on WASM, std::time otherwise
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Last value handed out by [`now_millis`].
static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Milliseconds since the Unix epoch, strictly increasing within the process.
///
/// Two calls in the same millisecond (or after the wall clock stepped back)
/// still return increasing values, which keeps stroke `zIndex` ordering stable.
pub fn now_millis() -> i64 {
    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);

    let mut last = LAST_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = wall.max(last + 1);
        match LAST_MILLIS.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// Mint a fresh identifier for a board or element.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
