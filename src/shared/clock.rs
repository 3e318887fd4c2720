//! Time provider abstraction
//!
//! Token expiry and client session expiry are both computed from a [`Clock`]
//! so that tests can move time forward without sleeping.
//!
//! # Example
//!
//! ```
//! use community_identity::shared::clock::{Clock, ManualClock};
//!
//! let clock = ManualClock::at_secs(1_700_000_000);
//! clock.advance_secs(901);
//! assert_eq!(clock.now_secs(), 1_700_000_901);
//! ```

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// A time provider for the current wall-clock time.
pub trait Clock: Send + Sync + Debug {
    /// Current time as a UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Current time as whole seconds since the Unix epoch.
    fn now_secs(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Production clock backed by [`chrono::Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock.
///
/// Clones share the same underlying instant, so a clock handed to the token
/// authority can be advanced from a test holding another clone.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock frozen at the given Unix time in seconds.
    pub fn at_secs(secs: i64) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(secs * 1000)),
        }
    }

    /// Create a clock frozen at the current system time.
    pub fn starting_now() -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(Utc::now().timestamp_millis())),
        }
    }

    /// Advance the clock by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.millis.fetch_add(secs * 1000, Ordering::SeqCst);
    }

    /// Set the clock to a specific Unix time in seconds.
    pub fn set_secs(&self, secs: i64) {
        self.millis.store(secs * 1000, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::at_secs(1_704_067_200)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::SeqCst);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}
