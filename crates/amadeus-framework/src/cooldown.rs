//! Per-channel cooldown tracking.
//!
//! A [`CooldownTracker`] remembers, for every channel, when it last let a
//! trigger fire. Each channel owns its own slot, so bursts in one channel never
//! contend with another; the map-wide lock is only taken for writing the first
//! time a channel is seen.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};

use amadeus_core::ChannelId;

type Slot = Arc<Mutex<Option<DateTime<Utc>>>>;

/// Throttles re-firing per channel.
#[derive(Debug)]
pub struct CooldownTracker {
    window: Duration,
    last_fired: RwLock<HashMap<ChannelId, Slot>>,
}

impl CooldownTracker {
    /// Creates a tracker that requires strictly more than `window` between
    /// two firings in the same channel.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a tracker with a window of `secs` seconds.
    pub fn from_secs(secs: i64) -> Self {
        Self::new(Duration::seconds(secs))
    }

    /// The configured window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Fires for `channel` at `now` if the window has elapsed.
    ///
    /// Returns `true` and records `now` when more than the window has passed
    /// since the last recorded firing (or none was recorded). Otherwise returns
    /// `false` and leaves the record untouched. The check and the record are
    /// atomic per channel.
    pub fn try_fire(&self, channel: ChannelId, now: DateTime<Utc>) -> bool {
        let slot = self.slot(channel);
        let mut last = slot.lock();

        match *last {
            Some(prev) if now - prev <= self.window => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// When `channel` last fired, if ever.
    pub fn last_fired(&self, channel: ChannelId) -> Option<DateTime<Utc>> {
        self.last_fired
            .read()
            .get(&channel)
            .and_then(|slot| *slot.lock())
    }

    /// Number of channels seen so far.
    pub fn tracked_channels(&self) -> usize {
        self.last_fired.read().len()
    }

    fn slot(&self, channel: ChannelId) -> Slot {
        if let Some(slot) = self.last_fired.read().get(&channel) {
            return Arc::clone(slot);
        }
        Arc::clone(self.last_fired.write().entry(channel).or_default())
    }
}
