//! Inbox: bridges the MQTT client task to the main loop.
//!
//! ```text
//! ┌──────────────────┐  InboxItem  ┌──────────────┐
//! │ MQTT event task  │───────────▶│  Main loop   │
//! │ (ESP-IDF, cb)    │  try_send   │  try_receive │
//! └──────────────────┘             └──────────────┘
//! ```
//!
//! The callback side never blocks: when the main loop falls behind and the
//! channel is full, new publishes are dropped and counted.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::messaging::InboundMessage;

/// Channel depth. Letters arrive at human typing speed.
const INBOX_DEPTH: usize = 8;

/// One event from the transport task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboxItem {
    /// The broker accepted the session.
    Connected,
    /// The connection attempt failed with this reason code.
    Refused(i32),
    Message(InboundMessage),
    /// An established session dropped.
    Closed,
}

pub struct Inbox {
    channel: Channel<CriticalSectionRawMutex, InboxItem, INBOX_DEPTH>,
    dropped: AtomicU32,
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Inbox {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue without blocking. Returns `false` if the item was dropped.
    pub fn post(&self, item: InboxItem) -> bool {
        match self.channel.try_send(item) {
            Ok(()) => true,
            Err(_) => {
                let n = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!("inbox: full, dropped event ({} total)", n);
                false
            }
        }
    }

    /// Dequeue the oldest item, if any.
    pub fn take(&self) -> Option<InboxItem> {
        self.channel.try_receive().ok()
    }

    /// Discard everything queued, e.g. leftovers of a previous session.
    pub fn drain(&self) {
        while self.channel.try_receive().is_ok() {}
    }

    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}
