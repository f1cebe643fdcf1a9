//! Single-slot notification queue
//!
//! At most one notification is visible. A new one replaces the visible one
//! and restarts the display window; there is no backlog. Each display gets a
//! generation number so that the dismiss timer of a replaced notification is
//! ignored when it fires.

use std::time::Duration;

use crate::domain::Notification;

/// What the caller needs to schedule the auto-dismiss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayTicket {
    pub generation: u64,
    pub ttl: Duration,
}

#[derive(Debug)]
pub struct NotificationQueue {
    visible: Option<(u64, Notification)>,
    generation: u64,
    ttl: Duration,
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            visible: None,
            generation: 0,
            ttl,
        }
    }

    /// Show `notification` now, replacing whatever is visible
    pub fn enqueue(&mut self, notification: Notification) -> DisplayTicket {
        self.generation += 1;
        self.visible = Some((self.generation, notification));
        self.display_next()
    }

    fn display_next(&self) -> DisplayTicket {
        DisplayTicket {
            generation: self.generation,
            ttl: self.ttl,
        }
    }

    /// Dismiss the notification shown under `generation`. Returns false when
    /// it was already replaced or dismissed.
    pub fn dismiss(&mut self, generation: u64) -> bool {
        match &self.visible {
            Some((current, _)) if *current == generation => {
                self.visible = None;
                true
            }
            _ => false,
        }
    }

    pub fn visible(&self) -> Option<&Notification> {
        self.visible.as_ref().map(|(_, n)| n)
    }
}
