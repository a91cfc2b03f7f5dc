//! Short-lived user-facing messages

use std::time::Duration;

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    expires: Timer,
}

/// Notifications currently shown, oldest first
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    items: Vec<Notification>,
    next_id: u64,
    duration: Duration,
}

impl Notifications {
    pub fn new(duration: Duration) -> Self {
        Self {
            items: Vec::new(),
            next_id: 0,
            duration,
        }
    }

    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let message = message.into();
        debug!("Notification ({:?}): {}", kind, message);
        self.items.push(Notification {
            id: self.next_id,
            kind,
            message,
            expires: Timer::new(self.duration, TimerMode::Once),
        });
        self.next_id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Error, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Info, message)
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|n| n.id != id);
    }

    /// Age every notification and drop the expired ones
    pub fn tick(&mut self, delta: Duration) {
        for item in &mut self.items {
            item.expires.tick(delta);
        }
        self.items.retain(|n| !n.expires.finished());
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }
}
