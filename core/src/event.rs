//! Fund events — the notification channel between commands and the UI.
//!
//! RULE: The settlement computation itself never publishes. Only the
//! side-effecting commands (approvals, payouts, period lifecycle) emit
//! events, and the caller's UI layer subscribes to refresh itself.

use crate::types::{EntityId, Money};
use serde::{Deserialize, Serialize};

/// Every event emitted by fund commands.
/// Variants are added over time — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FundEvent {
    EntryApproved {
        entry_id: EntityId,
        user_id: EntityId,
        amount: Money,
    },
    EntryRejected {
        entry_id: EntityId,
        user_id: EntityId,
    },
    PayoutRecorded {
        entry_id: EntityId,
        user_id: EntityId,
        amount: Money,
        period_id: Option<EntityId>,
    },
    PeriodClosed {
        period_id: EntityId,
    },
    PeriodCompleted {
        period_id: EntityId,
        forced: bool,
    },
    SettlementComputed {
        period_id: Option<EntityId>,
        employee_count: usize,
        pool: Money,
    },
}

/// Extract a stable string name from a FundEvent variant.
/// Used for the event_type column in event_log.
pub fn event_type_name(event: &FundEvent) -> &'static str {
    match event {
        FundEvent::EntryApproved { .. } => "entry_approved",
        FundEvent::EntryRejected { .. } => "entry_rejected",
        FundEvent::PayoutRecorded { .. } => "payout_recorded",
        FundEvent::PeriodClosed { .. } => "period_closed",
        FundEvent::PeriodCompleted { .. } => "period_completed",
        FundEvent::SettlementComputed { .. } => "settlement_computed",
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub period_id: Option<EntityId>,
    pub event_type: String,
    pub payload: String, // JSON-serialized FundEvent
    pub created_at: String,
}

/// In-process publish/subscribe. Subscribers see events in publish order.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Box<dyn Fn(&FundEvent) + Send>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn Fn(&FundEvent) + Send>) {
        self.subscribers.push(subscriber);
    }

    pub fn publish(&self, event: &FundEvent) {
        for subscriber in &self.subscribers {
            subscriber(event);
        }
    }
}
