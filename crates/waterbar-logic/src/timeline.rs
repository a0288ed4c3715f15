//! Append-only event timeline with time-travel state derivation.
//!
//! Every recorded action stores the full resulting state. The state "as of"
//! a clock time is the state of the latest confirmed event at or before
//! that time, ordered by creation instant, or the initial state when no
//! such event exists. User events are confirmed on creation; AI and
//! planned events stay provisional until [`Timeline::confirm`] is called.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::apply::{apply_action_checked, ApplyError};
use crate::catalog::{ActionCatalog, ActionId};
use crate::compartment::CompartmentState;
use crate::config::ModelConfig;

/// Minutes past midnight, written `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then(|| Self(hour as u16 * 60 + minute as u16))
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimelineError::InvalidTime(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimelineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

/// The 24 hourly slots of the day clock, `00:00` through `23:00`.
pub fn time_slots() -> Vec<TimeOfDay> {
    (0..24).map(|h| TimeOfDay(h * 60)).collect()
}

/// Whether `time` is at or before `now`.
pub fn is_in_past(time: TimeOfDay, now: TimeOfDay) -> bool {
    time <= now
}

/// Who created an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    User,
    Ai,
    Planned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: EventId,
    pub time: TimeOfDay,
    pub timestamp: DateTime<Utc>,
    pub action_id: ActionId,
    pub state: CompartmentState,
    pub source: EventSource,
    pub confirmed: bool,
}

/// A request to append an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub time: TimeOfDay,
    pub action_id: ActionId,
    pub source: EventSource,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    #[error("invalid time label {0:?}, expected HH:MM")]
    InvalidTime(String),
    #[error("unknown action: {0}")]
    UnknownAction(ActionId),
    #[error("unknown event: {0}")]
    UnknownEvent(EventId),
    #[error("action rejected: {0}")]
    Rejected(#[from] ApplyError),
}

/// The state as of `selected`: the latest confirmed event at or before it
/// (by timestamp, insertion order breaking ties), else `initial`.
pub fn derive_state_at_time(
    events: &[TimelineEvent],
    initial: &CompartmentState,
    selected: TimeOfDay,
) -> CompartmentState {
    let mut relevant: Vec<&TimelineEvent> = events
        .iter()
        .filter(|e| e.confirmed && e.time <= selected)
        .collect();
    relevant.sort_by_key(|e| e.timestamp);
    relevant.last().map_or(*initial, |e| e.state)
}

/// A single session's event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    initial: CompartmentState,
    events: Vec<TimelineEvent>,
    next_id: u64,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(CompartmentState::baseline())
    }
}

impl Timeline {
    pub fn new(initial: CompartmentState) -> Self {
        Self {
            initial,
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn initial(&self) -> &CompartmentState {
        &self.initial
    }

    /// Replace the initial state. Recorded events keep their snapshots.
    pub fn set_initial(&mut self, initial: CompartmentState) {
        self.initial = initial;
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: EventId) -> Option<&TimelineEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Provisional events awaiting confirmation.
    pub fn pending(&self) -> impl Iterator<Item = &TimelineEvent> {
        self.events.iter().filter(|e| !e.confirmed)
    }

    pub fn state_at(&self, selected: TimeOfDay) -> CompartmentState {
        derive_state_at_time(&self.events, &self.initial, selected)
    }

    /// Apply `entry.action_id` on top of the state as of `entry.time` and
    /// append the result. Only user events are confirmed immediately.
    pub fn record(
        &mut self,
        catalog: &ActionCatalog,
        config: &ModelConfig,
        entry: NewEvent,
    ) -> Result<&TimelineEvent, TimelineError> {
        let action = catalog
            .get(entry.action_id.as_str())
            .ok_or_else(|| TimelineError::UnknownAction(entry.action_id.clone()))?;

        let base = self.state_at(entry.time);
        let state = apply_action_checked(&base, action, config)?;

        let event = TimelineEvent {
            id: EventId(self.next_id),
            time: entry.time,
            timestamp: entry.timestamp,
            action_id: entry.action_id,
            state,
            source: entry.source,
            confirmed: entry.source == EventSource::User,
        };
        self.next_id += 1;

        log::info!(
            "recorded {} {} at {} ({:?}, confirmed={})",
            event.id,
            event.action_id,
            event.time,
            event.source,
            event.confirmed
        );
        self.events.push(event);
        Ok(&self.events[self.events.len() - 1])
    }

    /// Mark a provisional event as confirmed. Confirming twice is a no-op.
    pub fn confirm(&mut self, id: EventId) -> Result<&TimelineEvent, TimelineError> {
        let event = self
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(TimelineError::UnknownEvent(id))?;
        if !event.confirmed {
            event.confirmed = true;
            log::info!("confirmed {} {} at {}", event.id, event.action_id, event.time);
        }
        Ok(event)
    }
}
