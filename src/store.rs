//! In-memory event store.
//!
//! State only changes through [`Store::dispatch`], which runs the pure
//! [`reduce`] function and then notifies subscribed observers.

use crate::models::{Event, EventId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventsState {
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Action {
    #[serde(rename = "ADD_EVENT")]
    Add(Event),
    #[serde(rename = "UPDATE_EVENT")]
    Update(Event),
    #[serde(rename = "DELETE_EVENT")]
    Delete(EventId),
    #[serde(other)]
    Unknown,
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Add(_) => "ADD_EVENT",
            Action::Update(_) => "UPDATE_EVENT",
            Action::Delete(_) => "DELETE_EVENT",
            Action::Unknown => "UNKNOWN",
        }
    }

    /// Parses a raw `{type, payload}` object. Any unrecognised `type`,
    /// whatever its payload, becomes [`Action::Unknown`].
    pub fn from_json(value: serde_json::Value) -> Result<Action, serde_json::Error> {
        match value.get("type").and_then(|t| t.as_str()) {
            Some("ADD_EVENT" | "UPDATE_EVENT" | "DELETE_EVENT") => serde_json::from_value(value),
            _ => Ok(Action::Unknown),
        }
    }
}

pub fn reduce(mut state: EventsState, action: Action) -> EventsState {
    match action {
        Action::Add(event) => {
            state.events.push(event);
            state
        }
        Action::Update(event) => {
            for slot in state.events.iter_mut().filter(|e| e.id == event.id) {
                *slot = event.clone();
            }
            state
        }
        Action::Delete(id) => {
            state.events.retain(|e| e.id != id);
            state
        }
        Action::Unknown => state,
    }
}

/// Immutable view of the store at one revision.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub revision: u64,
    pub state: Arc<EventsState>,
}

impl Snapshot {
    pub fn events(&self) -> &[Event] {
        &self.state.events
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&Snapshot) + Send + Sync>;

pub struct Store {
    current: RwLock<Snapshot>,
    observers: RwLock<Vec<(SubscriptionId, Observer)>>,
    next_subscription: AtomicU64,
    last_id: AtomicI64,
}

impl Default for Store {
    fn default() -> Self {
        Store::new(EventsState::default())
    }
}

impl Store {
    pub fn new(initial: EventsState) -> Self {
        let last_id = initial.events.iter().map(|e| e.id.0).max().unwrap_or(0);
        Store {
            current: RwLock::new(Snapshot {
                revision: 0,
                state: Arc::new(initial),
            }),
            observers: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
            last_id: AtomicI64::new(last_id),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, id: EventId) -> Option<Event> {
        self.snapshot().events().iter().find(|e| e.id == id).cloned()
    }

    /// Issues a fresh id from the current millisecond timestamp, bumped past
    /// every id issued or dispatched so far. Saturates at `i64::MAX`.
    pub fn next_id(&self) -> EventId {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        EventId(now.max(previous.saturating_add(1)))
    }

    pub fn dispatch(&self, action: Action) -> Snapshot {
        let kind = action.kind();
        if let Action::Add(event) = &action {
            self.last_id.fetch_max(event.id.0, Ordering::SeqCst);
        }

        let snapshot = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let next = reduce((*current.state).clone(), action);
            if next != *current.state {
                *current = Snapshot {
                    revision: current.revision + 1,
                    state: Arc::new(next),
                };
            }
            current.clone()
        };

        debug!(action = kind, revision = snapshot.revision, "dispatched");
        self.notify(&snapshot);
        snapshot
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(sub, _)| *sub != id);
        observers.len() != before
    }

    fn notify(&self, snapshot: &Snapshot) {
        // Clone the list out so observers may subscribe or unsubscribe.
        let observers: Vec<Observer> = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn event(id: i64, name: &str, event_type: EventType) -> Event {
        Event {
            id: EventId(id),
            name: name.to_string(),
            event_type,
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            description: None,
            handled_by: String::new(),
            organisation: String::new(),
            sub_events: 0,
        }
    }

    #[test]
    fn add_appends_in_order() {
        let state = reduce(EventsState::default(), Action::Add(event(1, "a", EventType::Music)));
        let state = reduce(state, Action::Add(event(2, "b", EventType::Sports)));
        let names: Vec<_> = state.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn update_replaces_only_matching_record() {
        let state = EventsState {
            events: vec![event(1, "a", EventType::Music), event(2, "b", EventType::Sports)],
        };
        let mut changed = event(2, "b2", EventType::School);
        changed.sub_events = 4;

        let next = reduce(state.clone(), Action::Update(changed.clone()));
        assert_eq!(next.events[0], state.events[0]);
        assert_eq!(next.events[1], changed);
    }

    #[test]
    fn update_replaces_every_record_sharing_the_id() {
        let state = EventsState {
            events: vec![
                event(1, "a", EventType::Music),
                event(1, "b", EventType::Music),
                event(2, "c", EventType::Sports),
            ],
        };
        let next = reduce(state, Action::Update(event(1, "z", EventType::School)));
        let names: Vec<_> = next.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["z", "z", "c"]);
    }

    #[test]
    fn update_of_missing_id_is_a_no_op() {
        let state = EventsState {
            events: vec![event(1, "a", EventType::Music)],
        };
        let next = reduce(state.clone(), Action::Update(event(9, "x", EventType::General)));
        assert_eq!(next, state);
    }

    #[test]
    fn delete_of_missing_id_leaves_collection_unchanged() {
        let state = EventsState {
            events: vec![event(1, "a", EventType::Music), event(2, "b", EventType::Sports)],
        };
        let next = reduce(state.clone(), Action::Delete(EventId(3)));
        assert_eq!(next, state);

        let next = reduce(next, Action::Delete(EventId(1)));
        assert_eq!(next.events.len(), 1);
        assert_eq!(next.events[0].id, EventId(2));
    }

    #[test]
    fn unknown_action_type_deserializes_to_no_op() {
        let action: Action =
            serde_json::from_str(r#"{"type":"RESET_EVERYTHING","payload":null}"#).unwrap();
        assert_eq!(action, Action::Unknown);

        let state = EventsState {
            events: vec![event(1, "a", EventType::Music)],
        };
        assert_eq!(reduce(state.clone(), action), state);
    }

    #[test]
    fn unknown_type_with_object_payload_is_still_a_no_op() {
        let value = serde_json::json!({"type": "SET_FILTER", "payload": {"filter": "music"}});
        assert_eq!(Action::from_json(value).unwrap(), Action::Unknown);

        let bad = serde_json::json!({"type": "DELETE_EVENT", "payload": "nope"});
        assert!(Action::from_json(bad).is_err());
    }

    #[test]
    fn delete_action_deserializes_from_bare_id() {
        let action: Action = serde_json::from_str(r#"{"type":"DELETE_EVENT","payload":42}"#).unwrap();
        assert_eq!(action, Action::Delete(EventId(42)));
    }

    #[test]
    fn adding_n_events_yields_n_unique_ids() {
        let store = Store::default();
        for i in 0..50 {
            let id = store.next_id();
            store.dispatch(Action::Add(event(id.0, &format!("e{i}"), EventType::General)));
        }
        let snapshot = store.snapshot();
        assert_eq!(snapshot.events().len(), 50);
        let ids: HashSet<_> = snapshot.events().iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn next_id_skips_past_dispatched_ids() {
        let store = Store::default();
        let far_future = Utc::now().timestamp_millis() + 1_000_000;
        store.dispatch(Action::Add(event(far_future, "future", EventType::Music)));
        assert!(store.next_id().0 > far_future);
    }

    #[test]
    fn next_id_saturates_after_max_id_is_dispatched() {
        let store = Store::default();
        store.dispatch(Action::Add(event(i64::MAX, "edge", EventType::General)));
        assert_eq!(store.next_id(), EventId(i64::MAX));
        assert_eq!(store.next_id(), EventId(i64::MAX));
    }

    #[test]
    fn revision_only_moves_when_state_changes() {
        let store = Store::default();
        store.dispatch(Action::Add(event(1, "a", EventType::Music)));
        assert_eq!(store.snapshot().revision, 1);

        store.dispatch(Action::Delete(EventId(99)));
        store.dispatch(Action::Unknown);
        assert_eq!(store.snapshot().revision, 1);
    }

    #[test]
    fn observers_see_every_dispatch_until_unsubscribed() {
        let store = Store::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = store.subscribe(move |snapshot| {
            sink.lock().unwrap().push(snapshot.events().len());
        });

        store.dispatch(Action::Add(event(1, "a", EventType::Music)));
        store.dispatch(Action::Add(event(2, "b", EventType::Music)));
        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.dispatch(Action::Delete(EventId(1)));

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn get_finds_event_by_id() {
        let store = Store::new(EventsState {
            events: vec![event(7, "seven", EventType::Children)],
        });
        assert_eq!(store.get(EventId(7)).map(|e| e.name), Some("seven".to_string()));
        assert!(store.get(EventId(8)).is_none());
        assert!(store.next_id().0 > 7);
    }
}
