use crate::list::{ListMemo, ListQuery};
use crate::models::Event;
use crate::store::Store;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone, Default)]
pub struct AppState {
    pub store: Arc<Store>,
    pub list_memo: Arc<Mutex<ListMemo>>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        AppState {
            store: Arc::new(store),
            list_memo: Arc::default(),
        }
    }

    /// Current rows for the list view, recomputed only when the store or
    /// the query changed since the previous call.
    pub fn list_rows(&self, query: &ListQuery) -> Arc<Vec<Event>> {
        let snapshot = self.store.snapshot();
        self.list_memo
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rows(&snapshot, query)
    }
}
