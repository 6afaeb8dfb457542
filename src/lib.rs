pub mod config;
pub mod error;
pub mod form;
pub mod handlers;
pub mod list;
pub mod models;
pub mod state;
pub mod store;
pub mod views;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::NaiveDate;
use state::AppState;
use std::path::Path;
use store::{Action, Store};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, info};

pub fn app(app_state: AppState, assets_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::new_event_form).post(handlers::create_event_handler),
        )
        .route("/events", get(handlers::list_events_page))
        .route(
            "/events/{id}/edit",
            get(handlers::edit_event_form).post(handlers::update_event_handler),
        )
        .route("/events/{id}/delete", post(handlers::delete_event_handler))
        .route("/api/events", get(handlers::get_events))
        .route(
            "/api/events/{id}",
            get(handlers::get_event).delete(handlers::delete_event_api),
        )
        .route("/api/actions", post(handlers::dispatch_action))
        .nest_service("/assets", ServeDir::new(assets_dir.as_ref()))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

/// Logs every store change, the way a view would re-render on it.
pub fn log_store_changes(store: &Store) {
    store.subscribe(|snapshot| {
        debug!(
            revision = snapshot.revision,
            events = snapshot.events().len(),
            "store updated"
        );
    });
}

pub fn seed_if_empty(store: &Store) {
    if !store.snapshot().events().is_empty() {
        return;
    }
    let (Some(start), Some(end)) = (
        NaiveDate::from_ymd_opt(2024, 5, 1),
        NaiveDate::from_ymd_opt(2024, 5, 2),
    ) else {
        return;
    };

    info!("store is empty, adding demo event 'Fair'");
    store.dispatch(Action::Add(models::Event::new(
        store.next_id(),
        models::EventFields {
            name: "Fair".to_string(),
            event_type: models::EventType::General,
            start_date: start,
            end_date: end,
            description: Some("Spring fair on the town square".to_string()),
            handled_by: "Events Office".to_string(),
            organisation: "Town Hall".to_string(),
            sub_events: 3,
        },
    )));
}
