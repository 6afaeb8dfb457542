use crate::{
    error::AppError,
    form::{EventForm, FieldErrors},
    list::ListQuery,
    models::{Event, EventId},
    state::AppState,
    store::Action,
    views::{self, FormPage},
};
use axum::{
    Form, Json,
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct FormNotice {
    saved: Option<i64>,
}

pub async fn new_event_form(Query(notice): Query<FormNotice>) -> Result<Html<String>, AppError> {
    let notice = notice.saved.map(|id| format!("Event {id} saved."));
    let html = views::form_page(&FormPage {
        heading: "Add Event",
        edit_id: None,
        back: None,
        form: &EventForm::default(),
        errors: &FieldErrors::default(),
        notice: notice.as_deref(),
    })?;
    Ok(Html(html))
}

fn invalid_form(page: &FormPage<'_>) -> Result<Response, AppError> {
    let html = views::form_page(page)?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
}

/// Where to land after an edit or delete: the list, with the filter and
/// sort the user came from.
fn back_to_list(back: Option<&str>) -> Redirect {
    match back.filter(|q| !q.is_empty()) {
        Some(q) => Redirect::to(&format!("/events?{q}")),
        None => Redirect::to("/events"),
    }
}

pub async fn create_event_handler(
    State(app_state): State<AppState>,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    let store = &app_state.store;
    let id = store.next_id();
    match form.submit(None, || id) {
        Ok(action) => {
            store.dispatch(action);
            info!(%id, "event created");
            Ok(Redirect::to(&format!("/?saved={id}")).into_response())
        }
        Err(errors) => invalid_form(&FormPage {
            heading: "Add Event",
            edit_id: None,
            back: None,
            form: &form,
            errors: &errors,
            notice: None,
        }),
    }
}

pub async fn edit_event_form(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    RawQuery(back): RawQuery,
) -> Result<Html<String>, AppError> {
    let event = find_event(&app_state, EventId(id))?;
    let html = views::form_page(&FormPage {
        heading: "Edit Event",
        edit_id: Some(event.id),
        back: back.as_deref(),
        form: &EventForm::from_event(&event),
        errors: &FieldErrors::default(),
        notice: None,
    })?;
    Ok(Html(html))
}

pub async fn update_event_handler(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    RawQuery(back): RawQuery,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    let event = find_event(&app_state, EventId(id))?;
    match form.submit(Some(event.id), || event.id) {
        Ok(action) => {
            app_state.store.dispatch(action);
            info!(id, "event updated");
            Ok(back_to_list(back.as_deref()).into_response())
        }
        Err(errors) => invalid_form(&FormPage {
            heading: "Edit Event",
            edit_id: Some(event.id),
            back: back.as_deref(),
            form: &form,
            errors: &errors,
            notice: None,
        }),
    }
}

pub async fn delete_event_handler(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    RawQuery(back): RawQuery,
) -> Redirect {
    app_state.store.dispatch(Action::Delete(EventId(id)));
    info!(id, "event deleted");
    back_to_list(back.as_deref())
}

pub async fn list_events_page(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let rows = app_state.list_rows(&query);
    Ok(Html(views::list_page(&rows, &query)?))
}

pub async fn get_events(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Event>> {
    Json((*app_state.list_rows(&query)).clone())
}

pub async fn get_event(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Event>, AppError> {
    find_event(&app_state, EventId(id)).map(Json)
}

pub async fn delete_event_api(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> StatusCode {
    app_state.store.dispatch(Action::Delete(EventId(id)));
    StatusCode::NO_CONTENT
}

/// Dispatches a raw `{type, payload}` action straight into the reducer.
/// Payloads are not validated.
pub async fn dispatch_action(
    State(app_state): State<AppState>,
    Json(raw): Json<serde_json::Value>,
) -> Result<Json<Vec<Event>>, AppError> {
    let action = Action::from_json(raw)?;
    let snapshot = app_state.store.dispatch(action);
    Ok(Json(snapshot.events().to_vec()))
}

fn find_event(app_state: &AppState, id: EventId) -> Result<Event, AppError> {
    app_state
        .store
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("no event with id {id}")))
}
