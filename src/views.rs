//! Server-rendered HTML for the form and list pages.
//!
//! Markup lives in `templates/`; this module only builds the template
//! context. Templates end in `.html`, so minijinja autoescapes every value.

use crate::form::{EventForm, FieldErrors};
use crate::list::{Column, Direction, ListQuery};
use crate::models::{Event, EventId, EventType};
use minijinja::{Environment, context};
use serde::Serialize;
use std::collections::BTreeMap;

const LAYOUT_TEMPLATE: &str = include_str!("../templates/layout.html");
const FORM_TEMPLATE: &str = include_str!("../templates/form.html");
const LIST_TEMPLATE: &str = include_str!("../templates/list.html");

fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("layout.html", LAYOUT_TEMPLATE)?;
    env.add_template("form.html", FORM_TEMPLATE)?;
    env.add_template("list.html", LIST_TEMPLATE)?;
    Ok(env)
}

fn render(name: &str, ctx: minijinja::Value) -> Result<String, minijinja::Error> {
    environment()?.get_template(name)?.render(ctx)
}

#[derive(Serialize)]
struct TypeOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

fn type_options(selected: &str) -> Vec<TypeOption> {
    EventType::ALL
        .into_iter()
        .map(|t| TypeOption {
            value: t.as_str(),
            label: t.label(),
            selected: t.as_str().eq_ignore_ascii_case(selected.trim()),
        })
        .collect()
}

pub struct FormPage<'a> {
    pub heading: &'a str,
    /// Event being edited; `None` renders the create form.
    pub edit_id: Option<EventId>,
    /// List query string to return to after an edit.
    pub back: Option<&'a str>,
    pub form: &'a EventForm,
    pub errors: &'a FieldErrors,
    pub notice: Option<&'a str>,
}

pub fn form_page(page: &FormPage<'_>) -> Result<String, minijinja::Error> {
    let errors: BTreeMap<&str, &str> = page
        .errors
        .iter()
        .map(|(field, message)| (field.as_str(), message))
        .collect();

    render(
        "form.html",
        context! {
            title => page.heading,
            edit_id => page.edit_id,
            back => page.back,
            notice => page.notice,
            form => page.form,
            errors => errors,
            types => type_options(&page.form.event_type),
        },
    )
}

#[derive(Serialize)]
struct Header {
    heading: &'static str,
    query: String,
    arrow: &'static str,
}

#[derive(Serialize)]
struct Row {
    id: EventId,
    cells: Vec<String>,
}

pub fn list_page(rows: &[Event], query: &ListQuery) -> Result<String, minijinja::Error> {
    let current = query.sort_spec();
    let headers: Vec<Header> = Column::ALL
        .into_iter()
        .map(|column| Header {
            heading: column.heading(),
            query: query.toggled(column).to_query_string(),
            arrow: match current {
                Some(spec) if spec.column == column => match spec.direction {
                    Direction::Asc => " \u{25b2}",
                    Direction::Desc => " \u{25bc}",
                },
                _ => "",
            },
        })
        .collect();

    let rows: Vec<Row> = rows
        .iter()
        .map(|event| Row {
            id: event.id,
            cells: Column::ALL.iter().map(|c| c.cell(event)).collect(),
        })
        .collect();

    let back = query.to_query_string();
    render(
        "list.html",
        context! {
            title => "Events",
            types => type_options(&query.filter),
            sort => current.map(|spec| context! {
                column => spec.column.as_str(),
                direction => spec.direction.as_str(),
            }),
            headers => headers,
            rows => rows,
            back => (!back.is_empty()).then_some(back),
        },
    )
}
