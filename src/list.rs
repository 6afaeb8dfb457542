//! Derived list view: type filter, column sort and the memo that keeps
//! both from being recomputed on every render.

use crate::models::Event;
use crate::store::Snapshot;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Column {
    Name,
    Type,
    StartDate,
    EndDate,
    Description,
    HandledBy,
    Organisation,
    SubEvents,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Name,
        Column::Type,
        Column::StartDate,
        Column::EndDate,
        Column::Description,
        Column::HandledBy,
        Column::Organisation,
        Column::SubEvents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Type => "type",
            Column::StartDate => "startDate",
            Column::EndDate => "endDate",
            Column::Description => "description",
            Column::HandledBy => "handledBy",
            Column::Organisation => "organisation",
            Column::SubEvents => "subEvents",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Column::Name => "Event Name",
            Column::Type => "Event Type",
            Column::StartDate => "Start Date",
            Column::EndDate => "End Date",
            Column::Description => "Description",
            Column::HandledBy => "Handled By",
            Column::Organisation => "Organisation",
            Column::SubEvents => "Sub-Events",
        }
    }

    /// The string a row is displayed and compared by.
    pub fn cell(&self, event: &Event) -> String {
        match self {
            Column::Name => event.name.clone(),
            Column::Type => event.event_type.as_str().to_string(),
            Column::StartDate => event.start_date.to_string(),
            Column::EndDate => event.end_date.to_string(),
            Column::Description => event.description.clone().unwrap_or_default(),
            Column::HandledBy => event.handled_by.clone(),
            Column::Organisation => event.organisation.clone(),
            Column::SubEvents => event.sub_events.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub column: Column,
    pub direction: Direction,
}

impl SortSpec {
    /// Selection after the user picks `column`: the same column flips
    /// direction, a new column starts ascending.
    pub fn toggle(current: Option<SortSpec>, column: Column) -> SortSpec {
        match current {
            Some(spec) if spec.column == column => SortSpec {
                column,
                direction: spec.direction.flip(),
            },
            _ => SortSpec {
                column,
                direction: Direction::Asc,
            },
        }
    }
}

/// Query-string shape shared by the list page and the JSON listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub filter: String,
    pub sort: Option<Column>,
    pub dir: Option<Direction>,
}

impl ListQuery {
    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort.map(|column| SortSpec {
            column,
            direction: self.dir.unwrap_or_default(),
        })
    }

    /// Same filter, sort toggled on `column`.
    pub fn toggled(&self, column: Column) -> ListQuery {
        let spec = SortSpec::toggle(self.sort_spec(), column);
        ListQuery {
            filter: self.filter.clone(),
            sort: Some(spec.column),
            dir: Some(spec.direction),
        }
    }

    pub fn to_query_string(&self) -> String {
        let mut out = url::form_urlencoded::Serializer::new(String::new());
        if !self.filter.is_empty() {
            out.append_pair("filter", &self.filter);
        }
        if let Some(spec) = self.sort_spec() {
            out.append_pair("sort", spec.column.as_str());
            out.append_pair("dir", spec.direction.as_str());
        }
        out.finish()
    }
}

pub fn filter_by_type<'a>(events: &'a [Event], filter: &str) -> Vec<&'a Event> {
    let needle = filter.trim().to_lowercase();
    events
        .iter()
        .filter(|e| needle.is_empty() || e.event_type.as_str().contains(&needle))
        .collect()
}

/// Stable in both directions: equal cells keep their relative order.
pub fn sort_rows(rows: &mut [&Event], spec: SortSpec) {
    match spec.direction {
        Direction::Asc => rows.sort_by_cached_key(|e| spec.column.cell(e)),
        Direction::Desc => rows.sort_by(|a, b| compare_desc(spec.column, a, b)),
    }
}

fn compare_desc(column: Column, a: &Event, b: &Event) -> Ordering {
    column.cell(b).cmp(&column.cell(a))
}

pub fn apply(events: &[Event], query: &ListQuery) -> Vec<Event> {
    let mut rows = filter_by_type(events, &query.filter);
    if let Some(spec) = query.sort_spec() {
        sort_rows(&mut rows, spec);
    }
    rows.into_iter().cloned().collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoKey {
    revision: u64,
    filter: String,
    sort: Option<SortSpec>,
}

/// Caches the last derived rows, keyed on store revision plus the
/// filter/sort selection.
#[derive(Debug, Default)]
pub struct ListMemo {
    key: Option<MemoKey>,
    rows: Arc<Vec<Event>>,
    recomputed: u64,
}

impl ListMemo {
    pub fn rows(&mut self, snapshot: &Snapshot, query: &ListQuery) -> Arc<Vec<Event>> {
        let key = MemoKey {
            revision: snapshot.revision,
            filter: query.filter.trim().to_lowercase(),
            sort: query.sort_spec(),
        };
        if self.key.as_ref() != Some(&key) {
            self.rows = Arc::new(apply(snapshot.events(), query));
            self.key = Some(key);
            self.recomputed += 1;
            debug!(times = self.recomputed, rows = self.rows.len(), "list view recomputed");
        }
        Arc::clone(&self.rows)
    }

    #[cfg(test)]
    fn recomputed(&self) -> u64 {
        self.recomputed
    }
}
