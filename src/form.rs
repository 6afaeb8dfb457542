//! Create/edit form: raw field values, validation and action building.

use crate::models::{Event, EventFields, EventId, EventType};
use crate::store::Action;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    EventType,
    StartDate,
    EndDate,
    SubEvents,
}

impl FormField {
    /// Name of the posted form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::EventType => "type",
            FormField::StartDate => "startDate",
            FormField::EndDate => "endDate",
            FormField::SubEvents => "subEvents",
        }
    }
}

/// Per-field validation messages, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    fn set(&mut self, field: FormField, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

/// Field values as posted by the HTML form, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventForm {
    pub name: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub handled_by: String,
    pub organisation: String,
    pub sub_events: String,
}

impl EventForm {
    pub fn from_event(event: &Event) -> Self {
        EventForm {
            name: event.name.clone(),
            event_type: event.event_type.as_str().to_string(),
            start_date: event.start_date.format(DATE_FORMAT).to_string(),
            end_date: event.end_date.format(DATE_FORMAT).to_string(),
            description: event.description.clone().unwrap_or_default(),
            handled_by: event.handled_by.clone(),
            organisation: event.organisation.clone(),
            sub_events: event.sub_events.to_string(),
        }
    }

    pub fn validate(&self) -> Result<EventFields, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.set(FormField::Name, "Event Name is required");
        }

        let event_type = match self.event_type.trim() {
            "" => {
                errors.set(FormField::EventType, "Event Type is required");
                None
            }
            raw => match raw.parse::<EventType>() {
                Ok(t) => Some(t),
                Err(_) => {
                    errors.set(
                        FormField::EventType,
                        "Event Type must be one of sports, music, general, children, school",
                    );
                    None
                }
            },
        };

        let start_date = parse_date(&self.start_date, FormField::StartDate, "Start Date", &mut errors);
        let end_date = parse_date(&self.end_date, FormField::EndDate, "End Date", &mut errors);

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                errors.set(FormField::EndDate, "End Date must be after Start Date");
            }
        }

        let sub_events = match self.sub_events.trim() {
            "" => Some(0),
            raw => match raw.parse::<i64>() {
                Ok(n) if n < 0 => {
                    errors.set(
                        FormField::SubEvents,
                        "Total Number of Sub-Events must be a positive number",
                    );
                    None
                }
                Ok(n) => match u32::try_from(n) {
                    Ok(n) => Some(n),
                    Err(_) => {
                        errors.set(FormField::SubEvents, "Total Number of Sub-Events is too large");
                        None
                    }
                },
                Err(_) => {
                    errors.set(
                        FormField::SubEvents,
                        "Total Number of Sub-Events must be a whole number",
                    );
                    None
                }
            },
        };

        match (event_type, start_date, end_date, sub_events) {
            (Some(event_type), Some(start_date), Some(end_date), Some(sub_events))
                if errors.is_empty() =>
            {
                let description = self.description.trim();
                Ok(EventFields {
                    name: name.to_string(),
                    event_type,
                    start_date,
                    end_date,
                    description: (!description.is_empty()).then(|| description.to_string()),
                    handled_by: self.handled_by.trim().to_string(),
                    organisation: self.organisation.trim().to_string(),
                    sub_events,
                })
            }
            _ => Err(errors),
        }
    }

    /// Validates and builds the action to dispatch: `Update` when editing an
    /// existing id, otherwise `Add` under the id produced by `fresh_id`.
    pub fn submit(
        &self,
        editing: Option<EventId>,
        fresh_id: impl FnOnce() -> EventId,
    ) -> Result<Action, FieldErrors> {
        let fields = self.validate()?;
        Ok(match editing {
            Some(id) => Action::Update(Event::new(id, fields)),
            None => Action::Add(Event::new(fresh_id(), fields)),
        })
    }
}

fn parse_date(
    raw: &str,
    field: FormField,
    label: &str,
    errors: &mut FieldErrors,
) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.set(field, &format!("{label} is required"));
        return None;
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.set(field, &format!("{label} must be a valid date"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fair() -> EventForm {
        EventForm {
            name: "Fair".to_string(),
            event_type: "general".to_string(),
            start_date: "2024-05-01".to_string(),
            end_date: "2024-05-02".to_string(),
            sub_events: "3".to_string(),
            ..EventForm::default()
        }
    }

    #[test]
    fn valid_submission_builds_add_with_fresh_id() {
        let action = fair().submit(None, || EventId(1714521600000)).unwrap();
        let Action::Add(event) = action else {
            panic!("expected Add");
        };
        assert_eq!(event.id, EventId(1714521600000));
        assert_eq!(event.name, "Fair");
        assert_eq!(event.event_type, EventType::General);
        assert_eq!(event.sub_events, 3);
        assert_eq!(event.description, None);
    }

    #[test]
    fn editing_keeps_the_existing_id() {
        let action = fair()
            .submit(Some(EventId(5)), || panic!("no id should be generated"))
            .unwrap();
        assert!(matches!(action, Action::Update(ref e) if e.id == EventId(5)));
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errors = EventForm::default().validate().unwrap_err();
        assert_eq!(errors.get(FormField::Name), Some("Event Name is required"));
        assert_eq!(errors.get(FormField::EventType), Some("Event Type is required"));
        assert_eq!(errors.get(FormField::StartDate), Some("Start Date is required"));
        assert_eq!(errors.get(FormField::EndDate), Some("End Date is required"));
        assert_eq!(errors.get(FormField::SubEvents), None);
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn inverted_date_range_is_reported_on_end_date() {
        let form = EventForm {
            start_date: "2024-05-03".to_string(),
            ..fair()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get(FormField::EndDate), Some("End Date must be after Start Date"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn same_day_event_is_valid() {
        let form = EventForm {
            end_date: "2024-05-01".to_string(),
            ..fair()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn sub_events_must_be_non_negative_whole_number() {
        let negative = EventForm {
            sub_events: "-1".to_string(),
            ..fair()
        };
        assert_eq!(
            negative.validate().unwrap_err().get(FormField::SubEvents),
            Some("Total Number of Sub-Events must be a positive number")
        );

        let text = EventForm {
            sub_events: "many".to_string(),
            ..fair()
        };
        assert_eq!(
            text.validate().unwrap_err().get(FormField::SubEvents),
            Some("Total Number of Sub-Events must be a whole number")
        );

        let blank = EventForm {
            sub_events: String::new(),
            ..fair()
        };
        assert_eq!(blank.validate().unwrap().sub_events, 0);
    }

    #[test]
    fn unknown_type_and_bad_dates_are_rejected() {
        let form = EventForm {
            event_type: "opera".to_string(),
            start_date: "05/01/2024".to_string(),
            ..fair()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.get(FormField::EventType).is_some());
        assert_eq!(errors.get(FormField::StartDate), Some("Start Date must be a valid date"));
    }

    #[test]
    fn prefill_round_trips_through_validation() {
        let event = Event::new(EventId(9), fair().validate().unwrap());
        let form = EventForm::from_event(&event);
        assert_eq!(form.start_date, "2024-05-01");
        assert_eq!(form.event_type, "general");
        let Action::Update(again) = form.submit(Some(event.id), || EventId(0)).unwrap() else {
            panic!("expected Update");
        };
        assert_eq!(again, event);
    }
}
