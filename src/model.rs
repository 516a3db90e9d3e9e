// src/model.rs
//! Typed views of the two collections the API serves, and the partial
//! updates its edit endpoints accept.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Christian {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub status: Option<String>,
    pub role: String,
    #[serde(default)]
    pub event_id: Option<i64>,
    #[serde(default)]
    pub joined_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Christian>,
}

impl Christian {
    pub fn from_json(v: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(v)
    }
}

impl Event {
    pub fn from_json(v: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(v)
    }
}

/// Which typed record a fetched collection is expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RecordKind {
    Christian,
    Event,
}

impl RecordKind {
    /// Deserialize each element as this kind. Returns the index and error of
    /// every element that does not fit.
    pub fn check(self, items: &[serde_json::Value]) -> Vec<(usize, serde_json::Error)> {
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let res = match self {
                    RecordKind::Christian => Christian::from_json(item.clone()).map(drop),
                    RecordKind::Event => Event::from_json(item.clone()).map(drop),
                };
                res.err().map(|e| (i, e))
            })
            .collect()
    }
}

/// Sparse edit of a [`Christian`]. Unknown field names are rejected.
///
/// Nullable fields take `Option<Option<_>>`: absent leaves the field alone,
/// explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChristianPatch {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Option<Option<String>>,
    pub role: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub event_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub joined_date: Option<Option<NaiveDate>>,
}

impl ChristianPatch {
    pub fn from_json(v: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(v)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, c: &mut Christian) {
        if let Some(v) = self.name {
            c.name = v;
        }
        if let Some(v) = self.age {
            c.age = v;
        }
        if let Some(v) = self.gender {
            c.gender = v;
        }
        if let Some(v) = self.email {
            c.email = v;
        }
        if let Some(v) = self.phone {
            c.phone = v;
        }
        if let Some(v) = self.status {
            c.status = v;
        }
        if let Some(v) = self.role {
            c.role = v;
        }
        if let Some(v) = self.event_id {
            c.event_id = v;
        }
        if let Some(v) = self.joined_date {
            c.joined_date = v;
        }
    }
}

/// Sparse edit of an [`Event`]. Unknown field names are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Option<Option<String>>,
}

impl EventPatch {
    pub fn from_json(v: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(v)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, e: &mut Event) {
        if let Some(v) = self.name {
            e.name = v;
        }
        if let Some(v) = self.location {
            e.location = v;
        }
        if let Some(v) = self.date {
            e.date = v;
        }
        if let Some(v) = self.description {
            e.description = v;
        }
        if let Some(v) = self.status {
            e.status = v;
        }
    }
}

// present-but-null must stay distinguishable from absent
fn nullable<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn check_reports_records_that_do_not_fit() {
        let items = vec![
            json!({"id": 1, "name": "Vigil", "location": "Kigali", "date": "2024-12-24"}),
            json!({"id": 2, "name": "Harvest", "location": "Huye", "date": "not-a-date"}),
            json!({"id": 3, "name": "Retreat"}),
        ];
        let bad: Vec<usize> = RecordKind::Event
            .check(&items)
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(bad, vec![1, 2]);
        assert_eq!(RecordKind::Christian.check(&items).len(), 3);
    }

    fn ruth() -> Christian {
        Christian::from_json(json!({
            "id": 1,
            "name": "Ruth",
            "age": 30,
            "gender": "Female",
            "email": "ruth@example.org",
            "phone": "555-0100",
            "status": "Active",
            "role": "Usher",
            "event_id": 2,
            "joined_date": "2023-04-09"
        }))
        .unwrap()
    }

    #[test]
    fn patch_touches_only_the_fields_it_names() {
        let mut c = ruth();
        let patch = ChristianPatch::from_json(json!({"role": "Diacon", "age": 31})).unwrap();
        patch.apply(&mut c);
        assert_eq!(c.role, "Diacon");
        assert_eq!(c.age, 31);
        assert_eq!(c.name, "Ruth");
        assert_eq!(c.event_id, Some(2));
    }

    #[test]
    fn explicit_null_clears_a_nullable_field() {
        let mut c = ruth();
        let patch = ChristianPatch::from_json(json!({"event_id": null, "status": null})).unwrap();
        assert_eq!(patch.event_id, Some(None));
        patch.apply(&mut c);
        assert_eq!(c.event_id, None);
        assert_eq!(c.status, None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(ChristianPatch::from_json(json!({"shoe_size": 9})).is_err());
        assert!(EventPatch::from_json(json!({"id": 4})).is_err());
    }

    #[test]
    fn empty_patch_is_a_noop() {
        let patch = EventPatch::from_json(json!({})).unwrap();
        assert!(patch.is_empty());

        let mut e = Event::from_json(json!({
            "id": 2,
            "name": "Vigil",
            "location": "Kigali",
            "date": "2024-12-24"
        }))
        .unwrap();
        let before = e.clone();
        patch.apply(&mut e);
        assert_eq!(e, before);
        assert!(e.attendees.is_empty());
    }

    #[test]
    fn event_patch_moves_the_date() {
        let mut e = Event::from_json(json!({
            "id": 2,
            "name": "Vigil",
            "location": "Kigali",
            "date": "2024-12-24",
            "description": "night prayer"
        }))
        .unwrap();
        EventPatch::from_json(json!({"date": "2024-12-31", "description": null}))
            .unwrap()
            .apply(&mut e);
        assert_eq!(e.date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(e.description, None);
    }
}
