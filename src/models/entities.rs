use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Entity categories the booking phrase consumes, keyed as the NLU model names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCategory {
    PersonCount,
    RoomFeatures,
    TimePeriod,
    DateTime,
    AttendeeNames,
    RelativeLocation,
    RoomLocation,
}

impl EntityCategory {
    pub fn key(&self) -> &'static str {
        match self {
            EntityCategory::PersonCount => "anzahlPersonen",
            EntityCategory::RoomFeatures => "ausstattungRaum",
            EntityCategory::TimePeriod => "zeitRaum",
            EntityCategory::DateTime => "datetime",
            EntityCategory::AttendeeNames => "namePerson",
            EntityCategory::RelativeLocation => "ortRelativ",
            EntityCategory::RoomLocation => "ortRaum",
        }
    }
}

/// Numbers are read as their decimal text. Objects (e.g. resolved datetime
/// records) are kept as `Other` and never extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityValue {
    Text(String),
    Number(serde_json::Number),
    List(Vec<EntityValue>),
    Other(serde_json::Value),
}

impl EntityValue {
    pub fn text(s: &str) -> Self {
        EntityValue::Text(s.to_string())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        EntityValue::List(items.into_iter().map(|s| EntityValue::text(s.as_ref())).collect())
    }

    /// List entities arrive wrapped in a one-element sequence; take its first element.
    fn unwrap_singleton(&self) -> Option<String> {
        match self {
            EntityValue::List(items) => items.first().and_then(EntityValue::scalar),
            other => other.scalar(),
        }
    }

    fn scalar(&self) -> Option<String> {
        match self {
            EntityValue::Text(s) => Some(s.clone()),
            EntityValue::Number(n) => Some(n.to_string()),
            EntityValue::List(_) | EntityValue::Other(_) => None,
        }
    }
}

/// Raw entity mapping as returned by the recognizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityBag(HashMap<String, EntityValue>);

impl EntityBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: EntityValue) {
        self.0.insert(key.to_string(), value);
    }

    /// Appends one recognized instance to the sequence stored under `key`.
    pub fn push(&mut self, key: &str, value: EntityValue) {
        let slot = self
            .0
            .entry(key.to_string())
            .or_insert_with(|| EntityValue::List(Vec::new()));
        if !matches!(slot, EntityValue::List(_)) {
            let previous = std::mem::replace(slot, EntityValue::List(Vec::new()));
            *slot = EntityValue::List(vec![previous]);
        }
        if let EntityValue::List(items) = slot {
            items.push(value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&EntityValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwrapped values of a multi-value category. Anything that is not a
    /// sequence yields nothing.
    pub fn values(&self, category: EntityCategory) -> Vec<String> {
        match self.0.get(category.key()) {
            Some(EntityValue::List(items)) => items
                .iter()
                .filter_map(EntityValue::unwrap_singleton)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl FromIterator<(String, EntityValue)> for EntityBag {
    fn from_iter<T: IntoIterator<Item = (String, EntityValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Typed per-category view over an [`EntityBag`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingEntities {
    pub persons: Vec<String>,
    pub features: Vec<String>,
    pub attendees: Vec<String>,
    pub locations: Vec<String>,
    pub time_periods: Vec<String>,
    pub date_time: Option<String>,
}

impl BookingEntities {
    pub fn from_bag(bag: &EntityBag) -> Self {
        Self {
            persons: persons(bag),
            features: bag.values(EntityCategory::RoomFeatures),
            attendees: bag.values(EntityCategory::AttendeeNames),
            locations: locations(bag),
            time_periods: bag.values(EntityCategory::TimePeriod),
            date_time: bag.values(EntityCategory::DateTime).into_iter().next(),
        }
    }
}

fn persons(bag: &EntityBag) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    for person in bag.values(EntityCategory::PersonCount) {
        if !res.contains(&person) {
            res.push(person);
        }
    }
    res
}

fn locations(bag: &EntityBag) -> Vec<String> {
    let relative = bag.values(EntityCategory::RelativeLocation);
    if !relative.is_empty() {
        return relative
            .into_iter()
            .map(|place| {
                if place == "hier" {
                    "in der Nähe".to_string()
                } else {
                    place
                }
            })
            .collect();
    }

    bag.values(EntityCategory::RoomLocation)
        .into_iter()
        .map(|room| format!("in {room}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(entries: &[(&str, EntityValue)]) -> EntityBag {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn nested(values: &[&str]) -> EntityValue {
        EntityValue::List(values.iter().map(|v| EntityValue::list([*v])).collect())
    }

    #[test]
    fn test_persons_unwrapped_and_deduplicated() {
        let bag = bag(&[("anzahlPersonen", nested(&["Person", "4er", "Person"]))]);
        let entities = BookingEntities::from_bag(&bag);
        assert_eq!(entities.persons, vec!["Person", "4er"]);
    }

    #[test]
    fn test_features_keep_duplicates() {
        let bag = bag(&[(
            "ausstattungRaum",
            EntityValue::List(vec![
                EntityValue::list(["Beamer"]),
                EntityValue::text("Beamer"),
                EntityValue::list(["Flipchart"]),
            ]),
        )]);
        let entities = BookingEntities::from_bag(&bag);
        assert_eq!(entities.features, vec!["Beamer", "Beamer", "Flipchart"]);
    }

    #[test]
    fn test_attendees() {
        let bag = bag(&[("namePerson", EntityValue::list(["Anna", "Ben"]))]);
        assert_eq!(BookingEntities::from_bag(&bag).attendees, vec!["Anna", "Ben"]);
    }

    #[test]
    fn test_non_sequence_category_is_ignored() {
        let bag = bag(&[
            ("anzahlPersonen", EntityValue::text("4er")),
            ("namePerson", EntityValue::List(vec![EntityValue::List(vec![])])),
        ]);
        let entities = BookingEntities::from_bag(&bag);
        assert!(entities.persons.is_empty());
        assert!(entities.attendees.is_empty());
    }

    #[test]
    fn test_empty_bag() {
        assert_eq!(BookingEntities::from_bag(&EntityBag::new()), BookingEntities::default());
    }

    #[test]
    fn test_location_relative_hier() {
        let bag = bag(&[("ortRelativ", nested(&["hier"]))]);
        assert_eq!(BookingEntities::from_bag(&bag).locations, vec!["in der Nähe"]);
    }

    #[test]
    fn test_location_relative_passthrough() {
        let bag = bag(&[("ortRelativ", nested(&["im Erdgeschoss"]))]);
        assert_eq!(BookingEntities::from_bag(&bag).locations, vec!["im Erdgeschoss"]);
    }

    #[test]
    fn test_location_room_prefixed() {
        let bag = bag(&[("ortRaum", EntityValue::list(["101"]))]);
        assert_eq!(BookingEntities::from_bag(&bag).locations, vec!["in 101"]);
    }

    #[test]
    fn test_location_relative_wins_over_room() {
        let bag = bag(&[
            ("ortRelativ", nested(&["hier"])),
            ("ortRaum", EntityValue::list(["101"])),
        ]);
        assert_eq!(BookingEntities::from_bag(&bag).locations, vec!["in der Nähe"]);
    }

    #[test]
    fn test_location_empty_relative_falls_back_to_room() {
        let bag = bag(&[
            ("ortRelativ", EntityValue::List(vec![])),
            ("ortRaum", EntityValue::list(["12"])),
        ]);
        assert_eq!(BookingEntities::from_bag(&bag).locations, vec!["in 12"]);
    }

    #[test]
    fn test_date_time_takes_first_entry() {
        let bag = bag(&[("datetime", EntityValue::list(["14:30", "16:00"]))]);
        assert_eq!(BookingEntities::from_bag(&bag).date_time.as_deref(), Some("14:30"));
    }

    #[test]
    fn test_push_accumulates_instances() {
        let mut bag = EntityBag::new();
        bag.push("ortRaum", EntityValue::text("12"));
        bag.push("ortRaum", EntityValue::text("14"));
        assert_eq!(bag.values(EntityCategory::RoomLocation), vec!["12", "14"]);
    }

    #[test]
    fn test_deserialize_bag_with_numbers_and_objects() {
        let json = r#"{
            "number": [4],
            "anzahlPersonen": [[4], ["Person"]],
            "datetime": [{"type": "time", "timex": ["T14:30"]}],
            "ortRaum": ["12"]
        }"#;
        let bag: EntityBag = serde_json::from_str(json).unwrap();
        let entities = BookingEntities::from_bag(&bag);
        assert_eq!(entities.persons, vec!["4", "Person"]);
        assert_eq!(entities.locations, vec!["in 12"]);
        assert_eq!(entities.date_time, None);
    }

    #[test]
    fn test_deserialize_luis_style_bag() {
        let json = r#"{"anzahlPersonen": [["Person"], ["2er"]], "ortRaum": ["12"], "keyPhrase": "raum"}"#;
        let bag: EntityBag = serde_json::from_str(json).unwrap();
        let entities = BookingEntities::from_bag(&bag);
        assert_eq!(entities.persons, vec!["Person", "2er"]);
        assert_eq!(entities.locations, vec!["in 12"]);
    }
}
