//! Assembles the booking confirmation sentence from normalized entities.
//!
//! Clauses are appended in a fixed order: persons, features, attendees,
//! location, time, then [`SUFFIX`].

pub mod time;

use chrono::NaiveDateTime;

use crate::models::BookingEntities;

pub const SUFFIX: &str = " wird gebucht.";

const ROOM_FOR: &str = "Ein Raum für eine ";
const SMALL_GROUP: &str = "kleine Gruppe";
const GENERIC_PERSON: &str = "Person";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhraseError {
    #[error(
        "Die Anzahl der Personen ist unspezifisch, folgende Angaben wurden verstanden: {}",
        .0.join(" und ")
    )]
    AmbiguousPersonCount(Vec<String>),
}

pub fn build_phrase(entities: &BookingEntities, now: NaiveDateTime) -> Result<String, PhraseError> {
    let phrase = person_clause(&entities.persons)?;
    let phrase = features_clause(phrase, &entities.features);
    let phrase = attendees_clause(phrase, &entities.attendees);
    let phrase = location_clause(phrase, &entities.locations);
    let mut phrase = time_clause(
        phrase,
        entities.date_time.as_deref(),
        &entities.time_periods,
        now,
    );
    phrase.push_str(SUFFIX);
    Ok(phrase)
}

/// "Person" alongside one other value is a placeholder and is dropped.
pub fn person_clause(persons: &[String]) -> Result<String, PhraseError> {
    match persons {
        [] => Ok(format!("{ROOM_FOR}{SMALL_GROUP}")),
        [one] => Ok(format!("{ROOM_FOR}{one}")),
        [first, other] if first == GENERIC_PERSON => Ok(format!("{ROOM_FOR}{other}")),
        [other, last] if last == GENERIC_PERSON => Ok(format!("{ROOM_FOR}{other}")),
        _ => Err(PhraseError::AmbiguousPersonCount(persons.to_vec())),
    }
}

pub fn features_clause(phrase: String, features: &[String]) -> String {
    with_list(phrase, features)
}

pub fn attendees_clause(phrase: String, attendees: &[String]) -> String {
    with_list(phrase, attendees)
}

fn with_list(mut phrase: String, values: &[String]) -> String {
    if !values.is_empty() {
        phrase.push_str(" mit ");
        phrase.push_str(&values.join(" und "));
    }
    phrase
}

/// Only the first location is used.
pub fn location_clause(mut phrase: String, locations: &[String]) -> String {
    if let Some(first) = locations.first() {
        phrase.push(' ');
        phrase.push_str(first);
    }
    phrase
}

pub fn time_clause(
    mut phrase: String,
    date_time: Option<&str>,
    periods: &[String],
    now: NaiveDateTime,
) -> String {
    phrase.push_str(&time::render(time::resolve(now, date_time, periods)));
    phrase
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 7)
            .unwrap()
            .and_hms_opt(8, 10, 0)
            .unwrap()
    }

    #[test]
    fn test_person_clause_empty() {
        assert_eq!(person_clause(&[]).unwrap(), "Ein Raum für eine kleine Gruppe");
    }

    #[test]
    fn test_person_clause_single() {
        assert_eq!(person_clause(&strings(&["Tisch"])).unwrap(), "Ein Raum für eine Tisch");
    }

    #[test]
    fn test_person_clause_drops_placeholder() {
        assert_eq!(
            person_clause(&strings(&["Person", "4er"])).unwrap(),
            "Ein Raum für eine 4er"
        );
        assert_eq!(
            person_clause(&strings(&["4er", "Person"])).unwrap(),
            "Ein Raum für eine 4er"
        );
    }

    #[test]
    fn test_person_clause_two_without_placeholder() {
        let err = person_clause(&strings(&["2er", "4er"])).unwrap_err();
        assert_eq!(err, PhraseError::AmbiguousPersonCount(strings(&["2er", "4er"])));
    }

    #[test]
    fn test_person_clause_three_is_ambiguous() {
        let err = person_clause(&strings(&["A", "B", "C"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Die Anzahl der Personen ist unspezifisch, folgende Angaben wurden verstanden: A und B und C"
        );
    }

    #[test]
    fn test_features_clause() {
        assert_eq!(
            features_clause(String::new(), &strings(&["Beamer", "Flipchart"])),
            " mit Beamer und Flipchart"
        );
        assert_eq!(features_clause("x".to_string(), &[]), "x");
    }

    #[test]
    fn test_attendees_clause() {
        assert_eq!(
            attendees_clause("Raum".to_string(), &strings(&["Anna"])),
            "Raum mit Anna"
        );
        assert_eq!(attendees_clause("Raum".to_string(), &[]), "Raum");
    }

    #[test]
    fn test_location_clause_uses_first_only() {
        assert_eq!(
            location_clause("Raum".to_string(), &strings(&["in 12", "in 14"])),
            "Raum in 12"
        );
        assert_eq!(location_clause("Raum".to_string(), &[]), "Raum");
    }

    #[test]
    fn test_time_clause() {
        assert_eq!(
            time_clause("Raum".to_string(), Some("14:30"), &[], now()),
            "Raum am 7.5. um 14:30 Uhr"
        );
    }

    #[test]
    fn test_build_phrase_full() {
        let entities = BookingEntities {
            persons: strings(&["Person", "2er"]),
            features: strings(&["Beamer", "Flipchart"]),
            attendees: strings(&["Anna", "Ben"]),
            locations: strings(&["in 12"]),
            time_periods: strings(&["morgen", "abends"]),
            date_time: None,
        };
        assert_eq!(
            build_phrase(&entities, now()).unwrap(),
            "Ein Raum für eine 2er mit Beamer und Flipchart mit Anna und Ben in 12 am 8.5. um 18:00 Uhr wird gebucht."
        );
    }

    #[test]
    fn test_build_phrase_minimal() {
        assert_eq!(
            build_phrase(&BookingEntities::default(), now()).unwrap(),
            "Ein Raum für eine kleine Gruppe am 7.5. um 08:10 Uhr wird gebucht."
        );
    }

    #[test]
    fn test_build_phrase_ambiguous() {
        let entities = BookingEntities {
            persons: strings(&["A", "B", "C"]),
            ..Default::default()
        };
        assert!(matches!(
            build_phrase(&entities, now()),
            Err(PhraseError::AmbiguousPersonCount(_))
        ));
    }
}
