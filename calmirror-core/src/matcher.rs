//! Deciding whether two events stand for the same occurrence.

use crate::copy_tag::decode_source_id;
use crate::event::Event;

/// Same title and exactly the same start and end instants.
///
/// Description and location are not compared, so a hand-made duplicate on
/// the other calendar counts as already mirrored.
pub fn is_natural_match(a: &Event, b: &Event) -> bool {
    a.title == b.title && a.start == b.start && a.end == b.end
}

/// Whether `copy`'s tag points at `source`.
pub fn is_copy_of(copy: &Event, source: &Event) -> bool {
    decode_source_id(&copy.title) == Some(source.id.as_str())
}

/// Whether a copy has drifted from its source in any mirrored field.
///
/// Title is not compared: a retitled source with unchanged times keeps its
/// old copy title until one of these fields changes.
pub fn needs_refresh(copy: &Event, source: &Event) -> bool {
    copy.start != source.start
        || copy.end != source.end
        || copy.description != source.description
        || copy.location != source.location
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn event(id: &str, title: &str) -> Event {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        Event {
            id: id.to_string(),
            title: title.to_string(),
            start,
            end: start + Duration::minutes(30),
            description: None,
            location: None,
            all_day: false,
            color: None,
        }
    }

    #[test]
    fn test_natural_match_ignores_id_and_details() {
        let a = event("a1", "Standup");
        let mut b = event("b1", "Standup");
        b.description = Some("different".into());
        b.location = Some("Room 4".into());
        assert!(is_natural_match(&a, &b));
    }

    #[test]
    fn test_natural_match_is_exact_on_time() {
        let a = event("a1", "Standup");
        let mut b = event("b1", "Standup");
        b.end += Duration::milliseconds(1);
        assert!(!is_natural_match(&a, &b));

        let mut c = event("c1", "Standup");
        c.start -= Duration::milliseconds(1);
        assert!(!is_natural_match(&a, &c));
    }

    #[test]
    fn test_natural_match_is_case_sensitive() {
        assert!(!is_natural_match(&event("a", "Standup"), &event("b", "standup")));
    }

    #[test]
    fn test_is_copy_of() {
        let source = event("s1", "Team Standup Meeting");
        let copy = event("c1", "[COPY] Team Stand [ID: s1]");
        let other = event("c2", "[COPY] Team Stand [ID: s10]");
        assert!(is_copy_of(&copy, &source));
        assert!(!is_copy_of(&other, &source));
        assert!(!is_copy_of(&event("c3", "[COPY] Team Stand"), &source));
    }

    #[test]
    fn test_needs_refresh() {
        let source = event("s1", "Standup");
        let mut copy = event("c1", "[COPY] Standup [ID: s1]");
        assert!(!needs_refresh(&copy, &source));

        copy.location = Some("Room 4".into());
        assert!(needs_refresh(&copy, &source));

        copy.location = None;
        copy.start += Duration::minutes(15);
        assert!(needs_refresh(&copy, &source));
    }

    #[test]
    fn test_needs_refresh_ignores_title_and_color() {
        let source = event("s1", "Renamed");
        let mut copy = event("c1", "[COPY] Standup [ID: s1]");
        copy.color = Some(crate::event::EventColor::Red);
        assert!(!needs_refresh(&copy, &source));
    }
}
