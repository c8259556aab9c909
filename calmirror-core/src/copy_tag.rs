//! Copy tags embedded in event titles.
//!
//! A mirrored event carries its origin in its title:
//!
//! ```text
//! [COPY] {first 10 characters of the original title} [ID: {original event id}]
//! ```
//!
//! This is the only place that knows the format. Everything else asks
//! [`EventKind::classify`] whether an event is a copy and which source it
//! belongs to.

use std::sync::LazyLock;

use regex::Regex;

use crate::event::Event;

/// Prefix that marks an event as a copy.
pub const COPY_PREFIX: &str = "[COPY] ";

/// Number of characters of the original title kept in a copy title.
pub const TITLE_FRAGMENT_LEN: usize = 10;

/// Opening of the trailing source-id tag.
const ID_OPEN: &str = "[ID: ";

/// Tag anywhere in the title, for copies edited after creation.
static SOURCE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[ID: (.+?)\]").expect("valid copy tag pattern"));

/// Build a copy title. `title_fragment` should already be truncated.
pub fn encode(title_fragment: &str, source_id: &str) -> String {
    debug_assert!(title_fragment.chars().count() <= TITLE_FRAGMENT_LEN);
    format!("{COPY_PREFIX}{title_fragment} [ID: {source_id}]")
}

/// First [`TITLE_FRAGMENT_LEN`] characters of a title, without any ellipsis.
pub fn truncate_title(title: &str) -> &str {
    match title.char_indices().nth(TITLE_FRAGMENT_LEN) {
        Some((idx, _)) => &title[..idx],
        None => title,
    }
}

/// The copy title for a given source event.
pub fn copy_title_for(source: &Event) -> String {
    encode(truncate_title(&source.title), &source.id)
}

pub fn is_copy(title: &str) -> bool {
    title.starts_with(COPY_PREFIX)
}

/// Source id embedded in a copy title, if one can be recovered.
///
/// `encode` always puts the tag last, so a trailing `[ID: ...]` is read from
/// its last opening. The title fragment may itself contain `[ID: ` or `]`.
/// Titles not ending in a tag fall back to the first tag found anywhere.
pub fn decode_source_id(title: &str) -> Option<&str> {
    let trailing = title
        .strip_suffix(']')
        .and_then(|body| body.rfind(ID_OPEN).map(|idx| &body[idx + ID_OPEN.len()..]));

    trailing
        .or_else(|| {
            SOURCE_ID_RE
                .captures(title)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
        })
        .filter(|id| !id.is_empty())
}

/// What an event is, from the mirror's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A real event. Never written to by the mirror.
    Original,
    /// A mirror copy. `source_id` is `None` when the tag is malformed.
    Copy { source_id: Option<String> },
}

impl EventKind {
    pub fn classify(title: &str) -> Self {
        if is_copy(title) {
            EventKind::Copy {
                source_id: decode_source_id(title).map(str::to_string),
            }
        } else {
            EventKind::Original
        }
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, EventKind::Copy { .. })
    }

    pub fn source_id(&self) -> Option<&str> {
        match self {
            EventKind::Copy { source_id } => source_id.as_deref(),
            EventKind::Original => None,
        }
    }
}

/// An event paired with its classification, computed once per pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub event: Event,
    pub kind: EventKind,
}

impl Classified {
    pub fn new(event: Event) -> Self {
        let kind = EventKind::classify(&event.title);
        Classified { event, kind }
    }

    pub fn is_copy(&self) -> bool {
        self.kind.is_copy()
    }

    pub fn source_id(&self) -> Option<&str> {
        self.kind.source_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_format() {
        assert_eq!(encode("Team Stand", "s1"), "[COPY] Team Stand [ID: s1]");
    }

    #[test]
    fn test_truncate_title() {
        assert_eq!(truncate_title("Team Standup Meeting"), "Team Stand");
        assert_eq!(truncate_title("Standup (moved)"), "Standup (m");
        assert_eq!(truncate_title("Short"), "Short");
        assert_eq!(truncate_title(""), "");
        assert_eq!(truncate_title("0123456789"), "0123456789");
    }

    #[test]
    fn test_truncate_title_counts_characters_not_bytes() {
        assert_eq!(truncate_title("Café au lait à midi"), "Café au la");
        assert_eq!(truncate_title("日本語のタイトルです長い"), "日本語のタイトルです");
    }

    #[test]
    fn test_is_copy_requires_prefix() {
        assert!(is_copy("[COPY] Lunch [ID: abc]"));
        assert!(is_copy("[COPY] "));
        assert!(!is_copy("[COPY]Lunch"));
        assert!(!is_copy("Lunch [COPY] "));
        assert!(!is_copy("Lunch"));
    }

    #[test]
    fn test_decode_source_id() {
        assert_eq!(decode_source_id("[COPY] Lunch [ID: abc123]"), Some("abc123"));
        assert_eq!(
            decode_source_id("[COPY] Lunch [ID: 7k2@google.com]"),
            Some("7k2@google.com")
        );
        assert_eq!(decode_source_id("[COPY] Lunch"), None);
        assert_eq!(decode_source_id("[COPY] Lunch [ID: ]"), None);
    }

    #[test]
    fn test_decode_prefers_trailing_tag() {
        assert_eq!(decode_source_id("[COPY] [ID: x] y [ID: z]"), Some("z"));
        assert_eq!(decode_source_id("[COPY] Call [ID:  [ID: s1]"), Some("s1"));
        assert_eq!(decode_source_id("[COPY] Old [ID: abc] (moved)"), Some("abc"));
    }

    #[test]
    fn test_copy_title_round_trips_awkward_titles() {
        let titles = [
            "Call [ID: 7",
            "[ID: 42] sync",
            "a] b [ID: c]",
            "]]]]]]]]]]]]",
            "[ID: [ID: [ID: ",
            "Team Standup Meeting",
        ];
        for title in titles {
            let source = Event {
                id: "s1".into(),
                title: title.into(),
                start: chrono::Utc::now(),
                end: chrono::Utc::now(),
                description: None,
                location: None,
                all_day: false,
                color: None,
            };
            let copy_title = copy_title_for(&source);
            assert_eq!(decode_source_id(&copy_title), Some("s1"), "{copy_title}");
            assert_eq!(EventKind::classify(&copy_title).source_id(), Some("s1"));
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(EventKind::classify("Lunch"), EventKind::Original);
        assert_eq!(
            EventKind::classify("[COPY] Lunch [ID: abc]"),
            EventKind::Copy {
                source_id: Some("abc".to_string())
            }
        );
        assert_eq!(
            EventKind::classify("[COPY] Lunch"),
            EventKind::Copy { source_id: None }
        );
        // Tag without the prefix is not a copy.
        assert_eq!(EventKind::classify("Lunch [ID: abc]"), EventKind::Original);
    }
}
