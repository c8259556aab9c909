//! Finding copies whose source is gone.

use std::collections::HashSet;

use crate::copy_tag::Classified;
use crate::event::Event;

/// Copies in `target_copies` that no event in `sources` justifies.
///
/// A copy is an orphan when its tag has no recoverable id, or when that id
/// is not among the source window's ids. Only ids are compared, so an edited
/// source keeps its copy. Non-copies in `target_copies` are ignored.
pub fn collect_orphans<'a>(target_copies: &'a [Classified], sources: &[Event]) -> Vec<&'a Classified> {
    let live_ids: HashSet<&str> = sources.iter().map(|e| e.id.as_str()).collect();

    target_copies
        .iter()
        .filter(|c| c.is_copy())
        .filter(|c| match c.source_id() {
            Some(id) => !live_ids.contains(id),
            None => true,
        })
        .collect()
}
