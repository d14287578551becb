use crate::domain::Record;

/// True if a record with the same `(text, timestamp)` is already collected.
pub fn is_duplicate(candidate: &Record, collection: &[Record]) -> bool {
    collection.iter().any(|existing| existing.same_entity(candidate))
}

/// Gate applied before appending: the record must carry text or images and
/// must not repeat an entry already in `collection`.
pub fn should_save(candidate: &Record, collection: &[Record]) -> bool {
    candidate.has_content() && !is_duplicate(candidate, collection)
}
