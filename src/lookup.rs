//! Cross-collection joins.
//!
//! References between collections (`farmId`, `animalId`) are plain string
//! equality. Nothing enforces them; a missing parent renders as
//! [`UNKNOWN`].

use crate::record::Record;

pub const UNKNOWN: &str = "Desconocido";

pub fn find_by_id<'a, T: Record>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

/// Display name of the record `id` refers to, or [`UNKNOWN`].
pub fn display_or_unknown<T, F>(items: &[T], id: &str, describe: F) -> String
where
    T: Record,
    F: FnOnce(&T) -> String,
{
    find_by_id(items, id)
        .map(describe)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Children whose parent reference matches no record in `parents`.
pub fn orphans<'a, C, P, F>(children: &'a [C], parents: &[P], parent_id: F) -> Vec<&'a C>
where
    C: Record,
    P: Record,
    F: Fn(&C) -> &str,
{
    children
        .iter()
        .filter(|child| find_by_id(parents, parent_id(child)).is_none())
        .collect()
}
