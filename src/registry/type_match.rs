//! Type compatibility matching for type-keyed lookup.
//!
//! Finds the best entry in a table keyed by exact [`TypeKey`]s for a query
//! type that may only be compatible with one of them, not identical.

use std::collections::HashMap;

use crate::key::{TypeKey, TypeQuery};

/// Finds the table entry compatible with `query`.
///
/// Lookup order:
///
/// 1. Exact hit on the query's own key (the common fast path).
/// 2. The declared ancestor chain, nearest first. An ancestor present in the
///    table is a dead end: the walk confirms a class-hierarchy entry exists
///    and then deliberately yields no match. Superclass matching never
///    succeeds; callers relying on hierarchy lookup must register under the
///    capability instead.
/// 3. The declared capability list in order; the first capability present in
///    the table wins.
///
/// Pure function over its inputs; returns `None` when nothing matches.
pub fn find_compatible<'a, V>(table: &'a HashMap<TypeKey, V>, query: &TypeQuery) -> Option<&'a V> {
    if let Some(value) = table.get(&query.key()) {
        return Some(value);
    }

    if query
        .ancestors()
        .iter()
        .any(|ancestor| table.contains_key(ancestor))
    {
        return None;
    }

    query
        .capabilities()
        .iter()
        .find_map(|capability| table.get(capability))
}
