//! Name-sorted vectors used as associative sets.
//!
//! Catalog tables keep their entries sorted by name and look them up by binary
//! search. Iteration order is therefore reproducible and independent of the
//! order entries were authored in.

/// Something identified by a name.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for String {
    fn name(&self) -> &str {
        self
    }
}

/// Stable sort by name.
pub fn sort_by_name<T: Named>(items: &mut [T]) {
    items.sort_by(|a, b| a.name().cmp(b.name()));
}

/// First entry whose name equals its successor's. `items` must be sorted.
pub fn find_duplicate<T: Named>(items: &[T]) -> Option<&T> {
    items
        .windows(2)
        .find(|pair| pair[0].name() == pair[1].name())
        .map(|pair| &pair[0])
}

/// Index of the entry named `name`. `items` must be sorted.
pub fn index_by_name<T: Named>(items: &[T], name: &str) -> Option<usize> {
    items.binary_search_by(|item| item.name().cmp(name)).ok()
}

pub fn contains_name<T: Named>(items: &[T], name: &str) -> bool {
    index_by_name(items, name).is_some()
}
