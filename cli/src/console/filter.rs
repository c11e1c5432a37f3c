//! Ordered set of active filter tags.
//!
//! A command whose filter tags intersect this set is marked hidden by the
//! next rebuild cycle. Adding a present tag and removing an absent one are
//! both no-ops.

/// Filter tags in the order they were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    tags: Vec<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the tag was not already present.
    pub fn add(&mut self, tag: &str) -> bool {
        if self.contains(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Returns `true` if the tag was present. Remaining tags keep their order.
    pub fn remove(&mut self, tag: &str) -> bool {
        match self.tags.iter().position(|t| t == tag) {
            Some(index) => {
                self.tags.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether any of `tags` is an active filter.
    pub fn intersects<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|tag| self.contains(tag.as_ref()))
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut once = FilterSet::new();
        once.add("x");

        let mut twice = FilterSet::new();
        assert!(twice.add("x"));
        assert!(!twice.add("x"));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut filters = FilterSet::new();
        filters.add("a");
        let before = filters.clone();
        assert!(!filters.remove("b"));
        assert_eq!(filters, before);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut filters = FilterSet::new();
        for tag in ["a", "b", "c", "d"] {
            filters.add(tag);
        }
        assert!(filters.remove("b"));
        assert_eq!(filters.tags(), ["a", "c", "d"]);
    }

    #[test]
    fn test_intersects() {
        let mut filters = FilterSet::new();
        filters.add("windows");
        assert!(filters.intersects(&["linux", "windows"]));
        assert!(!filters.intersects(&["linux"]));
        assert!(!filters.intersects::<&str>(&[]));
    }
}
