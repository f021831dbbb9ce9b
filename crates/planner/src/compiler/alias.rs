use std::collections::HashSet;
use tracing::debug;

/// Hands out table aliases so that no two references in one statement share
/// a name. Created fresh for every compilation.
#[derive(Debug, Clone)]
pub struct AliasAllocator {
    seen: HashSet<String>,
}

impl AliasAllocator {
    pub fn new(root: &str) -> Self {
        Self {
            seen: HashSet::from([root.to_string()]),
        }
    }

    /// `None` for the first occurrence of `table`, otherwise the first free
    /// `table_k` (k = 1, 2, ...).
    pub fn allocate(&mut self, table: &str) -> Option<String> {
        if self.seen.insert(table.to_string()) {
            return None;
        }
        let alias = self.next_free(table);
        debug!(table, alias = %alias, "aliased repeated table");
        Some(alias)
    }

    /// `name` itself if unused, otherwise the first free `name_k`.
    pub fn reserve(&mut self, name: &str) -> String {
        if self.seen.insert(name.to_string()) {
            return name.to_string();
        }
        self.next_free(name)
    }

    fn next_free(&mut self, base: &str) -> String {
        let mut k = 1usize;
        loop {
            let candidate = format!("{base}_{k}");
            if self.seen.insert(candidate.clone()) {
                return candidate;
            }
            k += 1;
        }
    }
}

/// Alias chosen for each join step, by step index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasAssignment {
    aliases: Vec<Option<String>>,
}

impl AliasAssignment {
    pub fn push(&mut self, alias: Option<String>) {
        self.aliases.push(alias);
    }

    pub fn get(&self, step: usize) -> Option<&str> {
        self.aliases.get(step).and_then(|a| a.as_deref())
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_tables_get_distinct_aliases() {
        let mut allocator = AliasAllocator::new("station");
        let aliases: Vec<String> = (0..3)
            .map(|_| allocator.allocate("station"))
            .collect::<Option<Vec<_>>>()
            .unwrap();

        assert_eq!(aliases, vec!["station_1", "station_2", "station_3"]);
        assert!(aliases.iter().all(|a| !a.is_empty() && a != "station"));
    }

    #[test]
    fn first_occurrence_is_bare() {
        let mut allocator = AliasAllocator::new("station");
        assert_eq!(allocator.allocate("measurement"), None);
        assert_eq!(allocator.allocate("measurement"), Some("measurement_1".into()));
    }

    #[test]
    fn skips_names_already_taken() {
        let mut allocator = AliasAllocator::new("a");
        // A real table that happens to look like an alias.
        assert_eq!(allocator.allocate("a_1"), None);
        assert_eq!(allocator.allocate("a"), Some("a_2".into()));
        assert_eq!(allocator.reserve("tmp"), "tmp");
        assert_eq!(allocator.reserve("tmp"), "tmp_1");
    }
}
