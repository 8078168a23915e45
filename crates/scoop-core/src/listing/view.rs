//! Presentation projections over a cached file set.
//!
//! Pure functions of their input: nothing here touches the cache or the
//! network.

use std::cmp::Ordering;

use crate::models::FileEntry;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    Name,
    Size,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Search and sort settings of the tabular view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileQuery {
    pub search: String,
    pub sort: SortKey,
    pub order: SortOrder,
}

impl FileQuery {
    pub fn new(search: impl Into<String>, sort: SortKey, order: SortOrder) -> Self {
        Self {
            search: search.into(),
            sort,
            order,
        }
    }

    /// Clicking a column header: same key flips the order, a new key starts
    /// ascending.
    pub fn sort_by(&mut self, key: SortKey) {
        if self.sort == key {
            self.order = self.order.toggled();
        } else {
            self.sort = key;
            self.order = SortOrder::Ascending;
        }
    }

    pub fn matches(&self, file: &FileEntry) -> bool {
        let needle = self.search.trim();
        needle.is_empty() || file.name.to_lowercase().contains(&needle.to_lowercase())
    }

    /// Filter by the search text, then sort.
    ///
    /// Names compare case-insensitively. Sizes compare with every
    /// unresolved or unknown size ahead of the known ones, ties broken by
    /// name; descending order reverses the whole comparison.
    pub fn apply<I>(&self, files: I) -> Vec<FileEntry>
    where
        I: IntoIterator<Item = FileEntry>,
    {
        let mut rows: Vec<FileEntry> = files.into_iter().filter(|f| self.matches(f)).collect();
        rows.sort_by(|a, b| {
            let ord = match self.sort {
                SortKey::Name => by_name(a, b),
                SortKey::Size => a.size.bytes().cmp(&b.size.bytes()).then_with(|| by_name(a, b)),
            };
            match self.order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
        rows
    }
}

fn by_name(a: &FileEntry, b: &FileEntry) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountId, FileSize};

    fn entry(name: &str, size: FileSize) -> FileEntry {
        FileEntry::new(AccountId::new("A1"), name).with_size(size)
    }

    fn files() -> Vec<FileEntry> {
        vec![
            entry("beta.txt", FileSize::Known(300)),
            entry("Alpha.png", FileSize::Known(10)),
            entry("gamma.pdf", FileSize::Unknown),
            entry("delta.csv", FileSize::Unresolved),
            entry("alpha.txt", FileSize::Known(10)),
        ]
    }

    fn names(rows: &[FileEntry]) -> Vec<&str> {
        rows.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_name_sort_is_case_insensitive() {
        let rows = FileQuery::default().apply(files());
        assert_eq!(
            names(&rows),
            ["Alpha.png", "alpha.txt", "beta.txt", "delta.csv", "gamma.pdf"]
        );
    }

    #[test]
    fn test_name_sort_descending() {
        let query = FileQuery::new("", SortKey::Name, SortOrder::Descending);
        let rows = query.apply(files());
        assert_eq!(
            names(&rows),
            ["gamma.pdf", "delta.csv", "beta.txt", "alpha.txt", "Alpha.png"]
        );
    }

    #[test]
    fn test_size_sort_puts_unknown_first() {
        let query = FileQuery::new("", SortKey::Size, SortOrder::Ascending);
        let rows = query.apply(files());
        assert_eq!(
            names(&rows),
            ["delta.csv", "gamma.pdf", "Alpha.png", "alpha.txt", "beta.txt"]
        );

        let query = FileQuery::new("", SortKey::Size, SortOrder::Descending);
        let rows = query.apply(files());
        assert_eq!(names(&rows)[0], "beta.txt");
        assert_eq!(names(&rows)[4], "delta.csv");
    }

    #[test]
    fn test_search_filters_case_insensitively() {
        let query = FileQuery::new("  ALPHA ", SortKey::Name, SortOrder::Ascending);
        assert_eq!(names(&query.apply(files())), ["Alpha.png", "alpha.txt"]);

        let query = FileQuery::new("zzz", SortKey::Name, SortOrder::Ascending);
        assert!(query.apply(files()).is_empty());
    }

    #[test]
    fn test_sort_by_toggles_order() {
        let mut query = FileQuery::default();
        query.sort_by(SortKey::Name);
        assert_eq!(query.order, SortOrder::Descending);
        query.sort_by(SortKey::Size);
        assert_eq!((query.sort, query.order), (SortKey::Size, SortOrder::Ascending));
    }
}
