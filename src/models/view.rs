//! View state of the drive browser.

/// Layout of the file area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FileView {
    /// Thumbnail tiles in listing order (default)
    #[default]
    Grid,
    /// Sortable, searchable table
    Table,
}

impl FileView {
    pub fn toggled(self) -> Self {
        match self {
            Self::Grid => Self::Table,
            Self::Table => Self::Grid,
        }
    }
}
