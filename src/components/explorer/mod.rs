//! Drive explorer UI.
//!
//! - [`Explorer`] - open drive with header and file area
//! - [`Header`] - drive actions, upload and view toggle
//! - [`FileGrid`] - tiles in listing order with image thumbnails
//! - [`FileTable`] - searchable table sortable by name or size

mod explorer;
mod file_grid;
mod file_table;
mod header;

pub use explorer::Explorer;
pub use file_grid::FileGrid;
pub use file_table::FileTable;
pub use header::Header;
