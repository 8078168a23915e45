//! Centralized icon definitions.
//!
//! Icon theme is configured in `config.rs` via `ICON_THEME`.
//! This module maps semantic icon names to the selected theme's icons.

use icondata::Icon;

use crate::config::IconTheme;

// =============================================================================
// Theme Imports
// =============================================================================

mod lucide {
    pub use icondata::{
        LuArrowDown as SortDesc, LuArrowUp as SortAsc, LuCheck as Success,
        LuExternalLink as ExternalLink, LuFile as File, LuFileText as FileText,
        LuGlobe as Network, LuHardDrive as Drive, LuImage as FileImage, LuInfo as Info,
        LuLayoutGrid as Grid, LuLink as Link, LuList as List, LuLoader as Loading,
        LuLock as Lock, LuPlus as Plus, LuRefreshCw as Refresh, LuSearch as Search,
        LuTrash2 as Trash, LuTriangleAlert as Error, LuUpload as Upload, LuWallet as Wallet, LuX as Close,
    };
}

mod bootstrap {
    pub use icondata::{
        BsArrowClockwise as Refresh, BsArrowDown as SortDesc, BsArrowRepeat as Loading,
        BsArrowUp as SortAsc, BsBoxArrowUpRight as ExternalLink, BsCheckLg as Success,
        BsExclamationTriangle as Error, BsFileEarmark as File, BsFileEarmarkImage as FileImage,
        BsFileEarmarkText as FileText, BsGlobe as Network, BsGrid as Grid, BsHdd as Drive,
        BsInfoCircle as Info, BsLink45deg as Link, BsListUl as List, BsLockFill as Lock, BsPlusLg as Plus,
        BsSearch as Search, BsTrash as Trash, BsUpload as Upload, BsWallet2 as Wallet,
        BsXLg as Close,
    };
}

// =============================================================================
// Icon Constants (selected based on theme)
// =============================================================================

macro_rules! themed_icon {
    ($name:ident, $theme_name:ident) => {
        pub const $name: Icon = match crate::config::ICON_THEME {
            IconTheme::Lucide => lucide::$theme_name,
            IconTheme::Bootstrap => bootstrap::$theme_name,
        };
    };
}

themed_icon!(DRIVE, Drive);
themed_icon!(FILE, File);
themed_icon!(FILE_TEXT, FileText);
themed_icon!(FILE_IMAGE, FileImage);
themed_icon!(UPLOAD, Upload);
themed_icon!(TRASH, Trash);
themed_icon!(LOCK, Lock);
themed_icon!(GRID, Grid);
themed_icon!(LIST, List);
themed_icon!(SEARCH, Search);
themed_icon!(PLUS, Plus);
themed_icon!(CLOSE, Close);
themed_icon!(REFRESH, Refresh);
themed_icon!(WALLET, Wallet);
themed_icon!(NETWORK, Network);
themed_icon!(EXTERNAL_LINK, ExternalLink);
themed_icon!(LINK, Link);
themed_icon!(SORT_ASC, SortAsc);
themed_icon!(SORT_DESC, SortDesc);
themed_icon!(SUCCESS, Success);
themed_icon!(ERROR, Error);
themed_icon!(INFO, Info);
themed_icon!(LOADING, Loading);

// =============================================================================
// Helper Functions
// =============================================================================

/// Get icon for a file by its detected kind.
pub fn for_file(kind: scoop_core::FileKind) -> Icon {
    use scoop_core::FileKind;

    match kind {
        FileKind::Image => FILE_IMAGE,
        FileKind::Text | FileKind::Document | FileKind::Pdf | FileKind::Json | FileKind::Code => {
            FILE_TEXT
        }
        _ => FILE,
    }
}
