use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use super::AccountId;

/// Size of a stored object, resolved lazily and best-effort.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileSize {
    /// Not probed yet.
    #[default]
    Unresolved,
    /// Size in bytes.
    Known(u64),
    /// The probe failed or returned no length.
    Unknown,
}

impl FileSize {
    pub fn bytes(&self) -> Option<u64> {
        match self {
            Self::Known(bytes) => Some(*bytes),
            Self::Unresolved | Self::Unknown => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// Coarse file category inferred from the extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    Image,
    Pdf,
    Document,
    Text,
    Spreadsheet,
    Archive,
    Json,
    Code,
    Other,
}

impl FileKind {
    /// Detect the kind from a file name, case-insensitively.
    pub fn from_name(name: &str) -> Self {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return Self::Other;
        };
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" => Self::Image,
            "pdf" => Self::Pdf,
            "doc" | "docx" => Self::Document,
            "txt" | "md" => Self::Text,
            "xls" | "xlsx" | "csv" => Self::Spreadsheet,
            "zip" | "tar" | "gz" => Self::Archive,
            "json" => Self::Json,
            "js" | "jsx" | "ts" | "tsx" | "html" | "css" | "sol" | "rs" => Self::Code,
            _ => Self::Other,
        }
    }
}

/// One object in a storage account's listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub size: FileSize,
    pub account: AccountId,
}

impl FileEntry {
    pub fn new(account: AccountId, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: FileSize::Unresolved,
            account,
        }
    }

    pub fn with_size(mut self, size: FileSize) -> Self {
        self.size = size;
        self
    }

    /// Extension shown in the type column, or `None` for extensionless names.
    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_name(&self.name)
    }

    pub fn is_image(&self) -> bool {
        self.kind() == FileKind::Image
    }

    /// Public URL of this object on `gateway`.
    pub fn url(&self, gateway: &str) -> String {
        object_url(gateway, &self.account, &self.name)
    }
}

/// Bytes escaped in an object name. Unreserved URL characters pass through.
const NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Build the deterministic public URL `<gateway>/<account>/<name>`, with the
/// name percent-encoded as a single path segment.
pub fn object_url(gateway: &str, account: &AccountId, name: &str) -> String {
    format!(
        "{}/{}/{}",
        gateway.trim_end_matches('/'),
        account,
        utf8_percent_encode(name, NAME_ENCODE_SET)
    )
}

/// A file selected for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_detection() {
        assert_eq!(FileKind::from_name("photo.PNG"), FileKind::Image);
        assert_eq!(FileKind::from_name("paper.pdf"), FileKind::Pdf);
        assert_eq!(FileKind::from_name("notes.docx"), FileKind::Document);
        assert_eq!(FileKind::from_name("budget.xlsx"), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_name("program.rs"), FileKind::Code);
        assert_eq!(FileKind::from_name("bundle.zip"), FileKind::Archive);
        assert_eq!(FileKind::from_name("Makefile"), FileKind::Other);
        assert_eq!(FileKind::from_name("archive.xyz"), FileKind::Other);
    }

    #[test]
    fn test_extension() {
        let acct = AccountId::new("a");
        assert_eq!(FileEntry::new(acct.clone(), "a.tar.gz").extension(), Some("gz"));
        assert_eq!(FileEntry::new(acct.clone(), "README").extension(), None);
        assert_eq!(FileEntry::new(acct, "trailing.").extension(), None);
    }

    #[test]
    fn test_object_url() {
        let acct = AccountId::new("Acct1");
        assert_eq!(
            object_url("https://gw.example/", &acct, "a.txt"),
            "https://gw.example/Acct1/a.txt"
        );
        let entry = FileEntry::new(acct, "cat.jpg");
        assert_eq!(entry.url("https://gw.example"), "https://gw.example/Acct1/cat.jpg");
        assert!(entry.is_image());
    }

    #[test]
    fn test_object_url_escapes_name() {
        let acct = AccountId::new("Acct1");
        assert_eq!(
            object_url("https://gw.example", &acct, "a b#1.txt"),
            "https://gw.example/Acct1/a%20b%231.txt"
        );
        assert_eq!(
            object_url("https://gw.example", &acct, "dir/x?y=é"),
            "https://gw.example/Acct1/dir%2Fx%3Fy%3D%C3%A9"
        );
        assert_eq!(
            object_url("https://gw.example", &acct, "keep-this_name.v2~"),
            "https://gw.example/Acct1/keep-this_name.v2~"
        );
    }

    #[test]
    fn test_file_size() {
        assert_eq!(FileSize::Known(10).bytes(), Some(10));
        assert_eq!(FileSize::Unknown.bytes(), None);
        assert!(FileSize::Unknown.is_resolved());
        assert!(!FileSize::default().is_resolved());
    }
}
