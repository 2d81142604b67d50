//! Document format detection

/// Formats MuPDF is asked to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Epub,
}

impl DocumentFormat {
    /// Detect format from magic bytes
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        if bytes.starts_with(b"%PDF") {
            return Some(Self::Pdf);
        }

        // EPUB is a ZIP whose first entry is the "mimetype" file holding
        // "application/epub+zip". Other ZIP formats (.docx, .jar) are rejected.
        if bytes.starts_with(b"PK\x03\x04") && bytes.len() > 30 {
            let head = &bytes[..bytes.len().min(64)];
            if head.windows(4).any(|w| w == b"epub") {
                return Some(Self::Epub);
            }
        }

        None
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Epub => "application/epub+zip",
        }
    }
}
