use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;

/// How an uploaded statement is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    /// Binary PDF; text must be extracted first
    Pdf,
    /// CSV, JSON, TXT or any other text payload
    Text,
}

impl FileKind {
    /// PDF when the declared MIME type says so or the name ends in `.pdf`.
    pub fn detect(name: &str, mime: Option<&str>) -> Self {
        let mime_is_pdf = mime
            .map(|m| m.trim().eq_ignore_ascii_case("application/pdf"))
            .unwrap_or(false);
        if mime_is_pdf || name.trim().to_lowercase().ends_with(".pdf") {
            FileKind::Pdf
        } else {
            FileKind::Text
        }
    }
}

/// An uploaded statement: file name, optional declared MIME type, raw bytes
#[derive(Debug, Clone, PartialEq)]
pub struct StatementFile {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl StatementFile {
    pub fn new(name: impl Into<String>, mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }

    /// Read a statement from disk; the MIME type is left undeclared.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, None, bytes))
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn kind(&self) -> FileKind {
        FileKind::detect(&self.name, self.mime.as_deref())
    }

    /// Contents as text. Invalid UTF-8 is replaced rather than rejected and
    /// a leading byte-order mark is dropped.
    pub fn text(&self) -> Cow<'_, str> {
        match String::from_utf8_lossy(&self.bytes) {
            Cow::Borrowed(s) => Cow::Borrowed(s.trim_start_matches('\u{feff}')),
            Cow::Owned(s) => Cow::Owned(s.trim_start_matches('\u{feff}').to_string()),
        }
    }
}
