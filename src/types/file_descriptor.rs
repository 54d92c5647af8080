// src/types/file_descriptor.rs
//! Résumé file metadata and content as handed between selector and workflow

use bytes::Bytes;
use std::fmt;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TEXT_MIME: &str = "text/plain";

/// Document formats the analysis service can extract text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Text,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [Self::Pdf, Self::Docx, Self::Text];

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Docx => DOCX_MIME,
            Self::Text => TEXT_MIME,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Text => "txt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Text => "TXT",
        }
    }

    /// Match a MIME type against the allow-list. Parameters such as
    /// `; charset=utf-8` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        Self::ALL.into_iter().find(|kind| kind.mime_type() == essence)
    }

    /// Infer the kind from a file name's extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())?;

        Self::ALL.into_iter().find(|kind| kind.extension() == ext)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw file as yielded by a drop or picker, before validation.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: Option<String>,
    pub content: Bytes,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, mime_type: Option<&str>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size_bytes: content.len() as u64,
            mime_type: mime_type.map(str::to_string),
            content,
        }
    }
}

/// An accepted résumé file. Immutable once produced by the upload selector.
///
/// Cloning is cheap: the content is a shared byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    name: String,
    size_bytes: u64,
    kind: DocumentKind,
    content: Bytes,
}

impl FileDescriptor {
    pub(crate) fn new(name: String, size_bytes: u64, kind: DocumentKind, content: Bytes) -> Self {
        Self {
            name,
            size_bytes,
            kind,
            content,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Size in kilobytes with two decimals, e.g. `"2048.00 KB"`.
    pub fn display_size(&self) -> String {
        format!("{:.2} KB", self.size_bytes as f64 / 1024.0)
    }
}
