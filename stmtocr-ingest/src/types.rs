use std::path::{Path, PathBuf};

use crate::encoder::ReadError;

pub const PDF_MIME: &str = "application/pdf";

/// Where the file bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSource {
    /// Read lazily when the file is encoded
    Path(PathBuf),
    Bytes(Vec<u8>),
    /// `data:<mime>;base64,<payload>` as produced by a browser file reader
    DataUrl(String),
}

/// A user-submitted statement before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub name: String,
    pub mime_type: String,
    pub source: RawSource,
}

impl RawFile {
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source: RawSource::Bytes(bytes),
        }
    }

    pub fn from_data_url(name: impl Into<String>, mime_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source: RawSource::DataUrl(url.into()),
        }
    }

    /// Build a file from a path, inferring the media type from its extension.
    /// The contents are not read until encoding.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mime_type = detect_mime(path)
            .filter(|m| is_accepted_mime(m))
            .ok_or_else(|| ReadError::Unsupported(name.clone()))?;

        Ok(Self {
            name,
            mime_type: mime_type.to_string(),
            source: RawSource::Path(path.to_path_buf()),
        })
    }
}

/// Media type for a statement file, by extension.
pub fn detect_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => PDF_MIME,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(mime)
}

/// Statements must be images or PDFs.
pub fn is_accepted_mime(mime: &str) -> bool {
    mime.starts_with("image/") || mime == PDF_MIME
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mime() {
        assert_eq!(detect_mime(Path::new("march.PDF")), Some(PDF_MIME));
        assert_eq!(detect_mime(Path::new("scan.jpeg")), Some("image/jpeg"));
        assert_eq!(detect_mime(Path::new("notes.txt")), None);
        assert_eq!(detect_mime(Path::new("no_extension")), None);
    }

    #[test]
    fn test_accepted_mime() {
        assert!(is_accepted_mime("application/pdf"));
        assert!(is_accepted_mime("image/png"));
        assert!(!is_accepted_mime("text/csv"));
    }

    #[test]
    fn test_from_path_rejects_unsupported() {
        let err = RawFile::from_path("/tmp/export.csv").unwrap_err();
        assert!(matches!(err, ReadError::Unsupported(ref n) if n == "export.csv"));

        let ok = RawFile::from_path("/tmp/chase-2024-03.pdf").unwrap();
        assert_eq!(ok.name, "chase-2024-03.pdf");
        assert_eq!(ok.mime_type, PDF_MIME);
    }
}
