//! Content type to file extension mapping.

use mime::Mime;

use crate::StorageError;

/// Preferred extensions for types where `mime_guess` lists several candidates.
const PREFERRED: &[(&str, &str)] = &[
    ("application/json", "json"),
    ("application/octet-stream", "bin"),
    ("application/pdf", "pdf"),
    ("application/zip", "zip"),
    ("audio/mpeg", "mp3"),
    ("image/gif", "gif"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/svg+xml", "svg"),
    ("image/webp", "webp"),
    ("text/csv", "csv"),
    ("text/html", "html"),
    ("text/plain", "txt"),
    ("video/mp4", "mp4"),
];

/// Behavior when a content type has no known extension.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExtensionFallback {
    /// Store the file without an extension.
    #[default]
    Omit,
    /// Use a fixed extension.
    Fixed(String),
    /// Fail the upload with [`StorageError::UnknownExtension`].
    Reject,
}

impl ExtensionFallback {
    /// Resolves the extension for `content_type`, applying this fallback when unknown.
    pub fn resolve(&self, content_type: &Mime) -> Result<Option<String>, StorageError> {
        if let Some(ext) = extension_for(content_type) {
            return Ok(Some(ext.to_owned()));
        }

        match self {
            Self::Omit => Ok(None),
            Self::Fixed(ext) => Ok(Some(ext.trim_start_matches('.').to_owned())
                .filter(|ext| !ext.is_empty())),
            Self::Reject => Err(StorageError::UnknownExtension {
                content_type: content_type.essence_str().to_owned(),
            }),
        }
    }
}

/// Looks up the canonical extension for a content type, ignoring parameters.
pub fn extension_for(content_type: &Mime) -> Option<&'static str> {
    let essence = content_type.essence_str();
    if let Some((_, ext)) = PREFERRED.iter().find(|(mime, _)| *mime == essence) {
        return Some(ext);
    }

    mime_guess::get_mime_extensions_str(essence).and_then(|exts| exts.first().copied())
}

/// Appends `ext` to `stem` with a dot separator when present.
pub fn with_extension(stem: &str, ext: Option<&str>) -> String {
    match ext {
        Some(ext) if !ext.is_empty() => format!("{stem}.{ext}"),
        _ => stem.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_entries_win() {
        assert_eq!(extension_for(&mime::IMAGE_JPEG), Some("jpg"));
        assert_eq!(extension_for(&mime::TEXT_PLAIN_UTF_8), Some("txt"));
        assert_eq!(extension_for(&mime::IMAGE_PNG), Some("png"));
    }

    #[test]
    fn fallback_policies() {
        let unknown: Mime = "application/x-uploadgear-unknown".parse().unwrap();
        assert_eq!(ExtensionFallback::Omit.resolve(&unknown).unwrap(), None);
        assert_eq!(
            ExtensionFallback::Fixed(".dat".to_owned())
                .resolve(&unknown)
                .unwrap()
                .as_deref(),
            Some("dat")
        );
        assert!(matches!(
            ExtensionFallback::Reject.resolve(&unknown),
            Err(StorageError::UnknownExtension { content_type }) if content_type == "application/x-uploadgear-unknown"
        ));
    }

    #[test]
    fn joins_stem_and_extension() {
        assert_eq!(with_extension("avatar", Some("png")), "avatar.png");
        assert_eq!(with_extension("avatar", None), "avatar");
    }
}
