//! Upload policy: what files the admin panel accepts and where they are stored.

use chrono::{DateTime, Utc};

use crate::legal::LegalDocumentKind;

/// Largest accepted product image, in bytes.
pub const MAX_PRODUCT_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// MIME types accepted for legal documents: `.docx`, `.doc` and PDF.
pub const LEGAL_DOCUMENT_MIME_TYPES: [&str; 3] = [
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
    "application/pdf",
];

/// Extension used when the uploaded file name has none.
const FALLBACK_EXTENSION: &str = "bin";

/// Errors from checking an upload against the policy.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("file is empty")]
    Empty,
    #[error("only images can be uploaded (got {content_type})")]
    NotAnImage { content_type: String },
    #[error("file is {size} bytes; the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },
    #[error("only .docx, .doc and .pdf documents are accepted (got {content_type})")]
    UnsupportedDocumentType { content_type: String },
}

/// Check a product image: non-empty, `image/*`, at most 5 MB.
///
/// # Errors
///
/// Returns the first rule the file breaks.
pub fn validate_product_image(content_type: &str, size: usize) -> Result<(), UploadError> {
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if !content_type.starts_with("image/") {
        return Err(UploadError::NotAnImage {
            content_type: content_type.to_owned(),
        });
    }
    if size > MAX_PRODUCT_IMAGE_BYTES {
        return Err(UploadError::TooLarge {
            size,
            max: MAX_PRODUCT_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// Check a legal document: non-empty and one of [`LEGAL_DOCUMENT_MIME_TYPES`].
///
/// # Errors
///
/// Returns the first rule the file breaks.
pub fn validate_legal_document(content_type: &str, size: usize) -> Result<(), UploadError> {
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if !LEGAL_DOCUMENT_MIME_TYPES.contains(&content_type) {
        return Err(UploadError::UnsupportedDocumentType {
            content_type: content_type.to_owned(),
        });
    }
    Ok(())
}

/// Lowercased text after the last `.` of a file name.
#[must_use]
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| FALLBACK_EXTENSION.to_owned(), str::to_ascii_lowercase)
}

/// Object path for a product image: `products/<millis>-<base36>.<ext>`.
///
/// `nonce` is a random value supplied by the caller.
#[must_use]
pub fn product_image_path(file_name: &str, now: DateTime<Utc>, nonce: u64) -> String {
    format!(
        "products/{}-{}.{}",
        now.timestamp_millis(),
        base36(nonce),
        file_extension(file_name)
    )
}

/// Object path for a legal document: `<kind>_<millis>.<ext>`.
#[must_use]
pub fn legal_document_path(kind: LegalDocumentKind, file_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{}",
        kind.as_str(),
        now.timestamp_millis(),
        file_extension(file_name)
    )
}

/// The last path segment of a public object URL.
#[must_use]
pub fn object_name_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    path.rsplit('/').next().filter(|name| !name.is_empty())
}

fn base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while value > 0 {
        let digit = usize::try_from(value % 36).unwrap_or_default();
        out.push(DIGITS.get(digit).copied().map_or('0', char::from));
        value /= 36;
    }
    out.iter().rev().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_product_image_rules() {
        assert!(validate_product_image("image/png", 1024).is_ok());
        assert!(validate_product_image("image/webp", MAX_PRODUCT_IMAGE_BYTES).is_ok());
        assert_eq!(
            validate_product_image("application/pdf", 10),
            Err(UploadError::NotAnImage {
                content_type: "application/pdf".to_owned()
            })
        );
        assert_eq!(
            validate_product_image("image/jpeg", MAX_PRODUCT_IMAGE_BYTES + 1),
            Err(UploadError::TooLarge {
                size: MAX_PRODUCT_IMAGE_BYTES + 1,
                max: MAX_PRODUCT_IMAGE_BYTES
            })
        );
        assert_eq!(validate_product_image("image/jpeg", 0), Err(UploadError::Empty));
    }

    #[test]
    fn test_legal_document_rules() {
        assert!(validate_legal_document("application/pdf", 10).is_ok());
        assert!(validate_legal_document("application/msword", 10).is_ok());
        assert!(matches!(
            validate_legal_document("text/plain", 10),
            Err(UploadError::UnsupportedDocumentType { .. })
        ));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.JPG"), "jpg");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("noext"), "bin");
        assert_eq!(file_extension("trailing."), "bin");
        assert_eq!(file_extension("odd.p/ng"), "bin");
    }

    #[test]
    fn test_object_paths() {
        let now = Utc.timestamp_millis_opt(1_705_312_801_234).unwrap();
        assert_eq!(
            product_image_path("cat.png", now, 35),
            "products/1705312801234-z.png"
        );
        assert_eq!(
            product_image_path("cat.png", now, 36 * 36),
            "products/1705312801234-100.png"
        );
        assert_eq!(
            legal_document_path(LegalDocumentKind::PrivacyPolicy, "policy.docx", now),
            "privacy_policy_1705312801234.docx"
        );
    }

    #[test]
    fn test_object_name_from_url() {
        assert_eq!(
            object_name_from_url(
                "https://files.example.com/object/public/legal-documents/public_offer_1.pdf"
            ),
            Some("public_offer_1.pdf")
        );
        assert_eq!(object_name_from_url("https://x/y/a.pdf?download=1"), Some("a.pdf"));
        assert_eq!(object_name_from_url("https://x/y/"), None);
    }
}
