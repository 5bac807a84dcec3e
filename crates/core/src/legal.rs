//! Legal documents (privacy policy, terms of service, public offer).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::LegalDocumentId;

/// Which legal document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalDocumentKind {
    PrivacyPolicy,
    TermsOfService,
    PublicOffer,
}

impl LegalDocumentKind {
    pub const ALL: [Self; 3] = [Self::PrivacyPolicy, Self::TermsOfService, Self::PublicOffer];

    /// The stored `type` value, also used as the object-name prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrivacyPolicy => "privacy_policy",
            Self::TermsOfService => "terms_of_service",
            Self::PublicOffer => "public_offer",
        }
    }

    /// Display title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::PrivacyPolicy => "Политика конфиденциальности",
            Self::TermsOfService => "Пользовательское соглашение",
            Self::PublicOffer => "Публичная оферта",
        }
    }

    /// Text shown while no file has been uploaded for this kind.
    #[must_use]
    pub fn placeholder_content(self) -> String {
        format!(
            "{} будет доступна после загрузки документа через админ-панель.",
            self.title()
        )
    }
}

impl std::fmt::Display for LegalDocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LegalDocumentKind {
    type Err = crate::types::UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| crate::types::UnknownStatus {
                kind: "legal document",
                value: s.to_owned(),
            })
    }
}

/// A stored legal document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalDocument {
    pub id: LegalDocumentId,
    pub kind: LegalDocumentKind,
    pub title: String,
    /// Public URL of the uploaded file.
    pub file_url: Option<String>,
    /// Original name of the uploaded file.
    pub file_name: Option<String>,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LegalDocument {
    /// Whether a file is currently attached.
    #[must_use]
    pub const fn has_file(&self) -> bool {
        self.file_url.is_some()
    }
}

/// A freshly uploaded file to attach to a legal document kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalDocumentUpload {
    pub kind: LegalDocumentKind,
    pub file_url: String,
    pub file_name: String,
}
