use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::media::MediaType;
use crate::types::{FragmentId, OwnerId};

/// Wire form of a fragment's metadata as it crosses the store boundary.
///
/// Records are serialized as self-describing JSON so that a
/// schema-agnostic remote backend (one that only understands string
/// values) can round-trip the exact field set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentRecord {
    pub id: String,
    pub owner_id: String,
    pub content_type: String,
    pub size: u64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// A stored content item's metadata plus its derived properties.
///
/// `id`, `owner_id`, and the base content type are immutable after
/// construction; `size` and `updated` are refreshed on every data write.
/// All field validation lives here; stores and the repository never
/// construct a fragment that bypasses it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    id: FragmentId,
    owner_id: OwnerId,
    content_type: String,
    media: MediaType,
    size: u64,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl Fragment {
    /// Construct a new fragment with a generated id and fresh timestamps.
    ///
    /// The Content-Type value may carry parameters (e.g. `charset`),
    /// which are kept verbatim; the base type must be supported.
    pub fn new(
        owner_id: impl Into<OwnerId>,
        content_type: &str,
    ) -> Result<Self, ValidationError> {
        let owner_id = owner_id.into();
        if owner_id.as_str().is_empty() {
            return Err(ValidationError::MissingOwner);
        }
        if content_type.trim().is_empty() {
            return Err(ValidationError::MissingType);
        }
        let media = MediaType::parse(content_type)
            .ok_or_else(|| ValidationError::UnsupportedType(content_type.to_owned()))?;

        let now = Utc::now();
        Ok(Self {
            id: FragmentId::generate(),
            owner_id,
            content_type: content_type.to_owned(),
            media,
            size: 0,
            created: now,
            updated: now,
        })
    }

    /// Refresh `size` and `updated` after the fragment's payload was
    /// written or replaced.
    pub fn data_written(&mut self, size: u64) {
        self.size = size;
        self.updated = Utc::now();
    }

    #[must_use]
    pub fn id(&self) -> &FragmentId {
        &self.id
    }

    #[must_use]
    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    /// The declared Content-Type, parameters included.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The base type with parameters stripped.
    #[must_use]
    pub fn media_type(&self) -> MediaType {
        self.media
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    #[must_use]
    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    /// Returns `true` for `text/*` fragments.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.media.is_text()
    }

    /// The set of media types this fragment may be converted into,
    /// always including its own base type.
    #[must_use]
    pub fn formats(&self) -> Vec<MediaType> {
        self.media.conversion_targets()
    }

    /// Serialize into the wire form stored by metadata backends.
    #[must_use]
    pub fn to_record(&self) -> FragmentRecord {
        FragmentRecord {
            id: self.id.to_string(),
            owner_id: self.owner_id.to_string(),
            content_type: self.content_type.clone(),
            size: self.size,
            created: self.created,
            updated: self.updated,
        }
    }
}

impl TryFrom<FragmentRecord> for Fragment {
    type Error = ValidationError;

    /// Reconstruct a fragment from a stored record, re-running the same
    /// validation as construction. A record with an empty id receives a
    /// generated one.
    fn try_from(record: FragmentRecord) -> Result<Self, Self::Error> {
        if record.owner_id.is_empty() {
            return Err(ValidationError::MissingOwner);
        }
        if record.content_type.trim().is_empty() {
            return Err(ValidationError::MissingType);
        }
        let media = MediaType::parse(&record.content_type)
            .ok_or_else(|| ValidationError::UnsupportedType(record.content_type.clone()))?;

        let id = if record.id.is_empty() {
            FragmentId::generate()
        } else {
            FragmentId::from(record.id)
        };

        Ok(Self {
            id,
            owner_id: OwnerId::from(record.owner_id),
            content_type: record.content_type,
            media,
            size: record.size,
            created: record.created,
            updated: record.updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_id_and_timestamps() {
        let fragment = Fragment::new("owner-1", "text/plain").unwrap();
        assert!(!fragment.id().as_str().is_empty());
        assert_eq!(fragment.owner_id().as_str(), "owner-1");
        assert_eq!(fragment.size(), 0);
        assert_eq!(fragment.created(), fragment.updated());
    }

    #[test]
    fn new_rejects_missing_owner() {
        let err = Fragment::new("", "text/plain").unwrap_err();
        assert_eq!(err, ValidationError::MissingOwner);
    }

    #[test]
    fn new_rejects_missing_type() {
        let err = Fragment::new("owner-1", "  ").unwrap_err();
        assert_eq!(err, ValidationError::MissingType);
    }

    #[test]
    fn new_rejects_unsupported_type() {
        let err = Fragment::new("owner-1", "application/xml").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedType("application/xml".to_owned())
        );
    }

    #[test]
    fn charset_parameter_is_kept_but_stripped_from_media_type() {
        let fragment = Fragment::new("owner-1", "text/html; charset=utf-8").unwrap();
        assert_eq!(fragment.content_type(), "text/html; charset=utf-8");
        assert_eq!(fragment.media_type(), MediaType::TextHtml);
        assert!(fragment.is_text());
    }

    #[test]
    fn formats_always_contains_own_type() {
        for content_type in [
            "text/plain",
            "text/markdown",
            "text/csv",
            "application/json",
            "application/yaml",
            "image/png",
        ] {
            let fragment = Fragment::new("owner-1", content_type).unwrap();
            assert!(
                fragment.formats().contains(&fragment.media_type()),
                "{content_type} formats should include itself"
            );
        }
    }

    #[test]
    fn data_written_refreshes_size_and_updated() {
        let mut fragment = Fragment::new("owner-1", "text/plain").unwrap();
        let created = fragment.created();
        fragment.data_written(128);
        assert_eq!(fragment.size(), 128);
        assert_eq!(fragment.created(), created);
        assert!(fragment.updated() >= created);
    }

    #[test]
    fn record_roundtrip_preserves_fields() {
        let mut fragment = Fragment::new("owner-1", "application/json").unwrap();
        fragment.data_written(42);

        let record = fragment.to_record();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: FragmentRecord = serde_json::from_str(&json).unwrap();
        let back = Fragment::try_from(parsed).unwrap();

        assert_eq!(back, fragment);
    }

    #[test]
    fn record_with_unsupported_type_fails_reconstruction() {
        let fragment = Fragment::new("owner-1", "text/plain").unwrap();
        let mut record = fragment.to_record();
        record.content_type = "video/mp4".to_owned();
        assert!(Fragment::try_from(record).is_err());
    }

    #[test]
    fn record_with_empty_id_gets_a_generated_one() {
        let fragment = Fragment::new("owner-1", "text/plain").unwrap();
        let mut record = fragment.to_record();
        record.id = String::new();
        let back = Fragment::try_from(record).unwrap();
        assert!(!back.id().as_str().is_empty());
    }

    #[test]
    fn record_serializes_with_camel_case_fields() {
        let fragment = Fragment::new("owner-1", "text/plain").unwrap();
        let json = serde_json::to_value(fragment.to_record()).unwrap();
        assert!(json.get("ownerId").is_some());
        assert!(json.get("contentType").is_some());
        assert!(json.get("created").is_some());
    }
}
