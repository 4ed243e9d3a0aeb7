// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::ArtifactDecodeError;
use base64::{Engine as _, engine::general_purpose::STANDARD as Base64};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// The kind of content an [`Artifact`] carries.
///
/// Serialized using the names the orchestration runtime uses for its artifact types.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// An XML document, such as a rendered JUnit report.
    #[serde(rename = "XMLData")]
    XmlData,

    /// A JSON document.
    #[serde(rename = "JSONData")]
    JsonData,

    /// A PNG screenshot.
    Photo,
}

impl ArtifactKind {
    /// Returns the name of this kind, as used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::XmlData => "XMLData",
            Self::JsonData => "JSONData",
            Self::Photo => "Photo",
        }
    }

    /// Returns the file name prefix used when archiving artifacts of this kind.
    pub fn default_prefix(self) -> &'static str {
        match self {
            Self::XmlData => "junit",
            Self::JsonData => "scene",
            Self::Photo => "photo",
        }
    }

    /// Returns the file extension used when archiving artifacts of this kind.
    pub fn extension(self) -> &'static str {
        match self {
            Self::XmlData => "xml",
            Self::JsonData => "json",
            Self::Photo => "png",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable payload captured during a test run, such as a report document or a screenshot.
///
/// The payload is held as base64 text. Equality and hashing consider only that text: two
/// artifacts are interchangeable if and only if their encoded values are byte-identical.
///
/// Artifacts serialize to and from a [`SerializedArtifact`] record.
#[derive(Clone, Serialize, Deserialize)]
#[serde(into = "SerializedArtifact", try_from = "SerializedArtifact")]
pub struct Artifact {
    kind: ArtifactKind,
    encoded_value: String,
}

impl Artifact {
    /// Creates an artifact from UTF-8 text.
    pub fn from_string(kind: ArtifactKind, value: impl AsRef<str>) -> Self {
        Self::from_bytes(kind, value.as_ref().as_bytes())
    }

    /// Creates an artifact from raw bytes.
    pub fn from_bytes(kind: ArtifactKind, value: impl AsRef<[u8]>) -> Self {
        Self {
            kind,
            encoded_value: Base64.encode(value),
        }
    }

    /// Creates an artifact from an already-encoded base64 value.
    ///
    /// Returns an error if `encoded_value` is not valid base64.
    pub fn from_base64(
        kind: ArtifactKind,
        encoded_value: impl Into<String>,
    ) -> Result<Self, ArtifactDecodeError> {
        let encoded_value = encoded_value.into();
        Base64
            .decode(&encoded_value)
            .map_err(|error| ArtifactDecodeError::new(kind, error))?;
        Ok(Self {
            kind,
            encoded_value,
        })
    }

    /// Creates an XML artifact from the given document text.
    pub fn xml(document: impl AsRef<str>) -> Self {
        Self::from_string(ArtifactKind::XmlData, document)
    }

    /// Returns the kind of this artifact.
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Returns the base64 representation of this artifact.
    pub fn encoded_value(&self) -> &str {
        &self.encoded_value
    }

    /// Decodes this artifact into its raw bytes.
    pub fn decoded(&self) -> Result<Vec<u8>, ArtifactDecodeError> {
        Base64
            .decode(&self.encoded_value)
            .map_err(|error| ArtifactDecodeError::new(self.kind, error))
    }

    /// Applies `f` to the raw bytes of this artifact.
    pub fn map_decoded<T>(&self, f: impl FnOnce(&[u8]) -> T) -> Result<T, ArtifactDecodeError> {
        let decoded = self.decoded()?;
        Ok(f(&decoded))
    }

    /// Returns the plain record form of this artifact.
    pub fn to_record(&self) -> SerializedArtifact {
        SerializedArtifact {
            kind: self.kind,
            encoded_value: self.encoded_value.clone(),
        }
    }

    /// Reconstructs an artifact from its plain record form.
    pub fn from_record(record: SerializedArtifact) -> Result<Self, ArtifactDecodeError> {
        Self::from_base64(record.kind, record.encoded_value)
    }

    /// Serializes this artifact as a JSON record.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.to_record()).expect("artifact records are always serializable")
    }

    /// Deserializes an artifact from a JSON record.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.encoded_value == other.encoded_value
    }
}

impl Eq for Artifact {}

impl Hash for Artifact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encoded_value.hash(state);
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Payloads can be large (screenshots), so only show their size.
        f.debug_struct("Artifact")
            .field("kind", &self.kind)
            .field("encoded_len", &self.encoded_value.len())
            .finish()
    }
}

impl From<Artifact> for SerializedArtifact {
    fn from(artifact: Artifact) -> Self {
        Self {
            kind: artifact.kind,
            encoded_value: artifact.encoded_value,
        }
    }
}

impl TryFrom<SerializedArtifact> for Artifact {
    type Error = ArtifactDecodeError;

    fn try_from(record: SerializedArtifact) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}

/// The plain, tagged record an [`Artifact`] is transported as.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SerializedArtifact {
    /// The kind of artifact.
    #[serde(rename = "type")]
    pub kind: ArtifactKind,

    /// The base64-encoded payload.
    #[serde(rename = "base64EncodedValue", alias = "encodedValue")]
    pub encoded_value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    static DOCUMENT: &str = r#"<root><a id="1">Test 1</a><a id="2">Test 2</a></root>"#;

    #[test]
    fn serializes_to_tagged_record() {
        let xml = Artifact::xml(DOCUMENT);
        let record: serde_json::Value = serde_json::from_str(&xml.to_json()).unwrap();

        assert_eq!(record["type"], "XMLData");
        assert_eq!(record["base64EncodedValue"], xml.encoded_value());
    }

    #[test]
    fn deserializes_from_record() {
        let xml = Artifact::xml(DOCUMENT);
        let deserialized = Artifact::from_json(&xml.to_json()).expect("record is valid");

        assert_eq!(deserialized, xml);
        assert_eq!(deserialized.kind(), ArtifactKind::XmlData);
    }

    #[test]
    fn accepts_encoded_value_alias() {
        let artifact = Artifact::from_json(r#"{"type": "Photo", "encodedValue": "YWJj"}"#)
            .expect("alias is accepted");
        assert_eq!(artifact.kind(), ArtifactKind::Photo);
        assert_eq!(artifact.decoded().unwrap(), b"abc");
    }

    #[test_case(r#"{"type": "XMLData", "base64EncodedValue": "not base64!"}"# ; "bad payload")]
    #[test_case(r#"{"type": "Video", "base64EncodedValue": "YWJj"}"# ; "unknown kind")]
    #[test_case(r#"{"type": "XMLData"}"# ; "missing payload")]
    fn rejects_malformed_records(json: &str) {
        Artifact::from_json(json).expect_err("record is malformed");
    }

    #[test]
    fn from_base64_rejects_invalid_input() {
        let error = Artifact::from_base64(ArtifactKind::JsonData, "%%%")
            .expect_err("invalid base64 is rejected");
        assert_eq!(error.kind, ArtifactKind::JsonData);
    }

    #[test]
    fn equality_ignores_kind() {
        let xml = Artifact::from_bytes(ArtifactKind::XmlData, b"same");
        let photo = Artifact::from_bytes(ArtifactKind::Photo, b"same");
        assert_eq!(xml, photo);
        assert_ne!(xml, Artifact::xml("different"));
    }

    #[test]
    fn map_decoded_exposes_raw_bytes() {
        let xml = Artifact::xml(DOCUMENT);
        let text = xml
            .map_decoded(|bytes| String::from_utf8(bytes.to_vec()).unwrap())
            .unwrap();
        assert_eq!(text, DOCUMENT);

        let reencoded = xml.map_decoded(|bytes| Base64.encode(bytes)).unwrap();
        assert_eq!(reencoded, xml.encoded_value());
    }

    #[test]
    fn from_bytes_matches_from_string() {
        let decoded = Artifact::xml(DOCUMENT).decoded().unwrap();
        assert_eq!(Artifact::from_bytes(ArtifactKind::XmlData, &decoded), Artifact::xml(DOCUMENT));
    }

    proptest! {
        #[test]
        fn record_round_trip(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            let artifact = Artifact::from_bytes(ArtifactKind::Photo, &bytes);
            let restored = Artifact::from_record(artifact.to_record()).unwrap();
            prop_assert_eq!(&restored, &artifact);
            prop_assert_eq!(restored.decoded().unwrap(), bytes);
        }
    }
}
