//! # Artifact Classification
//!
//! Untrusted documents enter as JSON. [`Artifact::classify`] inspects the
//! declared `type` list and maps the document to exactly one variant; a
//! document declaring neither base type is rejected before anything else
//! looks at it. A document declaring both is treated as a presentation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::proof::ProofPurpose;

/// Stored category of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Verifiable Credential.
    #[serde(rename = "VC")]
    Credential,
    /// Verifiable Presentation.
    #[serde(rename = "VP")]
    Presentation,
}

impl ArtifactKind {
    /// Category code as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credential => "VC",
            Self::Presentation => "VP",
        }
    }

    /// Parse a stored category code.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "VC" => Some(Self::Credential),
            "VP" => Some(Self::Presentation),
            _ => None,
        }
    }

    /// Proof purpose a valid artifact of this kind carries.
    pub fn proof_purpose(&self) -> ProofPurpose {
        match self {
            Self::Credential => ProofPurpose::AssertionMethod,
            Self::Presentation => ProofPurpose::Authentication,
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The document declares neither `VerifiableCredential` nor
/// `VerifiablePresentation`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized artifact type {declared:?}: expected VerifiableCredential or VerifiablePresentation")]
pub struct UnrecognizedArtifactType {
    /// The string types the document declared, possibly none.
    pub declared: Vec<String>,
}

/// A classified document.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// Declares `VerifiableCredential`.
    Credential(Value),
    /// Declares `VerifiablePresentation`.
    Presentation(Value),
}

impl Artifact {
    /// Classify a document by its declared types.
    pub fn classify(document: Value) -> Result<Self, UnrecognizedArtifactType> {
        let declared = declared_types(&document);
        if declared.iter().any(|t| t == "VerifiablePresentation") {
            Ok(Self::Presentation(document))
        } else if declared.iter().any(|t| t == "VerifiableCredential") {
            Ok(Self::Credential(document))
        } else {
            Err(UnrecognizedArtifactType { declared })
        }
    }

    /// Which variant this is.
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Credential(_) => ArtifactKind::Credential,
            Self::Presentation(_) => ArtifactKind::Presentation,
        }
    }

    /// The document.
    pub fn document(&self) -> &Value {
        match self {
            Self::Credential(doc) | Self::Presentation(doc) => doc,
        }
    }

    /// Take the document out.
    pub fn into_document(self) -> Value {
        match self {
            Self::Credential(doc) | Self::Presentation(doc) => doc,
        }
    }

    /// Human-readable title for listings.
    ///
    /// `"Presentation"` for presentations. For credentials, the last
    /// declared type when more than one is declared, otherwise
    /// `"VerifiableCredential"`.
    pub fn title(&self) -> String {
        match self {
            Self::Presentation(_) => "Presentation".to_string(),
            Self::Credential(doc) => {
                let declared = declared_types(doc);
                match declared.as_slice() {
                    [_, .., last] => last.clone(),
                    _ => "VerifiableCredential".to_string(),
                }
            }
        }
    }
}

fn declared_types(document: &Value) -> Vec<String> {
    match document.get("type") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
