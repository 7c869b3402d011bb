//! # Verifiable Presentation
//!
//! The envelope a holder signs around one or more (possibly redacted)
//! credentials.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::credential::{ContextValue, TypeValue, VcError};
use crate::proof::ProofValue;

/// A W3C Verifiable Presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiablePresentation {
    /// JSON-LD contexts.
    #[serde(rename = "@context")]
    pub context: ContextValue,

    /// Optional presentation identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Declared types. Must include `VerifiablePresentation`.
    #[serde(rename = "type")]
    pub presentation_type: TypeValue,

    /// Holder DID, when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,

    /// Embedded credentials, kept as received.
    #[serde(rename = "verifiableCredential", default)]
    pub verifiable_credential: Vec<Value>,

    /// Attached proofs.
    #[serde(default, skip_serializing_if = "ProofValue::is_empty")]
    pub proof: ProofValue,
}

impl VerifiablePresentation {
    /// Wrap credentials in an unsigned presentation envelope.
    pub fn wrap(credentials: Vec<Value>, holder: Option<String>) -> Self {
        Self {
            context: ContextValue::default(),
            id: None,
            presentation_type: TypeValue::Array(vec!["VerifiablePresentation".to_string()]),
            holder,
            verifiable_credential: credentials,
            proof: ProofValue::default(),
        }
    }

    /// Parse and structurally check a received presentation document.
    pub fn from_document(document: &Value) -> Result<Self, VcError> {
        if !document.is_object() {
            return Err(VcError::NotAnObject);
        }
        let vp: Self = serde_json::from_value(document.clone())?;
        if !vp.presentation_type.contains("VerifiablePresentation") {
            return Err(VcError::MissingBaseType("VerifiablePresentation"));
        }
        Ok(vp)
    }

    /// Serialize to a JSON document.
    pub fn to_document(&self) -> Result<Value, VcError> {
        Ok(serde_json::to_value(self)?)
    }
}
