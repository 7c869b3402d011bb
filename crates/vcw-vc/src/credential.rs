//! # Verifiable Credential
//!
//! Typed envelope for building credentials and for structural checks on
//! received ones. The subject is an open JSON object; the envelope is not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::proof::ProofValue;

/// Base context of the W3C VC Data Model 1.1.
pub const W3C_CREDENTIALS_V1: &str = "https://www.w3.org/2018/credentials/v1";

/// Errors from credential and presentation structure handling.
#[derive(Error, Debug)]
pub enum VcError {
    /// Canonicalization of a document failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] vcw_core::CanonicalizationError),

    /// JSON shape did not match the data model.
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is not a JSON object.
    #[error("document is not a JSON object")]
    NotAnObject,

    /// `type` does not include the required base type.
    #[error("type must include '{0}'")]
    MissingBaseType(&'static str),
}

/// A W3C Verifiable Credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiableCredential {
    /// JSON-LD contexts.
    #[serde(rename = "@context")]
    pub context: ContextValue,

    /// Credential identifier, `urn:uuid:…` for credentials issued here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Declared types. Must include `VerifiableCredential`.
    #[serde(rename = "type")]
    pub credential_type: TypeValue,

    /// Issuer DID.
    pub issuer: String,

    /// Issuance time.
    #[serde(rename = "issuanceDate")]
    pub issuance_date: DateTime<Utc>,

    /// Optional expiry.
    #[serde(
        rename = "expirationDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_date: Option<DateTime<Utc>>,

    /// The claims.
    #[serde(rename = "credentialSubject")]
    pub credential_subject: Map<String, Value>,

    /// Attached proofs.
    #[serde(default, skip_serializing_if = "ProofValue::is_empty")]
    pub proof: ProofValue,
}

impl VerifiableCredential {
    /// Parse and structurally check a received credential document.
    pub fn from_document(document: &Value) -> Result<Self, VcError> {
        if !document.is_object() {
            return Err(VcError::NotAnObject);
        }
        let vc: Self = serde_json::from_value(document.clone())?;
        if !vc.credential_type.contains("VerifiableCredential") {
            return Err(VcError::MissingBaseType("VerifiableCredential"));
        }
        Ok(vc)
    }

    /// Serialize to a JSON document.
    pub fn to_document(&self) -> Result<Value, VcError> {
        Ok(serde_json::to_value(self)?)
    }

    /// True if an expiration date is set and has passed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date.is_some_and(|exp| exp < now)
    }
}

/// `@context`: a single URI or an array of URIs and term maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    /// Single context URI.
    Single(String),
    /// Context URIs and inline term definitions.
    Array(Vec<Value>),
}

impl Default for ContextValue {
    fn default() -> Self {
        Self::Array(vec![Value::String(W3C_CREDENTIALS_V1.to_string())])
    }
}

/// `type`: a single string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeValue {
    /// One type.
    Single(String),
    /// Several types, in declaration order.
    Array(Vec<String>),
}

impl TypeValue {
    /// Whether `name` is among the declared types.
    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|t| t == name)
    }

    /// Declared types in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            TypeValue::Single(s) => std::slice::from_ref(s),
            TypeValue::Array(arr) => arr,
        };
        slice.iter().map(String::as_str)
    }

    /// Number of declared types.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True if no type is declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
