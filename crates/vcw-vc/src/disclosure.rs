//! # Selective Disclosure
//!
//! Derives a credential that reveals only the requested subject
//! attributes. The envelope (`@context`, `id`, `type`, `issuer`,
//! `issuanceDate`, `expirationDate`) is copied verbatim from the source;
//! the source's proof is not carried over, since it would no longer cover
//! the redacted content.
//!
//! Requested attributes absent from the source are dropped silently.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::credential::VcError;

const ENVELOPE_FIELDS: &[&str] = &[
    "@context",
    "id",
    "type",
    "issuer",
    "issuanceDate",
    "expirationDate",
];

/// The subject attributes a holder chooses to reveal.
///
/// Wire form: `{"credentialSubject": ["name", "grade"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureFrame {
    /// Requested attribute names.
    #[serde(rename = "credentialSubject", default)]
    pub credential_subject: BTreeSet<String>,
}

impl DisclosureFrame {
    /// Frame revealing the given attributes.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            credential_subject: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Apply `frame` to `credential`.
///
/// The result's subject holds exactly the keys present both in the source
/// subject and in the frame. Fails only if the source is not an object.
pub fn redact(credential: &Value, frame: &DisclosureFrame) -> Result<Value, VcError> {
    let source = credential.as_object().ok_or(VcError::NotAnObject)?;

    let mut out = Map::new();
    for field in ENVELOPE_FIELDS {
        if let Some(v) = source.get(*field) {
            out.insert((*field).to_string(), v.clone());
        }
    }

    let subject: Map<String, Value> = match source.get("credentialSubject") {
        Some(Value::Object(subject)) => subject
            .iter()
            .filter(|(k, _)| frame.credential_subject.contains(k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        _ => Map::new(),
    };
    out.insert("credentialSubject".to_string(), Value::Object(subject));

    Ok(Value::Object(out))
}
