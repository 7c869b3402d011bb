//! # Issuance Claims
//!
//! [`ClaimInput`] is what an issuer submits; [`ClaimInput::validate`] turns
//! it into [`ClaimFields`], the fields that define the attested fact and
//! feed both the semantic fingerprint and the credential envelope.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Map, Value};
use vcw_core::CredentialId;
use vcw_vc::{ContextValue, TypeValue, VerifiableCredential, W3C_CREDENTIALS_V1};

use crate::error::LifecycleError;

/// Raw issuance request.
#[derive(Debug, Clone, Default)]
pub struct ClaimInput {
    /// Email of the receiving holder.
    pub holder_email: String,
    /// Holder's name as attested.
    pub name: String,
    /// Course completed.
    pub course: String,
    /// Grade awarded.
    pub grade: String,
    /// `YYYY-MM-DD`, not after today.
    pub completion_date: String,
    /// Awarding university; the configured default when absent or blank.
    pub university: Option<String>,
}

/// Validated claim fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimFields {
    /// Holder's name.
    pub name: String,
    /// Awarding university.
    pub university: String,
    /// Course completed.
    pub course: String,
    /// Grade awarded.
    pub grade: String,
    /// Completion date.
    pub completion_date: NaiveDate,
}

impl ClaimInput {
    /// Check required fields and the completion date against `today`.
    ///
    /// Returns the trimmed holder email alongside the claim fields.
    pub fn validate(
        &self,
        today: NaiveDate,
        default_university: &str,
    ) -> Result<(String, ClaimFields), LifecycleError> {
        let required = [
            ("holder_email", &self.holder_email),
            ("name", &self.name),
            ("course", &self.course),
            ("grade", &self.grade),
            ("completion_date", &self.completion_date),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| *k)
            .collect();
        if !missing.is_empty() {
            return Err(LifecycleError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let completion_date = vcw_core::parse_calendar_date(&self.completion_date, today)?;
        let university = self
            .university
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(default_university)
            .to_string();

        Ok((
            self.holder_email.trim().to_string(),
            ClaimFields {
                name: self.name.trim().to_string(),
                university,
                course: self.course.trim().to_string(),
                grade: self.grade.trim().to_string(),
                completion_date,
            },
        ))
    }
}

impl ClaimFields {
    /// The specific credential type: the course with whitespace removed.
    pub fn credential_type(&self) -> String {
        self.course.split_whitespace().collect()
    }

    fn context() -> ContextValue {
        ContextValue::Array(vec![
            Value::String(W3C_CREDENTIALS_V1.to_string()),
            json!({
                "name": "https://schema.org/name",
                "university": "https://schema.org/CollegeOrUniversity",
                "course": "https://schema.org/Course",
                "grade": "https://schema.org/grade",
                "completionDate": "https://schema.org/endDate"
            }),
        ])
    }

    /// Build the unsigned credential.
    pub fn to_credential(
        &self,
        cred_id: CredentialId,
        issuer_did: &str,
        subject_did: &str,
        issued_at: DateTime<Utc>,
    ) -> VerifiableCredential {
        let mut subject = Map::new();
        subject.insert("id".into(), Value::String(subject_did.to_string()));
        subject.insert("name".into(), Value::String(self.name.clone()));
        subject.insert("university".into(), Value::String(self.university.clone()));
        subject.insert("course".into(), Value::String(self.course.clone()));
        subject.insert("grade".into(), Value::String(self.grade.clone()));
        subject.insert(
            "completionDate".into(),
            Value::String(self.completion_date.format("%Y-%m-%d").to_string()),
        );

        VerifiableCredential {
            context: Self::context(),
            id: Some(format!("urn:uuid:{cred_id}")),
            credential_type: TypeValue::Array(vec![
                "VerifiableCredential".to_string(),
                self.credential_type(),
            ]),
            issuer: issuer_did.to_string(),
            issuance_date: issued_at,
            expiration_date: None,
            credential_subject: subject,
            proof: Default::default(),
        }
    }
}
