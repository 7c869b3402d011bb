//! # Content Addressing
//!
//! Two fingerprint policies, both SHA-256 rendered as lowercase hex:
//!
//! - [`semantic_fingerprint`] covers the fields that define an attested
//!   fact and is computed before signing, so two issuances of the same fact
//!   collide even though their signatures and timestamps differ.
//! - [`artifact_fingerprint`] covers the exact bytes of a submitted
//!   artifact.

use serde::Serialize;
use vcw_core::{sha256_digest, sha256_exact, CanonicalBytes, CanonicalizationError, UserId};

use crate::claim::ClaimFields;

#[derive(Serialize)]
struct SemanticKey<'a> {
    issuer_id: UserId,
    holder_id: UserId,
    name: &'a str,
    university: &'a str,
    course: &'a str,
    grade: &'a str,
    completion_date: String,
}

/// Fingerprint of `(issuer, holder, claim fields)`.
pub fn semantic_fingerprint(
    issuer_id: UserId,
    holder_id: UserId,
    claim: &ClaimFields,
) -> Result<String, CanonicalizationError> {
    let key = SemanticKey {
        issuer_id,
        holder_id,
        name: &claim.name,
        university: &claim.university,
        course: &claim.course,
        grade: &claim.grade,
        completion_date: claim.completion_date.format("%Y-%m-%d").to_string(),
    };
    Ok(sha256_digest(&CanonicalBytes::new(&key)?).to_hex())
}

/// Fingerprint of the exact submitted bytes.
pub fn artifact_fingerprint(raw: &[u8]) -> String {
    sha256_exact(raw).to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn fields(grade: &str) -> ClaimFields {
        ClaimFields {
            name: "Ines".into(),
            university: "Universidade de Aveiro".into(),
            course: "Databases".into(),
            grade: grade.into(),
            completion_date: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(),
        }
    }

    #[test]
    fn semantic_fingerprint_separates_parties_and_fields() {
        let issuer = UserId::new();
        let holder = UserId::new();
        let base = semantic_fingerprint(issuer, holder, &fields("15")).unwrap();
        assert_eq!(base.len(), 64);
        assert_eq!(base, semantic_fingerprint(issuer, holder, &fields("15")).unwrap());
        assert_ne!(base, semantic_fingerprint(issuer, holder, &fields("16")).unwrap());
        assert_ne!(base, semantic_fingerprint(holder, issuer, &fields("15")).unwrap());
    }

    #[test]
    fn artifact_fingerprint_is_byte_exact() {
        assert_ne!(
            artifact_fingerprint(br#"{"a":1,"b":2}"#),
            artifact_fingerprint(br#"{"b":2,"a":1}"#)
        );
    }

    proptest! {
        #[test]
        fn fingerprints_are_deterministic(
            name in "[A-Za-z ]{1,20}",
            grade in "[0-9]{1,2}",
            raw in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            let issuer = UserId::new();
            let holder = UserId::new();
            let mut claim = fields(&grade);
            claim.name = name;
            prop_assert_eq!(
                semantic_fingerprint(issuer, holder, &claim).unwrap(),
                semantic_fingerprint(issuer, holder, &claim).unwrap()
            );
            prop_assert_eq!(artifact_fingerprint(&raw), artifact_fingerprint(&raw));
        }
    }
}
