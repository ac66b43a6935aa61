//! Attribute submission bundles
//!
//! A subject ships three attribute ciphertexts plus a binding proof.
//! The proof commits the exact ciphertext bytes to one subject and one
//! engine instance, so a bundle replayed under another subject or
//! against another instance fails verification.

use crate::keys::{ClientKey, PublicKey};
use crate::value::{EncUint32, EncUint64, EncUint8};
use crate::{FheError, FheResult};
use serde::{Deserialize, Serialize};

const BINDING_TAG: &[u8] = b"veil.submission.v1";

/// Three sealed identity attributes plus their binding proof
#[derive(Clone, Serialize, Deserialize)]
pub struct SubmissionBundle {
    passport_ct: Vec<u8>,
    birth_year_ct: Vec<u8>,
    country_ct: Vec<u8>,
    proof: [u8; 32],
}

impl SubmissionBundle {
    /// Encrypt the three attributes with the client key and bind them
    /// to `subject` and `instance_id`
    pub fn seal(
        passport_digest: u64,
        birth_year: u32,
        country: u8,
        subject: [u8; 32],
        instance_id: [u8; 32],
        key: &ClientKey,
    ) -> FheResult<Self> {
        let passport_ct = EncUint64::encrypt(passport_digest, key)?.to_bytes()?;
        let birth_year_ct = EncUint32::encrypt(birth_year, key)?.to_bytes()?;
        let country_ct = EncUint8::encrypt(country, key)?.to_bytes()?;

        let proof = binding_proof(instance_id, subject, &passport_ct, &birth_year_ct, &country_ct);
        Ok(Self {
            passport_ct,
            birth_year_ct,
            country_ct,
            proof,
        })
    }

    /// Encrypt with the instance public key instead of the client key
    pub fn seal_with_public(
        passport_digest: u64,
        birth_year: u32,
        country: u8,
        subject: [u8; 32],
        instance_id: [u8; 32],
        key: &PublicKey,
    ) -> FheResult<Self> {
        let passport_ct = EncUint64::encrypt_with_public(passport_digest, key)?.to_bytes()?;
        let birth_year_ct = EncUint32::encrypt_with_public(birth_year, key)?.to_bytes()?;
        let country_ct = EncUint8::encrypt_with_public(country, key)?.to_bytes()?;

        let proof = binding_proof(instance_id, subject, &passport_ct, &birth_year_ct, &country_ct);
        Ok(Self {
            passport_ct,
            birth_year_ct,
            country_ct,
            proof,
        })
    }

    /// Verify the binding proof against a subject and engine instance
    pub fn verify(&self, instance_id: [u8; 32], subject: [u8; 32]) -> FheResult<()> {
        let expected = binding_proof(
            instance_id,
            subject,
            &self.passport_ct,
            &self.birth_year_ct,
            &self.country_ct,
        );
        if expected != self.proof {
            return Err(FheError::InvalidProof(
                "proof does not bind ciphertexts to this subject and instance".into(),
            ));
        }
        Ok(())
    }

    /// Serialized passport-digest ciphertext
    pub fn passport_ct(&self) -> &[u8] {
        &self.passport_ct
    }

    /// Serialized birth-year ciphertext
    pub fn birth_year_ct(&self) -> &[u8] {
        &self.birth_year_ct
    }

    /// Serialized country-code ciphertext
    pub fn country_ct(&self) -> &[u8] {
        &self.country_ct
    }
}

impl std::fmt::Debug for SubmissionBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionBundle")
            .field("proof", &hex::encode(&self.proof[..8]))
            .finish()
    }
}

/// Domain-separated digest binding ciphertext bytes to one subject and
/// one engine instance
fn binding_proof(
    instance_id: [u8; 32],
    subject: [u8; 32],
    passport_ct: &[u8],
    birth_year_ct: &[u8],
    country_ct: &[u8],
) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(BINDING_TAG);
    hasher.update(&instance_id);
    hasher.update(&subject);
    for ct in [passport_ct, birth_year_ct, country_ct] {
        hasher.update(&(ct.len() as u64).to_le_bytes());
        hasher.update(ct);
    }
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_bundle(instance: [u8; 32], subject: [u8; 32]) -> SubmissionBundle {
        // Structural tests only need the proof math, not real ciphertexts
        let passport_ct = vec![1u8; 16];
        let birth_year_ct = vec![2u8; 16];
        let country_ct = vec![3u8; 16];
        let proof = binding_proof(instance, subject, &passport_ct, &birth_year_ct, &country_ct);
        SubmissionBundle {
            passport_ct,
            birth_year_ct,
            country_ct,
            proof,
        }
    }

    #[test]
    fn proof_binds_subject_and_instance() {
        let bundle = fake_bundle([7u8; 32], [9u8; 32]);

        assert!(bundle.verify([7u8; 32], [9u8; 32]).is_ok());
        assert!(bundle.verify([7u8; 32], [8u8; 32]).is_err());
        assert!(bundle.verify([6u8; 32], [9u8; 32]).is_err());
    }

    #[test]
    fn proof_binds_ciphertext_bytes() {
        let mut bundle = fake_bundle([7u8; 32], [9u8; 32]);
        bundle.country_ct[0] ^= 0xff;
        assert!(bundle.verify([7u8; 32], [9u8; 32]).is_err());
    }

    #[test]
    fn length_prefix_prevents_boundary_shift() {
        let a = binding_proof([0u8; 32], [0u8; 32], &[1, 2], &[3], &[]);
        let b = binding_proof([0u8; 32], [0u8; 32], &[1], &[2, 3], &[]);
        assert_ne!(a, b);
    }
}
