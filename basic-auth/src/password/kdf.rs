use std::hint::black_box;

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::Sha1;
use sha2::Sha256;
use sha2::Sha384;
use sha2::Sha512;
use subtle::ConstantTimeEq;
use tracing::debug;
use tracing::error;

use super::errors::PasswordError;
use super::policy::HashPrimitive;
use super::policy::PasswordPolicy;
use super::record::PasswordRecord;

/// Salted PBKDF2 password hashing.
///
/// Supports two storage conventions sharing one derivation: the derived key
/// and salt as separate encoded fields, or a single encoded `salt || key`
/// blob split at the policy's salt length.
#[derive(Debug, Clone)]
pub struct PasswordService {
    policy: PasswordPolicy,
}

impl PasswordService {
    pub fn new(policy: PasswordPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Returns
    /// `(encoded_hash, encoded_salt)`
    ///
    /// # Errors
    /// * `RandomSource` - The OS random source failed
    pub fn hash_password(&self, plaintext: &str) -> Result<(String, String), PasswordError> {
        let salt = self.generate_salt()?;
        let derived = self.derive(plaintext.as_bytes(), &salt);
        let encoding = self.policy.encoding();

        debug!(hash = %self.policy.hash(), "Password hashed");

        Ok((encoding.encode(&derived), encoding.encode(&salt)))
    }

    /// Verify a password against a separately stored hash and salt.
    ///
    /// Returns `false` for undecodable records as well as for mismatches.
    pub fn verify_password(&self, encoded_hash: &str, encoded_salt: &str, plaintext: &str) -> bool {
        let encoding = self.policy.encoding();
        let decoded = encoding
            .decode(encoded_hash)
            .zip(encoding.decode(encoded_salt))
            .map(|(hash, salt)| (salt, hash));

        self.verify_decoded(plaintext, decoded)
    }

    /// Hash a plaintext password into a single encoded `salt || key` blob.
    ///
    /// # Errors
    /// * `RandomSource` - The OS random source failed
    pub fn hash_password_with_encoded_salt(&self, plaintext: &str) -> Result<String, PasswordError> {
        let mut salted = self.generate_salt()?;
        let derived = self.derive(plaintext.as_bytes(), &salted);
        salted.extend_from_slice(&derived);

        debug!(hash = %self.policy.hash(), "Password hashed with embedded salt");

        Ok(self.policy.encoding().encode(&salted))
    }

    /// Verify a password against a single encoded `salt || key` blob.
    ///
    /// The first `salt_len` decoded bytes are the salt. Blobs that fail to
    /// decode or are shorter than the salt return `false`.
    pub fn verify_password_with_encoded_salt(&self, encoded: &str, plaintext: &str) -> bool {
        let salt_len = self.policy.salt_len();
        let decoded = self
            .policy
            .encoding()
            .decode(encoded)
            .filter(|bytes| bytes.len() >= salt_len)
            .map(|mut salt| {
                let hash = salt.split_off(salt_len);
                (salt, hash)
            });

        self.verify_decoded(plaintext, decoded)
    }

    /// Verify a password against either storage convention.
    pub fn verify_record(&self, record: &PasswordRecord, plaintext: &str) -> bool {
        match record {
            PasswordRecord::Separate { hash, salt } => self.verify_password(hash, salt, plaintext),
            PasswordRecord::Combined(blob) => self.verify_password_with_encoded_salt(blob, plaintext),
        }
    }

    fn generate_salt(&self) -> Result<Vec<u8>, PasswordError> {
        let mut salt = vec![0u8; self.policy.salt_len()];
        OsRng.try_fill_bytes(&mut salt).map_err(|e| {
            error!(error = %e, "Secure random source failed");
            PasswordError::RandomSource(e.to_string())
        })?;
        Ok(salt)
    }

    fn derive(&self, password: &[u8], salt: &[u8]) -> Vec<u8> {
        let mut key = vec![0u8; self.policy.key_len()];
        let rounds = self.policy.iterations();

        match self.policy.hash() {
            HashPrimitive::Sha1 => pbkdf2_hmac::<Sha1>(password, salt, rounds, &mut key),
            HashPrimitive::Sha256 => pbkdf2_hmac::<Sha256>(password, salt, rounds, &mut key),
            HashPrimitive::Sha384 => pbkdf2_hmac::<Sha384>(password, salt, rounds, &mut key),
            HashPrimitive::Sha512 => pbkdf2_hmac::<Sha512>(password, salt, rounds, &mut key),
        }

        key
    }

    /// Recompute and compare in constant time. An undecodable record still
    /// pays for one derivation so it is indistinguishable from a mismatch.
    fn verify_decoded(&self, plaintext: &str, decoded: Option<(Vec<u8>, Vec<u8>)>) -> bool {
        match decoded {
            Some((salt, expected)) => {
                let derived = self.derive(plaintext.as_bytes(), &salt);
                derived.as_slice().ct_eq(expected.as_slice()).into()
            }
            None => {
                let dummy_salt = vec![0u8; self.policy.salt_len()];
                black_box(self.derive(plaintext.as_bytes(), &dummy_salt));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::policy::Encoding;

    fn service(hash: HashPrimitive, encoding: Encoding) -> PasswordService {
        let policy = PasswordPolicy::new(1000, 256, 16, hash, encoding).unwrap();
        PasswordService::new(policy)
    }

    #[test]
    fn test_hash_and_verify() {
        let service = service(HashPrimitive::Sha1, Encoding::Hex);
        let password = "iwakpitik";

        let (hash, salt) = service.hash_password(password).expect("Failed to hash password");
        assert_eq!(hash.len(), 256 * 2);
        assert_eq!(salt.len(), 16 * 2);

        assert!(service.verify_password(&hash, &salt, password));
        assert!(!service.verify_password(&hash, &salt, "wrong_password"));
    }

    #[test]
    fn test_hash_and_verify_with_encoded_salt() {
        let service = service(HashPrimitive::Sha1, Encoding::Hex);
        let password = "iwakpitik";

        let blob = service
            .hash_password_with_encoded_salt(password)
            .expect("Failed to hash password");
        assert_eq!(blob.len(), (16 + 256) * 2);

        assert!(service.verify_password_with_encoded_salt(&blob, password));
        assert!(!service.verify_password_with_encoded_salt(&blob, "wrong_password"));
    }

    #[test]
    fn test_base64_encoding() {
        let service = service(HashPrimitive::Sha256, Encoding::Base64);

        let (hash, salt) = service.hash_password("p4ss").unwrap();
        assert!(service.verify_password(&hash, &salt, "p4ss"));

        let blob = service.hash_password_with_encoded_salt("p4ss").unwrap();
        assert!(service.verify_password_with_encoded_salt(&blob, "p4ss"));
    }

    #[test]
    fn test_every_hash_primitive() {
        for hash in [
            HashPrimitive::Sha1,
            HashPrimitive::Sha256,
            HashPrimitive::Sha384,
            HashPrimitive::Sha512,
        ] {
            let service = service(hash, Encoding::Hex);
            let (encoded, salt) = service.hash_password("secret").unwrap();
            assert!(service.verify_password(&encoded, &salt, "secret"), "{}", hash);
        }
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let service = service(HashPrimitive::Sha1, Encoding::Hex);

        let (hash1, salt1) = service.hash_password("repeat").unwrap();
        let (hash2, salt2) = service.hash_password("repeat").unwrap();
        assert_ne!(salt1, salt2);
        assert_ne!(hash1, hash2);
        assert!(service.verify_password(&hash1, &salt1, "repeat"));
        assert!(service.verify_password(&hash2, &salt2, "repeat"));

        let blob1 = service.hash_password_with_encoded_salt("repeat").unwrap();
        let blob2 = service.hash_password_with_encoded_salt("repeat").unwrap();
        assert_ne!(blob1, blob2);
    }

    #[test]
    fn test_known_derivation() {
        // RFC 6070 test vector: PBKDF2-HMAC-SHA1, "password"/"salt", 2 rounds
        let policy = PasswordPolicy::new(2, 20, 4, HashPrimitive::Sha1, Encoding::Hex).unwrap();
        let service = PasswordService::new(policy);

        let derived = service.derive(b"password", b"salt");
        assert_eq!(hex::encode(derived), "ea6c014dc72d6f8ccd1ed92ace1d41f0d8de8957");
        assert!(service.verify_password(
            "ea6c014dc72d6f8ccd1ed92ace1d41f0d8de8957",
            &hex::encode(b"salt"),
            "password"
        ));
    }

    #[test]
    fn test_malformed_records_return_false() {
        let service = service(HashPrimitive::Sha1, Encoding::Hex);
        let (hash, salt) = service.hash_password("password").unwrap();

        assert!(!service.verify_password("not-hex", &salt, "password"));
        assert!(!service.verify_password(&hash, "not-hex", "password"));
        assert!(!service.verify_password("", "", "password"));
        assert!(!service.verify_password_with_encoded_salt("zzzz", "password"));
        assert!(!service.verify_password_with_encoded_salt("", "password"));
    }

    #[test]
    fn test_blob_shorter_than_salt_returns_false() {
        let service = service(HashPrimitive::Sha1, Encoding::Hex);
        let short = hex::encode([7u8; 8]);
        assert!(!service.verify_password_with_encoded_salt(&short, "password"));

        let salt_only = hex::encode([7u8; 16]);
        assert!(!service.verify_password_with_encoded_salt(&salt_only, "password"));
    }

    #[test]
    fn test_verify_record_dispatch() {
        let service = service(HashPrimitive::Sha256, Encoding::Hex);

        let separate = PasswordRecord::from(service.hash_password("pw").unwrap());
        let combined = PasswordRecord::combined(service.hash_password_with_encoded_salt("pw").unwrap());

        assert!(service.verify_record(&separate, "pw"));
        assert!(service.verify_record(&combined, "pw"));
        assert!(!service.verify_record(&separate, "other"));
        assert!(!service.verify_record(&combined, "other"));
    }
}
