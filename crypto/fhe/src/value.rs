//! Typed encrypted values
//!
//! Wrappers over TFHE-rs ciphertexts for the widths the identity domain
//! uses: 64-bit passport digests and proof tokens, 32-bit birth years,
//! 8-bit country codes, and boolean predicate results. Operators never
//! decrypt; they yield new ciphertexts.

use crate::keys::{ClientKey, PublicKey};
use crate::{FheError, FheResult};
use tfhe::prelude::*;
use tfhe::FheBool as TfheFheBool;

macro_rules! encrypted_uint {
    ($(#[$doc:meta])* $name:ident, $tfhe:ty, $compact:ty, $plain:ty, $width:expr) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $name {
            inner: $tfhe,
        }

        impl $name {
            /// Width label used in type-mismatch diagnostics
            pub const WIDTH: &'static str = $width;

            /// Encrypt a plaintext value with the client key
            pub fn encrypt(value: $plain, key: &ClientKey) -> FheResult<Self> {
                let inner = <$tfhe>::try_encrypt(value, key.inner())
                    .map_err(|e| FheError::EncryptionFailed(e.to_string()))?;
                Ok(Self { inner })
            }

            /// Encrypt with the instance public key (third-party encryption)
            pub fn encrypt_with_public(value: $plain, key: &PublicKey) -> FheResult<Self> {
                let compact = <$compact>::try_encrypt(value, key.inner())
                    .map_err(|e| FheError::EncryptionFailed(e.to_string()))?;
                Ok(Self {
                    inner: compact.expand(),
                })
            }

            /// Promote a plaintext constant into the ciphertext domain
            ///
            /// Trivial encryption: valid as an operand, carries no secrecy
            /// of its own. Requires an installed server key.
            pub fn promote(value: $plain) -> FheResult<Self> {
                let inner = <$tfhe>::try_encrypt_trivial(value)
                    .map_err(|e| FheError::EncryptionFailed(e.to_string()))?;
                Ok(Self { inner })
            }

            /// Decrypt with the client key
            pub fn decrypt(&self, key: &ClientKey) -> $plain {
                self.inner.decrypt(key.inner())
            }

            /// Get reference to the inner TFHE ciphertext
            pub fn inner(&self) -> &$tfhe {
                &self.inner
            }

            /// Wrap an existing TFHE ciphertext
            pub fn from_tfhe(inner: $tfhe) -> Self {
                Self { inner }
            }

            /// Serialize the ciphertext
            pub fn to_bytes(&self) -> FheResult<Vec<u8>> {
                bincode::serialize(&self.inner)
                    .map_err(|e| FheError::SerializationError(e.to_string()))
            }

            /// Deserialize a ciphertext
            pub fn from_bytes(bytes: &[u8]) -> FheResult<Self> {
                let inner: $tfhe = bincode::deserialize(bytes)
                    .map_err(|e| FheError::SerializationError(e.to_string()))?;
                Ok(Self { inner })
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name)).finish()
            }
        }
    };
}

encrypted_uint!(
    /// Encrypted 64-bit value (passport digests, proof tokens)
    EncUint64,
    tfhe::FheUint64,
    tfhe::CompactFheUint64,
    u64,
    "u64"
);

encrypted_uint!(
    /// Encrypted 32-bit value (birth years)
    EncUint32,
    tfhe::FheUint32,
    tfhe::CompactFheUint32,
    u32,
    "u32"
);

encrypted_uint!(
    /// Encrypted 8-bit value (country codes)
    EncUint8,
    tfhe::FheUint8,
    tfhe::CompactFheUint8,
    u8,
    "u8"
);

impl EncUint32 {
    /// Homomorphic subtraction (wrapping, like the underlying scheme)
    pub fn sub(&self, other: &EncUint32) -> EncUint32 {
        EncUint32::from_tfhe(&self.inner - &other.inner)
    }

    /// Homomorphic greater-or-equal, yields an encrypted boolean
    pub fn ge(&self, other: &EncUint32) -> EncBool {
        EncBool::from_tfhe(self.inner.ge(&other.inner))
    }
}

impl EncUint8 {
    /// Homomorphic equality, yields an encrypted boolean
    pub fn eq(&self, other: &EncUint8) -> EncBool {
        EncBool::from_tfhe(self.inner.eq(&other.inner))
    }
}

/// Encrypted boolean (predicate results)
#[derive(Clone)]
pub struct EncBool {
    inner: TfheFheBool,
}

impl EncBool {
    /// Width label used in type-mismatch diagnostics
    pub const WIDTH: &'static str = "bool";

    /// Promote a plaintext boolean into the ciphertext domain
    ///
    /// Routed through an 8-bit trivial encryption and a nonzero test so
    /// the result is a scheme-level boolean.
    pub fn promote(value: bool) -> FheResult<Self> {
        let raw = EncUint8::promote(value as u8)?;
        let zero = EncUint8::promote(0)?;
        Ok(Self {
            inner: raw.inner().ne(zero.inner()),
        })
    }

    /// Decrypt with the client key
    pub fn decrypt(&self, key: &ClientKey) -> bool {
        self.inner.decrypt(key.inner())
    }

    /// Logical AND
    pub fn and(&self, other: &EncBool) -> EncBool {
        EncBool::from_tfhe(&self.inner & &other.inner)
    }

    /// Logical OR
    pub fn or(&self, other: &EncBool) -> EncBool {
        EncBool::from_tfhe(&self.inner | &other.inner)
    }

    /// Logical NOT
    pub fn not(&self) -> EncBool {
        EncBool::from_tfhe(!&self.inner)
    }

    /// Oblivious selection between two encrypted 64-bit values
    ///
    /// The condition never leaves the ciphertext domain; both branches
    /// are computed and the scheme picks one.
    pub fn select_u64(&self, if_true: &EncUint64, if_false: &EncUint64) -> EncUint64 {
        EncUint64::from_tfhe(self.inner.if_then_else(if_true.inner(), if_false.inner()))
    }

    /// Get reference to the inner TFHE boolean
    pub fn inner(&self) -> &TfheFheBool {
        &self.inner
    }

    /// Wrap an existing TFHE boolean
    pub fn from_tfhe(inner: TfheFheBool) -> Self {
        Self { inner }
    }

    /// Serialize the ciphertext
    pub fn to_bytes(&self) -> FheResult<Vec<u8>> {
        bincode::serialize(&self.inner).map_err(|e| FheError::SerializationError(e.to_string()))
    }

    /// Deserialize a ciphertext
    pub fn from_bytes(bytes: &[u8]) -> FheResult<Self> {
        let inner: TfheFheBool =
            bincode::deserialize(bytes).map_err(|e| FheError::SerializationError(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl std::fmt::Debug for EncBool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncBool").finish()
    }
}
