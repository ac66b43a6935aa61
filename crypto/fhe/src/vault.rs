//! Ciphertext vault
//!
//! The vault owns every ciphertext an engine instance works with and
//! addresses them by opaque 32-byte handles. Homomorphic operators take
//! handles and yield handles; callers never touch scheme types.
//!
//! Decryption is gated by a per-handle grant list. A grant names one
//! principal and one handle; holding a grant for a derived value never
//! implies a grant for its operands.

use crate::submission::SubmissionBundle;
use crate::value::{EncBool, EncUint32, EncUint64, EncUint8};
use crate::{ClientKey, FheError, FheResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Opaque reference to a ciphertext stored in the vault
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle([u8; 32]);

impl Handle {
    /// Wrap raw handle bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

/// A stored ciphertext of any supported width
enum CipherValue {
    U64(EncUint64),
    U32(EncUint32),
    U8(EncUint8),
    Bool(EncBool),
}

impl CipherValue {
    fn width(&self) -> &'static str {
        match self {
            CipherValue::U64(_) => EncUint64::WIDTH,
            CipherValue::U32(_) => EncUint32::WIDTH,
            CipherValue::U8(_) => EncUint8::WIDTH,
            CipherValue::Bool(_) => EncBool::WIDTH,
        }
    }
}

/// Handles of one ingested attribute submission
#[derive(Clone, Copy, Debug)]
pub struct AttributeHandles {
    /// Passport-digest ciphertext
    pub passport: Handle,
    /// Birth-year ciphertext
    pub birth_year: Handle,
    /// Country-code ciphertext
    pub country: Handle,
}

/// Handle-addressed ciphertext store with decrypt-permission bookkeeping
pub struct CipherVault {
    instance_id: [u8; 32],
    values: HashMap<Handle, CipherValue>,
    grants: HashMap<Handle, HashSet<[u8; 32]>>,
    next_seq: u64,
}

impl CipherVault {
    /// Create an empty vault for one engine instance
    pub fn new(instance_id: [u8; 32]) -> Self {
        Self {
            instance_id,
            values: HashMap::new(),
            grants: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Engine instance this vault serves
    pub fn instance_id(&self) -> [u8; 32] {
        self.instance_id
    }

    /// Number of stored ciphertexts
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the vault is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check whether a handle refers to a stored ciphertext
    pub fn contains(&self, handle: Handle) -> bool {
        self.values.contains_key(&handle)
    }

    fn store(&mut self, value: CipherValue) -> Handle {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"veil.handle.v1");
        hasher.update(&self.instance_id);
        hasher.update(&self.next_seq.to_le_bytes());
        let handle = Handle(*hasher.finalize().as_bytes());
        self.next_seq += 1;
        self.values.insert(handle, value);
        handle
    }

    fn fetch(&self, handle: Handle) -> FheResult<&CipherValue> {
        self.values
            .get(&handle)
            .ok_or_else(|| FheError::UnknownHandle(handle.to_hex()))
    }

    fn fetch_u64(&self, handle: Handle) -> FheResult<&EncUint64> {
        match self.fetch(handle)? {
            CipherValue::U64(v) => Ok(v),
            other => Err(FheError::TypeMismatch {
                expected: EncUint64::WIDTH,
                got: other.width(),
            }),
        }
    }

    fn fetch_u32(&self, handle: Handle) -> FheResult<&EncUint32> {
        match self.fetch(handle)? {
            CipherValue::U32(v) => Ok(v),
            other => Err(FheError::TypeMismatch {
                expected: EncUint32::WIDTH,
                got: other.width(),
            }),
        }
    }

    fn fetch_u8(&self, handle: Handle) -> FheResult<&EncUint8> {
        match self.fetch(handle)? {
            CipherValue::U8(v) => Ok(v),
            other => Err(FheError::TypeMismatch {
                expected: EncUint8::WIDTH,
                got: other.width(),
            }),
        }
    }

    fn fetch_bool(&self, handle: Handle) -> FheResult<&EncBool> {
        match self.fetch(handle)? {
            CipherValue::Bool(v) => Ok(v),
            other => Err(FheError::TypeMismatch {
                expected: EncBool::WIDTH,
                got: other.width(),
            }),
        }
    }

    // ---- ingestion ----

    /// Verify a submission bundle's binding proof and admit its three
    /// ciphertexts
    ///
    /// No grants are issued here; the engine decides who may decrypt.
    pub fn ingest_submission(
        &mut self,
        bundle: &SubmissionBundle,
        subject: [u8; 32],
    ) -> FheResult<AttributeHandles> {
        bundle.verify(self.instance_id, subject)?;

        let passport = EncUint64::from_bytes(bundle.passport_ct())?;
        let birth_year = EncUint32::from_bytes(bundle.birth_year_ct())?;
        let country = EncUint8::from_bytes(bundle.country_ct())?;

        Ok(AttributeHandles {
            passport: self.store(CipherValue::U64(passport)),
            birth_year: self.store(CipherValue::U32(birth_year)),
            country: self.store(CipherValue::U8(country)),
        })
    }

    // ---- plaintext promotion ----

    /// Promote a plaintext u64 constant
    pub fn promote_u64(&mut self, value: u64) -> FheResult<Handle> {
        let v = EncUint64::promote(value)?;
        Ok(self.store(CipherValue::U64(v)))
    }

    /// Promote a plaintext u32 constant
    pub fn promote_u32(&mut self, value: u32) -> FheResult<Handle> {
        let v = EncUint32::promote(value)?;
        Ok(self.store(CipherValue::U32(v)))
    }

    /// Promote a plaintext u8 constant
    pub fn promote_u8(&mut self, value: u8) -> FheResult<Handle> {
        let v = EncUint8::promote(value)?;
        Ok(self.store(CipherValue::U8(v)))
    }

    /// Promote a plaintext boolean constant
    pub fn promote_bool(&mut self, value: bool) -> FheResult<Handle> {
        let v = EncBool::promote(value)?;
        Ok(self.store(CipherValue::Bool(v)))
    }

    // ---- homomorphic operators ----

    /// `a - b` over encrypted u32 (wrapping)
    pub fn sub_u32(&mut self, a: Handle, b: Handle) -> FheResult<Handle> {
        let result = self.fetch_u32(a)?.sub(self.fetch_u32(b)?);
        Ok(self.store(CipherValue::U32(result)))
    }

    /// `a >= b` over encrypted u32, yields an encrypted boolean
    pub fn ge_u32(&mut self, a: Handle, b: Handle) -> FheResult<Handle> {
        let result = self.fetch_u32(a)?.ge(self.fetch_u32(b)?);
        Ok(self.store(CipherValue::Bool(result)))
    }

    /// `a == b` over encrypted u8, yields an encrypted boolean
    pub fn eq_u8(&mut self, a: Handle, b: Handle) -> FheResult<Handle> {
        let result = self.fetch_u8(a)?.eq(self.fetch_u8(b)?);
        Ok(self.store(CipherValue::Bool(result)))
    }

    /// Logical AND over encrypted booleans
    pub fn and(&mut self, a: Handle, b: Handle) -> FheResult<Handle> {
        let result = self.fetch_bool(a)?.and(self.fetch_bool(b)?);
        Ok(self.store(CipherValue::Bool(result)))
    }

    /// Logical OR over encrypted booleans
    pub fn or(&mut self, a: Handle, b: Handle) -> FheResult<Handle> {
        let result = self.fetch_bool(a)?.or(self.fetch_bool(b)?);
        Ok(self.store(CipherValue::Bool(result)))
    }

    /// Oblivious select between two encrypted u64 values
    pub fn select_u64(&mut self, cond: Handle, if_true: Handle, if_false: Handle) -> FheResult<Handle> {
        let result = self
            .fetch_bool(cond)?
            .select_u64(self.fetch_u64(if_true)?, self.fetch_u64(if_false)?);
        Ok(self.store(CipherValue::U64(result)))
    }

    // ---- permission bookkeeping ----

    /// Grant `principal` the right to decrypt the value behind `handle`
    pub fn allow(&mut self, handle: Handle, principal: [u8; 32]) -> FheResult<()> {
        if !self.values.contains_key(&handle) {
            return Err(FheError::UnknownHandle(handle.to_hex()));
        }
        self.grants.entry(handle).or_default().insert(principal);
        Ok(())
    }

    /// Check whether `principal` may decrypt the value behind `handle`
    pub fn is_allowed(&self, handle: Handle, principal: [u8; 32]) -> bool {
        self.grants
            .get(&handle)
            .is_some_and(|set| set.contains(&principal))
    }

    /// List the principals granted on a handle (auditable)
    pub fn grants_of(&self, handle: Handle) -> Vec<[u8; 32]> {
        self.grants
            .get(&handle)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    fn check_grant(&self, handle: Handle, principal: [u8; 32]) -> FheResult<()> {
        if !self.is_allowed(handle, principal) {
            return Err(FheError::PermissionDenied {
                principal: hex::encode(&principal[..8]),
                handle: handle.to_hex(),
            });
        }
        Ok(())
    }

    // ---- decryption boundary ----

    /// Decrypt an encrypted boolean on behalf of a granted principal
    pub fn decrypt_bool(
        &self,
        handle: Handle,
        principal: [u8; 32],
        key: &ClientKey,
    ) -> FheResult<bool> {
        self.check_grant(handle, principal)?;
        Ok(self.fetch_bool(handle)?.decrypt(key))
    }

    /// Decrypt an encrypted u64 on behalf of a granted principal
    pub fn decrypt_u64(
        &self,
        handle: Handle,
        principal: [u8; 32],
        key: &ClientKey,
    ) -> FheResult<u64> {
        self.check_grant(handle, principal)?;
        Ok(self.fetch_u64(handle)?.decrypt(key))
    }

    /// Decrypt an encrypted u32 on behalf of a granted principal
    pub fn decrypt_u32(
        &self,
        handle: Handle,
        principal: [u8; 32],
        key: &ClientKey,
    ) -> FheResult<u32> {
        self.check_grant(handle, principal)?;
        Ok(self.fetch_u32(handle)?.decrypt(key))
    }

    /// Decrypt an encrypted u8 on behalf of a granted principal
    pub fn decrypt_u8(&self, handle: Handle, principal: [u8; 32], key: &ClientKey) -> FheResult<u8> {
        self.check_grant(handle, principal)?;
        Ok(self.fetch_u8(handle)?.decrypt(key))
    }
}

impl std::fmt::Debug for CipherVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherVault")
            .field("instance", &hex::encode(&self.instance_id[..8]))
            .field("values", &self.values.len())
            .field("granted_handles", &self.grants.len())
            .finish()
    }
}
