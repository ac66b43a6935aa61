//! Key management for the ciphertext substrate
//!
//! One TFHE key set exists per engine instance:
//! - ClientKey: encrypts submissions and performs off-engine decryption
//! - ServerKey: evaluates homomorphic operators (held by the host)
//! - PublicKey: lets third parties encrypt values for the instance
//!
//! TFHE-rs requires the server key to be installed globally before any
//! homomorphic operator runs.

use crate::{FheError, FheResult};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;
use tfhe::{generate_keys, CompactPublicKey, ConfigBuilder};
use tfhe::{ClientKey as TfheClientKey, ServerKey as TfheServerKey};

/// Substrate configuration
#[derive(Clone, Debug)]
pub struct FheConfig {
    /// Security parameter (bits)
    pub security_bits: u32,
    /// Enable multi-threaded operator evaluation
    pub multi_threaded: bool,
}

impl Default for FheConfig {
    fn default() -> Self {
        Self {
            security_bits: 128,
            multi_threaded: true,
        }
    }
}

impl FheConfig {
    /// Fingerprint used to detect keys generated under a different configuration
    fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"veil.fhe.config.v1");
        hasher.update(&self.security_bits.to_le_bytes());
        hasher.update(&[self.multi_threaded as u8]);
        *hasher.finalize().as_bytes()
    }
}

/// Global server key slot, mirrored into the TFHE-rs thread context
static INSTALLED_SERVER_KEY: OnceCell<Arc<RwLock<Option<TfheServerKey>>>> = OnceCell::new();

fn installed_slot() -> &'static Arc<RwLock<Option<TfheServerKey>>> {
    INSTALLED_SERVER_KEY.get_or_init(|| Arc::new(RwLock::new(None)))
}

/// Install a server key for homomorphic operations
pub fn install_server_key(key: &ServerKey) {
    let slot = installed_slot();
    *slot.write() = Some(key.inner.clone());
    tfhe::set_server_key(key.inner.clone());
}

/// Remove the installed server key
pub fn clear_server_key() {
    *installed_slot().write() = None;
}

/// Secret key for encryption and decryption
///
/// Held off-engine by the instance's key authority. Never enters
/// engine state.
#[derive(Clone)]
pub struct ClientKey {
    pub(crate) inner: TfheClientKey,
    fingerprint: [u8; 32],
}

impl ClientKey {
    /// Get reference to the inner TFHE key
    pub fn inner(&self) -> &TfheClientKey {
        &self.inner
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> FheResult<Vec<u8>> {
        bincode::serialize(&self.inner).map_err(|e| FheError::SerializationError(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8], config: &FheConfig) -> FheResult<Self> {
        let inner: TfheClientKey =
            bincode::deserialize(bytes).map_err(|e| FheError::SerializationError(e.to_string()))?;
        Ok(Self {
            inner,
            fingerprint: config.fingerprint(),
        })
    }
}

impl std::fmt::Debug for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientKey")
            .field("fingerprint", &hex::encode(&self.fingerprint[..8]))
            .finish()
    }
}

/// Evaluation key for homomorphic operators
///
/// Safe to share with the hosting ledger. Cannot decrypt.
#[derive(Clone)]
pub struct ServerKey {
    pub(crate) inner: TfheServerKey,
    fingerprint: [u8; 32],
}

impl ServerKey {
    /// Check the key was generated under the given configuration
    pub fn matches_config(&self, config: &FheConfig) -> bool {
        self.fingerprint == config.fingerprint()
    }

    /// Install this key globally for operator evaluation
    pub fn install(&self) {
        install_server_key(self);
    }
}

impl std::fmt::Debug for ServerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKey")
            .field("fingerprint", &hex::encode(&self.fingerprint[..8]))
            .finish()
    }
}

/// Compact public key for encryption only
#[derive(Clone)]
pub struct PublicKey {
    pub(crate) inner: CompactPublicKey,
    fingerprint: [u8; 32],
}

impl PublicKey {
    /// Get reference to the inner key
    pub fn inner(&self) -> &CompactPublicKey {
        &self.inner
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> FheResult<Vec<u8>> {
        bincode::serialize(&self.inner).map_err(|e| FheError::SerializationError(e.to_string()))
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("fingerprint", &hex::encode(&self.fingerprint[..8]))
            .finish()
    }
}

/// Complete key set for one engine instance
#[derive(Clone)]
pub struct InstanceKeys {
    /// Secret key (encryption + decryption)
    pub client: ClientKey,
    /// Evaluation key (homomorphic operators)
    pub server: ServerKey,
    /// Public encryption key
    pub public: PublicKey,
}

impl InstanceKeys {
    /// Generate a fresh key set
    ///
    /// WARNING: TFHE key generation takes seconds to tens of seconds.
    pub fn generate(config: &FheConfig) -> FheResult<Self> {
        let tfhe_config = ConfigBuilder::default().build();
        let (client_key, server_key) = generate_keys(tfhe_config);
        let public_key = CompactPublicKey::new(&client_key);
        let fingerprint = config.fingerprint();

        Ok(Self {
            client: ClientKey {
                inner: client_key,
                fingerprint,
            },
            server: ServerKey {
                inner: server_key,
                fingerprint,
            },
            public: PublicKey {
                inner: public_key,
                fingerprint,
            },
        })
    }

    /// Install the server key globally (required before any operator runs)
    pub fn install(&self) {
        self.server.install();
    }
}

impl std::fmt::Debug for InstanceKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceKeys")
            .field("client", &self.client)
            .finish()
    }
}
