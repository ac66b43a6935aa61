//! VEIL Ciphertext Substrate
//!
//! Homomorphic encryption layer for the eligibility engine, built on
//! TFHE-rs. Supplies encrypted integer/boolean values, operators over
//! them, plaintext promotion, and the decrypt-permission bookkeeping
//! the engine relies on.
//!
//! # Architecture
//! - ClientKey: encrypts submissions, performs off-engine decryption
//! - ServerKey: evaluates operators without decrypting (host-side)
//! - PublicKey: encryption only, publishable
//! - CipherVault: handle-addressed ciphertext store + grant ACL
//!
//! The engine core never sees a scheme type. It works with opaque
//! [`Handle`]s and asks the vault to combine them.

pub mod errors;
pub mod keys;
pub mod submission;
pub mod value;
pub mod vault;

pub use errors::FheError;
pub use keys::{clear_server_key, install_server_key, ClientKey, FheConfig, InstanceKeys, PublicKey, ServerKey};
pub use submission::SubmissionBundle;
pub use value::{EncBool, EncUint32, EncUint64, EncUint8};
pub use vault::{AttributeHandles, CipherVault, Handle};

/// Result type for substrate operations
pub type FheResult<T> = Result<T, FheError>;
