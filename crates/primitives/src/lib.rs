pub use alloy_primitives;

/// The keccak hashing primitive shared by transaction hashing and ENS.
pub mod hash;

pub mod address;
pub mod error;
pub mod rpc;
pub mod signature;
pub mod utils;

pub use address::{parse_address, AddressExt};
pub use error::PrimitiveError;
pub use hash::{eth_sign_digest, hash};
pub use signature::{SafeSignature, SignatureKind};
