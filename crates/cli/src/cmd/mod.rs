pub mod confirm;
pub mod ens;
pub mod namehash;
pub mod status;
pub mod tx_hash;

mod common;
