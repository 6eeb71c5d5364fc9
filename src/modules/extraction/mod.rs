pub mod json_walk;
pub mod pairing;

pub use pairing::{build_mapping, PairingStrategy, PublishMapping};
