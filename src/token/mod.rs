//! Token assembly and compact signing.

pub mod builder;
pub mod signer;

pub use builder::TokenBuilder;
pub use signer::TokenSigner;
