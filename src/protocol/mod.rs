//! Wire protocol: request and response shapes, nonces, and validation.

pub mod nonce;
pub mod request;
pub mod response;
pub mod validator;

pub use nonce::Nonce;
pub use request::{MessageImprint, Request, PROTOCOL_VERSION};
pub use response::{
    Accuracy, FailureReason, Response, ResponseStatus, TokenContent, STATUS_GRANTED,
    STATUS_REJECTION,
};
pub use validator::{HashAlgorithm, RequestValidator, ValidRequest};
