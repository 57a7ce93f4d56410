//! Identity verification for the admin upload flow.
//!
//! Split into the error type, the verifier abstraction with its Firebase
//! implementation, and the gate that enforces the single admin address.

pub mod errors;
pub mod gate;
pub mod verifier;

pub use errors::AuthError;
pub use gate::AdminGate;
pub use verifier::{FirebaseVerifier, IdentityVerifier, VerifiedIdentity};
