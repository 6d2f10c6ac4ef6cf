//! Authentication for claimdesk: signed identity tokens, password hashing,
//! and the register/login flows that tie them to stored accounts.
//!
//! Authorization is not decided here; see `claimdesk_core::access`.

pub mod accounts;
pub mod error;
pub mod password;
pub mod token;

pub use accounts::AccountService;
pub use error::TokenError;
pub use token::{TokenService, VerifiedToken};
