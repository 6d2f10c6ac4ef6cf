//! Core types, access rules and resource services for claimdesk.
//!
//! No HTTP or database code lives here. Storage is reached only through the
//! [`store::InsuranceStore`] trait, which concrete backends (e.g.
//! `claimdesk-store-sqlite`) implement.

pub mod access;
pub mod claim;
pub mod date;
pub mod error;
pub mod identity;
pub mod page;
pub mod policy;
pub mod service;
pub mod store;
pub mod user;

pub use error::{Error, ErrorKind, Result};
