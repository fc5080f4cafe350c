//! Service modules for the backend REST API under `/api/v1`.
//!
//! One module per resource, each a set of free functions taking the shared
//! [`ApiClient`] and the signed-in user's bearer token.

pub mod accounts;
pub mod auth;
pub mod client;
pub mod coa;
pub mod divisions;
pub mod journal_types;
pub mod journals;
pub mod partner_types;
pub mod partners;
pub mod reports;

pub use client::ApiClient;
