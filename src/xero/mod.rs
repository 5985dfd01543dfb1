//! Xero HTTP client and API interaction layer.
//!
//! This module provides the access layer for the Xero Accounting API. Key
//! features:
//!
//! - **Secure credential handling** via `secrecy::SecretString`
//! - **Safe logging** that never leaks tokens or contact data in `where` clauses
//! - **Bounded linear retry** on rate-limit responses via [`retry::RetryPolicy`]
//! - **Chunked contact retrieval** with pluggable progress reporting

pub mod client;
pub mod contact;
pub mod contacts;
pub mod groups;
pub mod retry;
pub mod service;

pub use client::{ContactGroup, Credentials, XeroClient};
pub use contact::{Address, Contact, FlatContact, Phone};
pub use contacts::{ContactFetcher, NoProgress, Progress};
pub use groups::{GroupExpander, GroupResolver};
pub use retry::RetryPolicy;
pub use service::ContactGroupQuery;
