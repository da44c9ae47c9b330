//! Upload API.
//!
//! This module provides the client for the receiving service, its
//! response types, and the notification channel used across the crate.

pub mod client;
pub mod types;
pub mod logs;

pub use client::UploadClient;
pub use types::*;
pub use logs::*;
