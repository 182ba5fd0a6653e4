#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! `ScannerControl` implementation backed by the ZAP JSON API.
//!
//! Layout: `client.rs` (HTTP client and trait implementation), `wire.rs`
//! (endpoint table and response decoding helpers).

mod client;
mod wire;

pub use client::{DEFAULT_ZAP_URL, HEADER_API_KEY, ZapClient, ZapConfig};
