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

//! Shared test helpers used across integration suites.
//! Layout: mocks.rs (in-memory scanner, scripted login, recording notices), fixtures.rs (tokens and contexts).

pub mod fixtures;
pub mod mocks;

pub use mocks::{LoginScript, RecordedUser, RecordingNotices, RecordingScanner, ScriptedLogin};
