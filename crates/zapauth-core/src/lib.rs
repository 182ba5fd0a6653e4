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

//! Scanner-agnostic authentication model and collaborator seams.
//!
//! Layout: `model.rs` (roster, tokens, rules, outcomes), `notice.rs`
//! (operator-facing notices and sinks), `service.rs` (`ScannerControl` and
//! `LoginEndpoint` traits), `error.rs` (typed collaborator errors).

pub mod error;
pub mod model;
pub mod notice;
pub mod service;

pub use error::{LoginError, LoginResult, ScannerError, ScannerResult, error_chain};
pub use model::{
    AccessToken, AuthOutcome, AuthReport, ContextRef, DEFAULT_CONTEXT_NAME, DEFAULT_ROSTER,
    HeaderRule, LoginOutcome, Role, UserCredential, UserReport,
};
pub use notice::{Notice, NoticeSink, StdoutNotices};
pub use service::{LoginEndpoint, ScannerControl};
