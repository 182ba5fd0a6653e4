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

//! Authenticates the test roster against the target API and registers the
//! resulting bearer tokens with the scanner.
//!
//! Layout: `hooks.rs` (`ensure_context` and the `Bootstrapper` run loop),
//! `login.rs` (HTTP login endpoint), `error.rs` (bootstrap errors).

pub mod error;
pub mod hooks;
pub mod login;

pub use error::{BootstrapError, BootstrapResult};
pub use hooks::{Bootstrapper, ensure_context, run_hooks, scope_regex, session_site};
pub use login::{HttpLoginEndpoint, LOGIN_PATH};
